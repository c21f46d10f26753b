use clap::Parser;
use quarry_dns_domain::{CliOverrides, ListenerKind};
use quarry_dns_infrastructure::dns::DispatchOutcome;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "quarry-dns")]
#[command(version)]
#[command(about = "Quarry DNS - UDP DNS front end with DNS Cookie support")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'p', long = "port")]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Worker pool size
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Answer one request, then exit
    #[arg(long)]
    once: bool,

    /// Use the multicast listener (1500 byte datagrams)
    #[arg(long)]
    multicast: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        workers: cli.workers,
        single_shot: cli.once,
        listener: cli.multicast.then_some(ListenerKind::Multicast),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Quarry DNS v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received");
        signal_token.cancel();
    });

    match server::start_dns_server(&config, shutdown).await {
        Ok(DispatchOutcome::SingleShotCompleted) => info!("Single-shot request handled"),
        Ok(DispatchOutcome::Cancelled) => info!("Server shutdown complete"),
        Err(e) => {
            error!(error = %e, "DNS server error");
            return Err(e);
        }
    }

    Ok(())
}
