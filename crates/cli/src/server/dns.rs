use quarry_dns_domain::Config;
use quarry_dns_infrastructure::dns::{DispatchOutcome, QueryWorker, RequestDispatcher};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn start_dns_server(
    config: &Config,
    shutdown: CancellationToken,
) -> anyhow::Result<DispatchOutcome> {
    let dispatcher_config = config.server.dispatcher_config()?;
    let payload_size = dispatcher_config.listener.recv_buffer_size() as u16;

    let worker = QueryWorker::from_config(&config.dns)?.with_udp_payload_size(payload_size);

    info!(
        bind_address = %dispatcher_config.bind_addr,
        workers = dispatcher_config.workers,
        cookies = config.dns.cookies_enabled,
        malformed_policy = config.dns.malformed_policy.as_str(),
        "Starting DNS server"
    );

    let dispatcher = RequestDispatcher::bind(dispatcher_config, worker)
        .await?
        .with_shutdown_token(shutdown);

    Ok(dispatcher.run().await)
}
