pub mod dns;
pub mod errors;
pub mod logging;
pub mod root;
pub mod server;

pub use dns::{DnsConfig, MalformedPolicy};
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use server::{DispatcherConfig, ListenerKind, ServerConfig};
