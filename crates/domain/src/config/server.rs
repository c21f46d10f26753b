use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Local address to bind. `None` binds the IPv4 wildcard address.
    #[serde(default)]
    pub bind_address: Option<String>,

    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Answer a single datagram, then shut down. Meant for diagnostics and
    /// tests only.
    #[serde(default)]
    pub single_shot: bool,

    #[serde(default)]
    pub listener: ListenerKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dns_port: default_dns_port(),
            bind_address: None,
            workers: default_workers(),
            single_shot: false,
            listener: ListenerKind::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_ip(&self) -> Result<IpAddr, ConfigError> {
        match self.bind_address.as_deref() {
            None => Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            Some(addr) => addr.parse().map_err(|_| {
                ConfigError::Validation(format!("Invalid bind address: {}", addr))
            }),
        }
    }

    pub fn dispatcher_config(&self) -> Result<DispatcherConfig, ConfigError> {
        Ok(DispatcherConfig {
            bind_addr: SocketAddr::new(self.bind_ip()?, self.dns_port),
            workers: self.workers,
            single_shot: self.single_shot,
            listener: self.listener,
        })
    }
}

/// Listener variant. Fixes the receive buffer size for the socket's lifetime.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListenerKind {
    #[default]
    Unicast,

    /// Multicast DNS listener. Datagrams may be up to the link MTU.
    Multicast,
}

impl ListenerKind {
    pub fn recv_buffer_size(&self) -> usize {
        match self {
            Self::Unicast => 512,
            Self::Multicast => 1500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unicast => "unicast",
            Self::Multicast => "multicast",
        }
    }
}

/// Everything the request dispatcher needs, resolved from [`ServerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub bind_addr: SocketAddr,
    pub workers: usize,
    pub single_shot: bool,
    pub listener: ListenerKind,
}

impl DispatcherConfig {
    pub fn new(bind_addr: SocketAddr, workers: usize) -> Self {
        Self {
            bind_addr,
            workers,
            single_shot: false,
            listener: ListenerKind::Unicast,
        }
    }

    pub fn with_single_shot(mut self, single_shot: bool) -> Self {
        self.single_shot = single_shot;
        self
    }

    pub fn with_listener(mut self, listener: ListenerKind) -> Self {
        self.listener = listener;
        self
    }
}

fn default_dns_port() -> u16 {
    53
}

fn default_workers() -> usize {
    10
}
