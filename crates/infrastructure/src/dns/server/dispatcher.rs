use super::socket::create_udp_socket;
use super::worker::RequestWorker;
use quarry_dns_domain::{DispatcherConfig, DomainError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Why [`RequestDispatcher::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Single-shot mode: the first datagram has been fully processed.
    SingleShotCompleted,
    /// The shutdown token was cancelled. Units already submitted keep running.
    Cancelled,
}

/// UDP receive loop feeding a bounded pool of workers.
///
/// Each datagram is trimmed to its received length and handed to its own
/// task. At most `workers` tasks run at once; when all permits are taken the
/// loop waits before receiving again.
pub struct RequestDispatcher<W: RequestWorker> {
    socket: Arc<UdpSocket>,
    config: DispatcherConfig,
    worker: Arc<W>,
    permits: Arc<Semaphore>,
    shutdown: Option<CancellationToken>,
}

impl<W: RequestWorker> RequestDispatcher<W> {
    pub async fn bind(config: DispatcherConfig, worker: W) -> Result<Self, DomainError> {
        let socket = create_udp_socket(config.bind_addr).map_err(|e| {
            DomainError::IoError(format!("Failed to bind {}: {}", config.bind_addr, e))
        })?;
        Ok(Self::from_socket(socket, config, worker))
    }

    /// Uses an already bound socket. `config.bind_addr` is ignored.
    pub fn from_socket(socket: UdpSocket, config: DispatcherConfig, worker: W) -> Self {
        Self {
            socket: Arc::new(socket),
            permits: Arc::new(Semaphore::new(config.workers.max(1))),
            worker: Arc::new(worker),
            config,
            shutdown: None,
        }
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn run(self) -> DispatchOutcome {
        let mut recv_buf = vec![0u8; self.config.listener.recv_buffer_size()];

        info!(
            bind_address = ?self.socket.local_addr().ok(),
            workers = self.config.workers,
            listener = self.config.listener.as_str(),
            single_shot = self.config.single_shot,
            "DNS listener ready"
        );

        loop {
            let received = match &self.shutdown {
                Some(token) => tokio::select! {
                    _ = token.cancelled() => {
                        info!("DNS listener shutting down");
                        return DispatchOutcome::Cancelled;
                    }
                    result = self.socket.recv_from(&mut recv_buf) => result,
                },
                None => self.socket.recv_from(&mut recv_buf).await,
            };

            let (len, peer) = match received {
                Ok(received) => received,
                Err(e) => {
                    error!(error = %e, "UDP recv error");
                    continue;
                }
            };

            let datagram = recv_buf[..len].to_vec();
            let permit = match self.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    error!("Worker pool closed");
                    return DispatchOutcome::Cancelled;
                }
            };

            let unit = self.submit(datagram, peer, permit);

            if self.config.single_shot {
                match unit.await {
                    Ok(Ok(())) => info!(client = %peer, "Single-shot request completed"),
                    Ok(Err(e)) => error!(client = %peer, error = %e, "Single-shot request failed"),
                    Err(e) => error!(client = %peer, error = %e, "Single-shot worker panicked"),
                }
                return DispatchOutcome::SingleShotCompleted;
            }
        }
    }

    fn submit(
        &self,
        datagram: Vec<u8>,
        peer: SocketAddr,
        permit: OwnedSemaphorePermit,
    ) -> JoinHandle<Result<(), DomainError>> {
        let worker = self.worker.clone();
        let socket = self.socket.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let result = worker.process(datagram, peer, socket).await;
            if let Err(e) = &result {
                debug!(client = %peer, error = %e, "Request failed");
            }
            result
        })
    }
}
