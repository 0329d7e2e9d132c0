//! Online/offline state with edge-triggered change notification.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Owns the process-wide connectivity flag. Consumers observe it through
/// [`ConnectivityMonitor::subscribe`]; only transitions are broadcast.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(is_offline: bool) -> Self {
        let (tx, _rx) = watch::channel(is_offline);
        Self { tx }
    }

    pub fn is_offline(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Records the current state. Returns true if this was a transition.
    pub fn set_offline(&self, is_offline: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == is_offline {
                false
            } else {
                *current = is_offline;
                true
            }
        });
        if changed {
            info!(is_offline, "Connectivity changed");
        }
        changed
    }

    /// Periodically probes `addr` with a TCP connect and feeds the result
    /// into the monitor until the monitor is dropped.
    pub fn spawn_probe(
        self: &Arc<Self>,
        addr: String,
        interval: Duration,
        timeout: Duration,
    ) -> JoinHandle<()> {
        let monitor = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let reachable = probe(&addr, timeout).await;
                match monitor.upgrade() {
                    Some(monitor) => {
                        monitor.set_offline(!reachable);
                    }
                    None => break,
                }
            }
        })
    }
}

/// True if a TCP connection to `addr` can be opened within `timeout`.
pub async fn probe(addr: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!(addr, error = %e, "Connectivity probe failed");
            false
        }
        Err(_) => {
            debug!(addr, "Connectivity probe timed out");
            false
        }
    }
}
