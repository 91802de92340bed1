//! Backend liveness polling.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::request::EndpointLayout;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// No check has completed yet
    Unknown,
    Online,
    Offline,
}

impl ServerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ServerStatus::Unknown => "Checking...",
            ServerStatus::Online => "Server Online",
            ServerStatus::Offline => "Server Offline",
        }
    }
}

/// Polls the health path forever at a fixed interval. A failed check flips
/// the status to offline and is simply retried on the next tick.
pub struct HealthMonitor {
    transport: Arc<dyn Transport>,
    path: &'static str,
    interval: Duration,
    status: watch::Sender<ServerStatus>,
}

impl HealthMonitor {
    pub fn new(transport: Arc<dyn Transport>, layout: EndpointLayout) -> Self {
        let (status, _) = watch::channel(ServerStatus::Unknown);
        Self {
            transport,
            path: layout.health_path(),
            interval: layout.health_interval(),
            status,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerStatus> {
        self.status.subscribe()
    }

    pub fn current(&self) -> ServerStatus {
        *self.status.borrow()
    }

    pub async fn check_once(&self) -> ServerStatus {
        let status = match self.transport.check_health(self.path).await {
            Ok(()) => ServerStatus::Online,
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                ServerStatus::Offline
            }
        };

        let previous = self.status.send_replace(status);
        if previous != status {
            tracing::info!(from = ?previous, to = ?status, "backend status changed");
        }
        status
    }

    /// Start polling on the runtime. The returned receiver sees every change.
    pub fn spawn(self) -> (watch::Receiver<ServerStatus>, JoinHandle<()>) {
        let receiver = self.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                self.check_once().await;
                tokio::time::sleep(self.interval).await;
            }
        });
        (receiver, handle)
    }
}
