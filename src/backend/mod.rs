use crate::event::AppEvent;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use tokio::runtime::Handle;
use tokio::time::{self, Duration};

pub mod http;
pub mod wire;

use wire::{ChatError, TurnOutcome, TurnRequest};

/// The conversational backend, seen as an opaque request/response endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_turn(&self, request: &TurnRequest) -> Result<TurnOutcome, ChatError>;

    async fn health(&self) -> Result<bool, ChatError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Checking,
    Online,
    Offline,
}

impl BackendStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// Runs backend calls on the tokio runtime and reports results to the UI
/// thread as [`AppEvent`]s.
#[derive(Clone)]
pub struct ChatClient {
    backend: Arc<dyn ChatBackend>,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
    health_interval: Duration,
    health_poller_started: Arc<AtomicBool>,
}

impl ChatClient {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        tx: mpsc::Sender<AppEvent>,
        runtime_handle: Handle,
        health_interval: Duration,
    ) -> Self {
        Self {
            backend,
            tx,
            runtime_handle,
            health_interval,
            health_poller_started: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn start(&self) {
        let _ = self
            .tx
            .send(AppEvent::BackendStatusChanged(BackendStatus::Checking));
        self.spawn_health_poller();
    }

    /// Sends one turn. Exactly one [`AppEvent::TurnSettled`] follows, even
    /// when the request task panics.
    pub fn send(&self, request: TurnRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let runtime_handle = self.runtime_handle.clone();

        self.runtime_handle.spawn(async move {
            let request_task =
                runtime_handle.spawn(async move { backend.send_turn(&request).await });
            let result = match request_task.await {
                Ok(result) => result,
                Err(err) => Err(ChatError::Aborted(err.to_string())),
            };
            let _ = tx.send(AppEvent::TurnSettled(result));
        });
    }

    fn spawn_health_poller(&self) {
        if self
            .health_poller_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let interval = self.health_interval;
        self.runtime_handle.spawn(async move {
            let mut ticker = time::interval(interval);
            let mut last_status = BackendStatus::Checking;

            loop {
                ticker.tick().await;
                let current_status = match backend.health().await {
                    Ok(true) => BackendStatus::Online,
                    Ok(false) => BackendStatus::Offline,
                    Err(err) => {
                        tracing::debug!(error = %err, "health check failed");
                        BackendStatus::Offline
                    }
                };
                if current_status != last_status {
                    last_status = current_status;
                    if tx.send(AppEvent::BackendStatusChanged(current_status)).is_err() {
                        break;
                    }
                }
            }
        });
    }
}
