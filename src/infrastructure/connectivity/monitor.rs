use crate::application::ports::{ConnectivitySink, ConnectivityState};
use crate::shared::config::ConnectivityConfig;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityEvent {
    Reconnected,
    Disconnected,
}

/// Tracks raw online/offline observations and publishes debounced transitions.
///
/// `is_connected` reflects the latest raw observation so a pass never starts
/// against a link that just dropped. Events are only published once a new
/// state has held for the debounce window, so a flapping link yields at most
/// one `Reconnected` per settled offline→online edge.
pub struct ConnectivityMonitor {
    raw: watch::Sender<bool>,
    settled: Arc<AtomicBool>,
    events: broadcast::Sender<ConnectivityEvent>,
    debounce: Duration,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool, debounce: Duration) -> Self {
        let (raw, _) = watch::channel(initially_online);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            raw,
            settled: Arc::new(AtomicBool::new(initially_online)),
            events,
            debounce,
            worker: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ConnectivityConfig) -> Self {
        Self::new(config.start_online, config.debounce())
    }

    /// Records an observation. Repeated observations of the same state are ignored.
    pub fn set_online(&self, online: bool) {
        let changed = self.raw.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::debug!(target: "sync::connectivity", online, "connectivity observation changed");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }

    /// Last state that survived the debounce window.
    pub fn settled_state(&self) -> bool {
        self.settled.load(Ordering::SeqCst)
    }

    /// Starts the debounce worker. Calling it again while running is a no-op.
    pub fn start(&self) {
        let mut worker = self.worker_slot();
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let mut rx = self.raw.subscribe();
        let settled = Arc::clone(&self.settled);
        let events = self.events.clone();
        let debounce = self.debounce;

        *worker = Some(tokio::spawn(async move {
            // Catch up with observations made before the worker started.
            rx.mark_changed();
            while rx.changed().await.is_ok() {
                if !wait_until_stable(&mut rx, debounce).await {
                    break;
                }

                let online = *rx.borrow_and_update();
                if settled.swap(online, Ordering::SeqCst) == online {
                    continue;
                }

                let event = if online {
                    ConnectivityEvent::Reconnected
                } else {
                    ConnectivityEvent::Disconnected
                };
                tracing::info!(target: "sync::connectivity", ?event, "connectivity transition");
                // No subscribers is fine; the state is still tracked.
                let _ = events.send(event);
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.worker_slot().take() {
            handle.abort();
        }
    }

    fn worker_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Waits until no new observation arrives for `debounce`. Returns false once the sender is gone.
async fn wait_until_stable(rx: &mut watch::Receiver<bool>, debounce: Duration) -> bool {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(debounce) => return true,
            changed = rx.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
        }
    }
}

impl ConnectivityState for ConnectivityMonitor {
    fn is_connected(&self) -> bool {
        *self.raw.borrow()
    }
}

impl ConnectivitySink for ConnectivityMonitor {
    fn report(&self, online: bool) {
        self.set_online(online);
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
