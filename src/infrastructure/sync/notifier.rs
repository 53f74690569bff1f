use crate::application::ports::SyncNotifier;
use crate::domain::entities::SyncReport;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const SYNC_COMPLETED_TOPIC: &str = "sync://completed";
pub const SYNC_FAILED_TOPIC: &str = "sync://failed";

/// Writes pass results to the log as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSyncNotifier;

impl SyncNotifier for LoggingSyncNotifier {
    fn emit_report(&self, report: &SyncReport) -> Result<(), String> {
        let body = serde_json::to_string(report).map_err(|err| err.to_string())?;
        tracing::info!(target: "sync::orchestrator", topic = SYNC_COMPLETED_TOPIC, report = %body);
        Ok(())
    }

    fn emit_failure(&self, message: &str) -> Result<(), String> {
        tracing::warn!(target: "sync::orchestrator", topic = SYNC_FAILED_TOPIC, message);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SyncEvent {
    Completed(SyncReport),
    Failed(String),
}

/// Fans pass results out to in-process subscribers (a UI bridge, tests).
pub struct BroadcastSyncNotifier {
    sender: broadcast::Sender<SyncEvent>,
}

impl BroadcastSyncNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    fn publish(&self, event: SyncEvent) -> Result<(), String> {
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}

impl SyncNotifier for BroadcastSyncNotifier {
    fn emit_report(&self, report: &SyncReport) -> Result<(), String> {
        self.publish(SyncEvent::Completed(report.clone()))
    }

    fn emit_failure(&self, message: &str) -> Result<(), String> {
        self.publish(SyncEvent::Failed(message.to_string()))
    }
}
