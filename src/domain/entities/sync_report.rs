use crate::domain::value_objects::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTally {
    pub synced: u32,
    pub errored: u32,
    /// Left `pending` because a parent still has no server id.
    pub deferred: u32,
}

impl KindTally {
    pub fn attempted(&self) -> u32 {
        self.synced + self.errored
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutcome {
    Completed,
    SkippedOffline,
    SkippedInFlight,
    /// The service was closed before the pass could start.
    SkippedClosed,
    /// The staging store failed mid-pass; untouched records remain `pending`.
    Aborted { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub outcome: PassOutcome,
    pub per_kind: BTreeMap<EntityKind, KindTally>,
    pub requeued: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn started() -> Self {
        let now = Utc::now();
        Self {
            outcome: PassOutcome::Completed,
            per_kind: BTreeMap::new(),
            requeued: 0,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn skipped(outcome: PassOutcome) -> Self {
        let mut report = Self::started();
        report.outcome = outcome;
        report
    }

    pub fn tally_mut(&mut self, kind: EntityKind) -> &mut KindTally {
        self.per_kind.entry(kind).or_default()
    }

    pub fn tally(&self, kind: EntityKind) -> KindTally {
        self.per_kind.get(&kind).copied().unwrap_or_default()
    }

    pub fn total_synced(&self) -> u32 {
        self.per_kind.values().map(|t| t.synced).sum()
    }

    pub fn total_errored(&self) -> u32 {
        self.per_kind.values().map(|t| t.errored).sum()
    }

    pub fn total_deferred(&self) -> u32 {
        self.per_kind.values().map(|t| t.deferred).sum()
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, PassOutcome::Completed) && self.total_errored() == 0
    }

    pub fn finish(mut self, outcome: PassOutcome) -> Self {
        self.outcome = outcome;
        self.finished_at = Utc::now();
        self
    }
}
