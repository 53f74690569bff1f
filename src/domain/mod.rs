pub mod entities;
pub mod sync_action;
pub mod value_objects;

pub use entities::{KindTally, PassOutcome, StagedRecord, SyncFailure, SyncReport};
pub use sync_action::SyncAction;
pub use value_objects::{EntityKind, FailureKind, RecordId, RecordPayload, SyncStatus};
