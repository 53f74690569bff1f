pub mod staged_record;
pub mod sync_report;

pub use staged_record::{StagedRecord, SyncFailure};
pub use sync_report::{KindTally, PassOutcome, SyncReport};
