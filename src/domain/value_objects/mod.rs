pub mod entity_kind;
pub mod payload;
pub mod record_id;
pub mod sync_status;

pub use entity_kind::{EntityKind, SYNC_STAGES};
pub use payload::{
    ActivityLogPayload, ForeignKey, InventoryLinePayload, ItemPayload, RecordPayload,
    WarehousePayload,
};
pub use record_id::{LOCAL_ID_PREFIX, RecordId, is_local_origin};
pub use sync_status::{FailureKind, SyncStatus};
