use super::entity_kind::EntityKind;
use super::record_id::is_local_origin;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ItemPayload {
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            barcode: None,
            name: name.into(),
            description: None,
            category: None,
            unit_price: None,
            weight: None,
            dimensions: None,
            image_url: None,
            is_active: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehousePayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl WarehousePayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            is_active: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLinePayload {
    pub item_id: String,
    pub warehouse_id: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl InventoryLinePayload {
    pub fn new(item_id: impl Into<String>, warehouse_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            item_id: item_id.into(),
            warehouse_id: warehouse_id.into(),
            quantity,
            min_threshold: None,
            max_capacity: None,
            location_code: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub action_type: String,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ActivityLogPayload {
    pub fn new(
        action_type: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: None,
            action_type: action_type.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            details: None,
            ip_address: None,
            created_at: None,
        }
    }
}

/// A reference from one staged payload to a record of another kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub target: EntityKind,
    pub field: &'static str,
    pub value: String,
}

impl ForeignKey {
    pub fn is_local_origin(&self) -> bool {
        is_local_origin(&self.value)
    }
}

/// Business fields of a staged record, one variant per collection.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    Item(ItemPayload),
    Warehouse(WarehousePayload),
    InventoryLine(InventoryLinePayload),
    ActivityLog(ActivityLogPayload),
}

impl RecordPayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            RecordPayload::Item(_) => EntityKind::Item,
            RecordPayload::Warehouse(_) => EntityKind::Warehouse,
            RecordPayload::InventoryLine(_) => EntityKind::InventoryLine,
            RecordPayload::ActivityLog(_) => EntityKind::ActivityLog,
        }
    }

    /// Row shape sent to the remote store (no `id`, no `sync_status`).
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            RecordPayload::Item(p) => serde_json::to_value(p),
            RecordPayload::Warehouse(p) => serde_json::to_value(p),
            RecordPayload::InventoryLine(p) => serde_json::to_value(p),
            RecordPayload::ActivityLog(p) => serde_json::to_value(p),
        }
    }

    pub fn from_json(kind: EntityKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EntityKind::Item => RecordPayload::Item(serde_json::from_value(value)?),
            EntityKind::Warehouse => RecordPayload::Warehouse(serde_json::from_value(value)?),
            EntityKind::InventoryLine => {
                RecordPayload::InventoryLine(serde_json::from_value(value)?)
            }
            EntityKind::ActivityLog => RecordPayload::ActivityLog(serde_json::from_value(value)?),
        })
    }

    pub fn foreign_keys(&self) -> Vec<ForeignKey> {
        match self {
            RecordPayload::InventoryLine(p) => vec![
                ForeignKey {
                    target: EntityKind::Item,
                    field: "item_id",
                    value: p.item_id.clone(),
                },
                ForeignKey {
                    target: EntityKind::Warehouse,
                    field: "warehouse_id",
                    value: p.warehouse_id.clone(),
                },
            ],
            RecordPayload::ActivityLog(p) => EntityKind::from_entity_type(&p.entity_type)
                .map(|target| ForeignKey {
                    target,
                    field: "entity_id",
                    value: p.entity_id.clone(),
                })
                .into_iter()
                .collect(),
            RecordPayload::Item(_) | RecordPayload::Warehouse(_) => Vec::new(),
        }
    }

    pub fn references(&self, target: EntityKind, id: &str) -> bool {
        self.foreign_keys()
            .iter()
            .any(|fk| fk.target == target && fk.value == id)
    }

    /// Rewrites every reference to `old_id` in `target`; returns whether anything changed.
    pub fn remap(&mut self, target: EntityKind, old_id: &str, new_id: &str) -> bool {
        let mut changed = false;
        match self {
            RecordPayload::InventoryLine(p) => {
                if target == EntityKind::Item && p.item_id == old_id {
                    p.item_id = new_id.to_string();
                    changed = true;
                }
                if target == EntityKind::Warehouse && p.warehouse_id == old_id {
                    p.warehouse_id = new_id.to_string();
                    changed = true;
                }
            }
            RecordPayload::ActivityLog(p) => {
                if EntityKind::from_entity_type(&p.entity_type) == Some(target)
                    && p.entity_id == old_id
                {
                    p.entity_id = new_id.to_string();
                    changed = true;
                }
            }
            RecordPayload::Item(_) | RecordPayload::Warehouse(_) => {}
        }
        changed
    }
}

impl From<ItemPayload> for RecordPayload {
    fn from(value: ItemPayload) -> Self {
        RecordPayload::Item(value)
    }
}

impl From<WarehousePayload> for RecordPayload {
    fn from(value: WarehousePayload) -> Self {
        RecordPayload::Warehouse(value)
    }
}

impl From<InventoryLinePayload> for RecordPayload {
    fn from(value: InventoryLinePayload) -> Self {
        RecordPayload::InventoryLine(value)
    }
}

impl From<ActivityLogPayload> for RecordPayload {
    fn from(value: ActivityLogPayload) -> Self {
        RecordPayload::ActivityLog(value)
    }
}
