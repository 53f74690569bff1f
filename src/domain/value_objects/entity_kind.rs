use serde::{Deserialize, Serialize};
use std::fmt;

/// The staged entity collections, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Item,
    Warehouse,
    InventoryLine,
    ActivityLog,
}

/// Dependency stages. Every kind in a stage only references kinds from earlier stages.
pub const SYNC_STAGES: &[&[EntityKind]] = &[
    &[EntityKind::Item, EntityKind::Warehouse],
    &[EntityKind::InventoryLine],
    &[EntityKind::ActivityLog],
];

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Item,
        EntityKind::Warehouse,
        EntityKind::InventoryLine,
        EntityKind::ActivityLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Item => "item",
            EntityKind::Warehouse => "warehouse",
            EntityKind::InventoryLine => "inventory",
            EntityKind::ActivityLog => "activity_log",
        }
    }

    /// Remote table backing this collection.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Item => "items",
            EntityKind::Warehouse => "warehouses",
            EntityKind::InventoryLine => "inventory",
            EntityKind::ActivityLog => "activity_logs",
        }
    }

    pub fn is_append_only(&self) -> bool {
        matches!(self, EntityKind::ActivityLog)
    }

    /// Kinds whose payloads may hold a foreign key into this kind.
    pub fn dependents(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Item | EntityKind::Warehouse => {
                &[EntityKind::InventoryLine, EntityKind::ActivityLog]
            }
            EntityKind::InventoryLine => &[EntityKind::ActivityLog],
            EntityKind::ActivityLog => &[],
        }
    }

    /// Lenient lookup for the free-form `entity_type` column of activity logs.
    pub fn from_entity_type(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "item" | "items" => Some(EntityKind::Item),
            "warehouse" | "warehouses" => Some(EntityKind::Warehouse),
            "inventory" | "inventory_line" | "inventory_lines" => Some(EntityKind::InventoryLine),
            "activity_log" | "activity_logs" => Some(EntityKind::ActivityLog),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("Unknown entity kind: {value}"))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
