use serde::Serialize;

use crate::source::Row;

/// Reference table `source` pulls in everything reference table `target` drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceEdge {
    pub source: i64,
    pub target: i64,
}

impl ReferenceEdge {
    pub const fn new(source: i64, target: i64) -> Self {
        Self { source, target }
    }

    /// From an `(entry, reference)` row
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self::new(row.int(0)?, row.int(1)?))
    }
}

/// An eligible piece of equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub level: i64,
}

impl Item {
    pub fn new(id: i64, name: impl Into<String>, level: i64) -> Self {
        Self {
            id,
            name: name.into(),
            level,
        }
    }

    /// From an `(entry, name, ItemLevel)` row
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self::new(row.int(0)?, row.text(1)?, row.int(2)?))
    }
}

/// A creature template and the reference tables its loot table links to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Npc {
    pub id: i64,
    pub name: String,
    pub min_level: i64,
    pub max_level: i64,
    pub loot_table_id: i64,
    /// Directly attached reference tables, first-seen order, no repeats
    pub reference_tables: Vec<i64>,
}

impl Npc {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        min_level: i64,
        max_level: i64,
        loot_table_id: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            min_level,
            max_level,
            loot_table_id,
            reference_tables: Vec::new(),
        }
    }

    pub fn with_reference(mut self, table_id: i64) -> Self {
        self.attach(table_id);
        self
    }

    pub fn attach(&mut self, table_id: i64) {
        if !self.reference_tables.contains(&table_id) {
            self.reference_tables.push(table_id);
        }
    }
}

/// One item an NPC can drop that is too far from its level range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub npc_id: i64,
    pub npc_name: String,
    pub npc_min_level: i64,
    pub npc_max_level: i64,
    pub reference_table_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub item_level: i64,
    pub level_gap: i64,
    pub loot_table_id: i64,
}

impl Violation {
    pub fn new(npc: &Npc, reference_table_id: i64, item: &Item, level_gap: i64) -> Self {
        Self {
            npc_id: npc.id,
            npc_name: npc.name.clone(),
            npc_min_level: npc.min_level,
            npc_max_level: npc.max_level,
            reference_table_id,
            item_id: item.id,
            item_name: item.name.clone(),
            item_level: item.level,
            level_gap,
            loot_table_id: npc.loot_table_id,
        }
    }

    pub fn aggregation_key(&self) -> AggregationKey {
        AggregationKey {
            npc_id: self.npc_id,
            reference_table_id: self.reference_table_id,
        }
    }
}

/// Violations sharing a key collapse into one report line and one DELETE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AggregationKey {
    pub npc_id: i64,
    pub reference_table_id: i64,
}
