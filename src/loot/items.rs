use std::collections::HashMap;
use tracing::{trace, warn};

use super::types::Item;
use crate::error::Result;
use crate::source::{queries, DataSource};

/// Lookup of the eligible items a reference table drops directly
pub trait ItemCatalog {
    fn items_for(&mut self, table_id: i64) -> Result<&[Item]>;
}

/// Fetches leaf items per reference table, caching each table for the
/// lifetime of the resolver
pub struct ItemResolver<S: DataSource> {
    source: S,
    cache: HashMap<i64, Vec<Item>>,
}

impl<S: DataSource> ItemResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    /// Number of tables fetched so far
    pub fn cached_tables(&self) -> usize {
        self.cache.len()
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn fetch(&mut self, table_id: i64) -> Result<Vec<Item>> {
        let sql = queries::leaf_items(table_id);
        let rows = self.source.query(&sql)?;

        let items: Vec<Item> = rows
            .iter()
            .filter_map(|row| {
                let item = Item::from_row(row);
                if item.is_none() {
                    warn!(table_id, ?row, "Skipping malformed item row");
                }
                item
            })
            .collect();

        trace!(table_id, count = items.len(), "Loaded reference table items");
        Ok(items)
    }
}

impl<S: DataSource> ItemCatalog for ItemResolver<S> {
    fn items_for(&mut self, table_id: i64) -> Result<&[Item]> {
        if !self.cache.contains_key(&table_id) {
            let items = self.fetch(table_id)?;
            self.cache.insert(table_id, items);
        }
        Ok(self.cache.get(&table_id).map(Vec::as_slice).unwrap_or_default())
    }
}

/// Fixed catalog, for callers that already hold every table's items
impl ItemCatalog for HashMap<i64, Vec<Item>> {
    fn items_for(&mut self, table_id: i64) -> Result<&[Item]> {
        Ok(self.get(&table_id).map(Vec::as_slice).unwrap_or_default())
    }
}
