//! Reference loot table graph and its transitive closure

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

use super::types::ReferenceEdge;
use crate::source::Row;

/// Map of reference table -> reference tables it links to directly
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    targets: HashMap<i64, Vec<i64>>,
}

impl ReferenceGraph {
    pub fn from_edges(edges: impl IntoIterator<Item = ReferenceEdge>) -> Self {
        let mut targets: HashMap<i64, Vec<i64>> = HashMap::new();

        for edge in edges {
            let list = targets.entry(edge.source).or_default();
            if !list.contains(&edge.target) {
                list.push(edge.target);
            }
        }

        Self { targets }
    }

    /// Build from `(entry, reference)` rows, skipping rows that don't parse
    pub fn from_rows(rows: &[Row]) -> Self {
        let edges = rows.iter().filter_map(|row| {
            let edge = ReferenceEdge::from_row(row);
            if edge.is_none() {
                warn!(?row, "Skipping malformed reference edge row");
            }
            edge
        });
        Self::from_edges(edges)
    }

    /// Number of tables with at least one outgoing reference
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Compute, for every table with outgoing references, every table it
    /// reaches. A table never appears in its own closure, even on a cycle.
    pub fn resolve(&self) -> ReferenceClosure {
        let reachable = self
            .targets
            .keys()
            .map(|&source| (source, self.reachable_from(source)))
            .collect();

        ReferenceClosure { reachable }
    }

    fn reachable_from(&self, source: i64) -> HashSet<i64> {
        let mut reachable = HashSet::new();
        let mut enqueued: HashSet<i64> = HashSet::from([source]);
        let mut queue: VecDeque<i64> = VecDeque::new();

        for &target in self.targets.get(&source).into_iter().flatten() {
            if enqueued.insert(target) {
                queue.push_back(target);
            }
        }

        while let Some(table) = queue.pop_front() {
            reachable.insert(table);

            if let Some(next) = self.targets.get(&table) {
                for &target in next {
                    if enqueued.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }

        reachable
    }
}

/// Table -> every table transitively reachable from it. Tables without
/// outgoing references have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceClosure {
    reachable: HashMap<i64, HashSet<i64>>,
}

impl ReferenceClosure {
    pub fn get(&self, table_id: i64) -> Option<&HashSet<i64>> {
        self.reachable.get(&table_id)
    }

    pub fn len(&self) -> usize {
        self.reachable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reachable.is_empty()
    }

    /// The given tables followed by everything they reach, without repeats.
    /// Reached tables are appended in id order so scans are reproducible.
    pub fn expand(&self, tables: &[i64]) -> Vec<i64> {
        let mut seen: HashSet<i64> = HashSet::new();
        let mut expanded = Vec::new();

        for &table in tables {
            if seen.insert(table) {
                expanded.push(table);
            }
        }

        for &table in tables {
            let Some(reached) = self.reachable.get(&table) else {
                continue;
            };
            let mut reached: Vec<i64> = reached.iter().copied().collect();
            reached.sort_unstable();
            for id in reached {
                if seen.insert(id) {
                    expanded.push(id);
                }
            }
        }

        expanded
    }

    /// Entries sorted by table id, each closure sorted too
    pub fn sorted(&self) -> Vec<(i64, Vec<i64>)> {
        let mut entries: Vec<(i64, Vec<i64>)> = self
            .reachable
            .iter()
            .map(|(&table, reached)| {
                let mut reached: Vec<i64> = reached.iter().copied().collect();
                reached.sort_unstable();
                (table, reached)
            })
            .collect();
        entries.sort_unstable_by_key(|(table, _)| *table);
        entries
    }
}
