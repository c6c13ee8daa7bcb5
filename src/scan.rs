//! Compares every item an NPC can drop against the NPC's level range

use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ScanParams;
use crate::error::Result;
use crate::loot::{Item, ItemCatalog, ItemResolver, Npc, ReferenceClosure, ReferenceGraph, Violation};
use crate::source::{queries, DataSource, Row};
use crate::ui::{Phase, SilentUi, Ui};

/// Build one NPC per id from `(id, name, min, max, loot id, reference id)`
/// rows. Later rows for a known id only add their reference table.
pub fn accumulate_npcs(rows: &[Row]) -> Vec<Npc> {
    let mut npcs: Vec<Npc> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let Some((npc, table_id)) = parse_npc_row(row) else {
            warn!(?row, "Skipping malformed NPC row");
            continue;
        };

        match index.get(&npc.id).copied() {
            Some(pos) => npcs[pos].attach(table_id),
            None => {
                index.insert(npc.id, npcs.len());
                npcs.push(npc.with_reference(table_id));
            }
        }
    }

    npcs
}

fn parse_npc_row(row: &Row) -> Option<(Npc, i64)> {
    let npc = Npc::new(row.int(0)?, row.text(1)?, row.int(2)?, row.int(3)?, row.int(4)?);
    Some((npc, row.int(5)?))
}

/// Level gap if `item` is outside `npc`'s range by at least `level_diff`.
///
/// A non-negative diff checks the top of the range, a negative one the bottom.
pub fn level_gap(npc: &Npc, item: &Item, level_diff: i64) -> Option<i64> {
    if level_diff >= 0 {
        (item.level >= npc.max_level.saturating_add(level_diff))
            .then(|| item.level.saturating_sub(npc.max_level))
    } else {
        (item.level <= npc.min_level.saturating_add(level_diff))
            .then(|| npc.min_level.saturating_sub(item.level))
    }
}

/// Find every (NPC, item) pair breaking the level rule, largest gap first,
/// then highest NPC id.
pub fn scan(
    npcs: &[Npc],
    closure: &ReferenceClosure,
    items: &mut impl ItemCatalog,
    level_diff: i64,
) -> Result<Vec<Violation>> {
    scan_with_progress(npcs, closure, items, level_diff, &mut SilentUi::new())
}

pub fn scan_with_progress(
    npcs: &[Npc],
    closure: &ReferenceClosure,
    items: &mut impl ItemCatalog,
    level_diff: i64,
    ui: &mut impl Ui,
) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    let total = npcs.len() as u64;

    for (count, npc) in npcs.iter().enumerate() {
        for table_id in closure.expand(&npc.reference_tables) {
            for item in items.items_for(table_id)? {
                if let Some(gap) = level_gap(npc, item, level_diff) {
                    violations.push(Violation::new(npc, table_id, item, gap));
                }
            }
        }
        ui.set_progress(count as u64 + 1, total, "NPCs");
    }

    sort_violations(&mut violations);
    Ok(violations)
}

/// Stable: equal (gap, npc) pairs keep their discovery order
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        b.level_gap
            .cmp(&a.level_gap)
            .then_with(|| b.npc_id.cmp(&a.npc_id))
    });
}

/// Runs the full pipeline against one data source
pub struct Scanner<S: DataSource> {
    source: S,
}

impl<S: DataSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Load every reference edge and flatten the graph
    pub fn resolve_references(&mut self) -> Result<ReferenceClosure> {
        let rows = self.source.query(&queries::reference_edges())?;
        let graph = ReferenceGraph::from_rows(&rows);
        let closure = graph.resolve();

        debug!(
            edges = rows.len(),
            tables = closure.len(),
            "Resolved reference loot tables"
        );
        Ok(closure)
    }

    pub fn load_npcs(&mut self, params: &ScanParams) -> Result<Vec<Npc>> {
        let sql = queries::eligible_npcs(params.band.min, params.band.max, &params.zones);
        let rows = self.source.query(&sql)?;
        let npcs = accumulate_npcs(&rows);

        debug!(rows = rows.len(), npcs = npcs.len(), "Loaded eligible NPCs");
        Ok(npcs)
    }

    /// Resolve, load and scan. Every cache lives only for this call.
    pub fn run(&mut self, params: &ScanParams, ui: &mut impl Ui) -> Result<Vec<Violation>> {
        let start = Instant::now();

        ui.set_phase(Phase::ResolvingReferences);
        let closure = self.resolve_references()?;
        ui.log(format!("{} reference tables link to other tables", closure.len()));

        ui.set_phase(Phase::LoadingNpcs);
        let npcs = self.load_npcs(params)?;
        ui.log(format!("{} NPCs in level band {}", npcs.len(), params.band));

        ui.set_phase(Phase::Scanning);
        let mut items = ItemResolver::new(&mut self.source);
        let violations = scan_with_progress(&npcs, &closure, &mut items, params.level_diff, ui)?;

        info!(
            band = %params.band,
            direction = %params.direction(),
            violations = violations.len(),
            tables_read = items.cached_tables(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scan finished"
        );
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::ReferenceEdge;
    use crate::source::SqlValue;

    fn bob() -> Npc {
        Npc::new(1, "Bob", 10, 50, 1).with_reference(100)
    }

    fn catalog(entries: &[(i64, Vec<Item>)]) -> HashMap<i64, Vec<Item>> {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_overlevel_boundary() {
        let npc = bob();
        assert_eq!(level_gap(&npc, &Item::new(1, "a", 54), 4), Some(4));
        assert_eq!(level_gap(&npc, &Item::new(1, "a", 53), 4), None);
        assert_eq!(level_gap(&npc, &Item::new(1, "a", 60), 4), Some(10));
    }

    #[test]
    fn test_underlevel_boundary() {
        let npc = bob();
        assert_eq!(level_gap(&npc, &Item::new(1, "a", 6), -4), Some(4));
        assert_eq!(level_gap(&npc, &Item::new(1, "a", 7), -4), None);
        assert_eq!(level_gap(&npc, &Item::new(1, "a", 60), -4), None);
    }

    #[test]
    fn test_zero_diff_flags_items_at_max_level() {
        let npc = bob();
        assert_eq!(level_gap(&npc, &Item::new(1, "a", 50), 0), Some(0));
        assert_eq!(level_gap(&npc, &Item::new(1, "a", 49), 0), None);
    }

    #[test]
    fn test_extreme_level_diff_flags_nothing() {
        let npc = bob();
        let item = Item::new(1, "a", 60);
        assert_eq!(level_gap(&npc, &item, i64::MAX), None);
        assert_eq!(level_gap(&npc, &item, i64::MIN), None);
        assert_eq!(level_gap(&npc, &Item::new(1, "a", i64::MIN), i64::MIN), Some(i64::MAX));
    }

    #[test]
    fn test_scan_follows_references() {
        let npcs = vec![Npc::new(1, "Bob", 40, 50, 1).with_reference(100)];
        let closure = ReferenceGraph::from_edges([ReferenceEdge::new(100, 200)]).resolve();
        let mut items = catalog(&[(200, vec![Item::new(9001, "Foo", 60)])]);

        let found = scan(&npcs, &closure, &mut items, 4).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].npc_id, 1);
        assert_eq!(found[0].reference_table_id, 200);
        assert_eq!(found[0].loot_table_id, 1);
        assert_eq!(found[0].level_gap, 10);
    }

    #[test]
    fn test_scan_orders_by_gap_then_npc_desc() {
        let npcs = vec![
            Npc::new(1, "Low", 1, 10, 11).with_reference(100),
            Npc::new(2, "High", 1, 10, 12).with_reference(100),
            Npc::new(3, "Other", 1, 20, 13).with_reference(100),
        ];
        let mut items = catalog(&[(100, vec![Item::new(5, "Sword", 30)])]);

        let found = scan(&npcs, &ReferenceClosure::default(), &mut items, 4).unwrap();
        let order: Vec<(i64, i64)> = found.iter().map(|v| (v.level_gap, v.npc_id)).collect();

        assert_eq!(order, vec![(20, 2), (20, 1), (10, 3)]);
    }

    #[test]
    fn test_scan_with_no_npcs_is_empty() {
        let mut items = catalog(&[]);
        let found = scan(&[], &ReferenceClosure::default(), &mut items, 4).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_accumulate_merges_rows_and_skips_malformed() {
        let row = |id: i64, name: SqlValue, table: i64| {
            Row::new(vec![
                SqlValue::Integer(id),
                name,
                SqlValue::Integer(10),
                SqlValue::Integer(12),
                SqlValue::Integer(id * 10),
                SqlValue::Integer(table),
            ])
        };
        let rows = vec![
            row(1, SqlValue::Text("Bob".into()), 100),
            row(2, SqlValue::Null, 100),
            row(3, SqlValue::Text("Ann".into()), 300),
            row(1, SqlValue::Text("Bob".into()), 101),
            Row::new(vec![SqlValue::Integer(4)]),
        ];

        let npcs = accumulate_npcs(&rows);

        assert_eq!(npcs.len(), 2);
        assert_eq!(npcs[0].id, 1);
        assert_eq!(npcs[0].reference_tables, vec![100, 101]);
        assert_eq!(npcs[0].loot_table_id, 10);
        assert_eq!(npcs[1].name, "Ann");
    }
}
