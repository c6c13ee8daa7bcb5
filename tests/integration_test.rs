//! End-to-end scans against a small SQLite copy of the AzerothCore world tables.
//!
//! Fixture layout:
//! - RLT 100 -> RLT 200 (leaf: one eligible item plus several ineligible ones)
//! - RLT 300 <-> RLT 301 (cycle, each with one eligible item)
//! - Bob (40-50) loots RLT 100, Wolf (10-12) and Veteran (40-45) loot RLT 300
//! - an elite and an instance-only NPC that only qualify under special filters

use rusqlite::Connection;
use std::fs;
use tempfile::NamedTempFile;

use acore_loot_audit::config::{Direction, LevelBand, ScanParams};
use acore_loot_audit::loot::Violation;
use acore_loot_audit::report::{format_report, ReportWriter};
use acore_loot_audit::scan::Scanner;
use acore_loot_audit::source::SqliteSource;
use acore_loot_audit::ui::SilentUi;

// =============================================================================
// Fixture
// =============================================================================

const SCHEMA: &str = "
CREATE TABLE creature_template (
    entry INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    minlevel INTEGER NOT NULL,
    maxlevel INTEGER NOT NULL,
    lootid INTEGER NOT NULL,
    rank INTEGER NOT NULL
);
CREATE TABLE creature (
    guid INTEGER PRIMARY KEY,
    id INTEGER NOT NULL,
    map INTEGER NOT NULL
);
CREATE TABLE creature_loot_template (
    Entry INTEGER NOT NULL,
    Item INTEGER NOT NULL,
    Reference INTEGER NOT NULL
);
CREATE TABLE reference_loot_template (
    entry INTEGER NOT NULL,
    Item INTEGER NOT NULL,
    reference INTEGER NOT NULL
);
CREATE TABLE item_template (
    entry INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    ItemLevel INTEGER NOT NULL,
    class INTEGER NOT NULL,
    Quality INTEGER NOT NULL,
    InventoryType INTEGER NOT NULL,
    startquest INTEGER NOT NULL
);
";

const DATA: &str = "
INSERT INTO creature_template VALUES
    (1, 'Bob', 40, 50, 1, 0),
    (2, 'Elite Ogre', 40, 50, 2, 1),
    (3, 'Deep Lurker', 20, 25, 3, 0),
    (4, 'Wolf', 10, 12, 4, 0),
    (5, 'Veteran', 40, 45, 5, 0);

INSERT INTO creature VALUES
    (1, 1, 0), (2, 1, 0), (3, 2, 1), (4, 3, 36), (5, 4, 1), (6, 5, 0);

INSERT INTO creature_loot_template VALUES
    (1, 0, 100), (1, 5000, 0),
    (2, 0, 100),
    (3, 0, 100),
    (4, 0, 300),
    (5, 0, 300);

INSERT INTO reference_loot_template VALUES
    (100, 0, 200),
    (200, 9001, 0), (200, 9002, 0), (200, 9003, 0), (200, 9004, 0), (200, 9005, 0),
    (300, 9010, 0), (300, 0, 301),
    (301, 9011, 0), (301, 0, 300);

INSERT INTO item_template VALUES
    (9001, 'Foo', 60, 4, 2, 5, 0),
    (9002, 'Unwearable Trinket', 60, 4, 2, 0, 0),
    (9003, 'Quest Starter', 60, 2, 2, 13, 77),
    (9004, 'Potion', 60, 0, 1, 0, 0),
    (9005, 'Broken Sword', 60, 2, 0, 13, 0),
    (9010, 'Cycle Blade', 30, 2, 2, 13, 0),
    (9011, 'Loop Helm', 58, 4, 3, 1, 0),
    (5000, 'Direct Drop', 60, 4, 2, 5, 0);
";

fn fixture() -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let conn = Connection::open(file.path()).expect("Failed to open fixture database");
    conn.execute_batch(SCHEMA).expect("Failed to create schema");
    conn.execute_batch(DATA).expect("Failed to insert fixture data");
    file
}

fn run_scan(params: &ScanParams) -> Vec<Violation> {
    let db = fixture();
    let source = SqliteSource::open(db.path()).expect("Failed to open fixture");
    Scanner::new(source)
        .run(params, &mut SilentUi::new())
        .expect("Scan failed")
}

fn band(min: i64, max: i64) -> LevelBand {
    LevelBand::new(min, max).unwrap()
}

fn summary(violations: &[Violation]) -> Vec<(i64, i64, i64, i64)> {
    violations
        .iter()
        .map(|v| (v.npc_id, v.reference_table_id, v.item_id, v.level_gap))
        .collect()
}

// =============================================================================
// Scans
// =============================================================================

#[test]
fn test_overlevel_scan_follows_references_and_cycles() {
    let found = run_scan(&ScanParams::new(band(1, 58), 4));

    assert_eq!(
        summary(&found),
        vec![
            (4, 301, 9011, 46),
            (4, 300, 9010, 18),
            (5, 301, 9011, 13),
            (1, 200, 9001, 10),
        ]
    );
}

#[test]
fn test_reached_table_is_reported_not_attached_one() {
    let found = run_scan(&ScanParams::new(band(40, 50), 4));
    let bob: Vec<&Violation> = found.iter().filter(|v| v.npc_id == 1).collect();

    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].npc_name, "Bob");
    assert_eq!(bob[0].reference_table_id, 200);
    assert_eq!(bob[0].loot_table_id, 1);
    assert_eq!(bob[0].item_name, "Foo");
    assert_eq!(bob[0].level_gap, 10);
}

#[test]
fn test_ineligible_items_elites_and_instances_are_ignored() {
    let found = run_scan(&ScanParams::new(band(1, 58), 4));

    assert!(found.iter().all(|v| v.npc_id != 2 && v.npc_id != 3));
    assert!(found
        .iter()
        .all(|v| [9001, 9010, 9011].contains(&v.item_id)));
}

#[test]
fn test_all_zones_includes_instance_npcs() {
    let mut params = ScanParams::new(band(1, 58), 4);
    params.zones.clear();

    let found = run_scan(&params);

    assert!(found
        .iter()
        .any(|v| v.npc_id == 3 && v.reference_table_id == 200 && v.level_gap == 35));
    assert!(found.iter().all(|v| v.npc_id != 2));
}

#[test]
fn test_underlevel_scan() {
    let params = ScanParams::new(band(1, 58), -4);
    assert_eq!(params.direction(), Direction::Under);

    let found = run_scan(&params);

    assert_eq!(summary(&found), vec![(5, 300, 9010, 10)]);
}

#[test]
fn test_band_with_no_npcs_is_empty() {
    let found = run_scan(&ScanParams::new(band(55, 58), 4));
    assert!(found.is_empty());
}

#[test]
fn test_resolve_references_from_database() {
    let db = fixture();
    let source = SqliteSource::open(db.path()).unwrap();
    let closure = Scanner::new(source).resolve_references().unwrap();

    assert_eq!(
        closure.sorted(),
        vec![(100, vec![200]), (300, vec![301]), (301, vec![300])]
    );
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_report_files_for_scan() {
    let params = ScanParams::new(band(1, 58), 4);
    let found = run_scan(&params);
    let report = format_report(&found, params.generate_sql);

    let out = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(out.path()).unwrap();
    let written = writer
        .write(params.band, params.direction(), &report, &found, false)
        .unwrap();

    assert_eq!(
        written,
        vec![
            out.path().join("ac-overlevel-1-58.txt"),
            out.path().join("ac-overlevel-1-58-sql.txt"),
        ]
    );

    let text = fs::read_to_string(&written[0]).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("ID: 4, Wolf, lvl 12 -> CLT 4 -> RLT 301 -> Item ID: 9011, lvl 58 Loop Helm"));

    let sql = fs::read_to_string(&written[1]).unwrap();
    assert!(sql.contains("DELETE FROM `creature_loot_template` WHERE `Entry` = 1 AND `Reference` = 200;"));
    assert_eq!(sql.matches("DELETE FROM").count(), 4);
}

#[test]
fn test_empty_scan_writes_text_only() {
    let params = ScanParams::new(band(55, 58), 4);
    let found = run_scan(&params);
    let report = format_report(&found, true);

    let out = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(out.path()).unwrap();
    let written = writer
        .write(params.band, params.direction(), &report, &found, false)
        .unwrap();

    assert_eq!(written, vec![out.path().join("ac-overlevel-55-58.txt")]);
    assert!(!writer.sql_path(params.band, params.direction()).exists());
}
