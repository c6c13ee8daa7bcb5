use std::collections::HashMap;
use std::fmt::Write;

use crate::loot::{AggregationKey, Violation};

/// Rendered report text and the matching DELETE script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub sql: String,
    /// Distinct (NPC, reference table) pairs reported
    pub entries: usize,
}

impl Report {
    pub fn is_sql_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Collapse violations sharing an NPC and reference table into one line
/// (and one DELETE), reported at the position of their first occurrence.
pub fn format_report(violations: &[Violation], generate_sql: bool) -> Report {
    let mut counts: HashMap<AggregationKey, usize> = HashMap::new();
    for violation in violations {
        *counts.entry(violation.aggregation_key()).or_insert(0) += 1;
    }

    let mut report = Report::default();

    for violation in violations {
        let Some(count) = counts.remove(&violation.aggregation_key()) else {
            continue;
        };

        push_line(&mut report.text, violation, count);
        if generate_sql {
            push_delete(&mut report.sql, violation, count);
        }
        report.entries += 1;
    }

    debug_assert!(counts.is_empty());
    report
}

fn push_line(out: &mut String, v: &Violation, count: usize) {
    let _ = write!(
        out,
        "ID: {}, {}, lvl {} -> CLT {} -> RLT {} -> Item ID: {}, lvl {} {} ({} level gap)",
        v.npc_id,
        v.npc_name,
        v.npc_max_level,
        v.loot_table_id,
        v.reference_table_id,
        v.item_id,
        v.item_level,
        v.item_name,
        v.level_gap
    );
    if count > 1 {
        let _ = write!(out, " and {} others", count - 1);
    }
    out.push('\n');
}

fn push_delete(out: &mut String, v: &Violation, count: usize) {
    let _ = writeln!(
        out,
        "-- Deletes RLT {} from lvl {} {}, ID {} ({} items/{} level gap)",
        v.reference_table_id, v.npc_min_level, v.npc_name, v.npc_id, count, v.level_gap
    );
    let _ = writeln!(
        out,
        "DELETE FROM `creature_loot_template` WHERE `Entry` = {} AND `Reference` = {};\n",
        v.loot_table_id, v.reference_table_id
    );
}
