//! SQL text for the three queries the audit runs against the world database.
//!
//! Identifiers are backtick-quoted, which both MySQL and SQLite accept, so the
//! same text runs against a live server and an offline SQLite dump.

/// Item classes that can be worn: weapons (2) and armor (4)
pub const EQUIPMENT_CLASSES: &[i64] = &[2, 4];

/// Inventory types that never get equipped: non-equip, shirt, tabard, bag, quiver
pub const EXCLUDED_INVENTORY_TYPES: &[i64] = &[0, 4, 19, 20, 23];

/// Open-world maps: Eastern Kingdoms and Kalimdor
pub const DEFAULT_ZONES: &[i64] = &[0, 1];

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every (entry, reference) pair where a reference table points at another one
pub fn reference_edges() -> String {
    "SELECT rlt.`entry`, rlt.`reference` \
     FROM `reference_loot_template` rlt \
     WHERE rlt.`reference` != 0"
        .to_string()
}

/// Non-elite NPCs in the level band with each reference table linked from
/// their creature loot table. With a non-empty `zones` only NPCs spawned on
/// one of those maps qualify; an empty slice scans every map.
///
/// Columns: npc id, name, min level, max level, loot table id, reference table id
pub fn eligible_npcs(min_level: i64, max_level: i64, zones: &[i64]) -> String {
    let mut sql = format!(
        "SELECT DISTINCT ct.`entry`, ct.`name`, ct.`minlevel`, ct.`maxlevel`, \
         clt.`Entry`, rlt.`entry` \
         FROM `creature_template` ct \
         JOIN `creature_loot_template` clt ON ct.`lootid` = clt.`Entry` \
         JOIN `reference_loot_template` rlt ON clt.`Reference` = rlt.`entry` \
         WHERE clt.`Reference` != 0 AND ct.`rank` = 0 \
         AND ct.`minlevel` >= {} AND ct.`maxlevel` <= {}",
        min_level, max_level
    );
    if !zones.is_empty() {
        sql.push_str(&format!(
            " AND ct.`entry` IN (SELECT c.`id` FROM `creature` c WHERE c.`map` IN ({}))",
            join_ids(zones)
        ));
    }
    sql
}

/// Eligible equipment dropped directly (not through another reference) by
/// reference table `table_id`.
///
/// Columns: item id, name, item level
pub fn leaf_items(table_id: i64) -> String {
    format!(
        "SELECT it.`entry`, it.`name`, it.`ItemLevel` \
         FROM `reference_loot_template` rlt \
         JOIN `item_template` it ON rlt.`Item` = it.`entry` \
         WHERE it.`startquest` = 0 AND it.`class` IN ({}) \
         AND rlt.`reference` = 0 AND it.`Quality` > 0 \
         AND it.`InventoryType` NOT IN ({}) \
         AND rlt.`entry` = {} \
         ORDER BY it.`entry`",
        join_ids(EQUIPMENT_CLASSES),
        join_ids(EXCLUDED_INVENTORY_TYPES),
        table_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_npcs_embeds_band_and_zones() {
        let sql = eligible_npcs(10, 20, &[0, 1, 530]);
        assert!(sql.contains("ct.`minlevel` >= 10"));
        assert!(sql.contains("ct.`maxlevel` <= 20"));
        assert!(sql.contains("c.`map` IN (0, 1, 530)"));
        assert!(sql.contains("ct.`rank` = 0"));
    }

    #[test]
    fn test_eligible_npcs_without_zones_scans_every_map() {
        let sql = eligible_npcs(1, 58, &[]);
        assert!(!sql.contains("`creature` c"));
    }

    #[test]
    fn test_leaf_items_filters() {
        let sql = leaf_items(200);
        assert!(sql.contains("it.`class` IN (2, 4)"));
        assert!(sql.contains("NOT IN (0, 4, 19, 20, 23)"));
        assert!(sql.contains("rlt.`reference` = 0"));
        assert!(sql.contains("rlt.`entry` = 200"));
    }
}
