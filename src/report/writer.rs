use std::fs;
use std::path::PathBuf;
use tracing::debug;

use super::format::Report;
use crate::config::{Direction, LevelBand};
use crate::error::Result;
use crate::loot::Violation;

/// Writes report files into one output directory
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)?;
        Ok(Self { out_dir })
    }

    /// `ac-overlevel-1-58` and friends
    pub fn base_name(band: LevelBand, direction: Direction) -> String {
        format!("ac-{}level-{}", direction, band)
    }

    pub fn text_path(&self, band: LevelBand, direction: Direction) -> PathBuf {
        self.out_dir
            .join(format!("{}.txt", Self::base_name(band, direction)))
    }

    pub fn sql_path(&self, band: LevelBand, direction: Direction) -> PathBuf {
        self.out_dir
            .join(format!("{}-sql.txt", Self::base_name(band, direction)))
    }

    pub fn json_path(&self, band: LevelBand, direction: Direction) -> PathBuf {
        self.out_dir
            .join(format!("{}.json", Self::base_name(band, direction)))
    }

    /// Write the text report (always), the SQL script (when it has content)
    /// and optionally the raw violations as JSON. Returns the written paths.
    pub fn write(
        &self,
        band: LevelBand,
        direction: Direction,
        report: &Report,
        violations: &[Violation],
        json: bool,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let text_path = self.text_path(band, direction);
        fs::write(&text_path, &report.text)?;
        written.push(text_path);

        if !report.is_sql_empty() {
            let sql_path = self.sql_path(band, direction);
            fs::write(&sql_path, &report.sql)?;
            written.push(sql_path);
        }

        if json {
            let json_path = self.json_path(band, direction);
            fs::write(&json_path, serde_json::to_string_pretty(violations)?)?;
            written.push(json_path);
        }

        debug!(files = written.len(), dir = ?self.out_dir, "Report written");
        Ok(written)
    }
}
