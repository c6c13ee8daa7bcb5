use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ConnectionSettings, Credentials, LevelBand, ScanParams};
use crate::error::Result;
use crate::source::{DataSource, MySqlSource, SqliteSource};

#[derive(Parser, Debug)]
#[command(name = "acore-loot-audit")]
#[command(
    version,
    about = "Find NPCs whose reference loot drops items outside their level range"
)]
pub struct Cli {
    /// Verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan one NPC level band and write its report
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Lowest NPC minimum level to include
        #[arg(long, default_value_t = 1)]
        min_level: i64,

        /// Highest NPC maximum level to include
        #[arg(long, default_value_t = 58)]
        max_level: i64,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Scan the standard bands 1-19, 20-29, 30-39, 40-49, 50-58 and 1-58
    Batch {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Print every reference table that links to other tables, with its closure
    Resolve {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// MySQL host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// MySQL port
    #[arg(long, default_value_t = 3306)]
    pub port: u16,

    /// World database name
    #[arg(long, default_value = "acore_world")]
    pub database: String,

    /// File with the database user and password on its first two lines
    #[arg(long)]
    pub auth_file: Option<PathBuf>,

    /// Read an SQLite copy of the world database instead of MySQL
    #[arg(long, conflicts_with_all = ["host", "port", "database", "auth_file"])]
    pub sqlite: Option<PathBuf>,
}

impl SourceArgs {
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
        }
    }

    /// Credentials are loaded before anything connects
    pub fn open(&self) -> Result<Box<dyn DataSource>> {
        match &self.sqlite {
            Some(path) => Ok(Box::new(SqliteSource::open(path)?)),
            None => {
                let credentials = Credentials::load(self.auth_file.as_deref())?;
                Ok(Box::new(MySqlSource::connect(&self.settings(), &credentials)?))
            }
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Level gap threshold. Positive finds overlevelled items, negative underlevelled
    #[arg(
        short,
        long,
        default_value_t = 4,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-255..=255)
    )]
    pub level_diff: i64,

    /// Skip generating DELETE statements
    #[arg(long)]
    pub no_sql: bool,

    /// Map ids NPCs must spawn on (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = [0, 1])]
    pub zones: Vec<i64>,

    /// Scan NPCs on every map, including instances
    #[arg(long, conflicts_with = "zones")]
    pub all_zones: bool,

    /// Also write the violations as JSON
    #[arg(long)]
    pub json: bool,

    /// Directory for report files
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl ReportArgs {
    pub fn params(&self, band: LevelBand) -> ScanParams {
        ScanParams {
            band,
            level_diff: self.level_diff,
            generate_sql: !self.no_sql,
            zones: if self.all_zones {
                Vec::new()
            } else {
                self.zones.clone()
            },
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
