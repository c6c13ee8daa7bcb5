pub mod cli;
pub mod config;
pub mod error;
pub mod loot;
pub mod report;
pub mod scan;
pub mod source;
pub mod ui;

pub use cli::{Cli, Commands};
pub use error::{AuditError, Result};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui};
