//! Progress reporting for a scan
//!
//! Provides a simple API for reporting where a scan is:
//! - Current phase (Connecting, Resolving, Loading NPCs, Scanning, Writing)
//! - Progress (current/total with a label)
//! - Activity messages

use tracing::{debug, info};

/// Scan phases, in the order a run goes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    ResolvingReferences,
    LoadingNpcs,
    Scanning,
    Writing,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Connecting => write!(f, "Connecting to database"),
            Phase::ResolvingReferences => write!(f, "Resolving reference loot tables"),
            Phase::LoadingNpcs => write!(f, "Loading NPCs"),
            Phase::Scanning => write!(f, "Scanning loot"),
            Phase::Writing => write!(f, "Writing report"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress through the current phase
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Trait for progress reporting - console output or silent for tests
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn log(&mut self, message: impl Into<String>);
}

/// Reports through `tracing`. Progress is logged every `step` percent.
pub struct ConsoleUi {
    phase: Option<Phase>,
    last_percent: u64,
    step: u64,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self {
            phase: None,
            last_percent: 0,
            step: 10,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        self.phase = Some(phase);
        self.last_percent = 0;
        info!("{}", phase);
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let progress = Progress::new(current, total, label);
        let percent = (progress.ratio() * 100.0) as u64;

        if percent >= self.last_percent + self.step || (current == total && total > 0) {
            self.last_percent = percent;
            debug!(
                "{}: {}/{} ({}%)",
                progress.label, progress.current, progress.total, percent
            );
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        info!("{}", message.into());
    }
}

/// Silent UI implementation for testing and `--quiet`
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn log(&mut self, _message: impl Into<String>) {}
}
