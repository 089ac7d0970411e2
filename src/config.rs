//! Runtime settings read from the environment.
//!
//! - `FOSSI_THRESHOLDS_PATH`: JSON cut-point table (published values when unset)
//! - `FOSSI_LOG_MODE`: `file`, `stdout` or `auto` (file when attached to a terminal)
//! - `FOSSI_LOG_FILE`: log file path for file mode

use std::path::PathBuf;

const DEFAULT_LOG_FILE: &str = "fossi.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    File,
    Stdout,
    Auto,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` given whether stdout is an interactive terminal.
    ///
    /// Writing logs to the terminal corrupts the TUI, so an interactive
    /// session logs to a file.
    #[must_use]
    pub fn uses_file(&self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub thresholds_path: Option<PathBuf>,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Settings {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let thresholds_path = lookup("FOSSI_THRESHOLDS_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let log_mode = lookup("FOSSI_LOG_MODE")
            .map(|v| LogMode::parse(&v))
            .unwrap_or(LogMode::Auto);
        let log_file = lookup("FOSSI_LOG_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        Self {
            thresholds_path,
            log_mode,
            log_file,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
