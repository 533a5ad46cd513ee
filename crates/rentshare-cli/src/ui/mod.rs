//! Terminal output for the rentshare CLI.
//!
//! Three modes: JSON documents, plain `key=value` lines and space-separated
//! rows for scripts, and pretty tables with badges for people.

mod cells;
mod render;
mod theme;

use std::io::IsTerminal;

use clap::ValueEnum;

use crate::cli::Cli;

pub use cells::{id_cell, money_cell, note_cell, note_line, timestamp_cell};
pub use render::{badge, header, hint, kv, print, print_error, receipt, table, Column};
pub use theme::Badge;

/// Value of `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Json,
    Plain,
    Pretty,
}

impl OutputMode {
    /// `--json` wins, then `--format`. Otherwise tables only on a TTY that
    /// is not `TERM=dumb`.
    fn resolve(json: bool, format: Option<OutputFormat>, is_tty: bool, dumb_term: bool) -> Self {
        match (json, format) {
            (true, _) => Self::Json,
            (false, Some(OutputFormat::Plain)) => Self::Plain,
            (false, Some(OutputFormat::Table)) => Self::Pretty,
            (false, None) if is_tty && !dumb_term => Self::Pretty,
            (false, None) => Self::Plain,
        }
    }

    pub fn is_json(self) -> bool {
        self == Self::Json
    }

    pub fn is_pretty(self) -> bool {
        self == Self::Pretty
    }
}

/// What the terminal and the global flags allow.
#[derive(Debug, Clone)]
pub struct UiContext {
    pub color: bool,
    pub unicode: bool,
    pub width: usize,
    pub mode: OutputMode,
}

impl UiContext {
    pub fn detect(cli: &Cli) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let dumb_term = std::env::var("TERM").is_ok_and(|term| term == "dumb");
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|cols| cols.parse::<usize>().ok())
            .filter(|cols| *cols > 0)
            .unwrap_or(80);

        Self {
            color: is_tty && !dumb_term && !cli.no_color && std::env::var_os("NO_COLOR").is_none(),
            unicode: !cli.ascii,
            width,
            mode: OutputMode::resolve(cli.json, cli.format, is_tty, dumb_term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_mode_resolution() {
        use OutputMode::*;
        assert_eq!(OutputMode::resolve(true, None, true, false), Json);
        assert_eq!(OutputMode::resolve(false, Some(OutputFormat::Plain), true, false), Plain);
        assert_eq!(OutputMode::resolve(false, Some(OutputFormat::Table), false, true), Pretty);
        assert_eq!(OutputMode::resolve(false, None, true, false), Pretty);
        assert_eq!(OutputMode::resolve(false, None, true, true), Plain);
        assert_eq!(OutputMode::resolve(false, None, false, false), Plain);
    }

    #[test]
    fn test_detect_honours_flags() {
        let cli = Cli::try_parse_from(["rentshare", "check", "--ascii", "--no-color", "--json"])
            .unwrap();
        let ui = UiContext::detect(&cli);
        assert!(!ui.unicode);
        assert!(!ui.color);
        assert_eq!(ui.mode, OutputMode::Json);
        assert!(ui.width > 0);
    }
}
