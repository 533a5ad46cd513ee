//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error
/// - 2: Misuse of shell command (clap usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure (storage, I/O, config).
    pub const FAILURE: i32 = 1;

    /// Database, property, owner, record or version not found.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Uniqueness violation or lost concurrent write.
    pub const CONFLICT: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;

    /// Recalculation finished but skipped some records.
    pub const PARTIAL_FAILURE: i32 = 7;
}

/// Default page size for `rent list`.
pub const DEFAULT_RENT_LIST_LIMIT: usize = 50;

/// Widest note shown in table cells.
pub const TABLE_NOTE_MAX: usize = 40;
