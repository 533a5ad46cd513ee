//! Argument parsing helpers.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use rentshare_core::{Money, RentshareError};

/// Parse an optional amount flag.
pub fn parse_amount(value: Option<&str>) -> anyhow::Result<Option<Money>> {
    value.map(Money::parse).transpose().map_err(Into::into)
}

/// Parse a calendar date (YYYY-MM-DD).
pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        RentshareError::InvalidArgument(format!("Invalid date (expected YYYY-MM-DD): {}", value))
            .into()
    })
}

/// Make a path absolute against the current directory.
pub fn absolutize(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
