//! Cell text for tables and receipts.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use rentshare_core::Money;

use crate::constants::TABLE_NOTE_MAX;

/// First UUID group in pretty tables, the full ID in plain output.
pub fn id_cell(id: &Uuid, pretty: bool) -> String {
    let full = id.to_string();
    if pretty {
        full[..8].to_string()
    } else {
        full
    }
}

/// Amount, or `-` when the record does not track it.
pub fn money_cell(amount: Option<Money>) -> String {
    amount.map_or_else(|| "-".to_string(), |m| m.to_string())
}

pub fn timestamp_cell(at: &DateTime<Utc>, pretty: bool) -> String {
    if pretty {
        at.format("%Y-%m-%d %H:%M UTC").to_string()
    } else {
        at.to_rfc3339()
    }
}

/// A note with all whitespace runs collapsed to single spaces.
pub fn note_line(note: &str) -> String {
    note.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A note for a table column: one line, clipped.
pub fn note_cell(note: Option<&str>) -> String {
    let line = note.map(note_line).unwrap_or_default();
    if line.chars().count() <= TABLE_NOTE_MAX {
        return line;
    }
    let clipped: String = line.chars().take(TABLE_NOTE_MAX - 3).collect();
    format!("{}...", clipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_cell() {
        let id = Uuid::parse_str("7a2e3c0b-1234-5678-9abc-def012345678").unwrap();
        assert_eq!(id_cell(&id, true), "7a2e3c0b");
        assert_eq!(id_cell(&id, false), id.to_string());
    }

    #[test]
    fn test_money_cell() {
        assert_eq!(money_cell(None), "-");
        assert_eq!(money_cell(Some(Money::from_cents(123456))), "1234.56");
    }

    #[test]
    fn test_notes() {
        assert_eq!(note_line("paid late\n  by  transfer"), "paid late by transfer");
        assert_eq!(note_cell(None), "");
        let long = "roof repair ".repeat(10);
        let cell = note_cell(Some(&long));
        assert_eq!(cell.chars().count(), TABLE_NOTE_MAX);
        assert!(cell.ends_with("..."));
    }
}
