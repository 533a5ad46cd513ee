//! Headers, receipts and tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use owo_colors::Style;

use super::theme::{paint, Badge};
use super::UiContext;

/// `Rentshare · report matrix (March 2025)`; empty outside pretty mode.
pub fn header(ui: &UiContext, command: &str, scope: Option<&str>) -> String {
    if !ui.mode.is_pretty() {
        return String::new();
    }
    let title = paint("Rentshare", Style::new().bold(), ui.color);
    let dot = if ui.unicode { "\u{00B7}" } else { "-" };
    match scope {
        Some(scope) => format!("{} {} {} ({})", title, dot, command, scope),
        None => format!("{} {} {}", title, dot, command),
    }
}

pub fn badge(ui: &UiContext, kind: Badge, message: &str) -> String {
    format!(
        "{} {}",
        paint(kind.symbol(ui.unicode), kind.style(), ui.color),
        message
    )
}

/// `Fee Share: 10.00` in pretty mode, `fee_share=10.00` otherwise.
pub fn kv(ui: &UiContext, key: &str, value: &str) -> String {
    if ui.mode.is_pretty() {
        let key = paint(&format!("{}:", key), Style::new().dimmed(), ui.color);
        format!("{} {}", key, value)
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

pub fn hint(ui: &UiContext, text: &str) -> String {
    kv(ui, "Hint", text)
}

/// Summary after a write: a badge and indented fields, or `status=ok`
/// followed by `key=value` lines.
pub fn receipt(ui: &UiContext, title: &str, items: &[(&str, String)]) -> String {
    let (first, indent) = if ui.mode.is_pretty() {
        (badge(ui, Badge::Ok, title), "  ")
    } else {
        ("status=ok".to_string(), "")
    };
    std::iter::once(first)
        .chain(
            items
                .iter()
                .map(|(key, value)| format!("{}{}", indent, kv(ui, key, value))),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,

    /// Right-aligned (amounts, counts)
    pub numeric: bool,
}

impl Column {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            numeric: false,
        }
    }

    pub fn numeric(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            numeric: true,
        }
    }
}

/// Bordered table in pretty mode; headerless space-separated rows otherwise.
pub fn table(ui: &UiContext, columns: &[Column], rows: &[Vec<String>]) -> String {
    if !ui.mode.is_pretty() {
        return rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = Table::new();
    if ui.unicode {
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(ASCII_MARKDOWN);
    }
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(u16::try_from(ui.width).unwrap_or(u16::MAX));

    table.set_header(columns.iter().map(|column| {
        let cell = Cell::new(&column.header);
        if ui.color {
            cell.add_attribute(Attribute::Bold)
        } else {
            cell
        }
    }));
    for row in rows {
        table.add_row(row.iter().zip(columns).map(|(value, column)| {
            let cell = Cell::new(value);
            if column.numeric {
                cell.set_alignment(CellAlignment::Right)
            } else {
                cell
            }
        }));
    }
    table.to_string()
}

/// Print to stdout, except in JSON mode or for empty text.
pub fn print(ui: &UiContext, text: &str) {
    if !ui.mode.is_json() && !text.is_empty() {
        println!("{}", text);
    }
}

fn error_text(ui: &UiContext, message: &str, hint_text: Option<&str>) -> String {
    let mut lines = vec![if ui.mode.is_pretty() {
        badge(ui, Badge::Err, message)
    } else {
        format!("error={}", message)
    }];
    if let Some(text) = hint_text {
        lines.push(hint(ui, text));
    }
    lines.join("\n")
}

/// Errors go to stderr in every mode, JSON included.
pub fn print_error(ui: &UiContext, message: &str, hint_text: Option<&str>) {
    eprintln!("{}", error_text(ui, message, hint_text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;

    fn ui(mode: OutputMode) -> UiContext {
        UiContext {
            color: false,
            unicode: true,
            width: 80,
            mode,
        }
    }

    #[test]
    fn test_header_only_in_pretty_mode() {
        let line = header(&ui(OutputMode::Pretty), "report matrix", Some("March 2025"));
        assert_eq!(line, "Rentshare \u{00B7} report matrix (March 2025)");
        assert_eq!(header(&ui(OutputMode::Plain), "report matrix", None), "");
    }

    #[test]
    fn test_receipt() {
        let items = [("Fee Share", "10.00".to_string())];
        assert_eq!(
            receipt(&ui(OutputMode::Plain), "Updated", &items),
            "status=ok\nfee_share=10.00"
        );
        assert_eq!(
            receipt(&ui(OutputMode::Pretty), "Updated", &items),
            "[\u{2713}] Updated\n  Fee Share: 10.00"
        );
    }

    #[test]
    fn test_table() {
        let columns = [Column::new("Property"), Column::numeric("Net")];
        let rows = vec![vec!["Loja 1".to_string(), "10.00".to_string()]];
        assert_eq!(table(&ui(OutputMode::Plain), &columns, &rows), "Loja 1 10.00");

        let pretty = table(&ui(OutputMode::Pretty), &columns, &rows);
        assert!(pretty.contains("Property"));
        assert!(pretty.contains("Loja 1"));
    }

    #[test]
    fn test_error_text() {
        assert_eq!(
            error_text(&ui(OutputMode::Json), "Not found", Some("run rentshare init")),
            "error=Not found\nhint=run rentshare init"
        );
        assert_eq!(
            error_text(&ui(OutputMode::Pretty), "Not found", None),
            "[\u{2717}] Not found"
        );
    }
}
