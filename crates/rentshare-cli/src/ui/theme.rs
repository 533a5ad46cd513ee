//! Status badges and color.

use owo_colors::{OwoColorize, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Ok,
    Warn,
    Err,
}

impl Badge {
    pub(super) fn symbol(self, unicode: bool) -> &'static str {
        match (self, unicode) {
            (Self::Ok, true) => "[\u{2713}]",
            (Self::Ok, false) => "[OK]",
            (Self::Warn, true) => "[\u{26A0}]",
            (Self::Warn, false) => "[WARN]",
            (Self::Err, true) => "[\u{2717}]",
            (Self::Err, false) => "[ERR]",
        }
    }

    pub(super) fn style(self) -> Style {
        let bold = Style::new().bold();
        match self {
            Self::Ok => bold.green(),
            Self::Warn => bold.yellow(),
            Self::Err => bold.red(),
        }
    }
}

/// `text` in `style`, unchanged when color is off.
pub(super) fn paint(text: &str, style: Style, color: bool) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        assert_eq!(Badge::Warn.symbol(false), "[WARN]");
        assert_eq!(Badge::Ok.symbol(true), "[\u{2713}]");
    }

    #[test]
    fn test_paint() {
        assert_eq!(paint("Loja", Badge::Ok.style(), false), "Loja");
        assert!(paint("Loja", Badge::Ok.style(), true).contains("\x1b["));
    }
}
