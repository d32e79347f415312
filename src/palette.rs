use std::fmt::Display;

/// ANSI color helpers for plain (non-TUI) terminal output.
pub struct Palette;

impl Palette {
    pub const INFO: &'static str = "\x1b[36m";
    pub const WARNING: &'static str = "\x1b[33m";
    pub const SUCCESS: &'static str = "\x1b[32m";
    pub const DANGER: &'static str = "\x1b[31m";

    const DIM: &'static str = "\x1b[2m";
    const RESET: &'static str = "\x1b[0m";

    pub fn paint(color: &str, value: impl Display) -> String {
        format!("{color}{value}{reset}", reset = Self::RESET)
    }

    pub fn dim(value: impl Display) -> String {
        Self::paint(Self::DIM, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_wraps_value_with_reset() {
        assert_eq!(
            Palette::paint(Palette::INFO, "cardsmith"),
            "\u{1b}[36mcardsmith\u{1b}[0m"
        );
        assert_eq!(Palette::paint(Palette::WARNING, 7), "\u{1b}[33m7\u{1b}[0m");
    }

    #[test]
    fn dim_uses_the_dim_attribute() {
        assert_eq!(Palette::dim("note"), "\u{1b}[2mnote\u{1b}[0m");
    }
}
