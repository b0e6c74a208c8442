//! Terminal output: colored one-line notes for CLI commands.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Info,
    Warn,
    Error,
    Success,
}

impl NoteKind {
    fn style(self) -> (&'static str, &'static str, &'static str) {
        match self {
            NoteKind::Info => (CYAN, "ℹ", "INFO"),
            NoteKind::Warn => (YELLOW, "⚠", "WARN"),
            NoteKind::Error => (RED, "✗", "ERROR"),
            NoteKind::Success => (GREEN, "✓", "OK"),
        }
    }
}

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

pub fn format_note(kind: NoteKind, msg: &str, color: bool) -> String {
    let (ansi, symbol, label) = kind.style();
    if color {
        format!("{ansi}{BOLD}{symbol}{RESET} {msg}")
    } else {
        format!("{label}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", format_note(NoteKind::Info, msg, supports_color()));
}

pub fn note_warn(msg: &str) {
    println!("{}", format_note(NoteKind::Warn, msg, supports_color()));
}

/// Errors go to stderr.
pub fn note_error(msg: &str) {
    eprintln!("{}", format_note(NoteKind::Error, msg, supports_color()));
}

pub fn note_success(msg: &str) {
    println!("{}", format_note(NoteKind::Success, msg, supports_color()));
}
