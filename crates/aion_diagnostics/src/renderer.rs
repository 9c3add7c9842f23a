//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning[W501]: Fc clipped to the available track count
///   --> tile (0, 3, 4)
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// The terminal width used to wrap long messages.
    pub width: u16,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool, width: u16) -> Self {
        Self { color, width }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let head = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return head;
        }
        let ansi = match diag.severity {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Note | Severity::Help => "\x1b[1;36m",
        };
        format!("{ansi}{head}\x1b[0m")
    }

    fn wrap(&self, text: &str, indent: usize) -> String {
        let limit = (self.width as usize).saturating_sub(indent).max(20);
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > limit {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
        lines.join(&format!("\n{}", " ".repeat(indent)))
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);
        if let Some(loc) = diag.location {
            out.push_str(&format!("  --> tile {loc}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {}\n", self.wrap(note, 11)));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {}\n", self.wrap(help, 11)));
        }
        out
    }
}
