//! Terminal capability probing and ANSI escape stripping.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::io::IsTerminal;

/// Reports whether the rendered-to sink is an interactive terminal and how
/// wide it currently is.
///
/// The relay queries the width once per rendered line, so a window resize
/// mid-run is picked up without any signal handling.
pub trait TermProbe: Send {
    fn is_interactive(&self) -> bool;

    /// Current column count, or `None` when the sink is not a terminal.
    fn width(&self) -> Option<usize>;
}

/// Probe backed by the process's real stdout.
pub struct StdoutProbe;

impl TermProbe for StdoutProbe {
    fn is_interactive(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    fn width(&self) -> Option<usize> {
        terminal_size::terminal_size().map(|(w, _)| w.0 as usize)
    }
}

/// Probe with a fixed answer, for rendering recorded transcripts in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
    interactive: bool,
    width: Option<usize>,
}

impl FixedProbe {
    /// An interactive terminal `width` columns wide.
    pub fn interactive(width: usize) -> Self {
        Self {
            interactive: true,
            width: Some(width),
        }
    }

    /// A non-terminal sink, e.g. a log file.
    pub fn plain() -> Self {
        Self {
            interactive: false,
            width: None,
        }
    }
}

impl TermProbe for FixedProbe {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn width(&self) -> Option<usize> {
        self.width
    }
}

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").expect("valid ANSI escape pattern"));

/// Remove CSI escape sequences (colors, cursor movement) from a line.
///
/// Non-terminal consumers such as log files and editors display these as
/// garbage. All other characters are preserved.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(line, "")
}
