//! Line-oriented rewrite of the wrapped tool's output.
//!
//! The tool prints a long stream of transient `including <file> ...`
//! progress lines with the occasional durable diagnostic in between. On an
//! interactive terminal each progress line overwrites the previous one in
//! place; a durable line first commits whatever progress line is currently
//! held so it is not lost. Off a terminal every line has its escape
//! sequences stripped and goes to the secondary sink as-is.

use crate::term::{strip_ansi, TermProbe};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Write};

static PROGRESS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\[\d+/\d+\] )?including \S+ \.\.\.$").expect("valid progress pattern")
});

/// True for transient progress lines that may be overwritten in place.
pub fn is_progress_line(line: &str) -> bool {
    PROGRESS_LINE.is_match(line)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderState {
    /// Cursor sits at the start of a fresh line.
    Blank,
    /// The terminal is showing an uncommitted progress line.
    TransientHeld,
}

/// Two-state renderer relaying merged tool output to a pair of sinks.
///
/// `interactive` receives the carriage-return overwrite protocol;
/// `secondary` receives durable lines (and, off a terminal, everything).
/// Durable lines are important enough for the secondary sink in both modes,
/// so non-interactive consumers see a complete log.
pub struct OutputRelay<P, O, S> {
    probe: P,
    interactive: O,
    secondary: S,
    state: RenderState,
}

impl<P, O, S> OutputRelay<P, O, S>
where
    P: TermProbe,
    O: Write,
    S: Write,
{
    pub fn new(probe: P, interactive: O, secondary: S) -> Self {
        Self {
            probe,
            interactive,
            secondary,
            state: RenderState::Blank,
        }
    }

    /// Render one line consumed from the merged output stream.
    pub fn relay_line(&mut self, line: &str) -> io::Result<()> {
        if self.probe.is_interactive() && is_progress_line(line) {
            // Limit the line to the terminal width, otherwise it wraps and
            // the overwrite below stops erasing the previous line. Probed
            // on every line in case the window was resized mid-run.
            let mut line = line;
            if let Some(max) = self.probe.width() {
                if line.len() > max {
                    let cut = (0..=max)
                        .rev()
                        .find(|&i| line.is_char_boundary(i))
                        .unwrap_or(0);
                    line = &line[..cut];
                }
            }

            // Back to column zero, print, clear the rest of the line.
            write!(self.interactive, "\r{line}\x1b[K")?;
            self.interactive.flush()?;
            self.state = RenderState::TransientHeld;
            return Ok(());
        }

        if self.probe.is_interactive() {
            if self.state == RenderState::TransientHeld {
                // Commit the held progress line instead of overwriting it.
                writeln!(self.interactive)?;
                self.state = RenderState::Blank;
            }
            writeln!(self.secondary, "{line}")?;
        } else {
            writeln!(self.secondary, "{}", strip_ansi(line))?;
        }
        self.secondary.flush()
    }

    /// Commit a trailing progress line once the stream is exhausted, so the
    /// terminal is never left holding an unterminated line.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.state == RenderState::TransientHeld {
            writeln!(self.interactive)?;
            self.interactive.flush()?;
            self.state = RenderState::Blank;
        }
        Ok(())
    }
}
