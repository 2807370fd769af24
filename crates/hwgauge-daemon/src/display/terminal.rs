//! Text gauges on a terminal.

use anyhow::Result;
use hwgauge_sensors::MetricsSnapshot;
use std::io::{self, IsTerminal, Stdout, Write};

use super::{gauges, DisplaySink};

/// Bar width in cells.
const BAR_WIDTH: usize = 30;

/// Clears the screen and homes the cursor.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Draws the four gauges as text bars, one line each.
pub struct TerminalDisplay<W: Write> {
    out: W,
    redraw: bool,
}

impl TerminalDisplay<Stdout> {
    /// Writes to stdout, redrawing in place when it is a terminal.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let redraw = out.is_terminal();
        Self::new(out, redraw)
    }
}

impl<W: Write> TerminalDisplay<W> {
    /// Creates a terminal display. With `redraw` set, each frame clears
    /// the screen first; otherwise frames are appended.
    pub fn new(out: W, redraw: bool) -> Self {
        Self { out, redraw }
    }

    /// Returns the underlying writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Creates a bar of filled and empty blocks for a 0-1 fraction.
fn create_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let empty = width - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

impl<W: Write> DisplaySink for TerminalDisplay<W> {
    fn name(&self) -> &str {
        "terminal"
    }

    fn show(&mut self, snapshot: &MetricsSnapshot) -> Result<()> {
        let mut frame = String::new();
        if self.redraw {
            frame.push_str(CLEAR);
        }
        for gauge in gauges(snapshot) {
            frame.push_str(&format!(
                "{:<14} {} {:>5}\n",
                gauge.label,
                create_bar(gauge.fraction(), BAR_WIDTH),
                gauge.subtext()
            ));
        }
        if !self.redraw {
            frame.push('\n');
        }

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
