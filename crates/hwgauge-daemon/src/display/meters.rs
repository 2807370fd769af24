//! Semicircle meters rendered to a PNG file.
//!
//! The four gauges sit in a 2x2 grid (CPU on top, GPU below, temperature on
//! the left, load on the right). Each meter fills its upper half circle in
//! proportion to a 0-100 reading and shows the whole-number value in
//! seven-segment digits.

use anyhow::{bail, Context, Result};
use hwgauge_sensors::MetricsSnapshot;
use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{gauges, Canvas, DisplaySink};

/// Dark theme colors.
struct Theme {
    background: u32,
    trough: u32,
    fill: u32,
    segment_on: u32,
    segment_off: u32,
}

const DARK: Theme = Theme {
    background: 0x222222,
    trough: 0x444444,
    fill: 0x00BC8C,
    segment_on: 0xFFFFFF,
    segment_off: 0x303030,
};

/// Smallest frame whose meters and digits stay at least a pixel thick.
pub const MIN_WIDTH: u32 = 96;
pub const MIN_HEIGHT: u32 = 64;

/// Segment masks for 0-9, bit 0 = top (a) through bit 6 = middle (g).
const SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Position and size of one meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterLayout {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub stroke: f32,
}

impl MeterLayout {
    /// Lays out meter `index` (row-major) in a 2x2 grid on a canvas.
    pub fn for_cell(index: usize, width: u32, height: u32) -> Self {
        let cell_w = width as f32 / 2.0;
        let cell_h = height as f32 / 2.0;
        let cell_x = (index % 2) as f32 * cell_w;
        let cell_y = (index / 2) as f32 * cell_h;

        let radius = (cell_w / 2.0).min(cell_h * 0.75) * 0.8;
        Self {
            cx: cell_x + cell_w / 2.0,
            // Centers the half circle vertically in its cell
            cy: cell_y + (cell_h + radius) / 2.0,
            radius,
            stroke: radius * 0.15,
        }
    }
}

/// Draws one seven-segment digit with its top-left corner at (x, y).
fn draw_digit(canvas: &mut Canvas, x: f32, y: f32, height: f32, digit: usize) {
    let w = height * 0.5;
    let t = height * 0.12;
    let half = height / 2.0;
    let segments = [
        (x, y, w, t),                     // a
        (x + w - t, y, t, half),          // b
        (x + w - t, y + half, t, half),   // c
        (x, y + height - t, w, t),        // d
        (x, y + half, t, half),           // e
        (x, y, t, half),                  // f
        (x, y + half - t / 2.0, w, t),    // g
    ];

    let mask = SEGMENTS[digit];
    for (bit, (sx, sy, sw, sh)) in segments.into_iter().enumerate() {
        let color = if mask & (1 << bit) != 0 {
            DARK.segment_on
        } else {
            DARK.segment_off
        };
        canvas.fill_rect(sx, sy, sw, sh, color);
    }
}

/// Draws a whole number centred on `cx` with its top edge at `top`.
fn draw_number(canvas: &mut Canvas, cx: f32, top: f32, height: f32, value: i64) {
    let digits: Vec<usize> = value
        .max(0)
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| d as usize))
        .collect();

    let width = height * 0.5;
    let gap = height * 0.15;
    let total = digits.len() as f32 * width + (digits.len() as f32 - 1.0) * gap;
    let mut x = cx - total / 2.0;
    for digit in digits {
        draw_digit(canvas, x, top, height, digit);
        x += width + gap;
    }
}

/// Renders all four meters for a snapshot.
pub fn render(canvas: &mut Canvas, snapshot: &MetricsSnapshot) {
    let (width, height) = canvas.dimensions();
    canvas.set_background(DARK.background);
    canvas.clear();

    for (index, gauge) in gauges(snapshot).iter().enumerate() {
        let layout = MeterLayout::for_cell(index, width, height);

        // Trough over the full upper half, then the filled part
        canvas.draw_arc(
            layout.cx,
            layout.cy,
            layout.radius,
            PI,
            2.0 * PI,
            layout.stroke,
            DARK.trough,
        );
        let fraction = gauge.fraction() as f32;
        if fraction > 0.0 {
            canvas.draw_arc(
                layout.cx,
                layout.cy,
                layout.radius,
                PI,
                PI + PI * fraction,
                layout.stroke,
                DARK.fill,
            );
        }

        let digit_height = layout.radius * 0.45;
        draw_number(
            canvas,
            layout.cx,
            layout.cy - digit_height - layout.stroke,
            digit_height,
            gauge.whole(),
        );
    }
}

/// Writes a PNG frame of the meters on every snapshot.
pub struct PngDisplay {
    canvas: Canvas,
    path: PathBuf,
}

impl PngDisplay {
    /// Creates a PNG display writing `width`x`height` frames to `path`.
    pub fn new(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            bail!(
                "PNG frame {}x{} is smaller than the minimum {}x{}",
                width,
                height,
                MIN_WIDTH,
                MIN_HEIGHT
            );
        }
        Ok(Self {
            canvas: Canvas::new(width, height)?,
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl DisplaySink for PngDisplay {
    fn name(&self) -> &str {
        "png"
    }

    fn show(&mut self, snapshot: &MetricsSnapshot) -> Result<()> {
        render(&mut self.canvas, snapshot);
        let png = self.canvas.to_png()?;

        // Readers never see a half-written frame
        let tmp = self.path.with_extension("png.tmp");
        fs::write(&tmp, png).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        debug!("Wrote frame to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(color: u32) -> Option<(u8, u8, u8, u8)> {
        Some(((color >> 16) as u8, (color >> 8) as u8, color as u8, 255))
    }

    /// Pixel at the top of a meter's arc.
    fn arc_top(canvas: &Canvas, index: usize) -> Option<(u8, u8, u8, u8)> {
        let (width, height) = canvas.dimensions();
        let layout = MeterLayout::for_cell(index, width, height);
        canvas.pixel(layout.cx as u32, (layout.cy - layout.radius) as u32)
    }

    #[test]
    fn test_layout_fits_cells() {
        for index in 0..4 {
            let layout = MeterLayout::for_cell(index, 800, 480);
            let cell_top = (index / 2) as f32 * 240.0;
            assert!(layout.cy - layout.radius - layout.stroke / 2.0 >= cell_top);
            assert!(layout.cy <= cell_top + 240.0);
            assert!(layout.cx - layout.radius >= (index % 2) as f32 * 400.0);
        }
    }

    #[test]
    fn test_meter_fill() {
        let mut canvas = Canvas::new(800, 480).unwrap();
        render(&mut canvas, &MetricsSnapshot::new(0.0, 100.0, 0.0, 100.0));

        assert_eq!(arc_top(&canvas, 0), rgb(DARK.trough));
        assert_eq!(arc_top(&canvas, 1), rgb(DARK.fill));
        assert_eq!(arc_top(&canvas, 2), rgb(DARK.trough));
        assert_eq!(arc_top(&canvas, 3), rgb(DARK.fill));
        assert_eq!(canvas.pixel(0, 0), rgb(DARK.background));
    }

    #[test]
    fn test_over_range_reading_fills_meter() {
        let mut canvas = Canvas::new(800, 480).unwrap();
        render(&mut canvas, &MetricsSnapshot::new(130.0, 0.0, 0.0, 0.0));
        assert_eq!(arc_top(&canvas, 0), rgb(DARK.fill));
    }

    #[test]
    fn test_digit_segments() {
        let mut canvas = Canvas::new(40, 40).unwrap();
        canvas.clear();
        draw_digit(&mut canvas, 0.0, 0.0, 40.0, 1);

        // "1" lights b and c, leaves a dark
        assert_eq!(canvas.pixel(18, 5), rgb(DARK.segment_on));
        assert_eq!(canvas.pixel(8, 2), rgb(DARK.segment_off));
    }

    #[test]
    fn test_png_display_writes_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gauges.png");
        let mut display = PngDisplay::new(&path, 320, 240).unwrap();

        display
            .show(&MetricsSnapshot::new(45.0, 87.5, 62.0, 37.0))
            .unwrap();
        let data = fs::read(&path).unwrap();
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
        assert!(!path.with_extension("png.tmp").exists());
    }

    #[test]
    fn test_png_display_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("gauges.png");
        let mut display = PngDisplay::new(&path, MIN_WIDTH, MIN_HEIGHT).unwrap();
        let err = display.show(&MetricsSnapshot::default()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to write"));
    }

    #[test]
    fn test_smallest_frame_renders() {
        let mut canvas = Canvas::new(MIN_WIDTH, MIN_HEIGHT).unwrap();
        render(&mut canvas, &MetricsSnapshot::new(45.0, 87.5, 62.0, 100.0));
        assert_eq!(arc_top(&canvas, 3), rgb(DARK.fill));

        // Digits are drawn with snapped rects even when a segment is sub-pixel
        let mut canvas = Canvas::new(40, 30).unwrap();
        render(&mut canvas, &MetricsSnapshot::new(88.0, 88.0, 88.0, 88.0));
    }

    #[test]
    fn test_png_display_rejects_tiny_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gauges.png");
        assert!(PngDisplay::new(&path, 64, 64).is_err());
        assert!(PngDisplay::new(&path, MIN_WIDTH, MIN_HEIGHT - 1).is_err());
        assert!(!path.exists());
    }
}
