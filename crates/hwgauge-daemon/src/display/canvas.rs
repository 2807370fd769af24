//! Canvas for rendering meters to an image.

use anyhow::{anyhow, Result};
use tiny_skia::{Color, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Segments used to approximate an arc.
const ARC_SEGMENTS: u32 = 96;

/// Converts an RGB888 color (0xRRGGBB) to an opaque tiny-skia color.
fn rgb(color: u32) -> Color {
    let r = ((color >> 16) & 0xFF) as u8;
    let g = ((color >> 8) & 0xFF) as u8;
    let b = (color & 0xFF) as u8;
    Color::from_rgba8(r, g, b, 255)
}

fn solid_paint(color: u32, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(rgb(color));
    paint.anti_alias = anti_alias;
    paint
}

/// Canvas for rendering.
pub struct Canvas {
    width: u32,
    height: u32,
    pixmap: Pixmap,
    background_color: u32,
}

impl Canvas {
    /// Creates a new canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("Invalid canvas size {}x{}", width, height))?;

        Ok(Self {
            width,
            height,
            pixmap,
            background_color: 0x000000, // Black
        })
    }

    /// Returns the canvas dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sets the background color.
    pub fn set_background(&mut self, color: u32) {
        self.background_color = color;
    }

    /// Clears the canvas.
    pub fn clear(&mut self) {
        self.pixmap.fill(rgb(self.background_color));
    }

    /// Draws a filled rectangle snapped to whole pixels.
    ///
    /// Anti-aliased rects thinner than a pixel trip an assertion in tiny-skia.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: u32) {
        if let Some(rect) = Rect::from_xywh(x, y, width, height) {
            self.pixmap.fill_rect(
                rect,
                &solid_paint(color, false),
                Transform::identity(),
                None,
            );
        }
    }

    /// Strokes a circular arc with rounded ends.
    ///
    /// Angles are in radians, clockwise from the positive x axis (screen
    /// coordinates, y down).
    #[allow(clippy::too_many_arguments)]
    pub fn draw_arc(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        stroke_width: f32,
        color: u32,
    ) {
        let sweep = end_angle - start_angle;
        let steps = ((ARC_SEGMENTS as f32 * sweep.abs() / std::f32::consts::TAU).ceil() as u32)
            .max(1);

        let mut pb = PathBuilder::new();
        for i in 0..=steps {
            let angle = start_angle + sweep * i as f32 / steps as f32;
            let (x, y) = (cx + radius * angle.cos(), cy + radius * angle.sin());
            if i == 0 {
                pb.move_to(x, y);
            } else {
                pb.line_to(x, y);
            }
        }

        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: stroke_width,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &solid_paint(color, true),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    /// Returns the RGBA value of a pixel, or `None` outside the canvas.
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        // Pixmap::pixel only checks the linear index, so x can wrap a row
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            (c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    /// Returns the raw RGBA pixels.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Encodes the canvas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(self.pixels())?;
        }

        Ok(png_data)
    }
}
