use burn::config::Config;
use image::{Rgb, RgbImage};

use crate::error::SketchError;
use crate::stroke::{PenColor, Stroke};

/// Geometry of the drawing surface and of the classifier input.
#[derive(Config, Debug)]
pub struct CanvasConfig {
    /// Side of the square drawing canvas in pixels.
    #[config(default = 448)]
    pub size: u32,
    /// Side of the square image fed to the classifier.
    #[config(default = 32)]
    pub input_size: u32,
    #[config(default = 3)]
    pub default_pen_width: u32,
}

/// Replays strokes onto a blank canvas.
#[derive(Clone, Debug)]
pub struct Rasterizer {
    width: u32,
    height: u32,
    background: Rgb<u8>,
}

impl Rasterizer {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> crate::error::Result<Self> {
        if width == 0 || height == 0 {
            return Err(SketchError::CanvasSize { width, height });
        }

        Ok(Self {
            width,
            height,
            background,
        })
    }

    /// A square white canvas as described by the config.
    pub fn from_config(config: &CanvasConfig) -> crate::error::Result<Self> {
        Self::new(config.size, config.size, PenColor::White.rgb())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Rgb<u8> {
        self.background
    }

    /// Renders the strokes in order on a background-filled bitmap.
    ///
    /// Later strokes overwrite earlier ones where they overlap. An empty slice yields a
    /// bitmap made only of the background color.
    pub fn rasterize(&self, strokes: &[Stroke]) -> RgbImage {
        let mut image = RgbImage::from_pixel(self.width, self.height, self.background);

        for stroke in strokes {
            draw_stroke(&mut image, stroke);
        }

        image
    }
}

/// Paints every pixel whose center lies within half the pen width of the segment.
///
/// A zero-length segment degenerates to a filled disc, so single clicks stay visible.
pub fn draw_stroke(image: &mut RgbImage, stroke: &Stroke) {
    let (width, height) = image.dimensions();
    let radius = (stroke.width.get() as f32 / 2.0).max(0.5);
    let reach = radius.ceil() as i64;
    let color = stroke.color.rgb();

    let (x1, y1) = (stroke.from.x as f32, stroke.from.y as f32);
    let (x2, y2) = (stroke.to.x as f32, stroke.to.y as f32);

    let min_x = (stroke.from.x.min(stroke.to.x) as i64 - reach).max(0);
    let min_y = (stroke.from.y.min(stroke.to.y) as i64 - reach).max(0);
    let max_x = (stroke.from.x.max(stroke.to.x) as i64 + reach).min(width as i64 - 1);
    let max_y = (stroke.from.y.max(stroke.to.y) as i64 + reach).min(height as i64 - 1);

    let (dx, dy) = (x2 - x1, y2 - y1);
    let length_sq = dx * dx + dy * dy;
    let radius_sq = radius * radius;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (px, py) = (x as f32, y as f32);
            let t = if length_sq == 0.0 {
                0.0
            } else {
                (((px - x1) * dx + (py - y1) * dy) / length_sq).clamp(0.0, 1.0)
            };
            let (cx, cy) = (x1 + t * dx - px, y1 + t * dy - py);

            if cx * cx + cy * cy <= radius_sq {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
