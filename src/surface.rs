use image::RgbImage;
use log::debug;

use crate::{
    error::Result,
    raster::{CanvasConfig, Rasterizer},
    stroke::{Pen, PenColor, PenWidth, Point, Stroke, StrokeLog},
};

/// Pointer input in canvas pixel coordinates.
///
/// Coordinates may fall outside of the canvas while dragging; they are clamped to its
/// edges before being recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeEvent {
    Down { x: i64, y: i64 },
    Move { x: i64, y: i64 },
    Up { x: i64, y: i64 },
}

/// Turns pointer events into strokes with the current pen.
#[derive(Clone, Debug)]
pub struct DrawingSurface {
    rasterizer: Rasterizer,
    pen: Pen,
    strokes: StrokeLog,
    /// Previous pointer position while the button is held.
    last_point: Option<Point>,
    moved: bool,
}

impl DrawingSurface {
    pub fn new(config: &CanvasConfig) -> Result<Self> {
        Ok(Self {
            rasterizer: Rasterizer::from_config(config)?,
            pen: Pen {
                color: PenColor::default(),
                width: PenWidth::new(config.default_pen_width)?,
            },
            strokes: StrokeLog::new(),
            last_point: None,
            moved: false,
        })
    }

    /// Applies one pointer event. Returns `true` when it completes a stroke.
    pub fn handle(&mut self, event: StrokeEvent) -> bool {
        match event {
            StrokeEvent::Down { x, y } => {
                self.last_point = Some(self.clamp(x, y));
                self.moved = false;
                false
            }
            StrokeEvent::Move { x, y } => {
                if let Some(last) = self.last_point {
                    let point = self.clamp(x, y);
                    self.strokes.push(Stroke::new(last, point, self.pen));
                    self.last_point = Some(point);
                    self.moved = true;
                }
                false
            }
            StrokeEvent::Up { x, y } => {
                let Some(last) = self.last_point.take() else {
                    return false;
                };
                let point = self.clamp(x, y);
                // A click without drag still leaves a dot.
                if !self.moved || point != last {
                    self.strokes.push(Stroke::new(last, point, self.pen));
                }
                self.moved = false;
                true
            }
        }
    }

    pub fn undo(&mut self) -> Option<Stroke> {
        self.strokes.undo()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.last_point = None;
        self.moved = false;
    }

    pub fn set_pen_color(&mut self, color: PenColor) {
        self.pen.color = color;
    }

    pub fn set_pen_width(&mut self, width: PenWidth) {
        self.pen.width = width;
    }

    pub fn pen(&self) -> Pen {
        self.pen
    }

    pub fn strokes(&self) -> &StrokeLog {
        &self.strokes
    }

    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    pub fn bitmap(&self) -> RgbImage {
        self.rasterizer.rasterize(self.strokes.strokes())
    }

    fn clamp(&self, x: i64, y: i64) -> Point {
        let max_x = self.rasterizer.width() as i64 - 1;
        let max_y = self.rasterizer.height() as i64 - 1;
        let point = Point::new(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32);

        if point.x as i64 != x || point.y as i64 != y {
            debug!("Pointer ({x}, {y}) clamped to ({}, {})", point.x, point.y);
        }

        point
    }
}
