use core::fmt;
use core::str::FromStr;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SketchError};

pub const MIN_PEN_WIDTH: u32 = 1;
pub const MAX_PEN_WIDTH: u32 = 15;
pub const DEFAULT_PEN_WIDTH: u32 = 3;

/// A pixel position on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// The fixed pen palette. `White` matches the canvas background and acts as an eraser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenColor {
    #[default]
    Black,
    Red,
    Blue,
    Green,
    Yellow,
    White,
    Brown,
    Purple,
}

impl PenColor {
    pub const ALL: [PenColor; 8] = [
        PenColor::Black,
        PenColor::Red,
        PenColor::Blue,
        PenColor::Green,
        PenColor::Yellow,
        PenColor::White,
        PenColor::Brown,
        PenColor::Purple,
    ];

    /// RGB value of the named color.
    pub fn rgb(self) -> Rgb<u8> {
        match self {
            PenColor::Black => Rgb([0, 0, 0]),
            PenColor::Red => Rgb([255, 0, 0]),
            PenColor::Blue => Rgb([0, 0, 255]),
            PenColor::Green => Rgb([0, 128, 0]),
            PenColor::Yellow => Rgb([255, 255, 0]),
            PenColor::White => Rgb([255, 255, 255]),
            PenColor::Brown => Rgb([165, 42, 42]),
            PenColor::Purple => Rgb([128, 0, 128]),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PenColor::Black => "black",
            PenColor::Red => "red",
            PenColor::Blue => "blue",
            PenColor::Green => "green",
            PenColor::Yellow => "yellow",
            PenColor::White => "white",
            PenColor::Brown => "brown",
            PenColor::Purple => "purple",
        }
    }
}

impl fmt::Display for PenColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PenColor {
    type Err = SketchError;

    fn from_str(name: &str) -> Result<Self> {
        PenColor::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| SketchError::PenColor(name.to_string()))
    }
}

/// Pen width in pixels, always within `MIN_PEN_WIDTH..=MAX_PEN_WIDTH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PenWidth(u32);

impl PenWidth {
    pub fn new(width: u32) -> Result<Self> {
        if (MIN_PEN_WIDTH..=MAX_PEN_WIDTH).contains(&width) {
            Ok(Self(width))
        } else {
            Err(SketchError::PenWidth(width))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PenWidth {
    fn default() -> Self {
        Self(DEFAULT_PEN_WIDTH)
    }
}

impl<'de> Deserialize<'de> for PenWidth {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let width = u32::deserialize(deserializer)?;
        PenWidth::new(width).map_err(serde::de::Error::custom)
    }
}

/// Current pen configuration of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pen {
    pub color: PenColor,
    pub width: PenWidth,
}

/// One straight segment drawn between two consecutive pointer positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub color: PenColor,
    pub width: PenWidth,
}

impl Stroke {
    pub fn new(from: Point, to: Point, pen: Pen) -> Self {
        Self {
            from,
            to,
            color: pen.color,
            width: pen.width,
        }
    }

    /// A stroke whose start and end coincide, rendered as a dot.
    pub fn dot(at: Point, pen: Pen) -> Self {
        Self::new(at, at, pen)
    }

    pub fn is_dot(&self) -> bool {
        self.from == self.to
    }
}

/// Ordered record of the strokes drawn so far, in draw order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrokeLog {
    strokes: Vec<Stroke>,
}

impl StrokeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Removes and returns the most recent stroke. Does nothing on an empty log.
    pub fn undo(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub fn clear(&mut self) {
        self.strokes = Vec::new();
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
