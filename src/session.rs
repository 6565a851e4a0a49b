use burn::prelude::*;
use image::RgbImage;
use log::{debug, info};

use crate::{
    data::SketchNormalizer,
    error::{Result, SketchError},
    inference::Classifier,
    labels::{Prediction, NUM_CLASSES},
    raster::CanvasConfig,
    stroke::{Pen, PenColor, PenWidth, Stroke, StrokeLog},
    surface::{DrawingSurface, StrokeEvent},
};

/// Text shown before the predicted label.
pub const DISPLAY_PREFIX: &str = "Predicted class: ";

/// One drawing session: the surface being drawn on, the classifier and the last result.
pub struct Session<B: Backend, C: Classifier<B>> {
    classifier: C,
    device: B::Device,
    surface: DrawingSurface,
    normalizer: SketchNormalizer,
    prediction: Option<Prediction>,
    display: String,
}

impl<B: Backend, C: Classifier<B>> Session<B, C> {
    /// Creates a session and checks that the classifier accepts the canvas input size and
    /// yields one value per label.
    pub fn new(classifier: C, config: &CanvasConfig, device: B::Device) -> Result<Self> {
        let surface = DrawingSurface::new(config)?;
        if config.input_size == 0 {
            return Err(SketchError::CanvasSize {
                width: config.input_size,
                height: config.input_size,
            });
        }
        if config.input_size as usize != classifier.input_size() {
            return Err(SketchError::InputSize {
                canvas: config.input_size,
                classifier: classifier.input_size(),
            });
        }
        let normalizer = SketchNormalizer::new(config.input_size);

        let blank = normalizer.normalize::<B>(&surface.bitmap(), &device);
        let actual = classifier.predict(blank)?.len();
        if actual != NUM_CLASSES {
            return Err(SketchError::OutputArity {
                expected: NUM_CLASSES,
                actual,
            });
        }

        Ok(Self {
            classifier,
            device,
            surface,
            normalizer,
            prediction: None,
            display: DISPLAY_PREFIX.to_string(),
        })
    }

    /// Feeds one pointer event. Returns the new prediction when a stroke is completed.
    pub fn handle(&mut self, event: StrokeEvent) -> Result<Option<Prediction>> {
        if self.surface.handle(event) {
            self.predict().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Classifies the current drawing and updates the display text.
    pub fn predict(&mut self) -> Result<Prediction> {
        let input = self.normalizer.normalize::<B>(&self.canvas(), &self.device);
        let prediction = Prediction::decode(self.classifier.predict(input)?);

        info!("{}{}", DISPLAY_PREFIX, prediction.label);
        debug!("Class probabilities:\n{}", prediction.breakdown());

        self.display = format!("{DISPLAY_PREFIX}{}", prediction.label);
        self.prediction = Some(prediction.clone());

        Ok(prediction)
    }

    /// Removes the most recent stroke, if any.
    pub fn undo(&mut self) -> Option<Stroke> {
        self.surface.undo()
    }

    /// Drops every stroke and resets the display to its placeholder.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.prediction = None;
        self.display = DISPLAY_PREFIX.to_string();
    }

    pub fn set_pen_color(&mut self, color: PenColor) {
        self.surface.set_pen_color(color);
    }

    pub fn set_pen_width(&mut self, width: u32) -> Result<()> {
        self.surface.set_pen_width(PenWidth::new(width)?);
        Ok(())
    }

    pub fn pen(&self) -> Pen {
        self.surface.pen()
    }

    pub fn strokes(&self) -> &StrokeLog {
        self.surface.strokes()
    }

    pub fn is_drawing(&self) -> bool {
        self.surface.is_drawing()
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn display_text(&self) -> &str {
        &self.display
    }

    /// Renders the strokes recorded so far.
    pub fn canvas(&self) -> RgbImage {
        self.surface.bitmap()
    }
}
