use std::path::PathBuf;

use burn::{config::ConfigError, data::dataset::vision::ImageLoaderError, record::RecorderError};
use thiserror::Error;

use crate::stroke::{MAX_PEN_WIDTH, MIN_PEN_WIDTH};

/// Errors raised while configuring, loading or driving a sketch session.
#[derive(Error, Debug)]
pub enum SketchError {
    /// Pen width outside of the accepted range.
    #[error("pen width {0} is outside of {min}..={max}", min = MIN_PEN_WIDTH, max = MAX_PEN_WIDTH)]
    PenWidth(u32),

    /// Pen color name not found in the palette.
    #[error("unknown pen color `{0}`")]
    PenColor(String),

    /// Canvas or input dimensions that cannot hold an image.
    #[error("invalid canvas dimensions {width}x{height}")]
    CanvasSize { width: u32, height: u32 },

    /// The model input is too small for the convolution stack.
    #[error("model input size {0} is too small for the convolution stack")]
    ModelInputSize(usize),

    /// The canvas is scaled to a size the classifier was not built for.
    #[error("canvas input size {canvas} does not match the classifier input size {classifier}")]
    InputSize { canvas: u32, classifier: usize },

    /// The classifier does not produce one probability per label.
    #[error("classifier returned {actual} probabilities, expected {expected}")]
    OutputArity { expected: usize, actual: usize },

    /// Tensor data could not be read back as `f32`.
    #[error("could not read tensor data: {0}")]
    TensorData(String),

    /// The dataset directory is missing a split.
    #[error("dataset split not found: {0}")]
    MissingSplit(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Dataset(#[from] ImageLoaderError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SketchError>;
