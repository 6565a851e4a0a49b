pub mod data;
pub mod error;
pub mod inference;
pub mod labels;
pub mod model;
pub mod raster;
pub mod script;
pub mod session;
pub mod stroke;
pub mod surface;
pub mod training;

pub use error::{Result, SketchError};
pub use inference::{Classifier, ModelClassifier};
pub use labels::{Prediction, CIFAR10_LABELS};
pub use session::Session;
pub use surface::StrokeEvent;
