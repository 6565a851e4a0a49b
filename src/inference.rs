use std::path::Path;

use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use log::info;

use crate::{
    error::{Result, SketchError},
    data::INPUT_SIZE,
    model::{CifarCnn, CifarCnnConfig},
    training::{config_path, model_path, TrainingConfig},
};

/// Maps a `[1, 32, 32, 3]` image in `[0, 1]` to one probability per label.
pub trait Classifier<B: Backend> {
    fn predict(&self, input: Tensor<B, 4>) -> Result<Vec<f32>>;

    /// Side of the square image the classifier accepts.
    fn input_size(&self) -> usize {
        INPUT_SIZE
    }
}

/// Reads a single-row tensor back as `f32` values.
pub fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|err| SketchError::TensorData(format!("{err:?}")))
}

/// Classifier backed by the trained network.
pub struct ModelClassifier<B: Backend> {
    model: CifarCnn<B>,
    input_size: usize,
}

impl<B: Backend> ModelClassifier<B> {
    /// A freshly initialized, untrained network.
    pub fn init(config: &CifarCnnConfig, device: &B::Device) -> Result<Self> {
        Ok(Self {
            model: config.init(device)?,
            input_size: config.input_size,
        })
    }

    /// Rebuilds the network from the training config and loads its weights.
    pub fn load(artifact_dir: &Path, device: &B::Device) -> Result<Self> {
        let config = TrainingConfig::load(config_path(artifact_dir))?;
        let record = CompactRecorder::new().load(model_path(artifact_dir), device)?;
        let mut classifier = Self::init(&config.model, device)?;
        classifier.model = classifier.model.load_record(record);

        info!("Loaded model from {}", artifact_dir.display());

        Ok(classifier)
    }
}

impl<B: Backend> Classifier<B> for ModelClassifier<B> {
    fn predict(&self, input: Tensor<B, 4>) -> Result<Vec<f32>> {
        tensor_to_vec(self.model.probabilities(input))
    }

    fn input_size(&self) -> usize {
        self.input_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::NUM_CLASSES;
    use burn::backend::NdArray;
    use burn::optim::AdamConfig;

    type TestBackend = NdArray;

    #[test]
    fn load_missing_artifacts_fails() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();

        let result = ModelClassifier::<TestBackend>::load(dir.path(), &device);
        assert!(matches!(result, Err(SketchError::Config(_))));
    }

    #[test]
    fn classifier_reports_the_configured_input_size() {
        let device = Default::default();
        let config = CifarCnnConfig::new()
            .with_input_size(24)
            .with_channels(2)
            .with_hidden_size(4);

        let classifier = ModelClassifier::<TestBackend>::init(&config, &device).unwrap();
        assert_eq!(classifier.input_size(), 24);

        let input = Tensor::<TestBackend, 4>::ones([1, 24, 24, 3], &device);
        assert_eq!(classifier.predict(input).unwrap().len(), NUM_CLASSES);
    }

    #[test]
    fn saved_model_loads_and_predicts() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model_config = CifarCnnConfig::new().with_channels(4).with_hidden_size(8);

        TrainingConfig::new(model_config.clone(), AdamConfig::new())
            .save(config_path(dir.path()))
            .unwrap();
        model_config
            .init::<TestBackend>(&device)
            .unwrap()
            .save_file(model_path(dir.path()), &CompactRecorder::new())
            .unwrap();

        let classifier = ModelClassifier::<TestBackend>::load(dir.path(), &device).unwrap();
        assert_eq!(classifier.input_size(), 32);
        let input = Tensor::<TestBackend, 4>::ones([1, 32, 32, 3], &device);
        let probabilities = classifier.predict(input).unwrap();

        assert_eq!(probabilities.len(), NUM_CLASSES);
        assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }
}
