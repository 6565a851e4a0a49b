use std::path::{Path, PathBuf};
use std::time::Instant;

use burn::{
    data::{
        dataloader::DataLoaderBuilder,
        dataset::{vision::ImageFolderDataset, Dataset},
    },
    nn::loss::CrossEntropyLossConfig,
    optim::AdamConfig,
    prelude::*,
    record::CompactRecorder,
    tensor::backend::AutodiffBackend,
    train::{
        metric::{AccuracyMetric, LossMetric},
        ClassificationOutput, LearnerBuilder, TrainOutput, TrainStep, ValidStep,
    },
};
use log::info;

use crate::{
    data::{CifarBatch, CifarBatcher},
    error::SketchError,
    model::{CifarCnn, CifarCnnConfig},
};

pub const CONFIG_FILE: &str = "config.json";
pub const MODEL_FILE: &str = "model";

impl<B: Backend> CifarCnn<B> {
    pub fn forward_classification(
        &self,
        images: Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput::new(loss, output, targets)
    }
}

impl<B: AutodiffBackend> TrainStep<CifarBatch<B>, ClassificationOutput<B>> for CifarCnn<B> {
    fn step(&self, batch: CifarBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        let item = self.forward_classification(batch.images, batch.targets);

        TrainOutput::new(self, item.loss.backward(), item)
    }
}

impl<B: Backend> ValidStep<CifarBatch<B>, ClassificationOutput<B>> for CifarCnn<B> {
    fn step(&self, batch: CifarBatch<B>) -> ClassificationOutput<B> {
        self.forward_classification(batch.images, batch.targets)
    }
}

#[derive(Config)]
pub struct TrainingConfig {
    pub model: CifarCnnConfig,
    pub optimizer: AdamConfig,
    #[config(default = 10)]
    pub num_epochs: usize,
    #[config(default = 64)]
    pub batch_size: usize,
    #[config(default = 4)]
    pub num_workers: usize,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 1.0e-3)]
    pub learning_rate: f64,
}

/// Location of the `train` and `test` image folders of a CIFAR-10 export.
#[derive(Clone, Debug)]
pub struct DatasetDir {
    root: PathBuf,
}

impl DatasetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn train(&self) -> crate::error::Result<ImageFolderDataset> {
        self.split("train")
    }

    pub fn test(&self) -> crate::error::Result<ImageFolderDataset> {
        self.split("test")
    }

    fn split(&self, name: &str) -> crate::error::Result<ImageFolderDataset> {
        let path = self.root.join(name);
        if !path.is_dir() {
            return Err(SketchError::MissingSplit(path));
        }

        Ok(ImageFolderDataset::new_classification(path)?)
    }
}

pub fn config_path(artifact_dir: &Path) -> PathBuf {
    artifact_dir.join(CONFIG_FILE)
}

pub fn model_path(artifact_dir: &Path) -> PathBuf {
    artifact_dir.join(MODEL_FILE)
}

/// Trains the network on the image folders and stores config and weights in `artifact_dir`.
pub fn train<B: AutodiffBackend>(
    artifact_dir: &Path,
    dataset: &DatasetDir,
    config: TrainingConfig,
    device: B::Device,
) -> crate::error::Result<()> {
    std::fs::create_dir_all(artifact_dir)?;
    config.save(config_path(artifact_dir))?;

    B::seed(config.seed);

    let dataset_train = dataset.train()?;
    // The CIFAR-10 test split doubles as the validation set.
    let dataset_test = dataset.test()?;
    info!(
        "Training on {} images, validating on {}",
        dataset_train.len(),
        dataset_test.len()
    );

    let batcher = CifarBatcher::new(config.model.input_size);

    let dataloader_train = DataLoaderBuilder::new(batcher.clone())
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(dataset_train);

    let dataloader_test = DataLoaderBuilder::new(batcher)
        .batch_size(config.batch_size)
        .num_workers(config.num_workers)
        .build(dataset_test);

    let model = config.model.init::<B>(&device)?;

    let directory = artifact_dir.to_string_lossy().into_owned();
    let learner = LearnerBuilder::new(directory.as_str())
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(vec![device.clone()])
        .num_epochs(config.num_epochs)
        .summary()
        .build(
            model,
            config.optimizer.init(),
            config.learning_rate,
        );

    let now = Instant::now();
    let model_trained = learner.fit(dataloader_train, dataloader_test);
    let elapsed = now.elapsed().as_secs();
    info!("Training completed in {}m{}s", elapsed / 60, elapsed % 60);

    model_trained.save_file(model_path(artifact_dir), &CompactRecorder::new())?;

    Ok(())
}
