use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cifar-sketch", version, about = "Sketch an image and classify it with a CIFAR-10 CNN")]
pub struct Cli {
    /// JSON canvas config; defaults to a 448x448 canvas and 32x32 model input.
    #[arg(long, global = true)]
    pub canvas_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the network on a CIFAR-10 image folder with `train/` and `test/` splits.
    Train {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, default_value = "/tmp/cifar-sketch")]
        artifact_dir: PathBuf,
        #[arg(long)]
        epochs: Option<usize>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Replay recorded drawing events and print the prediction after each stroke.
    Predict {
        #[arg(long, default_value = "/tmp/cifar-sketch")]
        artifact_dir: PathBuf,
        /// JSON list of drawing events.
        #[arg(long)]
        events: PathBuf,
        /// Print the per-class probabilities after each prediction.
        #[arg(long)]
        breakdown: bool,
        /// Write the final canvas as an image.
        #[arg(long)]
        save_canvas: Option<PathBuf>,
    },
    /// Rasterize recorded drawing events to an image, without a model.
    Render {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}
