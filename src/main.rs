mod cli;

use std::path::Path;
use std::process::ExitCode;

use burn::{backend::Autodiff, config::Config, optim::AdamConfig};
use cifar_sketch::{
    model::CifarCnnConfig,
    raster::CanvasConfig,
    script::{load_script, replay, replay_on_surface},
    surface::DrawingSurface,
    training::{train, DatasetDir, TrainingConfig},
    ModelClassifier, Result, Session,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

#[cfg(feature = "wgpu")]
mod backend {
    use burn::backend::wgpu::WgpuDevice;

    pub type Selected = burn::backend::Wgpu;

    pub fn device() -> WgpuDevice {
        WgpuDevice::default()
    }
}

#[cfg(all(feature = "tch-gpu", not(feature = "wgpu")))]
mod backend {
    use burn::backend::libtorch::LibTorchDevice;

    pub type Selected = burn::backend::LibTorch;

    #[cfg(not(target_os = "macos"))]
    pub fn device() -> LibTorchDevice {
        LibTorchDevice::Cuda(0)
    }

    #[cfg(target_os = "macos")]
    pub fn device() -> LibTorchDevice {
        LibTorchDevice::Mps
    }
}

#[cfg(all(feature = "tch-cpu", not(any(feature = "wgpu", feature = "tch-gpu"))))]
mod backend {
    use burn::backend::libtorch::LibTorchDevice;

    pub type Selected = burn::backend::LibTorch;

    pub fn device() -> LibTorchDevice {
        LibTorchDevice::Cpu
    }
}

#[cfg(not(any(feature = "wgpu", feature = "tch-gpu", feature = "tch-cpu")))]
mod backend {
    use burn::backend::ndarray::NdArrayDevice;

    pub type Selected = burn::backend::NdArray;

    pub fn device() -> NdArrayDevice {
        NdArrayDevice::Cpu
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn canvas_config(path: Option<&Path>) -> Result<CanvasConfig> {
    match path {
        Some(path) => Ok(CanvasConfig::load(path)?),
        None => Ok(CanvasConfig::new()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let canvas = canvas_config(cli.canvas_config.as_deref())?;

    match cli.command {
        Commands::Train {
            data_dir,
            artifact_dir,
            epochs,
            batch_size,
            workers,
            seed,
        } => {
            // The learner installs its own file logger under the artifact directory.
            let mut config = TrainingConfig::new(
                CifarCnnConfig::new().with_input_size(canvas.input_size as usize),
                AdamConfig::new(),
            );
            if let Some(epochs) = epochs {
                config.num_epochs = epochs;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            if let Some(workers) = workers {
                config.num_workers = workers;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }

            train::<Autodiff<backend::Selected>>(
                &artifact_dir,
                &DatasetDir::new(data_dir),
                config,
                backend::device(),
            )
        }
        Commands::Predict {
            artifact_dir,
            events,
            breakdown,
            save_canvas,
        } => {
            init_logging();
            let device = backend::device();
            let classifier = ModelClassifier::<backend::Selected>::load(&artifact_dir, &device)?;
            let mut session = Session::new(classifier, &canvas, device)?;

            let steps = load_script(&events)?;
            replay(&mut session, &steps, |session, prediction| {
                println!("{}", session.display_text());
                if breakdown {
                    print!("{}", prediction.breakdown());
                }
            })?;

            if let Some(path) = save_canvas {
                session.canvas().save(path)?;
            }
            Ok(())
        }
        Commands::Render { events, output } => {
            init_logging();
            let mut surface = DrawingSurface::new(&canvas)?;
            replay_on_surface(&mut surface, &load_script(&events)?);
            surface.bitmap().save(&output)?;
            log::info!("Wrote {} strokes to {}", surface.strokes().len(), output.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
