mod local;
mod remote;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

use crate::config::{BackendKind, Settings};
use crate::error::BatchError;
use anyhow::Result;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Brightness scoring and batch averaging, either in-process or delegated to
/// the remote image processor service. The filter and worker pool only see
/// this trait, so the two deployments share all pipeline logic.
pub trait AveragingBackend: Send + Sync {
    /// Mean luma of the image at `path`, in `0.0..=255.0`.
    fn brightness(&self, path: &Path) -> Result<f64, BatchError>;

    /// Elementwise mean of the images. The local backend normalizes every
    /// member to the canonical resolution first.
    fn average(&self, paths: &[PathBuf]) -> Result<RgbImage, BatchError>;
}

pub fn create_backend(settings: &Settings) -> Result<Box<dyn AveragingBackend>> {
    match settings.backend {
        BackendKind::Local => Ok(Box::new(LocalBackend::new(
            settings.canonical_width,
            settings.canonical_height,
        ))),
        BackendKind::Remote => Ok(Box::new(RemoteBackend::new(&settings.remote_url)?)),
    }
}
