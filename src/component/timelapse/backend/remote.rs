use super::AveragingBackend;
use crate::error::BatchError;
use anyhow::{Context, Result};
use image::RgbImage;
use reqwest::blocking::{Client, multipart};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The image processor rejects request bodies larger than this.
const MAX_REQUEST_BYTES: u64 = 16 * 1024 * 1024;

/// Bound on a single brightness/average round trip so one stuck request
/// cannot stall a worker indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Backend that delegates brightness and averaging to the HTTP image
/// processor service.
pub struct RemoteBackend {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct BrightnessResponse {
    brightness: f64,
}

impl RemoteBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url)
    }

    fn image_part(path: &Path) -> Result<(multipart::Part, u64), BatchError> {
        let bytes = fs::read(path)?;
        let size = bytes.len() as u64;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().to_string());
        Ok((multipart::Part::bytes(bytes).file_name(file_name), size))
    }
}

impl AveragingBackend for RemoteBackend {
    fn brightness(&self, path: &Path) -> Result<f64, BatchError> {
        let (part, size) = Self::image_part(path)?;
        if size > MAX_REQUEST_BYTES {
            return Err(BatchError::RemoteService(format!(
                "{} exceeds the 16 MiB request cap",
                path.display()
            )));
        }

        let form = multipart::Form::new().part("image", part);
        let response = self
            .client
            .post(self.endpoint("brightness"))
            .multipart(form)
            .send()
            .map_err(|e| BatchError::RemoteService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BatchError::RemoteService(format!(
                "brightness returned {}",
                response.status()
            )));
        }

        let payload: BrightnessResponse = response
            .json()
            .map_err(|e| BatchError::RemoteService(format!("malformed brightness payload: {e}")))?;
        Ok(payload.brightness)
    }

    fn average(&self, paths: &[PathBuf]) -> Result<RgbImage, BatchError> {
        if paths.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let mut form = multipart::Form::new();
        let mut total = 0u64;
        for path in paths {
            let (part, size) = Self::image_part(path)?;
            total += size;
            form = form.part("image", part);
        }
        if total > MAX_REQUEST_BYTES {
            return Err(BatchError::RemoteService(format!(
                "batch of {} images exceeds the 16 MiB request cap",
                paths.len()
            )));
        }

        let response = self
            .client
            .post(self.endpoint("average"))
            .multipart(form)
            .send()
            .map_err(|e| BatchError::RemoteService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BatchError::RemoteService(format!(
                "average returned {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| BatchError::RemoteService(e.to_string()))?;
        image::load_from_memory(&body)
            .map(|img| img.to_rgb8())
            .map_err(|e| BatchError::RemoteService(format!("undecodable averaged image: {e}")))
    }
}
