use super::AveragingBackend;
use crate::error::BatchError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use log::warn;
use std::path::{Path, PathBuf};

/// In-process backend built on the `image` crate.
pub struct LocalBackend {
    width: u32,
    height: u32,
}

impl LocalBackend {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn load(&self, path: &Path) -> Result<RgbImage, BatchError> {
        let img = image::open(path).map_err(|source| BatchError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.normalize(&img))
    }

    /// Normalizes an image to the canonical resolution: crop to the canonical
    /// aspect ratio anchored at the top-left, then resize. Cropping first
    /// keeps the aspect ratio undistorted.
    fn normalize(&self, img: &DynamicImage) -> RgbImage {
        let (w, h) = img.dimensions();
        if (w, h) == (self.width, self.height) {
            return img.to_rgb8();
        }

        // Compare aspect ratios by cross-multiplying to stay in integers.
        let lhs = u64::from(w) * u64::from(self.height);
        let rhs = u64::from(h) * u64::from(self.width);
        let (crop_w, crop_h) = if lhs > rhs {
            // Wider than canonical: trim the right edge.
            ((rhs / u64::from(self.height)) as u32, h)
        } else {
            // Taller than canonical: trim the bottom edge.
            (w, (lhs / u64::from(self.width)) as u32)
        };

        img.crop_imm(0, 0, crop_w.max(1), crop_h.max(1))
            .resize_exact(self.width, self.height, FilterType::Lanczos3)
            .to_rgb8()
    }
}

impl AveragingBackend for LocalBackend {
    fn brightness(&self, path: &Path) -> Result<f64, BatchError> {
        let img = image::open(path).map_err(|source| BatchError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let luma = img.to_luma8();
        let pixels = luma.as_raw();
        if pixels.is_empty() {
            return Ok(0.0);
        }
        let sum: u64 = pixels.iter().map(|&v| u64::from(v)).sum();
        Ok(sum as f64 / pixels.len() as f64)
    }

    fn average(&self, paths: &[PathBuf]) -> Result<RgbImage, BatchError> {
        // u32 per channel: 255 * window size stays far below the limit for
        // any realistic window.
        let mut acc = vec![0u32; self.width as usize * self.height as usize * 3];
        let mut loaded: u32 = 0;

        for path in paths {
            match self.load(path) {
                Ok(img) => {
                    for (slot, &value) in acc.iter_mut().zip(img.as_raw()) {
                        *slot += u32::from(value);
                    }
                    loaded += 1;
                }
                // A corrupt member shrinks the divisor instead of failing
                // the whole batch.
                Err(e) => warn!("skipping unreadable batch member: {e}"),
            }
        }

        if loaded == 0 {
            return Err(BatchError::EmptyBatch);
        }

        let half = loaded / 2;
        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            let i = (y as usize * self.width as usize + x as usize) * 3;
            Rgb([
                ((acc[i] + half) / loaded) as u8,
                ((acc[i + 1] + half) / loaded) as u8,
                ((acc[i + 2] + half) / loaded) as u8,
            ])
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, pixels: &[[u8; 3]], width: u32, height: u32) -> PathBuf {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb(pixels[(y * width + x) as usize])
        });
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    fn solid_png(dir: &Path, name: &str, value: u8, width: u32, height: u32) -> PathBuf {
        let pixels = vec![[value, value, value]; (width * height) as usize];
        write_png(dir, name, &pixels, width, height)
    }

    #[test]
    fn test_brightness_black_and_white() {
        let temp_dir = TempDir::new().unwrap();
        let black = solid_png(temp_dir.path(), "black.png", 0, 4, 4);
        let white = solid_png(temp_dir.path(), "white.png", 255, 4, 4);

        let backend = LocalBackend::new(4, 4);
        assert!(backend.brightness(&black).unwrap() < 1.0);
        assert!(backend.brightness(&white).unwrap() > 254.0);
    }

    #[test]
    fn test_brightness_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let bogus = temp_dir.path().join("bogus.png");
        std::fs::write(&bogus, b"not an image").unwrap();

        let backend = LocalBackend::new(4, 4);
        assert!(matches!(
            backend.brightness(&bogus),
            Err(BatchError::Decode { .. })
        ));
    }

    #[test]
    fn test_average_single_image_is_identity() {
        let temp_dir = TempDir::new().unwrap();
        let pixels: Vec<[u8; 3]> = (0..16u8).map(|i| [i * 3, i * 5, i * 7]).collect();
        let path = write_png(temp_dir.path(), "a.png", &pixels, 4, 4);

        let backend = LocalBackend::new(4, 4);
        let averaged = backend.average(&[path]).unwrap();
        for (i, pixel) in pixels.iter().enumerate() {
            let got = averaged.get_pixel(i as u32 % 4, i as u32 / 4);
            assert_eq!(&got.0, pixel);
        }
    }

    #[test]
    fn test_average_is_commutative() {
        let temp_dir = TempDir::new().unwrap();
        let a = solid_png(temp_dir.path(), "a.png", 10, 4, 4);
        let b = solid_png(temp_dir.path(), "b.png", 200, 4, 4);
        let c = solid_png(temp_dir.path(), "c.png", 90, 4, 4);

        let backend = LocalBackend::new(4, 4);
        let forward = backend
            .average(&[a.clone(), b.clone(), c.clone()])
            .unwrap();
        let backward = backend.average(&[c, b, a]).unwrap();
        assert_eq!(forward.as_raw(), backward.as_raw());
    }

    #[test]
    fn test_average_divides_by_loaded_count() {
        let temp_dir = TempDir::new().unwrap();
        let a = solid_png(temp_dir.path(), "a.png", 100, 4, 4);
        let b = solid_png(temp_dir.path(), "b.png", 200, 4, 4);
        let bogus = temp_dir.path().join("bogus.png");
        std::fs::write(&bogus, b"junk").unwrap();

        let backend = LocalBackend::new(4, 4);
        // The unreadable member is skipped; divisor is 2, not 3.
        let averaged = backend.average(&[a, b, bogus]).unwrap();
        assert_eq!(averaged.get_pixel(0, 0).0, [150, 150, 150]);
    }

    #[test]
    fn test_average_empty_batch() {
        let temp_dir = TempDir::new().unwrap();
        let bogus = temp_dir.path().join("bogus.png");
        std::fs::write(&bogus, b"junk").unwrap();

        let backend = LocalBackend::new(4, 4);
        assert!(matches!(
            backend.average(&[bogus]),
            Err(BatchError::EmptyBatch)
        ));
        assert!(matches!(backend.average(&[]), Err(BatchError::EmptyBatch)));
    }

    #[test]
    fn test_normalize_crops_wide_input_to_canonical() {
        let temp_dir = TempDir::new().unwrap();
        // 16:4 input for an 8:4 canonical frame: right half is cropped away.
        let mut pixels = vec![[0u8, 0, 0]; 16 * 4];
        for y in 0..4 {
            for x in 8..16 {
                pixels[y * 16 + x] = [255, 255, 255];
            }
        }
        let path = write_png(temp_dir.path(), "wide.png", &pixels, 16, 4);

        let backend = LocalBackend::new(8, 4);
        let averaged = backend.average(&[path]).unwrap();
        assert_eq!(averaged.dimensions(), (8, 4));
        // Only the black left half survives the top-left anchored crop.
        assert!(averaged.pixels().all(|p| p.0[0] < 32));
    }
}
