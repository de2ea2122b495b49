use super::backend::AveragingBackend;
use crate::error::{RejectReason, ValidationOutcome};
use indicatif::ProgressBar;
use log::debug;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Decides whether a candidate source image may participate in averaging.
/// Read-only: source files are never touched.
pub struct ValidityFilter<'a> {
    backend: &'a dyn AveragingBackend,
    brightness_threshold: f64,
}

impl<'a> ValidityFilter<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn AveragingBackend, brightness_threshold: f64) -> Self {
        Self {
            backend,
            brightness_threshold,
        }
    }

    /// Checks one candidate. Zero-byte files are rejected before any decode
    /// is attempted; decode failures are recorded, not propagated.
    #[must_use]
    pub fn check(&self, path: &Path) -> ValidationOutcome {
        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                return ValidationOutcome::Rejected {
                    path: path.to_path_buf(),
                    reason: RejectReason::DecodeError(e.to_string()),
                };
            }
        };
        if size == 0 {
            return ValidationOutcome::Rejected {
                path: path.to_path_buf(),
                reason: RejectReason::EmptyFile,
            };
        }

        match self.backend.brightness(path) {
            Ok(brightness) if brightness < self.brightness_threshold => {
                debug!(
                    "rejecting {} as too dark ({brightness:.1} < {:.1})",
                    path.display(),
                    self.brightness_threshold
                );
                ValidationOutcome::Rejected {
                    path: path.to_path_buf(),
                    reason: RejectReason::TooDark,
                }
            }
            Ok(_) => ValidationOutcome::Accepted(path.to_path_buf()),
            Err(e) => ValidationOutcome::Rejected {
                path: path.to_path_buf(),
                reason: RejectReason::DecodeError(e.to_string()),
            },
        }
    }

    /// Checks every candidate on the rayon pool. Brightness scoring
    /// dominates wall-clock time for large sets, so this is one task per
    /// file. Outcomes arrive in arbitrary completion order; the caller
    /// re-sorts accepted paths by filename before selection.
    pub fn check_all(
        &self,
        candidates: &[PathBuf],
        shutdown_signal: &Arc<AtomicBool>,
        progress: &ProgressBar,
    ) -> Vec<ValidationOutcome> {
        candidates
            .par_iter()
            .map(|path| {
                if shutdown_signal.load(Ordering::SeqCst) {
                    return ValidationOutcome::Rejected {
                        path: path.clone(),
                        reason: RejectReason::Interrupted,
                    };
                }
                let outcome = self.check(path);
                progress.inc(1);
                outcome
            })
            .collect()
    }
}
