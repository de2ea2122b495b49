use super::annotator::Annotator;
use super::backend::AveragingBackend;
use crate::error::BatchError;
use crate::tools::{display_label, output_file_name, parse_capture_time};
use indicatif::ProgressBar;
use log::{debug, error};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One averaged output frame to produce.
#[derive(Debug, Clone)]
pub struct AverageTask {
    pub members: Vec<PathBuf>,
    pub index: usize,
}

#[derive(Debug)]
pub enum AverageOutcome {
    Written(PathBuf),
    /// The derived output file already exists; nothing was recomputed.
    AlreadyProcessed(PathBuf),
    Failed(BatchError),
    Interrupted,
}

#[derive(Debug)]
pub struct AverageResult {
    pub index: usize,
    pub outcome: AverageOutcome,
}

#[must_use]
pub fn create_average_tasks(batches: Vec<Vec<PathBuf>>) -> Vec<AverageTask> {
    batches
        .into_iter()
        .enumerate()
        .map(|(index, members)| AverageTask { members, index })
        .collect()
}

/// Turns one batch into one annotated averaged frame on disk. Every task is
/// a pure function of its members plus read-only configuration, so tasks run
/// on the rayon pool without shared state.
pub struct FrameAverager<'a> {
    backend: &'a dyn AveragingBackend,
    annotator: &'a Annotator,
    processed_dir: &'a Path,
}

impl<'a> FrameAverager<'a> {
    #[must_use]
    pub const fn new(
        backend: &'a dyn AveragingBackend,
        annotator: &'a Annotator,
        processed_dir: &'a Path,
    ) -> Self {
        Self {
            backend,
            annotator,
            processed_dir,
        }
    }

    /// The batch timestamp comes from the first (lowest-index) member only.
    fn process_inner(&self, task: &AverageTask) -> Result<AverageOutcome, BatchError> {
        let first = task.members.first().ok_or(BatchError::EmptyBatch)?;
        let file_name = first
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BatchError::TimestampParse {
                path: first.clone(),
            })?;
        let captured =
            parse_capture_time(file_name).ok_or_else(|| BatchError::TimestampParse {
                path: first.clone(),
            })?;

        let output_path = self.processed_dir.join(output_file_name(&captured));
        if output_path.exists() {
            debug!("skipping batch {}: {} exists", task.index, output_path.display());
            return Ok(AverageOutcome::AlreadyProcessed(output_path));
        }

        let mut frame = self.backend.average(&task.members)?;
        self.annotator.annotate(&mut frame, &display_label(&captured));

        frame.save(&output_path).map_err(|source| BatchError::Write {
            path: output_path.clone(),
            source,
        })?;

        Ok(AverageOutcome::Written(output_path))
    }

    #[must_use]
    pub fn process(&self, task: &AverageTask) -> AverageResult {
        let outcome = match self.process_inner(task) {
            Ok(outcome) => outcome,
            Err(e) => AverageOutcome::Failed(e),
        };
        AverageResult {
            index: task.index,
            outcome,
        }
    }

    /// Averages all batches on the rayon pool. A failing batch is logged and
    /// tallied; it never aborts its siblings.
    pub fn process_all(
        &self,
        tasks: &[AverageTask],
        shutdown_signal: &Arc<AtomicBool>,
        progress: &ProgressBar,
    ) -> Vec<AverageResult> {
        tasks
            .par_iter()
            .map(|task| {
                if shutdown_signal.load(Ordering::SeqCst) {
                    return AverageResult {
                        index: task.index,
                        outcome: AverageOutcome::Interrupted,
                    };
                }
                let result = self.process(task);
                if let AverageOutcome::Failed(e) = &result.outcome {
                    error!("averaging batch {} failed: {e}", task.index);
                }
                progress.inc(1);
                result
            })
            .collect()
    }
}
