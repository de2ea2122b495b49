use super::annotator::Annotator;
use super::backend::AveragingBackend;
use super::batcher::batch;
use super::frame_averager::{AverageOutcome, FrameAverager, create_average_tasks};
use super::selector::{select, step_size};
use super::validity_filter::ValidityFilter;
use crate::config::Settings;
use crate::error::{RejectReason, ValidationOutcome};
use crate::tools::{
    ensure_directory_exists, is_output_file_name, scan_source_images, validate_directory_exists,
};
use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Counts reported at the end of a run.
#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub scanned: usize,
    pub accepted: usize,
    pub rejected_empty: usize,
    pub rejected_dark: usize,
    pub rejected_decode: usize,
    pub interrupted: usize,
    pub selected: usize,
    pub batches: usize,
    pub averaged: usize,
    pub already_processed: usize,
    pub failed: usize,
}

impl PipelineSummary {
    pub fn print(&self) {
        println!();
        println!("{}", style("=== timelapse summary ===").cyan().bold());
        println!("  scanned:           {}", self.scanned);
        println!("  accepted:          {}", style(self.accepted).green());
        if self.rejected_empty > 0 {
            println!("  empty files:       {}", style(self.rejected_empty).yellow());
        }
        if self.rejected_dark > 0 {
            println!("  too dark:          {}", style(self.rejected_dark).yellow());
        }
        if self.rejected_decode > 0 {
            println!("  decode errors:     {}", style(self.rejected_decode).yellow());
        }
        if self.interrupted > 0 {
            println!("  interrupted:       {}", style(self.interrupted).yellow());
        }
        println!("  selected:          {}", self.selected);
        println!("  batches:           {}", self.batches);
        println!("  frames written:    {}", style(self.averaged).green());
        if self.already_processed > 0 {
            println!("  already processed: {}", style(self.already_processed).yellow());
        }
        if self.failed > 0 {
            println!("  failed batches:    {}", style(self.failed).red());
        }

        info!(
            "run finished - accepted: {}, averaged: {}, skipped: {}, failed: {}",
            self.accepted, self.averaged, self.already_processed, self.failed
        );
    }
}

/// Drives Scan -> Filter -> Select -> Batch -> Average. The video encode is
/// a separate step (`tools::encode_video`) so the frame stages stay testable
/// without ffmpeg installed.
///
/// Per-file and per-batch problems are tallied, never fatal; only setup
/// failures (missing input directory, uncreatable output directory) abort
/// the run.
pub struct TimelapsePipeline<'a> {
    settings: &'a Settings,
    backend: &'a dyn AveragingBackend,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> TimelapsePipeline<'a> {
    #[must_use]
    pub const fn new(
        settings: &'a Settings,
        backend: &'a dyn AveragingBackend,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            settings,
            backend,
            shutdown_signal,
        }
    }

    pub fn run(&self, input_dir: &Path, fresh_run: bool) -> Result<PipelineSummary> {
        validate_directory_exists(input_dir)?;
        let processed_dir = processed_dir_for(input_dir);
        ensure_directory_exists(&processed_dir)
            .with_context(|| format!("cannot create {}", processed_dir.display()))?;
        if fresh_run {
            purge_stale_frames(&processed_dir)?;
        }

        let annotator = Annotator::new(self.settings.font_scale)?;

        let candidates = scan_source_images(input_dir, &self.settings.source_extension)?;
        println!(
            "{}",
            style(format!(
                "found {} candidate images in {}",
                candidates.len(),
                input_dir.display()
            ))
            .dim()
        );

        let mut summary = PipelineSummary {
            scanned: candidates.len(),
            ..PipelineSummary::default()
        };

        // Filter phase: one pool task per candidate file.
        let filter = ValidityFilter::new(self.backend, self.settings.brightness_threshold);
        let progress = ProgressBar::new(candidates.len() as u64);
        let outcomes = filter.check_all(&candidates, &self.shutdown_signal, &progress);
        progress.finish_and_clear();

        let mut accepted = Vec::new();
        for outcome in outcomes {
            match outcome {
                ValidationOutcome::Accepted(path) => accepted.push(path),
                ValidationOutcome::Rejected { path, reason } => {
                    match reason {
                        RejectReason::EmptyFile => summary.rejected_empty += 1,
                        RejectReason::TooDark => summary.rejected_dark += 1,
                        RejectReason::DecodeError(_) => summary.rejected_decode += 1,
                        RejectReason::Interrupted => summary.interrupted += 1,
                    }
                    if !matches!(reason, RejectReason::TooDark) {
                        warn!("rejected {}: {reason}", path.display());
                    }
                }
            }
        }
        // Pool completion order is arbitrary; frame order must not be.
        accepted.sort();
        summary.accepted = accepted.len();

        let target = self.settings.target_frame_count();
        let selection = select(&accepted, target);
        summary.selected = selection.len();
        info!(
            "accepted {} of {} images, step {} towards {} target frames, {} selected",
            summary.accepted,
            summary.scanned,
            step_size(accepted.len(), target),
            target,
            summary.selected
        );

        let batches = batch(&selection, self.settings.window_size);
        summary.batches = batches.len();
        let tasks = create_average_tasks(batches);

        // Average phase: one pool task per batch.
        let averager = FrameAverager::new(self.backend, &annotator, &processed_dir);
        let progress = ProgressBar::new(tasks.len() as u64);
        let results = averager.process_all(&tasks, &self.shutdown_signal, &progress);
        progress.finish_and_clear();

        for result in &results {
            match &result.outcome {
                AverageOutcome::Written(_) => summary.averaged += 1,
                AverageOutcome::AlreadyProcessed(_) => summary.already_processed += 1,
                AverageOutcome::Failed(_) => summary.failed += 1,
                AverageOutcome::Interrupted => summary.interrupted += 1,
            }
        }

        Ok(summary)
    }
}

/// Output directory `processed_<name>`, placed next to the input directory.
#[must_use]
pub fn processed_dir_for(input_dir: &Path) -> PathBuf {
    let name = input_dir_name(input_dir);
    input_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("processed_{name}"))
}

#[must_use]
pub fn input_dir_name(input_dir: &Path) -> String {
    input_dir
        .file_name()
        .map_or_else(|| "output".to_string(), |n| n.to_string_lossy().to_string())
}

/// Removes previously produced frames. Only files matching the derived
/// output naming scheme are touched, never arbitrary directory content.
fn purge_stale_frames(processed_dir: &Path) -> Result<()> {
    let mut removed = 0usize;
    for entry in fs::read_dir(processed_dir)
        .with_context(|| format!("cannot read {}", processed_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if is_output_file_name(name) {
            fs::remove_file(entry.path())
                .with_context(|| format!("cannot remove {}", entry.path().display()))?;
            removed += 1;
        }
    }
    if removed > 0 {
        info!("fresh run: purged {removed} stale frames");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_processed_dir_is_a_sibling() {
        let processed = processed_dir_for(Path::new("/data/img_cam2"));
        assert_eq!(processed, PathBuf::from("/data/processed_img_cam2"));
    }

    #[test]
    fn test_input_dir_name() {
        assert_eq!(input_dir_name(Path::new("/data/img")), "img");
        assert_eq!(input_dir_name(Path::new("img")), "img");
    }

    #[test]
    fn test_purge_only_touches_derived_frames() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("2024-01-01_0000.png"), b"frame").unwrap();
        fs::write(temp_dir.path().join("2024-01-01_0010.png"), b"frame").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"keep me").unwrap();
        fs::write(temp_dir.path().join("holiday.png"), b"keep me").unwrap();

        purge_stale_frames(temp_dir.path()).unwrap();

        assert!(!temp_dir.path().join("2024-01-01_0000.png").exists());
        assert!(!temp_dir.path().join("2024-01-01_0010.png").exists());
        assert!(temp_dir.path().join("notes.txt").exists());
        assert!(temp_dir.path().join("holiday.png").exists());
    }
}
