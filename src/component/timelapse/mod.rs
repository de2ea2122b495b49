pub mod backend;

mod annotator;
mod batcher;
mod frame_averager;
mod main;
mod selector;
mod validity_filter;

pub use annotator::Annotator;
pub use batcher::batch;
pub use frame_averager::{
    AverageOutcome, AverageResult, AverageTask, FrameAverager, create_average_tasks,
};
pub use main::{PipelineSummary, TimelapsePipeline, input_dir_name, processed_dir_for};
pub use selector::{select, step_size};
pub use validity_filter::ValidityFilter;
