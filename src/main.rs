use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use timelapse_maker::component::timelapse::backend::create_backend;
use timelapse_maker::component::timelapse::{
    TimelapsePipeline, input_dir_name, processed_dir_for,
};
use timelapse_maker::config::{BackendKind, Settings};
use timelapse_maker::init;
use timelapse_maker::signal::setup_shutdown_signal;
use timelapse_maker::tools::{EncodeCommand, encode_video};

/// Average timelapse stills into timestamped frames and compile a video.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory of source images named YYYY-MM-DD_HHMM*.jpg
    input_dir: PathBuf,

    /// Remove previously produced frames before running
    #[arg(long)]
    fresh: bool,

    /// Produce frames only, skip the ffmpeg video step
    #[arg(long)]
    skip_encode: bool,

    /// Settings file (defaults to ./settings.json when present)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Frames per second of the finished clip
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Desired clip length in seconds
    #[arg(long)]
    duration: Option<u32>,

    /// How many images to blend into each output frame
    #[arg(long)]
    window: Option<usize>,

    /// Delegate brightness/averaging to the image processor at this base URL
    #[arg(long)]
    remote: Option<String>,

    /// Audio track muxed under the video
    #[arg(long)]
    audio: Option<PathBuf>,
}

fn main() -> Result<()> {
    init::init();
    let args = Args::parse();

    let mut settings = Settings::load(args.settings.as_deref())?;
    if let Some(frame_rate) = args.frame_rate {
        settings.frame_rate = frame_rate;
    }
    if let Some(duration) = args.duration {
        settings.clip_duration_seconds = duration;
    }
    if let Some(window) = args.window {
        settings.window_size = window;
    }
    if let Some(url) = args.remote {
        settings.backend = BackendKind::Remote;
        settings.remote_url = url;
    }
    if args.audio.is_some() {
        settings.audio_track = args.audio;
    }

    let shutdown_signal = setup_shutdown_signal();
    let backend = create_backend(&settings)?;

    let pipeline = TimelapsePipeline::new(&settings, backend.as_ref(), shutdown_signal);
    let summary = pipeline.run(&args.input_dir, args.fresh)?;
    summary.print();

    if args.skip_encode {
        return Ok(());
    }

    let command = EncodeCommand::new(
        &processed_dir_for(&args.input_dir),
        &input_dir_name(&args.input_dir),
        settings.frame_rate,
        settings.audio_track.as_deref(),
    );
    println!(
        "{}",
        style(format!(
            "encoding {} ...",
            command.destination_path().display()
        ))
        .cyan()
    );
    encode_video(&command)?;
    println!(
        "{} {}",
        style("done:").green().bold(),
        command.destination_path().display()
    );

    Ok(())
}
