use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Builds the ffmpeg invocation that concatenates the averaged frames into
/// the final MP4. The codec settings target broad playback compatibility
/// (x264 baseline + aac, faststart for streaming).
pub struct EncodeCommand {
    frame_glob: String,
    frame_rate: u32,
    audio_track: Option<PathBuf>,
    destination_path: PathBuf,
}

impl EncodeCommand {
    #[must_use]
    pub fn new(
        processed_dir: &Path,
        input_dir_name: &str,
        frame_rate: u32,
        audio_track: Option<&Path>,
    ) -> Self {
        Self {
            frame_glob: format!("{}/*.png", processed_dir.display()),
            frame_rate,
            audio_track: audio_track.map(Path::to_path_buf),
            destination_path: PathBuf::from(format!("timelapse_{input_dir_name}.mp4")),
        }
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    /// Arguments are passed as a vector, never joined into a shell string,
    /// so frame and audio paths cannot inject options.
    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");

        cmd.args([
            "-hide_banner",
            "-nostdin",
            "-loglevel", "error",
            "-y",
            "-r", &self.frame_rate.to_string(),
            "-f", "image2",
            "-pattern_type", "glob",
            "-i", &self.frame_glob,
        ]);

        if let Some(audio) = &self.audio_track {
            cmd.arg("-i");
            cmd.arg(audio);
        }

        cmd.args([
            "-c:v", "libx264",
            "-pix_fmt", "yuv420p",
            "-profile:v", "baseline",
            "-level", "3.0",
            "-crf", "22",
            "-preset", "veryslow",
        ]);

        if self.audio_track.is_some() {
            // Cut to the shorter of the two streams.
            cmd.args(["-c:a", "aac", "-shortest"]);
        }

        cmd.args(["-movflags", "+faststart"]);
        cmd.arg(&self.destination_path);

        cmd
    }
}

/// Runs the encoder and surfaces a non-zero exit as a pipeline-fatal error
/// with the captured stderr.
pub fn encode_video(command: &EncodeCommand) -> Result<()> {
    let mut cmd = command.build_command();
    debug!("running {cmd:?}");

    let output = cmd
        .output()
        .with_context(|| "failed to launch ffmpeg, is it installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffmpeg exited with {}: {}", output.status, stderr.trim());
    }

    info!("video written: {}", command.destination_path().display());
    Ok(())
}
