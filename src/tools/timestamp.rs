use chrono::NaiveDateTime;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Capture timestamps are encoded as a filename prefix, e.g.
/// `2024-01-01_0730_cam2.jpg`.
const CAPTURE_FORMAT: &str = "%Y-%m-%d_%H%M";

static CAPTURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{4}").expect("valid capture pattern"));

static OUTPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{4}\.png$").expect("valid output pattern"));

/// Parses the capture timestamp encoded in a source file name.
/// Returns `None` when the name does not start with the expected pattern
/// or the digits do not form a real date/time.
#[must_use]
pub fn parse_capture_time(file_name: &str) -> Option<NaiveDateTime> {
    let token = CAPTURE_RE.find(file_name)?;
    NaiveDateTime::parse_from_str(token.as_str(), CAPTURE_FORMAT).ok()
}

/// Deterministic output file name for an averaged frame. Repeated runs over
/// the same batch resolve to the same name, which is what makes the
/// already-processed skip possible.
#[must_use]
pub fn output_file_name(captured: &NaiveDateTime) -> String {
    format!("{}.png", captured.format(CAPTURE_FORMAT))
}

/// Human-readable form rendered onto the averaged frame.
#[must_use]
pub fn display_label(captured: &NaiveDateTime) -> String {
    captured.format("%Y-%m-%d %H:%M").to_string()
}

/// Expected output name for a source image, if its name carries a timestamp.
#[must_use]
pub fn derived_output_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    parse_capture_time(name).map(|captured| output_file_name(&captured))
}

/// Whether `name` matches the averaged-frame naming scheme. The fresh-run
/// purge removes only such files, never arbitrary directory content.
#[must_use]
pub fn is_output_file_name(name: &str) -> bool {
    OUTPUT_RE.is_match(name)
}
