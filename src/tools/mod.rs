mod ffmpeg_command;
mod image_scanner;
mod path_validator;
mod timestamp;

pub use ffmpeg_command::{EncodeCommand, encode_video};
pub use image_scanner::scan_source_images;
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use timestamp::{
    derived_output_name, display_label, is_output_file_name, output_file_name, parse_capture_time,
};
