pub mod timelapse;
