pub mod load;
pub mod types;

pub use types::{BackendKind, Settings};
