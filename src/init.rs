use env_logger::Env;

/// Initializes logging from `RUST_LOG`, defaulting to `info`.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
