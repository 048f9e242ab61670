pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

use log::LevelFilter;
use std::{env, sync::OnceLock};

pub use error::{DashboardError, Result};

static LOGGER: OnceLock<()> = OnceLock::new();

pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("gdp_dashboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}
