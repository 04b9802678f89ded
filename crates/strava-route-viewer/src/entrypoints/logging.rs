//! Logging initialization
//!
//! `RUST_LOG` wins when set. Otherwise debug builds log our crates at `debug`
//! and keep the noisy rendering and networking stacks quiet.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEBUG_FILTER: &str = "debug,eframe::native=warn,egui::context=warn,hyper=info,hyper_util=info,reqwest::connect=info,walkers=info,wgpu_core=warn,wgpu_hal=warn,naga=warn";
const RELEASE_FILTER: &str = "info,eframe=warn,wgpu_core=warn,wgpu_hal=warn";

fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        DEBUG_FILTER
    } else {
        RELEASE_FILTER
    }
}

/// Install the global fmt subscriber; later calls are ignored
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));
    let fmt_layer = fmt::layer().with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        tracing::debug!("Logging already initialized");
        return;
    }
    tracing::info!("Logging initialized");
}
