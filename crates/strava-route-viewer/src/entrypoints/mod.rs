//! Native entry point plumbing: CLI parsing, logging setup, version info and
//! the eframe runner.

pub mod cli;
pub mod logging;
mod metadata;
pub mod run;

pub use cli::parse_args;
pub use logging::setup_logging;
pub use metadata::{log_version_info, short_version_info};
pub use run::native_main;
