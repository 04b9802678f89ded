//! Strava Route Viewer - Application Library
//!
//! Desktop client that searches routes on a route service and draws the
//! selected one on an interactive map.

pub mod api;
mod app;
pub mod entrypoints;
pub mod map;
pub mod themes;

pub use app::{RouteViewerApp, Settings};

pub const APP_NAME: &str = "Strava Route Viewer";

/// Parse the command line, start the async runtime and run the window until it closes
pub fn run_native() -> Result<(), Box<dyn std::error::Error>> {
    entrypoints::setup_logging();
    let settings = Settings::from_cli();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let handle = rt.handle().clone();

    rt.block_on(entrypoints::native_main(APP_NAME, move |cc| {
        let app = RouteViewerApp::new(cc, settings, handle)?;
        Ok(Box::new(app) as Box<dyn eframe::App>)
    }))?;
    Ok(())
}
