#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use std::process::ExitCode;

fn main() -> ExitCode {
    match strava_route_viewer::run_native() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Fatal: {}", err);
            eprintln!("{}: {}", strava_route_viewer::APP_NAME, err);
            ExitCode::FAILURE
        }
    }
}
