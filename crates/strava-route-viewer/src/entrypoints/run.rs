//! eframe runner for desktop platforms

use super::log_version_info;

/// Error type eframe accepts from an app creator
pub type CreatorError = Box<dyn std::error::Error + Send + Sync>;

/// Open the main window and run `app_creator`'s app until it closes
///
/// Logging must already be set up. Must be awaited from inside a tokio runtime
/// so the app can spawn background work.
pub async fn native_main(
    app_name: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Result<Box<dyn eframe::App>, CreatorError>
    + 'static,
) -> eframe::Result<()> {
    log_version_info();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title(app_name),
        ..Default::default()
    };

    eframe::run_native(
        app_name,
        native_options,
        Box::new(move |cc| app_creator(cc)),
    )
}
