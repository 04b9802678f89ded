pub fn short_version_info() -> String {
    format!(
        "{} {} ({} build, {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        std::env::consts::OS,
    )
}

pub fn log_version_info() {
    tracing::info!("{}", short_version_info());
}
