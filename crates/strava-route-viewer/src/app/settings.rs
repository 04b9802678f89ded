use crate::api::ApiConfig;
use crate::entrypoints::parse_args;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Strava Route Viewer - Search routes and see them on an interactive map
pub struct Settings {
    /// Base URL of the route service, every endpoint is resolved against it
    #[clap(
        long,
        env = "ROUTE_VIEWER_API_URL",
        default_value = "http://localhost:8000/api"
    )]
    pub api_base_url: String,

    /// Bearer token forwarded to the route service
    #[clap(long, env = "ROUTE_VIEWER_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Timeout for each request to the route service
    #[clap(long, value_name = "SECONDS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Access token for Mapbox map styles
    #[clap(long, env = "MAPBOX_TOKEN", hide_env_values = true)]
    pub map_access_token: Option<String>,

    /// Theme to start with (default, dark, outdoors, satellite)
    #[clap(short, long, default_value = "default")]
    pub theme: String,

    /// Search issued as soon as the window opens
    #[clap(short = 'q', long, value_name = "QUERY")]
    pub initial_query: Option<String>,
}

impl Settings {
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base_url.clone(),
            token: self.api_token.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let settings = Settings::parse_from([
            "strava-route-viewer",
            "--api-base-url",
            "https://routes.example.com/api",
            "--request-timeout-secs",
            "3",
            "--theme",
            "dark",
            "-q",
            "alpe",
        ]);

        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.initial_query.as_deref(), Some("alpe"));

        let config = settings.api_config();
        assert_eq!(config.base_url, "https://routes.example.com/api");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_timeout_must_be_a_number() {
        let result =
            Settings::try_parse_from(["strava-route-viewer", "--request-timeout-secs", "soon"]);
        assert!(result.is_err());
    }
}
