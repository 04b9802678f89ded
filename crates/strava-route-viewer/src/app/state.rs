//! Application state
//!
//! Everything the UI shows lives here: the search box and its results, the
//! selected route with its statistics, the active theme and panel toggles.
//! Transitions driven by remote responses are in [`super::selection`].

use crate::app::selection::{SearchTicket, SelectionTicket};
use crate::app::settings::Settings;
use crate::themes::{self, Theme};
use strava_route_lib::{RouteDetails, RouteId, RouteSelection, RouteStats, RouteSummary};

/// Main application state
pub struct AppState {
    pub search: SearchState,

    /// Route on the map, replaced once the details of a new selection arrive
    pub selected_route: Option<RouteDetails>,

    /// Statistics of the selected route, `None` when unavailable
    pub stats: Option<RouteStats>,

    pub loading_details: bool,
    pub loading_stats: bool,

    /// Message shown after a failed selection
    pub error: Option<String>,

    pub theme: &'static Theme,

    pub ui_settings: UiSettings,

    /// Selection whose responses are still awaited
    pub(crate) selection: Option<SelectionTicket>,
    pub(crate) selection_generation: u64,
}

/// Search box and results
#[derive(Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<RouteSummary>,
    pub loading: bool,
    pub error: Option<String>,
    /// Search whose response is still awaited
    pub(crate) current: Option<SearchTicket>,
    pub(crate) generation: u64,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    pub sidebar_open: bool,
    pub show_help: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            show_help: false,
        }
    }
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let theme = themes::get_theme(&settings.theme);
        if theme.name != settings.theme {
            tracing::warn!("Unknown theme {:?}, using {}", settings.theme, theme.name);
        }

        Self {
            search: SearchState {
                query: settings.initial_query.clone().unwrap_or_default(),
                ..Default::default()
            },
            selected_route: None,
            stats: None,
            loading_details: false,
            loading_stats: false,
            error: None,
            theme,
            ui_settings: UiSettings::default(),
            selection: None,
            selection_generation: 0,
        }
    }

    /// What the map should draw
    pub fn route_selection(&self) -> Option<RouteSelection> {
        self.selected_route.as_ref().map(RouteDetails::selection)
    }

    pub fn set_theme(&mut self, name: &str) {
        let theme = themes::get_theme(name);
        if theme.name != self.theme.name {
            tracing::info!("Switching theme to {}", theme.name);
            self.theme = theme;
        }
    }

    /// Id of the route being loaded, if any
    pub fn pending_route(&self) -> Option<RouteId> {
        self.selection.map(|ticket| ticket.route_id)
    }
}

/// One line of the stats panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub label: &'static str,
    pub value: String,
}

impl StatRow {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

/// Rows of the stats panel; optional values that are missing or zero are skipped
pub fn stat_rows(route: &RouteDetails, stats: Option<&RouteStats>) -> Vec<StatRow> {
    let mut rows = vec![
        StatRow::new("Distance", format_distance(route.summary.distance)),
        StatRow::new("Elevation Gain", format_elevation(route.summary.elevation_gain)),
    ];
    let Some(stats) = stats else {
        return rows;
    };

    let present = |value: Option<f64>| value.filter(|v| *v != 0.0);

    if let Some(seconds) = stats.moving_time.filter(|s| *s != 0) {
        rows.push(StatRow::new("Moving Time", format_duration(seconds)));
    }
    if let Some(speed) = present(stats.average_speed) {
        rows.push(StatRow::new("Avg Speed", format_speed(speed)));
    }
    if let Some(speed) = present(stats.max_speed) {
        rows.push(StatRow::new("Max Speed", format_speed(speed)));
    }
    if let Some(bpm) = present(stats.average_heartrate) {
        rows.push(StatRow::new("Avg Heart Rate", format_whole(bpm, "bpm")));
    }
    if let Some(watts) = present(stats.average_watts) {
        rows.push(StatRow::new("Avg Power", format_whole(watts, "W")));
    }
    if let Some(kj) = present(stats.kilojoules) {
        rows.push(StatRow::new("Energy", format_whole(kj, "kJ")));
    }
    rows
}

/// Meters as kilometers with two decimals
pub fn format_distance(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

pub fn format_elevation(meters: f64) -> String {
    format!("{:.0} m", meters)
}

/// `"1h 5m"`, or `"42m"` under an hour
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Meters per second as km/h with one decimal
pub fn format_speed(meters_per_second: f64) -> String {
    format!("{:.1} km/h", meters_per_second * 3.6)
}

fn format_whole(value: f64, unit: &str) -> String {
    format!("{:.0} {}", value, unit)
}

/// One-line description of a search result
pub fn format_summary(route: &RouteSummary) -> String {
    format!(
        "{} • {} elevation",
        format_distance(route.distance),
        format_elevation(route.elevation_gain)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use strava_route_lib::RouteMap;

    fn details(distance: f64, elevation_gain: f64) -> RouteDetails {
        RouteDetails {
            summary: RouteSummary {
                id: 1,
                name: "Hawk Hill".to_string(),
                distance,
                elevation_gain,
                map: RouteMap::default(),
                athlete: None,
            },
            description: None,
            route_type: None,
            sub_type: None,
            private: None,
            starred: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(12345.6), "12.35 km");
        assert_eq!(format_distance(0.0), "0.00 km");
    }

    #[test]
    fn test_format_elevation() {
        assert_eq!(format_elevation(321.2), "321 m");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3900), "1h 5m");
        assert_eq!(format_duration(2520), "42m");
        assert_eq!(format_duration(59), "0m");
        assert_eq!(format_duration(7200), "2h 0m");
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(7.0), "25.2 km/h");
    }

    #[test]
    fn test_format_summary() {
        let route = details(20_000.0, 410.0).summary;
        assert_eq!(format_summary(&route), "20.00 km • 410 m elevation");
    }

    #[test]
    fn test_stat_rows_without_stats() {
        let rows = stat_rows(&details(1000.0, 12.0), None);
        assert_eq!(
            rows,
            vec![
                StatRow::new("Distance", "1.00 km".to_string()),
                StatRow::new("Elevation Gain", "12 m".to_string()),
            ]
        );
    }

    #[test]
    fn test_stat_rows_hide_missing_and_zero_values() {
        let stats = RouteStats {
            distance: 1000.0,
            elevation_gain: 12.0,
            moving_time: Some(0),
            average_speed: Some(5.0),
            max_speed: None,
            average_heartrate: Some(0.0),
            average_watts: Some(201.2),
            kilojoules: Some(640.0),
            ..Default::default()
        };
        let rows = stat_rows(&details(1000.0, 12.0), Some(&stats));
        let labels: Vec<_> = rows.iter().map(|row| row.label).collect();

        assert_eq!(
            labels,
            ["Distance", "Elevation Gain", "Avg Speed", "Avg Power", "Energy"]
        );
        assert_eq!(rows[2].value, "18.0 km/h");
        assert_eq!(rows[3].value, "201 W");
        assert_eq!(rows[4].value, "640 kJ");
    }

    #[test]
    fn test_new_state_uses_settings() {
        let settings = Settings::parse_from(["viewer", "--theme", "outdoors", "-q", "climb"]);
        let state = AppState::new(&settings);

        assert_eq!(state.theme.name, "outdoors");
        assert_eq!(state.search.query, "climb");
        assert!(state.route_selection().is_none());
    }

    #[test]
    fn test_unknown_theme_setting_falls_back() {
        let settings = Settings::parse_from(["viewer", "--theme", "neon"]);
        assert_eq!(AppState::new(&settings).theme.name, "default");
    }

    #[test]
    fn test_route_selection_carries_geometry() {
        let mut route = details(1.0, 1.0);
        route.summary.map.summary_polyline = Some("_p~iF~ps|U".to_string());

        let settings = Settings::parse_from(["viewer"]);
        let mut state = AppState::new(&settings);
        state.selected_route = Some(route);

        let selection = state.route_selection().unwrap();
        assert_eq!(selection.id, 1);
        assert_eq!(selection.geometry(), Some("_p~iF~ps|U"));
    }
}
