//! Route records exchanged with the retrieval API
//!
//! Field names follow the REST payloads (`distance`, `elevation_gain`,
//! `map.summary_polyline`, ...). Unknown fields are ignored when deserializing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Remote identifier of a route
pub type RouteId = u64;

/// Encoded geometry attached to a route
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteMap {
    /// Low-resolution geometry, always present on search results
    #[cfg_attr(feature = "serde", serde(default))]
    pub summary_polyline: Option<String>,
    /// Full-resolution geometry, usually only present on detail responses
    #[cfg_attr(feature = "serde", serde(default))]
    pub polyline: Option<String>,
}

impl RouteMap {
    /// Preferred geometry: the full-resolution polyline, else the summary one
    ///
    /// Empty strings count as absent.
    pub fn best_polyline(&self) -> Option<&str> {
        self.polyline
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| self.summary_polyline.as_deref().filter(|p| !p.is_empty()))
    }
}

/// Owner of a route
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Athlete {
    pub id: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub firstname: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub lastname: Option<String>,
}

/// Route as returned by a search
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteSummary {
    pub id: RouteId,
    pub name: String,
    /// Length in meters
    pub distance: f64,
    /// Total climb in meters
    pub elevation_gain: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub map: RouteMap,
    #[cfg_attr(feature = "serde", serde(default))]
    pub athlete: Option<Athlete>,
}

/// Route as returned by the detail endpoint
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteDetails {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub summary: RouteSummary,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, rename = "type"))]
    pub route_type: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sub_type: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub private: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub starred: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<i64>,
}

impl RouteDetails {
    #[inline]
    pub fn id(&self) -> RouteId {
        self.summary.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.summary.name
    }

    /// What the map needs in order to draw this route
    pub fn selection(&self) -> RouteSelection {
        RouteSelection {
            id: self.summary.id,
            summary_polyline: self.summary.map.summary_polyline.clone(),
            polyline: self.summary.map.polyline.clone(),
        }
    }
}

/// Activity statistics for a route
///
/// Only distance and elevation gain are guaranteed; everything else depends on
/// what was recorded.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteStats {
    /// Meters
    pub distance: f64,
    /// Meters
    pub elevation_gain: f64,
    /// Seconds
    #[cfg_attr(feature = "serde", serde(default))]
    pub moving_time: Option<u64>,
    /// Seconds
    #[cfg_attr(feature = "serde", serde(default))]
    pub elapsed_time: Option<u64>,
    /// Meters per second
    #[cfg_attr(feature = "serde", serde(default))]
    pub average_speed: Option<f64>,
    /// Meters per second
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_speed: Option<f64>,
    /// Beats per minute
    #[cfg_attr(feature = "serde", serde(default))]
    pub average_heartrate: Option<f64>,
    /// Beats per minute
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_heartrate: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub average_watts: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kilojoules: Option<f64>,
}

/// Identity and geometry of the route currently on display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteSelection {
    pub id: RouteId,
    pub summary_polyline: Option<String>,
    /// High-resolution override, preferred when present
    pub polyline: Option<String>,
}

impl RouteSelection {
    /// Geometry to draw, or `None` when the route carries no usable polyline
    pub fn geometry(&self) -> Option<&str> {
        self.polyline
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| self.summary_polyline.as_deref().filter(|p| !p.is_empty()))
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    fn selection(summary: Option<&str>, full: Option<&str>) -> RouteSelection {
        RouteSelection {
            id: 1,
            summary_polyline: summary.map(str::to_string),
            polyline: full.map(str::to_string),
        }
    }

    #[test]
    fn test_geometry_prefers_high_resolution() {
        assert_eq!(selection(Some("a"), Some("b")).geometry(), Some("b"));
        assert_eq!(selection(Some("a"), None).geometry(), Some("a"));
        assert_eq!(selection(Some("a"), Some("")).geometry(), Some("a"));
        assert_eq!(selection(None, None).geometry(), None);
        assert_eq!(selection(Some(""), None).geometry(), None);
    }

    #[test]
    fn test_summary_deserializes_without_optional_fields() {
        let json = r#"{"id": 42, "name": "Loop", "distance": 12345.6, "elevation_gain": 321.0,
                       "map": {"summary_polyline": "_p~iF~ps|U"}, "unknown": true}"#;
        let route: RouteSummary = serde_json::from_str(json).unwrap();

        assert_eq!(route.id, 42);
        assert_eq!(route.map.best_polyline(), Some("_p~iF~ps|U"));
        assert!(route.athlete.is_none());
    }

    #[test]
    fn test_details_flatten_summary_fields() {
        let json = r#"{"id": 7, "name": "Climb", "distance": 1000.0, "elevation_gain": 50.0,
                       "map": {"summary_polyline": "abc", "polyline": "def"},
                       "athlete": {"id": 3, "firstname": "Ana"},
                       "description": "Steep", "type": 1, "starred": true}"#;
        let details: RouteDetails = serde_json::from_str(json).unwrap();

        assert_eq!(details.id(), 7);
        assert_eq!(details.name(), "Climb");
        assert_eq!(details.description.as_deref(), Some("Steep"));
        assert_eq!(details.route_type, Some(1));
        assert_eq!(details.starred, Some(true));
        assert_eq!(details.summary.athlete.as_ref().map(|a| a.id), Some(3));

        let selection = details.selection();
        assert_eq!(selection.id, 7);
        assert_eq!(selection.geometry(), Some("def"));
    }

    #[test]
    fn test_stats_optional_fields() {
        let json = r#"{"distance": 5000.0, "elevation_gain": 10.0, "moving_time": 1500,
                       "average_speed": 3.3}"#;
        let stats: RouteStats = serde_json::from_str(json).unwrap();

        assert_eq!(stats.moving_time, Some(1500));
        assert_eq!(stats.average_speed, Some(3.3));
        assert!(stats.kilojoules.is_none());
    }
}
