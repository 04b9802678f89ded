//! Strava Route Library - Geometry and Route Records
//!
//! This library holds the data layer of the route viewer: decoding of Google's
//! encoded-polyline format into geographic paths, the route records exchanged with
//! the retrieval API, and the small amount of Web Mercator math needed to frame a
//! path on a slippy map.
//!
//! # Architecture
//!
//! - **[`polyline`]**: Encoded-polyline decoder (and the matching encoder)
//! - **[`RouteSummary`] / [`RouteDetails`] / [`RouteStats`]**: Wire records
//! - **[`RouteSelection`]**: What the map should draw for the selected route
//! - **[`utils`]**: Bounding boxes, Mercator conversions, camera fit math
//!
//! # Coordinate Order
//!
//! Decoded paths are [`geo::LineString`]s whose coordinates are `x = longitude`,
//! `y = latitude`, matching what map renderers expect.

pub mod polyline;
mod route;
pub mod utils;

// Public API exports
pub use polyline::{DecodedPath, decode, encode};
pub use route::{Athlete, RouteDetails, RouteId, RouteMap, RouteSelection, RouteStats, RouteSummary};

/// Error produced when an encoded polyline is malformed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Encoded polyline ends inside a value at byte {position}")]
    Truncated { position: usize },

    #[error("Invalid character {character:?} at byte {position}")]
    InvalidCharacter { position: usize, character: char },

    #[error("Value starting at byte {position} is too long")]
    Overflow { position: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
