//! Utility functions for coordinate conversions and camera framing

use geo::{BoundingRect, Coord, LineString, Point, Rect};

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;
pub const EARTH_MERCATOR_MIN: f64 = -20037508.34;
pub const EARTH_SIZE_METERS: f64 = EARTH_MERCATOR_MAX - EARTH_MERCATOR_MIN;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Precomputed constant: EARTH_MERCATOR_MAX / 180.0
const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / PI
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Precomputed constant: 180.0 / EARTH_MERCATOR_MAX
const X_TO_LON_FACTOR: f64 = 180.0 / EARTH_MERCATOR_MAX;

/// Precomputed constant: PI / EARTH_MERCATOR_MAX
const Y_TO_LAT_FACTOR: f64 = std::f64::consts::PI / EARTH_MERCATOR_MAX;

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// # Arguments
/// * `lat` - Latitude in degrees (-85.05 to 85.05)
/// * `lon` - Longitude in degrees (-180 to 180)
///
/// # Returns
/// A `Point<f64>` with x (easting) and y (northing) in meters
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    // Clamp latitude to valid Web Mercator range
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * LON_TO_X_FACTOR;
    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;

    Point::new(x, y)
}

/// Convert Web Mercator (x, y) in meters to WGS84 (lat, lon)
#[inline(always)]
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = x * X_TO_LON_FACTOR;
    let lat =
        (std::f64::consts::PI / 2.0 - 2.0 * ((-y * Y_TO_LAT_FACTOR).exp()).atan()).to_degrees();
    (lat, lon)
}

/// Bounding box of a path in degrees (`x` = longitude, `y` = latitude)
///
/// Returns `None` for an empty path.
#[inline]
pub fn path_bounds(path: &LineString<f64>) -> Option<Rect<f64>> {
    path.bounding_rect()
}

/// Camera placement that frames a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    /// Center in degrees (`x` = longitude, `y` = latitude)
    pub center: Coord<f64>,
    pub zoom: f64,
}

/// Compute the center and zoom that fit `bounds` into a viewport
///
/// # Arguments
/// * `bounds` - Box to frame, in degrees
/// * `viewport` - Viewport size in pixels `(width, height)`
/// * `padding` - Margin in pixels kept free on every side
/// * `max_zoom` - Zoom ceiling, so very short routes are not over-zoomed
/// * `tile_size` - Tile edge in pixels (256 for standard raster tiles)
///
/// Degenerate boxes (a single point) get `max_zoom`.
pub fn fit_camera(
    bounds: Rect<f64>,
    viewport: (f64, f64),
    padding: f64,
    max_zoom: f64,
    tile_size: f64,
) -> CameraFit {
    let min = wgs84_to_mercator(bounds.min().y, bounds.min().x);
    let max = wgs84_to_mercator(bounds.max().y, bounds.max().x);

    let center_x = (min.x() + max.x()) / 2.0;
    let center_y = (min.y() + max.y()) / 2.0;
    let (center_lat, center_lon) = mercator_to_wgs84(center_x, center_y);

    let width_m = (max.x() - min.x()).abs();
    let height_m = (max.y() - min.y()).abs();

    // Never let the padding eat the whole viewport
    let usable_w = (viewport.0 - 2.0 * padding).max(1.0);
    let usable_h = (viewport.1 - 2.0 * padding).max(1.0);

    let mut zoom = max_zoom;
    if width_m > 0.0 {
        zoom = zoom.min((usable_w * EARTH_SIZE_METERS / (tile_size * width_m)).log2());
    }
    if height_m > 0.0 {
        zoom = zoom.min((usable_h * EARTH_SIZE_METERS / (tile_size * height_m)).log2());
    }

    CameraFit {
        center: Coord {
            x: center_lon,
            y: center_lat,
        },
        zoom: zoom.clamp(0.0, max_zoom.max(0.0)),
    }
}
