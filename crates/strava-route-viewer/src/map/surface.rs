//! Render surface contract
//!
//! A render surface is the stateful map engine: tiles, camera and vector layers.
//! [`MapSynchronizer`](super::MapSynchronizer) is the only owner of a surface and
//! drives it exclusively through this trait, which keeps the synchronizer testable
//! against a fake engine.

use egui::Color32;
use geo::{Coord, LineString, Rect};
use thiserror::Error;

/// Errors reported by a render surface when a mutation is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Unknown map style: {0}")]
    UnknownStyle(String),

    #[error("Map style {0} requires an access token")]
    MissingAccessToken(String),

    #[error("Source {0} already exists")]
    DuplicateSource(String),

    #[error("Layer {0} already exists")]
    DuplicateLayer(String),

    #[error("No source with id {0}")]
    MissingSource(String),

    #[error("No layer with id {0}")]
    MissingLayer(String),

    #[error("Source {source_id} is still used by layer {layer_id}")]
    SourceInUse { source_id: String, layer_id: String },

    #[error("Invalid geometry for source {0}")]
    InvalidGeometry(String),

    #[error("Surface has been released")]
    Released,
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Lifecycle notifications emitted by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The surface finished its initial load
    Load,
    /// A style requested through [`RenderSurface::set_style`] finished loading
    StyleLoaded,
}

/// Built-in UI controls a surface can host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapControl {
    /// Zoom in / zoom out / reset buttons
    Navigation,
}

/// Where a control is anchored on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
}

/// Paint properties of a line layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePaint {
    pub color: Color32,
    /// Pixels
    pub width: f32,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f32,
}

/// Layout properties of a line layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineLayout {
    pub join: LineJoin,
    pub cap: LineCap,
}

/// Line layer drawing the geometry of one source
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    pub id: String,
    pub source: String,
    pub paint: LinePaint,
    pub layout: LineLayout,
}

/// Options for [`RenderSurface::fit_bounds`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBoundsOptions {
    /// Pixels kept free around the box
    pub padding: f32,
    /// Zoom ceiling
    pub max_zoom: f64,
}

/// Parameters for constructing a surface
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    pub style: String,
    /// Initial camera center (`x` = longitude, `y` = latitude)
    pub center: Coord<f64>,
    pub zoom: f64,
    /// Token for styles served by an authenticated tile provider
    pub access_token: Option<String>,
}

/// Imperative map engine driven by the synchronizer
pub trait RenderSurface {
    /// Replace the whole style. All sources and layers are discarded; the surface
    /// emits [`SurfaceEvent::StyleLoaded`] once the new style is usable.
    fn set_style(&mut self, style: &str) -> SurfaceResult<()>;

    fn add_control(&mut self, control: MapControl, position: ControlPosition);

    fn has_layer(&self, id: &str) -> bool;

    fn has_source(&self, id: &str) -> bool;

    fn remove_layer(&mut self, id: &str) -> SurfaceResult<()>;

    /// Fails with [`SurfaceError::SourceInUse`] while a layer still references it
    fn remove_source(&mut self, id: &str) -> SurfaceResult<()>;

    fn add_source(&mut self, id: &str, geometry: LineString<f64>) -> SurfaceResult<()>;

    /// Fails with [`SurfaceError::MissingSource`] if the referenced source is absent
    fn add_layer(&mut self, layer: LineLayer) -> SurfaceResult<()>;

    /// Move the camera so that `bounds` (degrees) is visible
    fn fit_bounds(&mut self, bounds: Rect<f64>, options: FitBoundsOptions);

    /// Whether the initial load has completed
    fn is_loaded(&self) -> bool;

    /// Next pending lifecycle event, if any
    fn poll_event(&mut self) -> Option<SurfaceEvent>;

    /// Free engine resources. Called exactly once by the owner.
    fn release(&mut self);
}

/// Builds surfaces for [`MapSynchronizer::mount`](super::MapSynchronizer::mount)
pub trait SurfaceFactory {
    type Surface: RenderSurface;

    fn construct(&mut self, options: &SurfaceOptions) -> SurfaceResult<Self::Surface>;
}
