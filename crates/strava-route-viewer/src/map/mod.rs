//! Map rendering
//!
//! - **[`RenderSurface`]**: Contract of the stateful map engine
//! - **[`MapSynchronizer`]**: Keeps a surface in line with route, theme and lifecycle
//! - **[`WalkersSurface`]**: Production surface on top of walkers tiles

mod plugin;
mod surface;
mod synchronizer;
#[cfg(test)]
pub(crate) mod testing;
mod walkers_surface;

pub use plugin::RouteLayerPlugin;
pub use surface::{
    ControlPosition, FitBoundsOptions, LineCap, LineJoin, LineLayer, LineLayout, LinePaint,
    MapControl, RenderSurface, SurfaceError, SurfaceEvent, SurfaceFactory, SurfaceOptions,
    SurfaceResult,
};
pub use synchronizer::{
    CameraDefaults, FIT_MAX_ZOOM, FIT_PADDING, MapLifecyclePhase, MapSynchronizer, ROUTE_ID,
    RenderedRouteLayer,
};
pub use walkers_surface::{MapStyle, WalkersSurface, WalkersSurfaceFactory};
