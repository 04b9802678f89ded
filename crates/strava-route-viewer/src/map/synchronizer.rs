//! Map synchronizer
//!
//! Keeps an imperative [`RenderSurface`] consistent with the latest application
//! state: the selected route, the active theme and the surface's own lifecycle.
//!
//! Requests that arrive before the surface can accept them (while it is still
//! loading or swapping styles) are folded into a single pending intent. Only the
//! most recent request survives, and it is applied once the surface is ready.

use super::surface::{
    ControlPosition, FitBoundsOptions, LineLayer, LineLayout, LinePaint, MapControl,
    RenderSurface, SurfaceEvent, SurfaceFactory, SurfaceOptions, SurfaceResult,
};
use crate::themes::ThemeMapConfig;
use geo::Coord;
use strava_route_lib::{DecodedPath, RouteId, RouteSelection, polyline, utils};

/// Id shared by the route source and the route layer
pub const ROUTE_ID: &str = "route";

/// Margin kept around the route when framing it
pub const FIT_PADDING: f32 = 50.0;

/// Zoom ceiling when framing a route, so short routes are not over-zoomed
pub const FIT_MAX_ZOOM: f64 = 15.0;

/// Lifecycle of the render surface, as seen by the synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLifecyclePhase {
    /// No surface has been constructed yet
    Uninitialized,
    /// Surface constructed, waiting for its load event
    Initializing,
    /// Sources and layers can be mutated
    Ready,
    /// A new style is loading; sources and layers are gone until it finishes
    StyleTransitioning,
    /// Surface released; terminal
    Destroyed,
}

/// Camera used before any route has been framed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDefaults {
    /// `x` = longitude, `y` = latitude
    pub center: Coord<f64>,
    pub zoom: f64,
}

impl Default for CameraDefaults {
    fn default() -> Self {
        // San Francisco
        Self {
            center: Coord { x: -122.4, y: 37.8 },
            zoom: 12.0,
        }
    }
}

/// Request to bring the route layer in line with the given selection
#[derive(Debug, Clone, PartialEq)]
struct ApplyIntent {
    route: Option<RouteSelection>,
}

/// What the surface currently shows under [`ROUTE_ID`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRouteLayer {
    pub route_id: RouteId,
    /// Encoded geometry the path was decoded from
    pub geometry: String,
    pub path: DecodedPath,
    pub paint: LinePaint,
}

/// Owner of the render surface; see the module docs
pub struct MapSynchronizer<S: RenderSurface> {
    surface: Option<S>,
    phase: MapLifecyclePhase,
    theme: ThemeMapConfig,
    /// Latest requested selection
    route: Option<RouteSelection>,
    /// Latest request not yet applied (overwritten, never queued)
    pending: Option<ApplyIntent>,
    rendered: Option<RenderedRouteLayer>,
    /// Style the surface was last told to use
    surface_style: Option<&'static str>,
    /// `set_style` calls whose `StyleLoaded` event has not arrived yet
    styles_in_flight: usize,
    camera: CameraDefaults,
    access_token: Option<String>,
}

impl<S: RenderSurface> MapSynchronizer<S> {
    pub fn new(theme: ThemeMapConfig, camera: CameraDefaults, access_token: Option<String>) -> Self {
        Self {
            surface: None,
            phase: MapLifecyclePhase::Uninitialized,
            theme,
            route: None,
            pending: None,
            rendered: None,
            surface_style: None,
            styles_in_flight: 0,
            camera,
            access_token,
        }
    }

    #[inline]
    pub fn phase(&self) -> MapLifecyclePhase {
        self.phase
    }

    #[inline]
    pub fn theme(&self) -> &ThemeMapConfig {
        &self.theme
    }

    #[inline]
    pub fn rendered(&self) -> Option<&RenderedRouteLayer> {
        self.rendered.as_ref()
    }

    #[inline]
    pub fn has_pending_intent(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub(crate) fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    #[cfg(test)]
    pub(crate) fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Construct the surface with the current theme's style and the default camera
    ///
    /// Only valid from [`MapLifecyclePhase::Uninitialized`]; later calls are ignored.
    /// On failure the synchronizer stays uninitialized and can be mounted again.
    pub fn mount<F>(&mut self, factory: &mut F) -> SurfaceResult<()>
    where
        F: SurfaceFactory<Surface = S>,
    {
        if self.phase != MapLifecyclePhase::Uninitialized {
            tracing::warn!("Ignoring mount in phase {:?}", self.phase);
            return Ok(());
        }

        let options = SurfaceOptions {
            style: self.theme.style.to_string(),
            center: self.camera.center,
            zoom: self.camera.zoom,
            access_token: self.access_token.clone(),
        };
        let mut surface = factory.construct(&options)?;
        surface.add_control(MapControl::Navigation, ControlPosition::TopRight);

        let loaded = surface.is_loaded();
        self.surface = Some(surface);
        self.surface_style = Some(self.theme.style);
        self.phase = MapLifecyclePhase::Initializing;
        tracing::info!("Map surface constructed with style {}", self.theme.style);

        if loaded {
            self.on_load();
        }
        Ok(())
    }

    /// Show `route` (or nothing) as soon as the surface allows it
    pub fn set_route(&mut self, route: Option<RouteSelection>) {
        if self.phase == MapLifecyclePhase::Destroyed {
            tracing::trace!("Ignoring route request on a destroyed map");
            return;
        }
        self.route = route;
        self.request_apply();
    }

    /// Switch to a new theme, swapping the surface style when it is ready
    pub fn set_theme(&mut self, theme: ThemeMapConfig) {
        if self.phase == MapLifecyclePhase::Destroyed || theme == self.theme {
            return;
        }
        self.theme = theme;

        match self.phase {
            MapLifecyclePhase::Ready | MapLifecyclePhase::StyleTransitioning => {
                self.begin_style_transition();
            }
            // The load handler compares styles and swaps if needed
            MapLifecyclePhase::Uninitialized | MapLifecyclePhase::Initializing => {}
            MapLifecyclePhase::Destroyed => {}
        }
    }

    /// Feed a lifecycle event coming from the surface
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match (self.phase, event) {
            (MapLifecyclePhase::Initializing, SurfaceEvent::Load) => self.on_load(),
            (MapLifecyclePhase::StyleTransitioning, SurfaceEvent::StyleLoaded) => {
                self.styles_in_flight = self.styles_in_flight.saturating_sub(1);
                if self.styles_in_flight == 0 {
                    tracing::debug!("Style {} loaded", self.theme.style);
                    self.phase = MapLifecyclePhase::Ready;
                    self.flush_pending();
                }
            }
            (phase, event) => {
                tracing::debug!("Ignoring surface event {:?} in phase {:?}", event, phase);
            }
        }
    }

    /// Drain and handle every event the surface has queued
    pub fn pump(&mut self) {
        loop {
            let Some(event) = self.surface.as_mut().and_then(|s| s.poll_event()) else {
                break;
            };
            self.handle_event(event);
        }
    }

    /// Release the surface. Terminal; safe to call more than once.
    pub fn teardown(&mut self) {
        if self.phase == MapLifecyclePhase::Destroyed {
            return;
        }
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            tracing::info!("Map surface released");
        }
        self.phase = MapLifecyclePhase::Destroyed;
        self.pending = None;
        self.rendered = None;
    }

    fn on_load(&mut self) {
        self.phase = MapLifecyclePhase::Ready;
        tracing::debug!("Map surface loaded");

        if self.surface_style != Some(self.theme.style) {
            // Theme changed while the surface was loading
            self.begin_style_transition();
        } else {
            self.flush_pending();
        }
    }

    fn request_apply(&mut self) {
        self.pending = Some(ApplyIntent {
            route: self.route.clone(),
        });
        if self.phase == MapLifecyclePhase::Ready {
            self.flush_pending();
        }
    }

    fn flush_pending(&mut self) {
        if let Some(intent) = self.pending.take() {
            self.apply_route(intent.route);
        }
    }

    fn begin_style_transition(&mut self) {
        let style = self.theme.style;
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        match surface.set_style(style) {
            Ok(()) => {
                self.surface_style = Some(style);
                self.styles_in_flight += 1;
                self.phase = MapLifecyclePhase::StyleTransitioning;
                // The swap wipes every source and layer
                self.rendered = None;
                self.pending = Some(ApplyIntent {
                    route: self.route.clone(),
                });
                tracing::debug!("Switching map style to {}", style);
            }
            Err(err) => {
                // The old style stays; still repaint the route with the new colors
                tracing::warn!("Failed to switch map style to {}: {}", style, err);
                if self.phase != MapLifecyclePhase::StyleTransitioning {
                    self.phase = MapLifecyclePhase::Ready;
                    self.request_apply();
                }
            }
        }
    }

    fn apply_route(&mut self, route: Option<RouteSelection>) {
        profiling::scope!("MapSynchronizer::apply_route");

        let paint = self.theme.line_paint();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        let Some(route) = route else {
            if let Err(err) = remove_route_layer(surface) {
                tracing::warn!("Failed to clear route layer: {}", err);
                return;
            }
            self.rendered = None;
            return;
        };

        let Some(geometry) = route.geometry() else {
            tracing::debug!("Route {} has no geometry to draw", route.id);
            if let Err(err) = remove_route_layer(surface) {
                tracing::warn!("Failed to clear route layer: {}", err);
                return;
            }
            self.rendered = None;
            return;
        };

        if let Some(rendered) = &self.rendered
            && rendered.route_id == route.id
            && rendered.geometry == geometry
            && rendered.paint == paint
            && surface.has_layer(ROUTE_ID)
        {
            tracing::trace!("Route {} already up to date", route.id);
            return;
        }

        let path = match polyline::decode(geometry) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(
                    "Keeping previous map state, geometry of route {} is malformed: {}",
                    route.id,
                    err
                );
                return;
            }
        };

        if let Err(err) = remove_route_layer(surface) {
            tracing::warn!("Failed to remove previous route layer: {}", err);
            return;
        }
        let previous = self.rendered.take();

        let Some(bounds) = utils::path_bounds(&path) else {
            tracing::debug!("Route {} decoded to an empty path", route.id);
            return;
        };

        match add_route_layer(surface, &path, paint) {
            Ok(()) => {
                surface.fit_bounds(
                    bounds,
                    FitBoundsOptions {
                        padding: FIT_PADDING,
                        max_zoom: FIT_MAX_ZOOM,
                    },
                );
                tracing::debug!("Drew route {} with {} points", route.id, path.0.len());
                self.rendered = Some(RenderedRouteLayer {
                    route_id: route.id,
                    geometry: geometry.to_string(),
                    path,
                    paint,
                });
            }
            Err(err) => {
                tracing::warn!("Failed to draw route {}: {}", route.id, err);
                if let Some(previous) = previous {
                    match add_route_layer(surface, &previous.path, previous.paint) {
                        Ok(()) => self.rendered = Some(previous),
                        Err(err) => {
                            tracing::warn!("Failed to restore route {}: {}", previous.route_id, err);
                            if let Err(err) = remove_route_layer(surface) {
                                tracing::error!("Route layer left half-built: {}", err);
                            }
                        }
                    }
                }
            }
        }
    }
}

impl<S: RenderSurface> Drop for MapSynchronizer<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Remove the route layer, then its source (the layer references the source)
fn remove_route_layer<S: RenderSurface>(surface: &mut S) -> SurfaceResult<()> {
    if surface.has_layer(ROUTE_ID) {
        surface.remove_layer(ROUTE_ID)?;
    }
    if surface.has_source(ROUTE_ID) {
        surface.remove_source(ROUTE_ID)?;
    }
    Ok(())
}

/// Add source and layer as a pair; a failed layer takes its source with it
fn add_route_layer<S: RenderSurface>(
    surface: &mut S,
    path: &DecodedPath,
    paint: LinePaint,
) -> SurfaceResult<()> {
    surface.add_source(ROUTE_ID, path.clone())?;

    let layer = LineLayer {
        id: ROUTE_ID.to_string(),
        source: ROUTE_ID.to_string(),
        paint,
        layout: LineLayout::default(),
    };
    if let Err(err) = surface.add_layer(layer) {
        if let Err(cleanup) = surface.remove_source(ROUTE_ID) {
            tracing::error!("Route source left behind after failed layer: {}", cleanup);
        }
        return Err(err);
    }
    Ok(())
}
