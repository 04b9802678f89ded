//! Render surface backed by walkers slippy-map tiles
//!
//! Styles are tile providers. A style swap replaces the tile cache and drops every
//! source and layer, like a vector-style engine would. Lifecycle events are emitted
//! after the frame that first draws the map (or the new style).

use super::plugin::RouteLayerPlugin;
use super::surface::{
    ControlPosition, FitBoundsOptions, LineLayer, MapControl, RenderSurface, SurfaceError,
    SurfaceEvent, SurfaceFactory, SurfaceOptions, SurfaceResult,
};
use super::synchronizer::MapSynchronizer;
use geo::{LineString, Rect};
use std::collections::{HashMap, VecDeque};
use strava_route_lib::utils;
use walkers::{
    HttpTiles, Map, MapMemory, Position, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Prefix of styles served by Mapbox, e.g. `mapbox://styles/mapbox/outdoors-v12`
const MAPBOX_PREFIX: &str = "mapbox://styles/";

/// Raster tiles are square with this edge in pixels
const TILE_SIZE: f64 = 256.0;

/// Tile provider behind a style id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapStyle {
    OpenStreetMap,
    OpenTopoMap,
    CartoLight,
    CartoDark,
    Mapbox { owner: String, style: String },
}

impl MapStyle {
    pub fn parse(id: &str) -> SurfaceResult<Self> {
        match id {
            "openstreetmap" => Ok(Self::OpenStreetMap),
            "opentopomap" => Ok(Self::OpenTopoMap),
            "carto-light" => Ok(Self::CartoLight),
            "carto-dark" => Ok(Self::CartoDark),
            _ => {
                let (owner, style) = id
                    .strip_prefix(MAPBOX_PREFIX)
                    .and_then(|rest| rest.split_once('/'))
                    .filter(|(owner, style)| {
                        !owner.is_empty() && !style.is_empty() && !style.contains('/')
                    })
                    .ok_or_else(|| SurfaceError::UnknownStyle(id.to_string()))?;
                Ok(Self::Mapbox {
                    owner: owner.to_string(),
                    style: style.to_string(),
                })
            }
        }
    }

    pub fn max_zoom(&self) -> u8 {
        match self {
            Self::OpenTopoMap => 17,
            Self::CartoLight | Self::CartoDark => 20,
            Self::OpenStreetMap | Self::Mapbox { .. } => 19,
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
            Self::CartoLight | Self::CartoDark => "© OpenStreetMap contributors © CARTO",
            Self::Mapbox { .. } => "© Mapbox © OpenStreetMap contributors",
        }
    }

    fn tiles(&self, access_token: Option<&str>, ctx: &egui::Context) -> SurfaceResult<HttpTiles> {
        let tiles = match self {
            Self::OpenStreetMap => HttpTiles::new(OpenStreetMap, ctx.clone()),
            Self::OpenTopoMap => HttpTiles::new(OpenTopoMap, ctx.clone()),
            Self::CartoLight => HttpTiles::new(Carto { variant: "light_all" }, ctx.clone()),
            Self::CartoDark => HttpTiles::new(Carto { variant: "dark_all" }, ctx.clone()),
            Self::Mapbox { owner, style } => {
                let token = access_token
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| {
                        SurfaceError::MissingAccessToken(format!("{MAPBOX_PREFIX}{owner}/{style}"))
                    })?;
                HttpTiles::new(
                    Mapbox {
                        owner: owner.clone(),
                        style: style.clone(),
                        token: token.to_string(),
                    },
                    ctx.clone(),
                )
            }
        };
        Ok(tiles)
    }
}

/// OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// CARTO basemaps (`light_all` or `dark_all`)
pub struct Carto {
    variant: &'static str,
}

impl TileSource for Carto {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://a.basemaps.cartocdn.com/{}/{}/{}/{}.png",
            self.variant, tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenStreetMap contributors © CARTO",
            url: "https://carto.com/attributions",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        20
    }
}

/// Raster tiles rendered from a Mapbox style
pub struct Mapbox {
    owner: String,
    style: String,
    token: String,
}

impl TileSource for Mapbox {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/{}/{}/tiles/256/{}/{}/{}?access_token={}",
            self.owner, self.style, tile_id.zoom, tile_id.x, tile_id.y, self.token
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© Mapbox © OpenStreetMap contributors",
            url: "https://www.mapbox.com/about/maps/",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Walkers map with vector-style sources and line layers on top
pub struct WalkersSurface {
    ctx: egui::Context,
    style: MapStyle,
    /// `None` once released
    tiles: Option<HttpTiles>,
    map_memory: MapMemory,
    home: Position,
    home_zoom: f64,
    access_token: Option<String>,
    sources: HashMap<String, LineString<f64>>,
    /// Draw order
    layers: Vec<LineLayer>,
    controls: Vec<(MapControl, ControlPosition)>,
    events: VecDeque<SurfaceEvent>,
    loaded: bool,
    /// Style swaps waiting for their first frame
    styles_loading: usize,
    pending_fit: Option<(Rect<f64>, FitBoundsOptions)>,
}

impl WalkersSurface {
    pub fn new(ctx: egui::Context, options: &SurfaceOptions) -> SurfaceResult<Self> {
        let style = MapStyle::parse(&options.style)?;
        let tiles = style.tiles(options.access_token.as_deref(), &ctx)?;

        let home = walkers::lat_lon(options.center.y, options.center.x);
        let mut map_memory = MapMemory::default();
        map_memory.center_at(home);
        if map_memory.set_zoom(options.zoom).is_err() {
            tracing::warn!("Initial zoom {} out of range", options.zoom);
        }

        Ok(Self {
            ctx,
            style,
            tiles: Some(tiles),
            map_memory,
            home,
            home_zoom: options.zoom,
            access_token: options.access_token.clone(),
            sources: HashMap::new(),
            layers: Vec::new(),
            controls: Vec::new(),
            events: VecDeque::new(),
            loaded: false,
            styles_loading: 0,
            pending_fit: None,
        })
    }

    #[inline]
    pub fn style(&self) -> &MapStyle {
        &self.style
    }

    /// Draw the map into the remaining space of `ui`
    pub fn show(&mut self, ui: &mut egui::Ui) {
        profiling::scope!("WalkersSurface::show");

        let Some(tiles) = self.tiles.as_mut() else {
            return;
        };

        if let Some((bounds, options)) = self.pending_fit.take() {
            let viewport = ui.available_size();
            let max_zoom = options.max_zoom.min(self.style.max_zoom() as f64);
            let fit = utils::fit_camera(
                bounds,
                (viewport.x as f64, viewport.y as f64),
                options.padding as f64,
                max_zoom,
                TILE_SIZE,
            );
            self.map_memory
                .center_at(walkers::lat_lon(fit.center.y, fit.center.x));
            if self.map_memory.set_zoom(fit.zoom).is_err() {
                tracing::warn!("Fitted zoom {:.2} out of range", fit.zoom);
            }
            tracing::trace!(
                "Fitted camera to ({:.4}, {:.4}) zoom {:.1}",
                fit.center.y,
                fit.center.x,
                fit.zoom
            );
        }

        let mut map = Map::new(Some(tiles), &mut self.map_memory, self.home);
        for layer in &self.layers {
            if let Some(path) = self.sources.get(&layer.source) {
                map = map.with_plugin(RouteLayerPlugin::new(path, layer.paint, layer.layout));
            }
        }
        let response = ui.add(map);

        for (control, position) in self.controls.clone() {
            match control {
                MapControl::Navigation => self.navigation_control(ui, &response, position),
            }
        }

        let painter = ui.painter();
        painter.text(
            response.rect.center_bottom() + egui::vec2(0.0, -5.0),
            egui::Align2::CENTER_BOTTOM,
            self.style.attribution(),
            egui::FontId::proportional(10.0),
            egui::Color32::from_black_alpha(180),
        );

        // The first frame with the map (or a new style) on screen completes its load
        let mut emitted = false;
        if !self.loaded {
            self.loaded = true;
            self.events.push_back(SurfaceEvent::Load);
            emitted = true;
        }
        for _ in 0..std::mem::take(&mut self.styles_loading) {
            self.events.push_back(SurfaceEvent::StyleLoaded);
            emitted = true;
        }
        if emitted {
            self.ctx.request_repaint();
        }
    }

    fn navigation_control(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        position: ControlPosition,
    ) {
        let margin = 10.0;
        let rect = response.rect;
        // Bottom anchors leave room for the attribution line
        let (anchor, pivot) = match position {
            ControlPosition::TopLeft => (
                rect.left_top() + egui::vec2(margin, margin),
                egui::Align2::LEFT_TOP,
            ),
            ControlPosition::TopRight => (
                rect.right_top() + egui::vec2(-margin, margin),
                egui::Align2::RIGHT_TOP,
            ),
            ControlPosition::BottomLeft => (
                rect.left_bottom() + egui::vec2(margin, -margin * 3.0),
                egui::Align2::LEFT_BOTTOM,
            ),
            ControlPosition::BottomRight => (
                rect.right_bottom() + egui::vec2(-margin, -margin * 3.0),
                egui::Align2::RIGHT_BOTTOM,
            ),
        };

        egui::Area::new(egui::Id::new(("map_navigation", position as u8)))
            .fixed_pos(anchor)
            .pivot(pivot)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.vertical(|ui| {
                        if ui.button("➕").on_hover_text("Zoom in").clicked()
                            && self.map_memory.zoom_in().is_err()
                        {
                            tracing::debug!("Already at maximum zoom");
                        }
                        if ui.button("➖").on_hover_text("Zoom out").clicked()
                            && self.map_memory.zoom_out().is_err()
                        {
                            tracing::debug!("Already at minimum zoom");
                        }
                        if ui.button("⟲").on_hover_text("Reset view").clicked() {
                            self.map_memory.center_at(self.home);
                            if self.map_memory.set_zoom(self.home_zoom).is_err() {
                                tracing::warn!("Home zoom {} out of range", self.home_zoom);
                            }
                        }
                    });
                });
            });
    }

    fn check_alive(&self) -> SurfaceResult<()> {
        if self.tiles.is_none() {
            return Err(SurfaceError::Released);
        }
        Ok(())
    }
}

impl RenderSurface for WalkersSurface {
    fn set_style(&mut self, style: &str) -> SurfaceResult<()> {
        self.check_alive()?;
        let parsed = MapStyle::parse(style)?;
        let tiles = parsed.tiles(self.access_token.as_deref(), &self.ctx)?;

        tracing::info!("Loading map style {}", style);
        self.style = parsed;
        self.tiles = Some(tiles);
        self.sources.clear();
        self.layers.clear();
        self.styles_loading += 1;
        self.ctx.request_repaint();
        Ok(())
    }

    fn add_control(&mut self, control: MapControl, position: ControlPosition) {
        if !self.controls.contains(&(control, position)) {
            self.controls.push((control, position));
        }
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|layer| layer.id == id)
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn remove_layer(&mut self, id: &str) -> SurfaceResult<()> {
        self.check_alive()?;
        let index = self
            .layers
            .iter()
            .position(|layer| layer.id == id)
            .ok_or_else(|| SurfaceError::MissingLayer(id.to_string()))?;
        self.layers.remove(index);
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> SurfaceResult<()> {
        self.check_alive()?;
        if let Some(layer) = self.layers.iter().find(|layer| layer.source == id) {
            return Err(SurfaceError::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SurfaceError::MissingSource(id.to_string()))
    }

    fn add_source(&mut self, id: &str, geometry: LineString<f64>) -> SurfaceResult<()> {
        self.check_alive()?;
        if self.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource(id.to_string()));
        }
        if geometry.0.is_empty() {
            return Err(SurfaceError::InvalidGeometry(id.to_string()));
        }
        self.sources.insert(id.to_string(), geometry);
        Ok(())
    }

    fn add_layer(&mut self, layer: LineLayer) -> SurfaceResult<()> {
        self.check_alive()?;
        if self.has_layer(&layer.id) {
            return Err(SurfaceError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(SurfaceError::MissingSource(layer.source));
        }
        self.layers.push(layer);
        self.ctx.request_repaint();
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, options: FitBoundsOptions) {
        // Applied on the next frame, once the viewport size is known
        self.pending_fit = Some((bounds, options));
        self.ctx.request_repaint();
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn poll_event(&mut self) -> Option<SurfaceEvent> {
        self.events.pop_front()
    }

    fn release(&mut self) {
        // Dropping the tiles stops their download tasks
        self.tiles = None;
        self.sources.clear();
        self.layers.clear();
        self.events.clear();
        self.pending_fit = None;
    }
}

/// Builds [`WalkersSurface`]s bound to the application's egui context
pub struct WalkersSurfaceFactory {
    ctx: egui::Context,
}

impl WalkersSurfaceFactory {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl SurfaceFactory for WalkersSurfaceFactory {
    type Surface = WalkersSurface;

    fn construct(&mut self, options: &SurfaceOptions) -> SurfaceResult<WalkersSurface> {
        WalkersSurface::new(self.ctx.clone(), options)
    }
}

impl MapSynchronizer<WalkersSurface> {
    /// Draw the map, then handle the lifecycle events the frame produced
    pub fn show(&mut self, ui: &mut egui::Ui) {
        if let Some(surface) = self.surface_mut() {
            surface.show(ui);
        }
        self.pump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtin_styles() {
        assert_eq!(MapStyle::parse("openstreetmap"), Ok(MapStyle::OpenStreetMap));
        assert_eq!(MapStyle::parse("opentopomap"), Ok(MapStyle::OpenTopoMap));
        assert_eq!(MapStyle::parse("carto-light"), Ok(MapStyle::CartoLight));
        assert_eq!(MapStyle::parse("carto-dark"), Ok(MapStyle::CartoDark));
    }

    #[test]
    fn test_parse_mapbox_style() {
        assert_eq!(
            MapStyle::parse("mapbox://styles/mapbox/outdoors-v12"),
            Ok(MapStyle::Mapbox {
                owner: "mapbox".to_string(),
                style: "outdoors-v12".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_styles() {
        for id in [
            "",
            "satellite",
            "mapbox://styles/",
            "mapbox://styles/mapbox",
            "mapbox://styles//dark-v11",
            "mapbox://styles/mapbox/a/b",
        ] {
            assert_eq!(
                MapStyle::parse(id),
                Err(SurfaceError::UnknownStyle(id.to_string())),
                "{id}"
            );
        }
    }

    #[test]
    fn test_mapbox_tile_url_carries_token() {
        let source = Mapbox {
            owner: "mapbox".to_string(),
            style: "dark-v11".to_string(),
            token: "pk.abc".to_string(),
        };
        let url = source.tile_url(TileId {
            x: 1,
            y: 2,
            zoom: 3,
        });
        assert_eq!(
            url,
            "https://api.mapbox.com/styles/v1/mapbox/dark-v11/tiles/256/3/1/2?access_token=pk.abc"
        );
    }

    #[test]
    fn test_mapbox_tiles_require_token() {
        let ctx = egui::Context::default();
        let style = MapStyle::parse("mapbox://styles/mapbox/dark-v11").unwrap();

        assert!(matches!(
            style.tiles(None, &ctx),
            Err(SurfaceError::MissingAccessToken(_))
        ));
        assert!(matches!(
            style.tiles(Some(""), &ctx),
            Err(SurfaceError::MissingAccessToken(_))
        ));
    }

    #[test]
    fn test_carto_variants() {
        let url = Carto { variant: "dark_all" }.tile_url(TileId {
            x: 5,
            y: 6,
            zoom: 7,
        });
        assert_eq!(url, "https://a.basemaps.cartocdn.com/dark_all/7/5/6.png");
    }
}
