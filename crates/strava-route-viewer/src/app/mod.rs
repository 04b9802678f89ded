//! Application module
//!
//! This module provides the main application structure:
//! - Full-window map showing the selected route
//! - Toggleable sidebar with search, results, stats and theme selection
//! - Background loading of routes with stale responses discarded

mod selection;
pub(crate) mod settings;
mod state;
mod ui_panels;

pub use settings::Settings;

use crate::api::{ApiError, HttpRouteApi, RouteApi};
use crate::map::{CameraDefaults, MapSynchronizer, WalkersSurface, WalkersSurfaceFactory};
use crate::themes;
use eframe::egui;
use selection::RouteLoader;
use state::AppState;
use std::sync::Arc;
use strava_route_lib::RouteSelection;
use tokio::runtime::Handle;
use ui_panels::SidebarAction;

/// Main application structure
pub struct RouteViewerApp {
    state: AppState,

    /// Runs remote calls and collects their results
    loader: RouteLoader,

    /// Owner of the map surface
    map: MapSynchronizer<WalkersSurface>,

    /// Route last handed to the map
    shown_route: Option<RouteSelection>,

    /// Theme whose visuals are installed in the egui context
    applied_visuals: Option<&'static str>,
}

impl RouteViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        runtime: Handle,
    ) -> Result<Self, ApiError> {
        let api: Arc<dyn RouteApi> = Arc::new(HttpRouteApi::new(settings.api_config())?);
        let mut state = AppState::new(&settings);
        let loader = RouteLoader::new(api, runtime, Some(cc.egui_ctx.clone()));

        let mut map = MapSynchronizer::new(
            state.theme.map,
            CameraDefaults::default(),
            settings.map_access_token.clone(),
        );
        let mut factory = WalkersSurfaceFactory::new(cc.egui_ctx.clone());
        if let Err(err) = map.mount(&mut factory) {
            // Typically a Mapbox style without a token
            tracing::error!("Cannot show theme {}: {}", state.theme.name, err);
            state.theme = themes::get_theme(themes::DEFAULT.name);
            map.set_theme(state.theme.map);
            if let Err(err) = map.mount(&mut factory) {
                tracing::error!("Map unavailable: {}", err);
            }
        }

        if !state.search.query.trim().is_empty() {
            loader.search(&mut state);
        }

        Ok(Self {
            state,
            loader,
            map,
            shown_route: None,
            applied_visuals: None,
        })
    }

    /// Push state changes to the map and the egui visuals
    fn sync_map(&mut self, ctx: &egui::Context) {
        profiling::scope!("sync_map");

        let theme = self.state.theme;
        if self.applied_visuals != Some(theme.name) {
            ctx.set_visuals(theme.visuals());
            self.applied_visuals = Some(theme.name);
        }
        self.map.set_theme(theme.map);

        let route = self.state.route_selection();
        if route != self.shown_route {
            self.map.set_route(route.clone());
            self.shown_route = route;
        }
    }
}

#[profiling::all_functions]
impl eframe::App for RouteViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) || (i.key_pressed(egui::Key::H) && i.modifiers.ctrl) {
                self.state.ui_settings.show_help = !self.state.ui_settings.show_help;
            }
        });

        self.loader.drain(&mut self.state);

        if self.state.ui_settings.show_help {
            ui_panels::help_overlay(ctx, &mut self.state.ui_settings.show_help);
        }
        ui_panels::error_window(ctx, &mut self.state);

        match ui_panels::render_sidebar(ctx, &mut self.state) {
            Some(SidebarAction::Search) => self.loader.search(&mut self.state),
            Some(SidebarAction::Select(id)) => self.loader.select(&mut self.state, id),
            None => {}
        }

        self.sync_map(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");
                self.map.show(ui);
                ui_panels::sidebar_toggle_button(ui, &mut self.state);
            });
    }
}
