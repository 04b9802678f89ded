//! Walkers plugin drawing one line layer over the map tiles

use super::surface::{LineCap, LineLayout, LinePaint};
use egui::Stroke;
use geo::LineString;
use walkers::{Plugin, Projector};

/// Draws a decoded route as a projected polyline
pub struct RouteLayerPlugin<'a> {
    path: &'a LineString<f64>,
    paint: LinePaint,
    layout: LineLayout,
}

impl<'a> RouteLayerPlugin<'a> {
    pub fn new(path: &'a LineString<f64>, paint: LinePaint, layout: LineLayout) -> Self {
        Self {
            path,
            paint,
            layout,
        }
    }
}

impl Plugin for RouteLayerPlugin<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RouteLayerPlugin::run");

        let color = self.paint.color.gamma_multiply(self.paint.opacity.clamp(0.0, 1.0));
        let stroke = Stroke::new(self.paint.width, color);
        let painter = ui.painter();

        // Convert WGS84 coordinates to screen space
        let screen_points: Vec<egui::Pos2> = self
            .path
            .coords()
            .map(|coord| {
                let screen_vec = projector.project(walkers::lat_lon(coord.y, coord.x));
                egui::Pos2::new(screen_vec.x, screen_vec.y)
            })
            .collect();

        let radius = self.paint.width / 2.0;
        if let (Some(&first), Some(&last)) = (screen_points.first(), screen_points.last()) {
            if screen_points.len() == 1 || self.layout.cap == LineCap::Round {
                painter.circle_filled(first, radius, color);
                painter.circle_filled(last, radius, color);
            }
            if screen_points.len() >= 2 {
                painter.add(egui::Shape::line(screen_points, stroke));
            }
        }
    }
}
