//! UI panels for the application
//!
//! Sidebar with search, results, stats and theme selection, plus the overlays
//! drawn on top of the map.

use crate::app::state::{AppState, format_summary, stat_rows};
use crate::themes;
use egui::{RichText, Ui};
use strava_route_lib::RouteId;

/// Something the user asked for that needs the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarAction {
    Search,
    Select(RouteId),
}

/// Render the sidebar toggle button (overlaid on top-left of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_rect = egui::Rect::from_min_size(rect.left_top() + egui::vec2(margin, margin), button_size);
    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) -> Option<SidebarAction> {
    if !state.ui_settings.sidebar_open {
        return None;
    }

    let screen_size = ctx.viewport_rect().size();
    let mut action = None;

    if screen_size.y > screen_size.x {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(300.0)
            .min_height(180.0)
            .max_height(screen_size.y * 0.6)
            .resizable(true)
            .show(ctx, |ui| action = render_sidebar_content(ui, state));
    } else {
        egui::SidePanel::left("main_sidebar")
            .default_width(340.0)
            .min_width(280.0)
            .max_width(480.0)
            .resizable(true)
            .show(ctx, |ui| action = render_sidebar_content(ui, state));
    }
    action
}

fn render_sidebar_content(ui: &mut Ui, state: &mut AppState) -> Option<SidebarAction> {
    ui.horizontal(|ui| {
        ui.heading("Strava Route Viewer");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            render_theme_selector(ui, state);
        });
    });
    ui.separator();

    let mut action = render_search(ui, state);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if let Some(id) = render_results(ui, state) {
                action = Some(SidebarAction::Select(id));
            }

            if state.loading_details {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading route...");
                });
            }

            ui.add_space(8.0);
            ui.separator();
            render_stats_section(ui, state);
        });

    action
}

fn render_theme_selector(ui: &mut Ui, state: &mut AppState) {
    let mut selected = state.theme.name;
    egui::ComboBox::from_id_salt("theme_select")
        .selected_text(state.theme.display_name)
        .show_ui(ui, |ui| {
            for theme in themes::all_themes() {
                ui.selectable_value(&mut selected, theme.name, theme.display_name);
            }
        });
    ui.label(RichText::new("Theme:").color(state.theme.colors.text_secondary));

    if selected != state.theme.name {
        state.set_theme(selected);
    }
}

fn render_search(ui: &mut Ui, state: &mut AppState) -> Option<SidebarAction> {
    let mut submit = false;

    ui.horizontal(|ui| {
        let button_text = if state.search.loading {
            "Searching..."
        } else {
            "Search"
        };
        let button = egui::Button::new(RichText::new(button_text).color(egui::Color32::WHITE))
            .fill(state.theme.colors.primary);

        // Leave room for the button on the right
        let input_width = (ui.available_width() - 90.0).max(80.0);
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.search.query)
                .hint_text("Search for routes...")
                .desired_width(input_width),
        );
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit = true;
        }
        if ui.add_enabled(!state.search.loading, button).clicked() {
            submit = true;
        }
    });

    if let Some(error) = &state.search.error {
        ui.colored_label(ui.visuals().error_fg_color, error);
    }

    submit.then_some(SidebarAction::Search)
}

/// List of search results; returns the clicked route
fn render_results(ui: &mut Ui, state: &AppState) -> Option<RouteId> {
    if state.search.results.is_empty() {
        return None;
    }

    ui.add_space(8.0);
    ui.label(RichText::new("Results").strong());

    let selected_id = state
        .pending_route()
        .or_else(|| state.selected_route.as_ref().map(|route| route.id()));
    let mut clicked = None;

    for route in &state.search.results {
        let frame = egui::Frame::group(ui.style()).stroke(egui::Stroke::new(
            1.0,
            state.theme.colors.border,
        ));
        let response = frame
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                let name = RichText::new(&route.name).strong();
                let name = if selected_id == Some(route.id) {
                    name.color(state.theme.colors.primary)
                } else {
                    name
                };
                ui.label(name);
                ui.label(
                    RichText::new(format_summary(route))
                        .small()
                        .color(state.theme.colors.text_secondary),
                );
            })
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand);

        if response.clicked() {
            clicked = Some(route.id);
        }
    }
    clicked
}

fn render_stats_section(ui: &mut Ui, state: &AppState) {
    let Some(route) = &state.selected_route else {
        ui.label(
            RichText::new("Select a route to view statistics")
                .color(state.theme.colors.text_secondary),
        );
        return;
    };

    ui.label(RichText::new(route.name()).heading().strong());
    if let Some(description) = route.description.as_deref().filter(|d| !d.is_empty()) {
        ui.label(RichText::new(description).color(state.theme.colors.text_secondary));
    }
    ui.add_space(4.0);

    egui::Grid::new("stats_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for row in stat_rows(route, state.stats.as_ref()) {
                ui.label(RichText::new(row.label).color(state.theme.colors.text_secondary));
                ui.label(RichText::new(row.value).strong());
                ui.end_row();
            }
        });

    if state.loading_stats {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading stats...");
        });
    }
}

/// Modal shown when a route could not be loaded
pub fn error_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.error.clone() else {
        return;
    };

    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                state.error = None;
            }
        });
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Strava Route Viewer");
            ui.add_space(8.0);

            ui.label(RichText::new("Finding Routes").strong());
            ui.label("• Type a name in the search box and press Enter");
            ui.label("• Click a result to draw it on the map");
            ui.add_space(8.0);

            ui.label(RichText::new("Navigation").strong());
            ui.label("• Scroll or use the +/- buttons to zoom");
            ui.label("• Click and drag to pan");
            ui.label("• ⟲ returns to the starting view");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}
