//! Theme catalog
//!
//! Static table of UI palettes and map styles. Lookups never fail: unknown names
//! resolve to the default theme.

use crate::map::LinePaint;
use egui::Color32;

/// Map side of a theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeMapConfig {
    /// Style id understood by the render surface
    pub style: &'static str,
    pub route_color: Color32,
    /// Pixels
    pub route_width: f32,
    pub route_opacity: f32,
}

impl ThemeMapConfig {
    pub fn line_paint(&self) -> LinePaint {
        LinePaint {
            color: self.route_color,
            width: self.route_width,
            opacity: self.route_opacity,
        }
    }
}

/// UI colors of a theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    pub primary: Color32,
    pub secondary: Color32,
    pub background: Color32,
    pub surface: Color32,
    pub text: Color32,
    pub text_secondary: Color32,
    pub border: Color32,
    pub accent: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Stable key used on the command line
    pub name: &'static str,
    pub display_name: &'static str,
    pub dark: bool,
    pub colors: ThemePalette,
    pub map: ThemeMapConfig,
}

impl Theme {
    /// egui visuals matching the palette
    pub fn visuals(&self) -> egui::Visuals {
        let mut visuals = if self.dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        let colors = &self.colors;

        visuals.override_text_color = Some(colors.text);
        visuals.hyperlink_color = colors.accent;
        visuals.selection.bg_fill = colors.primary;
        visuals.panel_fill = colors.surface;
        visuals.window_fill = colors.surface;
        visuals.extreme_bg_color = colors.background;
        visuals.faint_bg_color = colors.background;
        visuals.window_stroke.color = colors.border;
        visuals.widgets.noninteractive.bg_stroke.color = colors.border;
        visuals.widgets.hovered.bg_stroke.color = colors.secondary;
        visuals.widgets.active.bg_fill = colors.primary;
        visuals
    }
}

/// Strava orange
const STRAVA_ORANGE: Color32 = Color32::from_rgb(252, 76, 2);

pub const DEFAULT: Theme = Theme {
    name: "default",
    display_name: "Default",
    dark: false,
    colors: ThemePalette {
        primary: STRAVA_ORANGE,
        secondary: Color32::from_rgb(45, 45, 50),
        background: Color32::from_rgb(245, 245, 245),
        surface: Color32::WHITE,
        text: Color32::from_rgb(36, 36, 40),
        text_secondary: Color32::from_rgb(110, 110, 115),
        border: Color32::from_rgb(221, 221, 221),
        accent: Color32::from_rgb(0, 123, 255),
    },
    map: ThemeMapConfig {
        style: "openstreetmap",
        route_color: STRAVA_ORANGE,
        route_width: 4.0,
        route_opacity: 0.9,
    },
};

pub const DARK: Theme = Theme {
    name: "dark",
    display_name: "Dark",
    dark: true,
    colors: ThemePalette {
        primary: Color32::from_rgb(255, 107, 53),
        secondary: Color32::from_rgb(200, 200, 205),
        background: Color32::from_rgb(18, 18, 20),
        surface: Color32::from_rgb(30, 30, 34),
        text: Color32::from_rgb(235, 235, 240),
        text_secondary: Color32::from_rgb(160, 160, 168),
        border: Color32::from_rgb(60, 60, 66),
        accent: Color32::from_rgb(0, 212, 255),
    },
    map: ThemeMapConfig {
        style: "carto-dark",
        route_color: Color32::from_rgb(0, 212, 255),
        route_width: 4.0,
        route_opacity: 1.0,
    },
};

pub const OUTDOORS: Theme = Theme {
    name: "outdoors",
    display_name: "Outdoors",
    dark: false,
    colors: ThemePalette {
        primary: Color32::from_rgb(46, 125, 50),
        secondary: Color32::from_rgb(121, 85, 72),
        background: Color32::from_rgb(241, 248, 233),
        surface: Color32::from_rgb(250, 253, 246),
        text: Color32::from_rgb(27, 46, 28),
        text_secondary: Color32::from_rgb(85, 107, 86),
        border: Color32::from_rgb(197, 225, 165),
        accent: Color32::from_rgb(255, 143, 0),
    },
    map: ThemeMapConfig {
        style: "opentopomap",
        route_color: Color32::from_rgb(211, 47, 47),
        route_width: 5.0,
        route_opacity: 0.85,
    },
};

/// Needs a Mapbox access token
pub const SATELLITE: Theme = Theme {
    name: "satellite",
    display_name: "Satellite",
    dark: true,
    colors: ThemePalette {
        primary: Color32::from_rgb(255, 214, 0),
        secondary: Color32::from_rgb(176, 190, 197),
        background: Color32::from_rgb(16, 24, 32),
        surface: Color32::from_rgb(28, 38, 48),
        text: Color32::from_rgb(236, 239, 241),
        text_secondary: Color32::from_rgb(144, 164, 174),
        border: Color32::from_rgb(55, 71, 79),
        accent: Color32::from_rgb(255, 214, 0),
    },
    map: ThemeMapConfig {
        style: "mapbox://styles/mapbox/satellite-streets-v12",
        route_color: Color32::from_rgb(255, 214, 0),
        route_width: 4.0,
        route_opacity: 1.0,
    },
};

/// Every theme, in display order
static THEMES: [Theme; 4] = [DEFAULT, DARK, OUTDOORS, SATELLITE];

/// Theme with the given name, or the default theme
pub fn get_theme(name: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|theme| theme.name == name)
        .unwrap_or(&THEMES[0])
}

pub fn theme_names() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|theme| theme.name)
}

pub fn all_themes() -> &'static [Theme] {
    &THEMES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_get_theme_by_name() {
        assert_eq!(get_theme("dark").name, "dark");
        assert_eq!(get_theme("outdoors").map.style, "opentopomap");
    }

    #[test]
    fn test_unknown_theme_falls_back_to_default() {
        assert_eq!(get_theme("neon"), &DEFAULT);
        assert_eq!(get_theme(""), &DEFAULT);
        // Names are case sensitive
        assert_eq!(get_theme("Dark"), &DEFAULT);
    }

    #[test]
    fn test_catalog_order_and_unique_names() {
        let names: Vec<_> = theme_names().collect();
        assert_eq!(names, ["default", "dark", "outdoors", "satellite"]);

        let unique: HashSet<_> = all_themes().iter().map(|theme| theme.name).collect();
        assert_eq!(unique.len(), all_themes().len());
    }

    #[test]
    fn test_line_paint_follows_map_config() {
        let paint = OUTDOORS.map.line_paint();
        assert_eq!(paint.color, OUTDOORS.map.route_color);
        assert_eq!(paint.width, 5.0);
        assert_eq!(paint.opacity, 0.85);
    }

    #[test]
    fn test_route_styles_are_visible() {
        for theme in all_themes() {
            assert!(theme.map.route_width > 0.0, "{}", theme.name);
            assert!(
                theme.map.route_opacity > 0.0 && theme.map.route_opacity <= 1.0,
                "{}",
                theme.name
            );
        }
    }

    #[test]
    fn test_visuals_follow_darkness() {
        assert!(DARK.visuals().dark_mode);
        assert!(!DEFAULT.visuals().dark_mode);
        assert_eq!(DEFAULT.visuals().panel_fill, DEFAULT.colors.surface);
    }
}
