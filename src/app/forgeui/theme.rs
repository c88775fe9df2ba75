//! Theme management and the optional style-override file.
//!
//! A `theme.toml` in the config directory can preset the theme and window
//! corner radius. The file is optional everywhere: absence is silent,
//! malformed content logs a warning and falls back to defaults.

use std::path::Path;

use super::app::ForgeApp;
use eframe::egui;

#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, PartialEq, Default)]
pub enum ThemeChoice {
    Latte,
    Frappe,
    Macchiato,
    #[default]
    Mocha,
}

impl ThemeChoice {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "latte" => Some(ThemeChoice::Latte),
            "frappe" => Some(ThemeChoice::Frappe),
            "macchiato" => Some(ThemeChoice::Macchiato),
            "mocha" => Some(ThemeChoice::Mocha),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThemeChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeChoice::Latte => write!(f, "Latte"),
            ThemeChoice::Frappe => write!(f, "Frappe"),
            ThemeChoice::Macchiato => write!(f, "Macchiato"),
            ThemeChoice::Mocha => write!(f, "Mocha"),
        }
    }
}

/// Optional per-user style overrides.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct ThemeOverrides {
    pub theme: Option<String>,
    pub corner_radius: Option<u8>,
}

/// Load overrides from the default config location. Missing file is the
/// normal case and stays silent.
pub fn load_theme_overrides() -> ThemeOverrides {
    let Some(path) = directories::ProjectDirs::from("com", "", "uiforge")
        .map(|dirs| dirs.config_dir().join("theme.toml"))
    else {
        return ThemeOverrides::default();
    };
    load_theme_overrides_from(&path)
}

/// Load overrides from an explicit path (tests use this directly).
pub fn load_theme_overrides_from(path: &Path) -> ThemeOverrides {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return ThemeOverrides::default(),
    };

    match toml::from_str(&raw) {
        Ok(overrides) => overrides,
        Err(e) => {
            log_warn!("Ignoring malformed theme file {:?}: {}", path, e);
            ThemeOverrides::default()
        }
    }
}

impl ForgeApp {
    /// Apply the selected theme to the UI context.
    pub(super) fn apply_theme(&self, ctx: &egui::Context) {
        match self.theme {
            ThemeChoice::Latte => catppuccin_egui::set_theme(ctx, catppuccin_egui::LATTE),
            ThemeChoice::Frappe => catppuccin_egui::set_theme(ctx, catppuccin_egui::FRAPPE),
            ThemeChoice::Macchiato => catppuccin_egui::set_theme(ctx, catppuccin_egui::MACCHIATO),
            ThemeChoice::Mocha => catppuccin_egui::set_theme(ctx, catppuccin_egui::MOCHA),
        }

        // Squarer windows read better for a tool-forge aesthetic
        let corner_radius = self.corner_radius;
        let mut style = (*ctx.style()).clone();
        style.visuals.window_corner_radius = egui::CornerRadius::same(corner_radius);
        ctx.set_style(style);
    }
}
