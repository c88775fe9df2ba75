//! egui user interface for UI Forge.
//!
//! - [`app`] - the `ForgeApp` root type and central builder panel
//! - [`control_panel`] - sidebar with credentials, engine selector, quick prompts
//! - [`script_surface`] - code-mode renderer (widgets, tables, charts)
//! - [`source_window`] - generated-source viewer
//! - [`theme`] - catppuccin themes and the optional style-override file

pub mod app;
pub mod control_panel;
pub mod script_surface;
pub mod source_window;
pub mod theme;

pub use app::ForgeApp;
pub use theme::ThemeChoice;
