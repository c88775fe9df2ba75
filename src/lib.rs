//! UI Forge - Natural-Language Interface Builder
//!
//! UI Forge is a desktop application that turns a plain-text description of a
//! calculator, dashboard, or landing page into a working artifact. The text is
//! sent to a hosted text-generation model and the completion is rendered
//! directly: generated HTML is shown in a sandboxed webview window, generated
//! JavaScript is executed in an embedded V8 isolate against a small set of
//! preloaded helper bindings.
//!
//! # Architecture Overview
//!
//! - **UI Layer** ([`app::forgeui`]): egui-based desktop interface
//! - **Generation Pipeline** ([`app::prompts`], [`app::gemini_client`],
//!   [`app::session`]): prompt compilation, the remote call, and the
//!   per-session artifact cache
//! - **Render Sandboxes** ([`app::script_runtime`], [`app::webview`]): the V8
//!   script surface and the child-process markup preview
//!
//! The main entry point is [`ForgeApp`], which owns the session context and
//! coordinates the panels.

#![warn(clippy::all, rust_2018_idioms)]

// Include logging macros first
#[macro_use]
pub mod logging_macros;

pub mod app;
pub use app::ForgeApp;

use once_cell::sync::OnceCell;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Default tracing directives: application at info, noisy GUI stacks capped.
pub const DEFAULT_LOG_FILTER: &str =
    "uiforge=info,eframe=info,egui=warn,wgpu=warn,winit=warn,wry=info,tao=warn,reqwest=warn,hyper=warn";

/// Verbose directives used while the debug toggle is on.
pub const VERBOSE_LOG_FILTER: &str =
    "uiforge=debug,eframe=info,egui=warn,wgpu=warn,winit=warn,wry=info,tao=warn,reqwest=info,hyper=warn";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Reload handle for the global tracing filter, set once during logging init.
static TRACING_RELOAD_HANDLE: OnceCell<FilterHandle> = OnceCell::new();

/// Store the reload handle so the UI can retune log verbosity later.
pub fn set_tracing_reload_handle(handle: FilterHandle) {
    let _ = TRACING_RELOAD_HANDLE.set(handle);
}

/// Switch the global filter between the default and verbose directive sets.
///
/// No-op when logging was never initialized (tests, webview child processes).
pub fn set_verbose_tracing(enabled: bool) {
    let Some(handle) = TRACING_RELOAD_HANDLE.get() else {
        return;
    };

    let directives = if enabled {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };

    match EnvFilter::try_new(directives) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                tracing::warn!("Failed to reload tracing filter: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!("Invalid tracing directives '{}': {}", directives, e);
        }
    }
}
