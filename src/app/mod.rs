//! Core application modules for UI Forge.
//!
//! # Module Organization
//!
//! ## Generation Pipeline
//! - [`credentials`] - ordered API-key providers (environment, secrets file, manual entry)
//! - [`prompts`] - fixed prompt templates for the two engine modes
//! - [`gemini_client`] - the remote text-generation call and fence stripping
//! - [`session`] - per-session artifact cache and build orchestration
//!
//! ## Render Sandboxes
//! - [`script_runtime`] - V8 isolate with the five helper bindings (code mode)
//! - [`webview`] - child-process webview preview (markup mode)
//!
//! ## UI
//! - [`forgeui`] - egui panels and windows

pub mod credentials;
pub mod forgeui;
pub mod gemini_client;
pub mod prompts;
pub mod script_runtime;
pub mod session;
pub mod webview;

pub use forgeui::app::ForgeApp;
