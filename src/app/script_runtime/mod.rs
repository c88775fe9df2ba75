//! Embedded script engine for code-mode artifacts.
//!
//! # Architecture
//!
//! - **Platform**: global V8 platform initialized once at app startup
//! - **Runtime**: per-execution isolate with heap and timeout limits
//! - **Bindings**: the five helper globals generated scripts may use
//!
//! Execution is deliberately boxed in: no filesystem, no network, no process
//! access - the only way out of a script is the recorded widget ops and the
//! captured console.

#![warn(clippy::all, rust_2018_idioms)]

pub mod bindings;
pub mod console;
pub mod platform;
pub mod runtime;

pub use bindings::{
    api_documentation, register_bindings, InputValue, PlotKind, PlotSpec, SurfaceBuffers,
    TableSpec, WidgetOp,
};
pub use console::{register_console, ConsoleBuffers};
pub use platform::{initialize_v8_platform, is_v8_initialized};
pub use runtime::{ExecutionResult, RuntimeConfig, ScriptRuntime};
