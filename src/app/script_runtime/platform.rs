//! Global V8 platform management.
//!
//! The platform is initialized once at startup and lives for the whole
//! process. `OnceCell` makes repeat initialization a safe no-op, which also
//! lets every test call [`initialize_v8_platform`] without coordination.

#![warn(clippy::all, rust_2018_idioms)]

use log::info;
use once_cell::sync::OnceCell;

static GLOBAL_V8_PLATFORM: OnceCell<v8::SharedRef<v8::Platform>> = OnceCell::new();

/// Initialize the V8 platform. Must run before any isolate is created;
/// subsequent calls are no-ops.
pub fn initialize_v8_platform() -> Result<(), String> {
    GLOBAL_V8_PLATFORM
        .get_or_try_init(|| {
            // 0 = default thread pool size, no idle task support
            let platform = v8::new_default_platform(0, false).make_shared();

            v8::V8::initialize_platform(platform.clone());
            v8::V8::initialize();

            info!("V8 platform initialized");

            Ok(platform)
        })
        .map(|_| ())
}

/// Whether [`initialize_v8_platform`] has completed.
pub fn is_v8_initialized() -> bool {
    GLOBAL_V8_PLATFORM.get().is_some()
}
