//! Console capture for the script sandbox.
//!
//! Generated scripts get a `console` whose log/warn/debug output lands in a
//! stdout buffer and whose error output lands in a stderr buffer. The
//! buffers are shown under the debug toggle after a render pass.

#![warn(clippy::all, rust_2018_idioms)]

use std::cell::RefCell;
use std::rc::Rc;

/// Captured console output, shared with the V8 callbacks through
/// `Rc<RefCell<_>>` behind a `v8::External`.
#[derive(Debug, Clone)]
pub struct ConsoleBuffers {
    pub stdout: Rc<RefCell<String>>,
    pub stderr: Rc<RefCell<String>>,
}

impl ConsoleBuffers {
    pub fn new() -> Self {
        Self {
            stdout: Rc::new(RefCell::new(String::new())),
            stderr: Rc::new(RefCell::new(String::new())),
        }
    }

    pub fn get_stdout(&self) -> String {
        self.stdout.borrow().clone()
    }

    pub fn get_stderr(&self) -> String {
        self.stderr.borrow().clone()
    }

    /// Extract ConsoleBuffers from V8 External data.
    ///
    /// # Safety
    ///
    /// The data must be a valid pointer to ConsoleBuffers created via
    /// `v8::External::new`.
    unsafe fn from_v8_external(external: v8::Local<'_, v8::External>) -> Self {
        let ptr = external.value() as *mut ConsoleBuffers;
        (*ptr).clone()
    }
}

impl Default for ConsoleBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind `console.log`, `console.error`, `console.warn`, and `console.debug`
/// into the context's global scope, capturing into `buffers`.
pub fn register_console(
    scope: &mut v8::ContextScope<'_, '_, v8::HandleScope<'_>>,
    buffers: ConsoleBuffers,
) {
    let global = scope.get_current_context().global(scope);

    let console_key = v8::String::new(scope, "console").unwrap();
    let console_obj = v8::Object::new(scope);

    // The callbacks borrow the buffers through an External; the box lives as
    // long as the isolate
    let buffers_box = Box::new(buffers.clone());
    let buffers_ptr = Box::into_raw(buffers_box) as *mut std::ffi::c_void;
    let buffers_data = v8::External::new(scope, buffers_ptr);

    // console.log / console.warn / console.debug all capture to stdout
    for name in ["log", "warn", "debug"] {
        let function = v8::Function::builder(console_stdout_callback)
            .data(buffers_data.into())
            .build(scope)
            .unwrap();
        let key = v8::String::new(scope, name).unwrap();
        console_obj.set(scope, key.into(), function.into());
    }

    // console.error captures to stderr
    {
        let function = v8::Function::builder(console_stderr_callback)
            .data(buffers_data.into())
            .build(scope)
            .unwrap();
        let key = v8::String::new(scope, "error").unwrap();
        console_obj.set(scope, key.into(), function.into());
    }

    global.set(scope, console_key.into(), console_obj.into());
}

fn console_stdout_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    let data = args.data();
    let external = v8::Local::<v8::External>::try_from(data).unwrap();
    let buffers = unsafe { ConsoleBuffers::from_v8_external(external) };

    let message = format_console_args(scope, &args);
    buffers.stdout.borrow_mut().push_str(&message);
    buffers.stdout.borrow_mut().push('\n');
}

fn console_stderr_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    let data = args.data();
    let external = v8::Local::<v8::External>::try_from(data).unwrap();
    let buffers = unsafe { ConsoleBuffers::from_v8_external(external) };

    let message = format_console_args(scope, &args);
    buffers.stderr.borrow_mut().push_str(&message);
    buffers.stderr.borrow_mut().push('\n');
}

/// Render console arguments the way a browser would: strings as-is, objects
/// and arrays as JSON, everything else via toString, joined with spaces.
fn format_console_args(
    scope: &mut v8::PinScope<'_, '_>,
    args: &v8::FunctionCallbackArguments<'_>,
) -> String {
    let mut parts = Vec::with_capacity(args.length() as usize);

    for i in 0..args.length() {
        let arg = args.get(i);

        let rendered = if arg.is_string() {
            arg.to_string(scope)
                .map(|s| s.to_rust_string_lossy(scope))
                .unwrap_or_default()
        } else if arg.is_object() || arg.is_array() {
            v8::json::stringify(scope, arg)
                .map(|s| s.to_rust_string_lossy(scope))
                .unwrap_or_else(|| "[object]".to_string())
        } else {
            arg.to_string(scope)
                .map(|s| s.to_rust_string_lossy(scope))
                .unwrap_or_default()
        };

        parts.push(rendered);
    }

    parts.join(" ")
}
