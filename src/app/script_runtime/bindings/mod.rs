//! Helper bindings for the script sandbox.
//!
//! Generated scripts see exactly five global names, registered here:
//!
//! - `ui` - the host UI handle (widgets, layout, tables)
//! - `DataTable` - column-table constructor
//! - `num` - numeric-array helpers
//! - `plotx` - expression-style chart builders (line/bar/scatter/area)
//! - `plot` - figure-style chart builders (pie/histogram)
//!
//! Widget and chart calls do not draw anything themselves; they record
//! [`WidgetOp`] values into shared [`SurfaceBuffers`], and the egui surface
//! draws the recorded ops after the pass. Input widgets echo the host-side
//! value for their id back to the script, which is what makes re-running the
//! whole program on every interaction behave like an interactive tool.

#![warn(clippy::all, rust_2018_idioms)]

pub mod num;
pub mod plots;
pub mod table;
pub mod ui;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Host-side value of one interactive widget, keyed by widget id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputValue {
    Number(f64),
    Toggle(bool),
}

/// A table emitted through `ui.table(...)`: column names plus display rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Chart families the two plotting modules can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotKind {
    Line,
    Bar,
    Scatter,
    Area,
    Pie,
    Histogram,
}

/// One chart to draw. `labels` carries category names (bar/pie); `x`/`y`
/// carry numeric series; histograms keep raw samples in `y` and bin at draw
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    pub kind: PlotKind,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub bins: Option<usize>,
}

/// One recorded surface operation, in script emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetOp {
    Heading(String),
    Text(String),
    Metric { label: String, value: String },
    Separator,
    BeginColumns(usize),
    EndColumns,
    Slider {
        id: String,
        label: String,
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    },
    NumberInput { id: String, label: String, value: f64 },
    Checkbox { id: String, label: String, value: bool },
    Table(TableSpec),
    Plot(PlotSpec),
}

/// Buffers shared between the host and the V8 callbacks for one execution:
/// recorded ops out, current widget values in.
#[derive(Debug, Clone)]
pub struct SurfaceBuffers {
    ops: Rc<RefCell<Vec<WidgetOp>>>,
    inputs: Rc<RefCell<HashMap<String, InputValue>>>,
}

impl SurfaceBuffers {
    pub fn new(inputs: HashMap<String, InputValue>) -> Self {
        Self {
            ops: Rc::new(RefCell::new(Vec::new())),
            inputs: Rc::new(RefCell::new(inputs)),
        }
    }

    /// Drain the recorded ops after an execution.
    pub fn take_ops(&self) -> Vec<WidgetOp> {
        std::mem::take(&mut *self.ops.borrow_mut())
    }

    pub(crate) fn record(&self, op: WidgetOp) {
        self.ops.borrow_mut().push(op);
    }

    pub(crate) fn input(&self, id: &str) -> Option<InputValue> {
        self.inputs.borrow().get(id).copied()
    }

    /// Recover the buffers inside a callback from its data slot.
    pub(crate) fn from_args(args: &v8::FunctionCallbackArguments<'_>) -> Self {
        let external = v8::Local::<v8::External>::try_from(args.data())
            .expect("binding callback registered without SurfaceBuffers data");
        let ptr = external.value() as *mut SurfaceBuffers;
        // The box behind the External lives as long as the isolate
        unsafe { (*ptr).clone() }
    }
}

/// Register the five helper globals into a context.
pub fn register_bindings(
    scope: &mut v8::ContextScope<'_, '_, v8::HandleScope<'_>>,
    buffers: &SurfaceBuffers,
) -> Result<()> {
    // Callback data shared by every stateful binding; the box lives as long
    // as the isolate
    let buffers_box = Box::new(buffers.clone());
    let buffers_ptr = Box::into_raw(buffers_box) as *mut std::ffi::c_void;
    let data = v8::External::new(scope, buffers_ptr);

    ui::register(scope, data)?;
    plots::register(scope, data)?;
    table::register(scope)?;
    num::register(scope)?;

    Ok(())
}

/// Documentation for every bound helper, embedded into the code-mode prompt
/// so the model knows the exact API surface.
pub fn api_documentation() -> String {
    let mut docs = String::new();

    docs.push_str("# Available script APIs\n\n");
    docs.push_str("These are the only globals in your execution environment. ");
    docs.push_str("All functions are synchronous.\n\n");

    docs.push_str("## ui - host UI handle\n\n");
    docs.push_str(&ui::documentation());

    docs.push_str("\n## DataTable - column table constructor\n\n");
    docs.push_str(&table::documentation());

    docs.push_str("\n## num - numeric arrays\n\n");
    docs.push_str(&num::documentation());

    docs.push_str("\n## plotx / plot - charts\n\n");
    docs.push_str(&plots::documentation());

    docs
}

// --- Shared argument extraction -------------------------------------------
//
// Binding callbacks validate their own arguments and throw a JavaScript
// TypeError on mismatch, so bad generated code surfaces as a contained
// runtime error instead of silently recording garbage.

pub(crate) fn throw_type_error(scope: &mut v8::PinScope<'_, '_>, message: &str) {
    let msg = v8::String::new(scope, message).unwrap();
    let exception = v8::Exception::type_error(scope, msg);
    scope.throw_exception(exception);
}

pub(crate) fn string_arg(
    scope: &mut v8::PinScope<'_, '_>,
    args: &v8::FunctionCallbackArguments<'_>,
    index: i32,
) -> Option<String> {
    let value = args.get(index);
    if value.is_undefined() {
        return None;
    }
    value.to_string(scope).map(|s| s.to_rust_string_lossy(scope))
}

pub(crate) fn number_arg(
    scope: &mut v8::PinScope<'_, '_>,
    args: &v8::FunctionCallbackArguments<'_>,
    index: i32,
) -> Option<f64> {
    let value = args.get(index);
    if value.is_undefined() {
        return None;
    }
    value.number_value(scope).filter(|n| n.is_finite())
}

pub(crate) fn f64_array_arg(
    scope: &mut v8::PinScope<'_, '_>,
    args: &v8::FunctionCallbackArguments<'_>,
    index: i32,
) -> Option<Vec<f64>> {
    let array = v8::Local::<v8::Array>::try_from(args.get(index)).ok()?;
    let mut out = Vec::with_capacity(array.length() as usize);
    for i in 0..array.length() {
        let element = array.get_index(scope, i)?;
        out.push(element.number_value(scope).unwrap_or(f64::NAN));
    }
    Some(out)
}

pub(crate) fn string_array_arg(
    scope: &mut v8::PinScope<'_, '_>,
    args: &v8::FunctionCallbackArguments<'_>,
    index: i32,
) -> Option<Vec<String>> {
    let array = v8::Local::<v8::Array>::try_from(args.get(index)).ok()?;
    let mut out = Vec::with_capacity(array.length() as usize);
    for i in 0..array.length() {
        let element = array.get_index(scope, i)?;
        let rendered = element
            .to_string(scope)
            .map(|s| s.to_rust_string_lossy(scope))?;
        out.push(rendered);
    }
    Some(out)
}
