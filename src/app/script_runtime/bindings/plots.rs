//! The `plotx` and `plot` bindings: chart builders.
//!
//! `plotx` is the expression-style module (line/bar/scatter/area over
//! series); `plot` is the figure-style module (pie/histogram). Both record
//! a [`PlotSpec`] op; the surface draws the chart after the pass.

#![warn(clippy::all, rust_2018_idioms)]

use anyhow::Result;

use super::{
    f64_array_arg, number_arg, string_arg, string_array_arg, throw_type_error, PlotKind,
    PlotSpec, SurfaceBuffers, WidgetOp,
};

/// Register the `plotx` and `plot` globals.
pub fn register(
    scope: &mut v8::ContextScope<'_, '_, v8::HandleScope<'_>>,
    data: v8::Local<'_, v8::External>,
) -> Result<()> {
    let global = scope.get_current_context().global(scope);

    macro_rules! bind_method {
        ($obj:ident, $name:literal, $callback:ident) => {{
            let function = v8::Function::builder($callback)
                .data(data.into())
                .build(scope)
                .unwrap();
            let key = v8::String::new(scope, $name).unwrap();
            $obj.set(scope, key.into(), function.into());
        }};
    }

    let plotx_key = v8::String::new(scope, "plotx").unwrap();
    let plotx_obj = v8::Object::new(scope);
    bind_method!(plotx_obj, "line", line_callback);
    bind_method!(plotx_obj, "bar", bar_callback);
    bind_method!(plotx_obj, "scatter", scatter_callback);
    bind_method!(plotx_obj, "area", area_callback);
    global.set(scope, plotx_key.into(), plotx_obj.into());

    let plot_key = v8::String::new(scope, "plot").unwrap();
    let plot_obj = v8::Object::new(scope);
    bind_method!(plot_obj, "pie", pie_callback);
    bind_method!(plot_obj, "hist", hist_callback);
    global.set(scope, plot_key.into(), plot_obj.into());

    Ok(())
}

/// Shared body for the x/y chart calls (line, scatter, area).
fn record_xy_chart(
    scope: &mut v8::PinScope<'_, '_>,
    args: &v8::FunctionCallbackArguments<'_>,
    kind: PlotKind,
    signature: &str,
) {
    let buffers = SurfaceBuffers::from_args(args);

    let (Some(x), Some(y)) = (f64_array_arg(scope, args, 0), f64_array_arg(scope, args, 1))
    else {
        throw_type_error(scope, signature);
        return;
    };

    if x.len() != y.len() {
        throw_type_error(scope, "x and y must have the same length");
        return;
    }

    let title = string_arg(scope, args, 2);

    buffers.record(WidgetOp::Plot(PlotSpec {
        kind,
        title,
        labels: Vec::new(),
        x,
        y,
        bins: None,
    }));
}

fn line_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    record_xy_chart(
        scope,
        &args,
        PlotKind::Line,
        "plotx.line(x, y, title?) expects two number arrays",
    );
}

fn scatter_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    record_xy_chart(
        scope,
        &args,
        PlotKind::Scatter,
        "plotx.scatter(x, y, title?) expects two number arrays",
    );
}

fn area_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    record_xy_chart(
        scope,
        &args,
        PlotKind::Area,
        "plotx.area(x, y, title?) expects two number arrays",
    );
}

/// Shared body for the labelled-value charts (bar, pie).
fn record_labelled_chart(
    scope: &mut v8::PinScope<'_, '_>,
    args: &v8::FunctionCallbackArguments<'_>,
    kind: PlotKind,
    signature: &str,
) {
    let buffers = SurfaceBuffers::from_args(args);

    let (Some(labels), Some(values)) = (
        string_array_arg(scope, args, 0),
        f64_array_arg(scope, args, 1),
    ) else {
        throw_type_error(scope, signature);
        return;
    };

    if labels.len() != values.len() {
        throw_type_error(scope, "labels and values must have the same length");
        return;
    }

    let title = string_arg(scope, args, 2);

    buffers.record(WidgetOp::Plot(PlotSpec {
        kind,
        title,
        labels,
        x: Vec::new(),
        y: values,
        bins: None,
    }));
}

fn bar_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    record_labelled_chart(
        scope,
        &args,
        PlotKind::Bar,
        "plotx.bar(labels, values, title?) expects a string array and a number array",
    );
}

fn pie_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    record_labelled_chart(
        scope,
        &args,
        PlotKind::Pie,
        "plot.pie(labels, values, title?) expects a string array and a number array",
    );
}

fn hist_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);

    let Some(values) = f64_array_arg(scope, &args, 0) else {
        throw_type_error(
            scope,
            "plot.hist(values, bins?, title?) expects a number array",
        );
        return;
    };

    let bins = number_arg(scope, &args, 1)
        .filter(|b| *b >= 1.0)
        .map(|b| (b as usize).min(100));
    let title = string_arg(scope, &args, 2);

    buffers.record(WidgetOp::Plot(PlotSpec {
        kind: PlotKind::Histogram,
        title,
        labels: Vec::new(),
        x: Vec::new(),
        y: values,
        bins,
    }));
}

/// Model-facing documentation for the plotting helpers.
pub fn documentation() -> String {
    r#"
### plotx.line(x, y, title?) / plotx.scatter(x, y, title?) / plotx.area(x, y, title?)

Draw an x/y chart from two equal-length number arrays.

### plotx.bar(labels, values, title?)

Draw a bar chart from category labels and values.

### plot.pie(labels, values, title?)

Draw a pie chart of the share of each labelled value.

### plot.hist(values, bins?, title?)

Draw a histogram of raw samples (default 10 bins).

```javascript
plotx.line(num.range(years), balances, "Remaining Balance");
plot.pie(["Interest", "Principal"], [totalInterest, principal], "Cost Split");
```
"#
    .to_string()
}
