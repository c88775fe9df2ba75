//! The `ui` binding: the host UI handle.
//!
//! Output calls (heading, text, metric, table, separator) record ops for the
//! surface to draw. Input calls (slider, numberInput, checkbox) additionally
//! return the host-side value for their widget id, so a re-run sees what the
//! user last set. `ui.columns(n, fn)` brackets the ops recorded by `fn` so
//! the surface can lay them out side by side.

#![warn(clippy::all, rust_2018_idioms)]

use anyhow::Result;

use super::{
    number_arg, string_arg, throw_type_error, InputValue, SurfaceBuffers, TableSpec, WidgetOp,
};

/// Register the `ui` global.
pub fn register(
    scope: &mut v8::ContextScope<'_, '_, v8::HandleScope<'_>>,
    data: v8::Local<'_, v8::External>,
) -> Result<()> {
    let global = scope.get_current_context().global(scope);

    let ui_key = v8::String::new(scope, "ui").unwrap();
    let ui_obj = v8::Object::new(scope);

    // One block per method; the builder only accepts zero-sized fn items
    macro_rules! bind_method {
        ($name:literal, $callback:ident) => {{
            let function = v8::Function::builder($callback)
                .data(data.into())
                .build(scope)
                .unwrap();
            let key = v8::String::new(scope, $name).unwrap();
            ui_obj.set(scope, key.into(), function.into());
        }};
    }

    bind_method!("heading", heading_callback);
    bind_method!("text", text_callback);
    bind_method!("metric", metric_callback);
    bind_method!("separator", separator_callback);
    bind_method!("columns", columns_callback);
    bind_method!("slider", slider_callback);
    bind_method!("numberInput", number_input_callback);
    bind_method!("checkbox", checkbox_callback);
    bind_method!("table", table_callback);

    global.set(scope, ui_key.into(), ui_obj.into());
    Ok(())
}

fn heading_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);
    match string_arg(scope, &args, 0) {
        Some(text) => buffers.record(WidgetOp::Heading(text)),
        None => throw_type_error(scope, "ui.heading(text) expects a string"),
    }
}

fn text_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);
    match string_arg(scope, &args, 0) {
        Some(text) => buffers.record(WidgetOp::Text(text)),
        None => throw_type_error(scope, "ui.text(text) expects a string"),
    }
}

fn metric_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);

    let Some(label) = string_arg(scope, &args, 0) else {
        throw_type_error(scope, "ui.metric(label, value) expects a label");
        return;
    };

    // Numbers get compact formatting; anything else renders as a string
    let value_arg = args.get(1);
    let value = if value_arg.is_number() {
        value_arg
            .number_value(scope)
            .map(format_number)
            .unwrap_or_default()
    } else {
        value_arg
            .to_string(scope)
            .map(|s| s.to_rust_string_lossy(scope))
            .unwrap_or_default()
    };

    buffers.record(WidgetOp::Metric { label, value });
}

fn separator_callback(
    _scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    SurfaceBuffers::from_args(&args).record(WidgetOp::Separator);
}

fn columns_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);

    let count = match number_arg(scope, &args, 0) {
        Some(n) if n >= 1.0 => (n as usize).min(8),
        _ => {
            throw_type_error(scope, "ui.columns(count, fn) expects a positive count");
            return;
        }
    };

    let Ok(body) = v8::Local::<v8::Function>::try_from(args.get(1)) else {
        throw_type_error(scope, "ui.columns(count, fn) expects a function");
        return;
    };

    buffers.record(WidgetOp::BeginColumns(count));

    let receiver = v8::undefined(scope);
    let result = body.call(scope, receiver.into(), &[]);

    // Close the group even when the body threw, so the surface can still lay
    // out what was recorded; the exception keeps propagating
    buffers.record(WidgetOp::EndColumns);

    let _ = result;
}

fn slider_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);

    let (Some(label), Some(min), Some(max), Some(default)) = (
        string_arg(scope, &args, 0),
        number_arg(scope, &args, 1),
        number_arg(scope, &args, 2),
        number_arg(scope, &args, 3),
    ) else {
        throw_type_error(
            scope,
            "ui.slider(label, min, max, default, step?) expects a label and three numbers",
        );
        return;
    };

    if max <= min {
        throw_type_error(scope, "ui.slider: max must be greater than min");
        return;
    }

    let step = number_arg(scope, &args, 4)
        .filter(|s| *s > 0.0)
        .unwrap_or((max - min) / 100.0);

    let id = label.clone();
    let value = match buffers.input(&id) {
        Some(InputValue::Number(current)) => current.clamp(min, max),
        _ => default.clamp(min, max),
    };

    buffers.record(WidgetOp::Slider {
        id,
        label,
        min,
        max,
        step,
        value,
    });

    rv.set(v8::Number::new(scope, value).into());
}

fn number_input_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);

    let (Some(label), Some(default)) =
        (string_arg(scope, &args, 0), number_arg(scope, &args, 1))
    else {
        throw_type_error(
            scope,
            "ui.numberInput(label, default) expects a label and a number",
        );
        return;
    };

    let id = label.clone();
    let value = match buffers.input(&id) {
        Some(InputValue::Number(current)) => current,
        _ => default,
    };

    buffers.record(WidgetOp::NumberInput { id, label, value });

    rv.set(v8::Number::new(scope, value).into());
}

fn checkbox_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);

    let Some(label) = string_arg(scope, &args, 0) else {
        throw_type_error(scope, "ui.checkbox(label, default?) expects a label");
        return;
    };

    let default = args.get(1).is_true();

    let id = label.clone();
    let value = match buffers.input(&id) {
        Some(InputValue::Toggle(current)) => current,
        _ => default,
    };

    buffers.record(WidgetOp::Checkbox { id, label, value });

    rv.set(v8::Boolean::new(scope, value).into());
}

fn table_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    _rv: v8::ReturnValue<'_>,
) {
    let buffers = SurfaceBuffers::from_args(&args);

    let Ok(object) = v8::Local::<v8::Object>::try_from(args.get(0)) else {
        throw_type_error(scope, "ui.table(table) expects a DataTable");
        return;
    };

    let columns_key = v8::String::new(scope, "columns").unwrap();
    let rows_key = v8::String::new(scope, "rows").unwrap();

    let columns = object
        .get(scope, columns_key.into())
        .and_then(|v| value_to_string_array(scope, v));
    let rows = object
        .get(scope, rows_key.into())
        .and_then(|v| value_to_rows(scope, v));

    match (columns, rows) {
        (Some(columns), Some(rows)) => {
            buffers.record(WidgetOp::Table(TableSpec { columns, rows }));
        }
        _ => throw_type_error(scope, "ui.table(table) expects a DataTable"),
    }
}

fn value_to_string_array(
    scope: &mut v8::PinScope<'_, '_>,
    value: v8::Local<'_, v8::Value>,
) -> Option<Vec<String>> {
    let array = v8::Local::<v8::Array>::try_from(value).ok()?;
    let mut out = Vec::with_capacity(array.length() as usize);
    for i in 0..array.length() {
        let element = array.get_index(scope, i)?;
        out.push(render_cell(scope, element));
    }
    Some(out)
}

fn value_to_rows(
    scope: &mut v8::PinScope<'_, '_>,
    value: v8::Local<'_, v8::Value>,
) -> Option<Vec<Vec<String>>> {
    let array = v8::Local::<v8::Array>::try_from(value).ok()?;
    let mut rows = Vec::with_capacity(array.length() as usize);
    for i in 0..array.length() {
        let row = array.get_index(scope, i)?;
        rows.push(value_to_string_array(scope, row)?);
    }
    Some(rows)
}

fn render_cell(scope: &mut v8::PinScope<'_, '_>, value: v8::Local<'_, v8::Value>) -> String {
    if value.is_number() {
        value
            .number_value(scope)
            .map(format_number)
            .unwrap_or_default()
    } else {
        value
            .to_string(scope)
            .map(|s| s.to_rust_string_lossy(scope))
            .unwrap_or_default()
    }
}

/// Compact display formatting: integers without a fraction, everything else
/// trimmed to at most four decimals.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let formatted = format!("{:.4}", n);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Model-facing documentation for the `ui` helper.
pub fn documentation() -> String {
    r#"
### ui.heading(text) / ui.text(text)

Emit a heading or a paragraph of body text.

### ui.metric(label, value)

Emit a labelled key figure. Numbers are formatted compactly.

```javascript
ui.metric("Monthly Payment", payment);
```

### ui.separator()

Emit a horizontal rule.

### ui.columns(count, fn)

Lay the widgets emitted inside `fn` out across `count` columns.

```javascript
ui.columns(2, () => {
    ui.metric("Total Interest", interest);
    ui.metric("Total Paid", total);
});
```

### ui.slider(label, min, max, default, step?) -> number

Interactive slider. Returns the current value; the program re-runs whenever
the user drags it. The label doubles as the widget id, so keep labels unique.

### ui.numberInput(label, default) -> number

Interactive numeric field. Returns the current value.

### ui.checkbox(label, default?) -> boolean

Interactive toggle. Returns the current state.

### ui.table(table)

Render a DataTable.

```javascript
const t = new DataTable({ Year: [1, 2, 3], Balance: [95000, 89500, 83600] });
ui.table(t);
```
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_integers() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_format_number_trims_decimals() {
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(3.14159), "3.1416");
        assert_eq!(format_number(0.2500), "0.25");
    }

    #[test]
    fn test_documentation_mentions_every_call() {
        let docs = documentation();
        for name in [
            "ui.heading",
            "ui.text",
            "ui.metric",
            "ui.separator",
            "ui.columns",
            "ui.slider",
            "ui.numberInput",
            "ui.checkbox",
            "ui.table",
        ] {
            assert!(docs.contains(name), "missing {}", name);
        }
    }
}
