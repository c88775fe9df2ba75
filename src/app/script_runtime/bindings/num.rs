//! The `num` binding: numeric-array helpers.
//!
//! Stateless convenience functions for the arithmetic generated dashboards
//! lean on: sequence builders and simple reductions. Arrays go in and out as
//! ordinary JavaScript arrays.

#![warn(clippy::all, rust_2018_idioms)]

use anyhow::Result;

use super::{f64_array_arg, number_arg, throw_type_error};

/// Register the `num` global.
pub fn register(scope: &mut v8::ContextScope<'_, '_, v8::HandleScope<'_>>) -> Result<()> {
    let global = scope.get_current_context().global(scope);

    let num_key = v8::String::new(scope, "num").unwrap();
    let num_obj = v8::Object::new(scope);

    macro_rules! bind_method {
        ($name:literal, $callback:ident) => {{
            let function = v8::Function::new(scope, $callback).unwrap();
            let key = v8::String::new(scope, $name).unwrap();
            num_obj.set(scope, key.into(), function.into());
        }};
    }

    bind_method!("range", range_callback);
    bind_method!("linspace", linspace_callback);
    bind_method!("sum", sum_callback);
    bind_method!("mean", mean_callback);
    bind_method!("min", min_callback);
    bind_method!("max", max_callback);
    bind_method!("round", round_callback);

    global.set(scope, num_key.into(), num_obj.into());
    Ok(())
}

fn set_number_array(
    scope: &mut v8::PinScope<'_, '_>,
    rv: &mut v8::ReturnValue<'_>,
    values: &[f64],
) {
    let array = v8::Array::new(scope, values.len() as i32);
    for (i, value) in values.iter().enumerate() {
        let number = v8::Number::new(scope, *value);
        array.set_index(scope, i as u32, number.into());
    }
    rv.set(array.into());
}

fn range_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let Some(count) = number_arg(scope, &args, 0).filter(|n| *n >= 0.0) else {
        throw_type_error(scope, "num.range(count) expects a non-negative number");
        return;
    };

    let values: Vec<f64> = (0..count as usize).map(|i| i as f64).collect();
    set_number_array(scope, &mut rv, &values);
}

fn linspace_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let (Some(start), Some(stop), Some(count)) = (
        number_arg(scope, &args, 0),
        number_arg(scope, &args, 1),
        number_arg(scope, &args, 2).filter(|n| *n >= 2.0),
    ) else {
        throw_type_error(
            scope,
            "num.linspace(start, stop, count) expects two numbers and a count >= 2",
        );
        return;
    };

    let count = count as usize;
    let step = (stop - start) / (count - 1) as f64;
    let values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
    set_number_array(scope, &mut rv, &values);
}

fn sum_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let Some(values) = f64_array_arg(scope, &args, 0) else {
        throw_type_error(scope, "num.sum(values) expects an array of numbers");
        return;
    };
    rv.set(v8::Number::new(scope, values.iter().sum()).into());
}

fn mean_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let Some(values) = f64_array_arg(scope, &args, 0) else {
        throw_type_error(scope, "num.mean(values) expects an array of numbers");
        return;
    };

    let mean = if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    };
    rv.set(v8::Number::new(scope, mean).into());
}

fn min_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let Some(values) = f64_array_arg(scope, &args, 0) else {
        throw_type_error(scope, "num.min(values) expects an array of numbers");
        return;
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let min = if min.is_finite() { min } else { f64::NAN };
    rv.set(v8::Number::new(scope, min).into());
}

fn max_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let Some(values) = f64_array_arg(scope, &args, 0) else {
        throw_type_error(scope, "num.max(values) expects an array of numbers");
        return;
    };

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max = if max.is_finite() { max } else { f64::NAN };
    rv.set(v8::Number::new(scope, max).into());
}

fn round_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let Some(value) = number_arg(scope, &args, 0) else {
        throw_type_error(scope, "num.round(value, digits?) expects a number");
        return;
    };

    let digits = number_arg(scope, &args, 1).unwrap_or(0.0).max(0.0) as u32;
    let factor = 10f64.powi(digits as i32);
    rv.set(v8::Number::new(scope, (value * factor).round() / factor).into());
}

/// Model-facing documentation for `num`.
pub fn documentation() -> String {
    r#"
### num.range(count) -> number[]

Integers 0..count (exclusive).

### num.linspace(start, stop, count) -> number[]

`count` evenly spaced values from start to stop inclusive (count >= 2).

### num.sum(values) / num.mean(values) / num.min(values) / num.max(values) -> number

Reductions over an array of numbers. Empty arrays yield 0 for sum and NaN
for the others.

### num.round(value, digits?) -> number

Round to `digits` decimal places (default 0).

```javascript
const months = num.range(360);
const rate = ui.slider("Rate %", 0.5, 12, 6.5) / 100 / 12;
const payment = num.round(principal * rate / (1 - Math.pow(1 + rate, -360)), 2);
```
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documentation_mentions_every_call() {
        let docs = documentation();
        for name in [
            "num.range",
            "num.linspace",
            "num.sum",
            "num.mean",
            "num.min",
            "num.max",
            "num.round",
        ] {
            assert!(docs.contains(name), "missing {}", name);
        }
    }
}
