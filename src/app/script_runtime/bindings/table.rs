//! The `DataTable` binding: a column-table constructor.
//!
//! `new DataTable({ name: [values...], ... })` validates the column map and
//! returns a plain object `{ columns, rows, length }` with rows in column
//! order. Property insertion order is preserved, so columns display in the
//! order the script wrote them.

#![warn(clippy::all, rust_2018_idioms)]

use anyhow::Result;

use super::throw_type_error;

/// Register the `DataTable` global.
pub fn register(scope: &mut v8::ContextScope<'_, '_, v8::HandleScope<'_>>) -> Result<()> {
    let global = scope.get_current_context().global(scope);

    let constructor = v8::Function::new(scope, data_table_callback)
        .expect("Failed to create DataTable function");

    let name = v8::String::new(scope, "DataTable").expect("Failed to create name string");
    global.set(scope, name.into(), constructor.into());

    Ok(())
}

fn data_table_callback(
    scope: &mut v8::PinScope<'_, '_>,
    args: v8::FunctionCallbackArguments<'_>,
    mut rv: v8::ReturnValue<'_>,
) {
    let spec_value = args.get(0);
    if spec_value.is_array() || !spec_value.is_object() {
        throw_type_error(scope, "DataTable({column: [values...]}) expects an object");
        return;
    }
    let spec = v8::Local::<v8::Object>::try_from(spec_value).unwrap();

    let Some(names) = spec.get_own_property_names(scope, v8::GetPropertyNamesArgs::default())
    else {
        throw_type_error(scope, "DataTable({column: [values...]}) expects an object");
        return;
    };

    if names.length() == 0 {
        throw_type_error(scope, "DataTable expects at least one column");
        return;
    }

    // Collect column arrays up front so length mismatches fail before any
    // output object exists
    let mut columns: Vec<(v8::Local<'_, v8::Value>, v8::Local<'_, v8::Array>)> =
        Vec::with_capacity(names.length() as usize);
    let mut row_count: Option<u32> = None;

    for i in 0..names.length() {
        let Some(name) = names.get_index(scope, i) else {
            return;
        };
        let Some(value) = spec.get(scope, name) else {
            return;
        };

        let Ok(column) = v8::Local::<v8::Array>::try_from(value) else {
            throw_type_error(scope, "DataTable columns must be arrays");
            return;
        };

        match row_count {
            None => row_count = Some(column.length()),
            Some(expected) if expected != column.length() => {
                throw_type_error(scope, "DataTable columns must all have the same length");
                return;
            }
            Some(_) => {}
        }

        columns.push((name, column));
    }

    let row_count = row_count.unwrap_or(0);

    let columns_out = v8::Array::new(scope, columns.len() as i32);
    for (i, (name, _)) in columns.iter().enumerate() {
        columns_out.set_index(scope, i as u32, *name);
    }

    let rows_out = v8::Array::new(scope, row_count as i32);
    for r in 0..row_count {
        let row = v8::Array::new(scope, columns.len() as i32);
        for (c, (_, column)) in columns.iter().enumerate() {
            let Some(cell) = column.get_index(scope, r) else {
                return;
            };
            row.set_index(scope, c as u32, cell);
        }
        rows_out.set_index(scope, r, row.into());
    }

    let result = v8::Object::new(scope);

    let columns_key = v8::String::new(scope, "columns").unwrap();
    result.set(scope, columns_key.into(), columns_out.into());

    let rows_key = v8::String::new(scope, "rows").unwrap();
    result.set(scope, rows_key.into(), rows_out.into());

    let length_key = v8::String::new(scope, "length").unwrap();
    let length_value = v8::Number::new(scope, row_count as f64);
    result.set(scope, length_key.into(), length_value.into());

    rv.set(result.into());
}

/// Model-facing documentation for `DataTable`.
pub fn documentation() -> String {
    r#"
### new DataTable({column: [values...], ...}) -> table

Build a table from named columns. All columns must be arrays of equal
length. The result has `columns` (names, in insertion order), `rows`
(row-major cell values), and `length` (row count). Pass it to `ui.table`.

```javascript
const schedule = new DataTable({
    Year: num.range(years).map(y => y + 1),
    Payment: payments,
    Balance: balances,
});
ui.table(schedule);
console.log(`rows: ${schedule.length}`);
```

**Edge cases:**
- Mismatched column lengths throw a TypeError
- An empty object throws a TypeError
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documentation_shape() {
        let docs = documentation();
        assert!(docs.contains("new DataTable"));
        assert!(docs.contains("ui.table"));
        assert!(docs.contains("Edge cases"));
    }
}
