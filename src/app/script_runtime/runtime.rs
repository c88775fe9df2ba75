//! Script execution for code-mode artifacts.
//!
//! Each render pass gets a fresh isolate with a heap limit and a wall-clock
//! watchdog, the captured `console`, and the five helper bindings - nothing
//! else. Errors never leave the pass: compile and runtime failures come back
//! inside [`ExecutionResult`] with whatever ops the script managed to record
//! first, matching how a partially drawn tool looks when its code trips.

#![warn(clippy::all, rust_2018_idioms)]

use std::collections::HashMap;
use std::pin::pin;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use super::bindings::{register_bindings, InputValue, SurfaceBuffers, WidgetOp};
use super::console::{register_console, ConsoleBuffers};

/// Limits for one execution.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum heap size in bytes (default: 128MB)
    pub max_heap_size_bytes: usize,

    /// Execution timeout (default: 10 seconds)
    pub timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_heap_size_bytes: 128 * 1024 * 1024,
            timeout: Duration::from_secs(10),
        }
    }
}

/// What one execution produced.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether the script ran to completion.
    pub success: bool,

    /// Exception text when it did not (compile error, runtime error, timeout).
    pub error: Option<String>,

    /// Captured console.log/warn/debug output.
    pub stdout: String,

    /// Captured console.error output.
    pub stderr: String,

    /// Surface ops recorded before completion or failure, in emission order.
    pub ops: Vec<WidgetOp>,

    /// Execution time in milliseconds.
    pub execution_time_ms: u64,
}

/// V8-backed script runtime. Stateless between executions - every call gets
/// a fresh isolate.
pub struct ScriptRuntime {
    config: RuntimeConfig,
}

impl ScriptRuntime {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
        }
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Execute a generated script against the current widget values.
    ///
    /// The script's completion value is ignored; its observable output is
    /// the recorded ops and console text. Errors are data, not `Err` - the
    /// `Err` path here is reserved for V8 itself failing (e.g. source too
    /// large to materialize).
    pub fn execute(
        &self,
        code: &str,
        inputs: &HashMap<String, InputValue>,
    ) -> Result<ExecutionResult> {
        let start_time = Instant::now();

        let surface = SurfaceBuffers::new(inputs.clone());
        let console = ConsoleBuffers::new();

        let mut params = v8::CreateParams::default();
        params = params.heap_limits(0, self.config.max_heap_size_bytes);

        let mut isolate = v8::Isolate::new(params);

        // Watchdog: terminate the isolate if the script runs too long
        let isolate_handle = isolate.thread_safe_handle();
        let timeout = self.config.timeout;
        let _timeout_thread = thread::spawn(move || {
            thread::sleep(timeout);
            isolate_handle.terminate_execution();
        });

        let scope = pin!(v8::HandleScope::new(&mut isolate));
        let scope = &mut scope.init();
        let context = v8::Context::new(scope, Default::default());
        let scope = &mut v8::ContextScope::new(scope, context);

        register_console(scope, console.clone());

        if let Err(e) = register_bindings(scope, &surface) {
            return Ok(ExecutionResult {
                success: false,
                error: Some(format!("Failed to register bindings: {}", e)),
                stdout: console.get_stdout(),
                stderr: console.get_stderr(),
                ops: surface.take_ops(),
                execution_time_ms: start_time.elapsed().as_millis() as u64,
            });
        }

        let code_str = v8::String::new(scope, code)
            .ok_or_else(|| anyhow!("Failed to create V8 string from code"))?;

        let scope = pin!(v8::TryCatch::new(scope));
        let scope = &mut scope.init();

        let script = match v8::Script::compile(scope, code_str, None) {
            Some(script) => script,
            None => {
                let error = if scope.has_terminated() {
                    format!("Execution terminated (timeout: {:?})", timeout)
                } else {
                    scope
                        .exception()
                        .and_then(|exception| exception.to_string(scope))
                        .map(|s| s.to_rust_string_lossy(scope))
                        .unwrap_or_else(|| "unknown script error".to_string())
                };
                return Ok(ExecutionResult {
                    success: false,
                    error: Some(error),
                    stdout: console.get_stdout(),
                    stderr: console.get_stderr(),
                    ops: surface.take_ops(),
                    execution_time_ms: start_time.elapsed().as_millis() as u64,
                });
            }
        };

        if script.run(scope).is_none() {
            let error = if scope.has_terminated() {
                format!("Execution terminated (timeout: {:?})", timeout)
            } else {
                scope
                    .exception()
                    .and_then(|exception| exception.to_string(scope))
                    .map(|s| s.to_rust_string_lossy(scope))
                    .unwrap_or_else(|| "unknown script error".to_string())
            };
            return Ok(ExecutionResult {
                success: false,
                error: Some(error),
                stdout: console.get_stdout(),
                stderr: console.get_stderr(),
                ops: surface.take_ops(),
                execution_time_ms: start_time.elapsed().as_millis() as u64,
            });
        }

        Ok(ExecutionResult {
            success: true,
            error: None,
            stdout: console.get_stdout(),
            stderr: console.get_stderr(),
            ops: surface.take_ops(),
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

impl Default for ScriptRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::script_runtime::bindings::{PlotKind, TableSpec};
    use crate::app::script_runtime::initialize_v8_platform;

    fn run(code: &str) -> ExecutionResult {
        run_with_inputs(code, &HashMap::new())
    }

    fn run_with_inputs(code: &str, inputs: &HashMap<String, InputValue>) -> ExecutionResult {
        let _ = initialize_v8_platform();
        ScriptRuntime::new().execute(code, inputs).unwrap()
    }

    #[test]
    fn test_plain_script_succeeds() {
        let result = run("const x = 2 + 2;");
        assert!(result.success);
        assert!(result.error.is_none());
        assert!(result.ops.is_empty());
    }

    #[test]
    fn test_output_widgets_recorded_in_order() {
        let result = run(
            r#"
            ui.heading("Budget");
            ui.text("monthly view");
            ui.separator();
            ui.metric("Total", 1234.5);
        "#,
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(result.ops.len(), 4);
        assert_eq!(result.ops[0], WidgetOp::Heading("Budget".to_string()));
        assert_eq!(
            result.ops[3],
            WidgetOp::Metric {
                label: "Total".to_string(),
                value: "1234.5".to_string(),
            }
        );
    }

    #[test]
    fn test_undeclared_name_is_contained() {
        let result = run("ui.text(definitelyNotBound);");

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(
            error.contains("definitelyNotBound") && error.contains("not defined"),
            "unexpected error: {}",
            error
        );
    }

    #[test]
    fn test_runtime_recovers_after_error() {
        let bad = run("nope();");
        assert!(!bad.success);

        let good = run("ui.text('still alive');");
        assert!(good.success);
        assert_eq!(good.ops.len(), 1);
    }

    #[test]
    fn test_ops_before_error_are_kept() {
        let result = run(
            r#"
            ui.heading("partial");
            missingFunction();
        "#,
        );

        assert!(!result.success);
        assert_eq!(result.ops, vec![WidgetOp::Heading("partial".to_string())]);
    }

    #[test]
    fn test_compile_error_reported() {
        let result = run("const = ;");
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Unexpected token"));
    }

    #[test]
    fn test_timeout_terminates_infinite_loop() {
        let _ = initialize_v8_platform();
        let runtime = ScriptRuntime::with_config(RuntimeConfig {
            timeout: Duration::from_millis(100),
            ..Default::default()
        });

        let result = runtime.execute("while (true) {}", &HashMap::new()).unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().contains("timeout"));
        assert!(result.execution_time_ms >= 100);
    }

    #[test]
    fn test_console_capture_split_streams() {
        let result = run(
            r#"
            console.log("plain", 42);
            console.warn("careful");
            console.error("broken");
        "#,
        );

        assert!(result.success);
        assert!(result.stdout.contains("plain 42"));
        assert!(result.stdout.contains("careful"));
        assert!(result.stderr.contains("broken"));
    }

    #[test]
    fn test_slider_returns_default_without_input() {
        let result = run(
            r#"
            const rate = ui.slider("Rate", 0, 10, 2.5);
            ui.metric("rate", rate);
        "#,
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(
            result.ops[1],
            WidgetOp::Metric {
                label: "rate".to_string(),
                value: "2.5".to_string(),
            }
        );
    }

    #[test]
    fn test_slider_echoes_host_input() {
        let mut inputs = HashMap::new();
        inputs.insert("Rate".to_string(), InputValue::Number(7.0));

        let result = run_with_inputs(
            r#"
            const rate = ui.slider("Rate", 0, 10, 2.5);
            ui.metric("rate", rate);
        "#,
            &inputs,
        );

        assert!(result.success);
        assert_eq!(
            result.ops[1],
            WidgetOp::Metric {
                label: "rate".to_string(),
                value: "7".to_string(),
            }
        );
    }

    #[test]
    fn test_slider_clamps_host_input_to_range() {
        let mut inputs = HashMap::new();
        inputs.insert("Rate".to_string(), InputValue::Number(99.0));

        let result = run_with_inputs("ui.slider('Rate', 0, 10, 5);", &inputs);

        assert!(result.success);
        match &result.ops[0] {
            WidgetOp::Slider { value, .. } => assert_eq!(*value, 10.0),
            other => panic!("expected slider op, got {:?}", other),
        }
    }

    #[test]
    fn test_checkbox_round_trip() {
        let mut inputs = HashMap::new();
        inputs.insert("Show detail".to_string(), InputValue::Toggle(true));

        let result = run_with_inputs(
            r#"
            const detail = ui.checkbox("Show detail", false);
            if (detail) { ui.text("details!"); }
        "#,
            &inputs,
        );

        assert!(result.success);
        assert!(result
            .ops
            .contains(&WidgetOp::Text("details!".to_string())));
    }

    #[test]
    fn test_columns_bracket_recorded_ops() {
        let result = run(
            r#"
            ui.columns(2, () => {
                ui.metric("A", 1);
                ui.metric("B", 2);
            });
        "#,
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(result.ops.first(), Some(&WidgetOp::BeginColumns(2)));
        assert_eq!(result.ops.last(), Some(&WidgetOp::EndColumns));
        assert_eq!(result.ops.len(), 4);
    }

    #[test]
    fn test_columns_error_inside_body_is_contained() {
        let result = run(
            r#"
            ui.columns(2, () => {
                ui.metric("A", 1);
                boom();
            });
        "#,
        );

        assert!(!result.success);
        // The group is still closed around what was emitted
        assert_eq!(result.ops.first(), Some(&WidgetOp::BeginColumns(2)));
        assert_eq!(result.ops.last(), Some(&WidgetOp::EndColumns));
    }

    #[test]
    fn test_data_table_through_ui_table() {
        let result = run(
            r#"
            const t = new DataTable({ Year: [1, 2], Balance: [100, 50.25] });
            ui.table(t);
        "#,
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(
            result.ops[0],
            WidgetOp::Table(TableSpec {
                columns: vec!["Year".to_string(), "Balance".to_string()],
                rows: vec![
                    vec!["1".to_string(), "100".to_string()],
                    vec!["2".to_string(), "50.25".to_string()],
                ],
            })
        );
    }

    #[test]
    fn test_data_table_rejects_ragged_columns() {
        let result = run("new DataTable({ A: [1, 2], B: [1] });");

        assert!(!result.success);
        assert!(result.error.unwrap().contains("same length"));
    }

    #[test]
    fn test_num_helpers_compose() {
        let result = run(
            r#"
            const xs = num.linspace(0, 1, 5);
            ui.metric("count", xs.length);
            ui.metric("mean", num.mean(xs));
        "#,
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(
            result.ops[0],
            WidgetOp::Metric {
                label: "count".to_string(),
                value: "5".to_string(),
            }
        );
        assert_eq!(
            result.ops[1],
            WidgetOp::Metric {
                label: "mean".to_string(),
                value: "0.5".to_string(),
            }
        );
    }

    #[test]
    fn test_plot_specs_recorded() {
        let result = run(
            r#"
            plotx.line([0, 1, 2], [10, 20, 15], "Balance");
            plot.pie(["Interest", "Principal"], [40, 60]);
        "#,
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(result.ops.len(), 2);

        match &result.ops[0] {
            WidgetOp::Plot(spec) => {
                assert_eq!(spec.kind, PlotKind::Line);
                assert_eq!(spec.title.as_deref(), Some("Balance"));
                assert_eq!(spec.x, vec![0.0, 1.0, 2.0]);
            }
            other => panic!("expected plot op, got {:?}", other),
        }

        match &result.ops[1] {
            WidgetOp::Plot(spec) => {
                assert_eq!(spec.kind, PlotKind::Pie);
                assert_eq!(spec.labels, vec!["Interest", "Principal"]);
            }
            other => panic!("expected plot op, got {:?}", other),
        }
    }

    #[test]
    fn test_helper_misuse_is_a_contained_type_error() {
        let result = run("ui.slider('Rate', 10, 0, 5);");

        assert!(!result.success);
        assert!(result.error.unwrap().contains("max must be greater"));
    }

    #[test]
    fn test_only_expected_globals_are_bound() {
        // The five helpers plus console exist; nothing else was leaked in
        let result = run(
            r#"
            const bound = [
                typeof ui, typeof DataTable, typeof num, typeof plotx, typeof plot,
                typeof console,
            ];
            if (bound.includes("undefined")) { throw new Error("missing binding"); }
            if (typeof require !== "undefined") { throw new Error("require leaked"); }
            if (typeof process !== "undefined") { throw new Error("process leaked"); }
            if (typeof fetch !== "undefined") { throw new Error("fetch leaked"); }
        "#,
        );

        assert!(result.success, "error: {:?}", result.error);
    }
}
