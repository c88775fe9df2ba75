//! The code-mode render surface.
//!
//! Executes the current artifact in the script runtime and draws whatever it
//! recorded: widgets, tables, and hand-painted charts. Interactive widgets
//! write their values back into the surface's input map and queue a re-run,
//! so the generated program behaves like a live tool while still being a
//! plain top-to-bottom script.
//!
//! A failed pass never leaves the surface: the error (and, under the debug
//! toggle, the captured console) is drawn in place of the missing output,
//! and whatever ops were recorded before the failure still render.

use std::collections::HashMap;

use eframe::egui;
use egui::{Color32, RichText, Sense, Stroke};

use crate::app::script_runtime::{
    ExecutionResult, InputValue, PlotKind, PlotSpec, ScriptRuntime, TableSpec, WidgetOp,
};

/// Chart series palette (works on the dark and light catppuccin themes).
const PALETTE: [Color32; 8] = [
    Color32::from_rgb(137, 180, 250),
    Color32::from_rgb(166, 227, 161),
    Color32::from_rgb(250, 179, 135),
    Color32::from_rgb(243, 139, 168),
    Color32::from_rgb(203, 166, 247),
    Color32::from_rgb(249, 226, 175),
    Color32::from_rgb(148, 226, 213),
    Color32::from_rgb(180, 190, 254),
];

pub struct ScriptSurface {
    runtime: ScriptRuntime,
    inputs: HashMap<String, InputValue>,
    last_result: Option<ExecutionResult>,
    needs_run: bool,
}

impl Default for ScriptSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptSurface {
    pub fn new() -> Self {
        Self {
            runtime: ScriptRuntime::new(),
            inputs: HashMap::new(),
            last_result: None,
            needs_run: false,
        }
    }

    /// A new artifact arrived: drop widget state and queue an execution.
    pub fn reset(&mut self) {
        self.inputs.clear();
        self.last_result = None;
        self.needs_run = true;
    }

    /// Execute if queued, then draw the last result.
    pub fn show(&mut self, ui: &mut egui::Ui, artifact: &str, debug: bool) {
        if self.needs_run {
            self.needs_run = false;
            match self.runtime.execute(artifact, &self.inputs) {
                Ok(result) => {
                    log_debug!(
                        "Script pass: success={} ops={} {}ms",
                        result.success,
                        result.ops.len(),
                        result.execution_time_ms
                    );
                    self.last_result = Some(result);
                }
                Err(e) => {
                    log_error!("Script runtime unavailable: {}", e);
                    self.last_result = Some(ExecutionResult {
                        success: false,
                        error: Some(e.to_string()),
                        stdout: String::new(),
                        stderr: String::new(),
                        ops: Vec::new(),
                        execution_time_ms: 0,
                    });
                }
            }
        }

        let Some(result) = &self.last_result else {
            return;
        };

        let mut changed = false;

        if render_ops(ui, &result.ops, &mut self.inputs) {
            changed = true;
        }

        if let Some(error) = &result.error {
            ui.add_space(6.0);
            ui.colored_label(
                Color32::from_rgb(243, 139, 168),
                RichText::new("RUNTIME ERROR IN GENERATED CODE:").strong(),
            );
            ui.label(RichText::new(error).monospace());
            ui.weak("Try tweaking your prompt and rebuilding.");
        }

        if debug {
            let has_console = !result.stdout.is_empty() || !result.stderr.is_empty();
            if has_console {
                ui.add_space(6.0);
                ui.collapsing("Console output", |ui| {
                    if !result.stdout.is_empty() {
                        ui.label(RichText::new(&result.stdout).monospace());
                    }
                    if !result.stderr.is_empty() {
                        ui.colored_label(
                            Color32::from_rgb(243, 139, 168),
                            RichText::new(&result.stderr).monospace(),
                        );
                    }
                });
            }
        }

        if changed {
            self.needs_run = true;
            ui.ctx().request_repaint();
        }
    }
}

/// Draw a flat op list, grouping `BeginColumns..EndColumns` spans into
/// side-by-side columns. Returns true when any input widget changed.
fn render_ops(
    ui: &mut egui::Ui,
    ops: &[WidgetOp],
    inputs: &mut HashMap<String, InputValue>,
) -> bool {
    let mut changed = false;
    let mut index = 0;

    while index < ops.len() {
        match &ops[index] {
            WidgetOp::BeginColumns(count) => {
                let end = ops[index + 1..]
                    .iter()
                    .position(|op| matches!(op, WidgetOp::EndColumns))
                    .map(|offset| index + 1 + offset)
                    .unwrap_or(ops.len());
                let group = &ops[index + 1..end];

                ui.columns(*count, |columns| {
                    for (slot, op) in group.iter().enumerate() {
                        let column = &mut columns[slot % *count];
                        if render_single(column, op, slot + index, inputs) {
                            changed = true;
                        }
                    }
                });

                index = (end + 1).min(ops.len());
            }
            WidgetOp::EndColumns => {
                // Unmatched close marker; nothing to draw
                index += 1;
            }
            op => {
                if render_single(ui, op, index, inputs) {
                    changed = true;
                }
                index += 1;
            }
        }
    }

    changed
}

fn render_single(
    ui: &mut egui::Ui,
    op: &WidgetOp,
    salt: usize,
    inputs: &mut HashMap<String, InputValue>,
) -> bool {
    match op {
        WidgetOp::Heading(text) => {
            ui.heading(text);
            false
        }
        WidgetOp::Text(text) => {
            ui.label(text);
            false
        }
        WidgetOp::Metric { label, value } => {
            ui.vertical(|ui| {
                ui.label(RichText::new(label).small().weak());
                ui.label(RichText::new(value).heading().strong());
            });
            false
        }
        WidgetOp::Separator => {
            ui.separator();
            false
        }
        WidgetOp::Slider {
            id,
            label,
            min,
            max,
            step,
            value,
        } => {
            let mut current = *value;
            let response = ui.add(
                egui::Slider::new(&mut current, *min..=*max)
                    .step_by(*step)
                    .text(label),
            );
            if response.changed() {
                inputs.insert(id.clone(), InputValue::Number(current));
                return true;
            }
            false
        }
        WidgetOp::NumberInput { id, label, value } => {
            let mut current = *value;
            let mut widget_changed = false;
            ui.horizontal(|ui| {
                ui.label(label);
                let response = ui.add(egui::DragValue::new(&mut current).speed(0.1));
                if response.changed() {
                    widget_changed = true;
                }
            });
            if widget_changed {
                inputs.insert(id.clone(), InputValue::Number(current));
                return true;
            }
            false
        }
        WidgetOp::Checkbox { id, label, value } => {
            let mut current = *value;
            if ui.checkbox(&mut current, label).changed() {
                inputs.insert(id.clone(), InputValue::Toggle(current));
                return true;
            }
            false
        }
        WidgetOp::Table(table) => {
            render_table(ui, table, salt);
            false
        }
        WidgetOp::Plot(spec) => {
            draw_plot(ui, spec);
            false
        }
        WidgetOp::BeginColumns(_) | WidgetOp::EndColumns => false,
    }
}

fn render_table(ui: &mut egui::Ui, table: &TableSpec, salt: usize) {
    egui::Grid::new(("surface_table", salt))
        .striped(true)
        .min_col_width(60.0)
        .show(ui, |ui| {
            for column in &table.columns {
                ui.label(RichText::new(column).strong());
            }
            ui.end_row();

            for row in &table.rows {
                for cell in row {
                    ui.label(cell);
                }
                ui.end_row();
            }
        });
}

// --- Chart painting -------------------------------------------------------

fn draw_plot(ui: &mut egui::Ui, spec: &PlotSpec) {
    if let Some(title) = &spec.title {
        ui.label(RichText::new(title).strong());
    }

    let width = ui.available_width().clamp(160.0, 560.0);
    let height = 200.0;
    let (response, painter) = ui.allocate_painter(egui::vec2(width, height), Sense::hover());
    let rect = response.rect.shrink(10.0);

    let frame_stroke = Stroke::new(1.0, ui.visuals().weak_text_color());

    match spec.kind {
        PlotKind::Line | PlotKind::Area | PlotKind::Scatter => {
            draw_xy(ui, &painter, rect, spec, frame_stroke);
        }
        PlotKind::Bar => {
            draw_bars(ui, &painter, rect, &spec.labels, &spec.y, frame_stroke);
        }
        PlotKind::Histogram => {
            let (labels, counts) = bin_samples(&spec.y, spec.bins.unwrap_or(10));
            draw_bars(ui, &painter, rect, &labels, &counts, frame_stroke);
        }
        PlotKind::Pie => {
            draw_pie(ui, &painter, rect, spec);
        }
    }
}

fn span(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        if v.is_finite() {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

fn draw_no_data(ui: &egui::Ui, painter: &egui::Painter, rect: egui::Rect) {
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "no data",
        egui::FontId::proportional(12.0),
        ui.visuals().weak_text_color(),
    );
}

fn draw_xy(
    ui: &egui::Ui,
    painter: &egui::Painter,
    rect: egui::Rect,
    spec: &PlotSpec,
    frame_stroke: Stroke,
) {
    if spec.x.is_empty() {
        draw_no_data(ui, painter, rect);
        return;
    }

    let (x_lo, x_hi) = span(&spec.x);
    let (y_lo, y_hi) = span(&spec.y);

    let to_screen = |x: f64, y: f64| -> egui::Pos2 {
        let tx = ((x - x_lo) / (x_hi - x_lo)) as f32;
        let ty = ((y - y_lo) / (y_hi - y_lo)) as f32;
        egui::pos2(
            rect.left() + tx * rect.width(),
            rect.bottom() - ty * rect.height(),
        )
    };

    // Frame: baseline and left edge, with the value extremes as tick labels
    painter.line_segment([rect.left_bottom(), rect.right_bottom()], frame_stroke);
    painter.line_segment([rect.left_top(), rect.left_bottom()], frame_stroke);
    let tick_font = egui::FontId::proportional(10.0);
    let tick_color = ui.visuals().weak_text_color();
    painter.text(
        rect.left_top(),
        egui::Align2::LEFT_TOP,
        fmt_tick(y_hi),
        tick_font.clone(),
        tick_color,
    );
    painter.text(
        rect.left_bottom(),
        egui::Align2::LEFT_BOTTOM,
        fmt_tick(y_lo),
        tick_font,
        tick_color,
    );

    let color = PALETTE[0];
    let points: Vec<egui::Pos2> = spec
        .x
        .iter()
        .zip(spec.y.iter())
        .map(|(x, y)| to_screen(*x, *y))
        .collect();

    match spec.kind {
        PlotKind::Scatter => {
            for point in &points {
                painter.circle_filled(*point, 3.0, color);
            }
        }
        PlotKind::Area => {
            let fill = color.gamma_multiply(0.25);
            for pair in points.windows(2) {
                let quad = vec![
                    pair[0],
                    pair[1],
                    egui::pos2(pair[1].x, rect.bottom()),
                    egui::pos2(pair[0].x, rect.bottom()),
                ];
                painter.add(egui::Shape::convex_polygon(quad, fill, Stroke::NONE));
            }
            painter.add(egui::Shape::line(points, Stroke::new(2.0, color)));
        }
        _ => {
            painter.add(egui::Shape::line(points, Stroke::new(2.0, color)));
        }
    }
}

fn draw_bars(
    ui: &egui::Ui,
    painter: &egui::Painter,
    rect: egui::Rect,
    labels: &[String],
    values: &[f64],
    frame_stroke: Stroke,
) {
    if values.is_empty() {
        draw_no_data(ui, painter, rect);
        return;
    }

    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max)
        .max(f64::EPSILON);

    painter.line_segment([rect.left_bottom(), rect.right_bottom()], frame_stroke);

    let label_band = 14.0;
    let plot_height = rect.height() - label_band;
    let slot = rect.width() / values.len() as f32;
    let bar_width = (slot * 0.7).max(2.0);

    for (i, value) in values.iter().enumerate() {
        let h = ((value / max).max(0.0) as f32) * plot_height;
        let center_x = rect.left() + slot * (i as f32 + 0.5);
        let bar = egui::Rect::from_min_max(
            egui::pos2(center_x - bar_width / 2.0, rect.bottom() - label_band - h),
            egui::pos2(center_x + bar_width / 2.0, rect.bottom() - label_band),
        );
        painter.rect_filled(bar, egui::CornerRadius::same(2), PALETTE[i % PALETTE.len()]);

        if let Some(label) = labels.get(i) {
            painter.text(
                egui::pos2(center_x, rect.bottom()),
                egui::Align2::CENTER_BOTTOM,
                label,
                egui::FontId::proportional(10.0),
                ui.visuals().weak_text_color(),
            );
        }
    }
}

fn draw_pie(ui: &egui::Ui, painter: &egui::Painter, rect: egui::Rect, spec: &PlotSpec) {
    let total: f64 = spec.y.iter().filter(|v| v.is_finite() && **v > 0.0).sum();
    if total <= 0.0 {
        draw_no_data(ui, painter, rect);
        return;
    }

    let center = rect.center();
    let radius = rect.height().min(rect.width()) * 0.42;

    let mut angle = -std::f32::consts::FRAC_PI_2;
    for (i, value) in spec.y.iter().enumerate() {
        if !value.is_finite() || *value <= 0.0 {
            continue;
        }
        let sweep = ((value / total) * std::f64::consts::TAU) as f32;

        // Sample the arc so each slice is a convex fan
        let steps = ((sweep / 0.12).ceil() as usize).max(2);
        let mut points = Vec::with_capacity(steps + 2);
        points.push(center);
        for s in 0..=steps {
            let a = angle + sweep * (s as f32 / steps as f32);
            points.push(egui::pos2(
                center.x + radius * a.cos(),
                center.y + radius * a.sin(),
            ));
        }
        painter.add(egui::Shape::convex_polygon(
            points,
            PALETTE[i % PALETTE.len()],
            Stroke::NONE,
        ));

        // Label at the slice midpoint, pushed outside the rim
        let mid = angle + sweep / 2.0;
        let share = (value / total * 100.0).round();
        let label = match spec.labels.get(i) {
            Some(name) => format!("{} ({}%)", name, share),
            None => format!("{}%", share),
        };
        painter.text(
            egui::pos2(
                center.x + (radius + 12.0) * mid.cos(),
                center.y + (radius + 12.0) * mid.sin(),
            ),
            egui::Align2::CENTER_CENTER,
            label,
            egui::FontId::proportional(10.0),
            ui.visuals().text_color(),
        );

        angle += sweep;
    }
}

/// Tick formatting: whole numbers bare, large magnitudes in k/M, fractions
/// to two decimals.
fn fmt_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 10_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Bin raw samples into `bins` equal-width buckets.
fn bin_samples(samples: &[f64], bins: usize) -> (Vec<String>, Vec<f64>) {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return (Vec::new(), Vec::new());
    }

    let (lo, hi) = span(&finite);
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0.0f64; bins];
    for v in &finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1.0;
    }

    let labels = (0..bins)
        .map(|i| {
            if i == 0 || i == bins - 1 {
                fmt_tick(lo + width * i as f64)
            } else {
                String::new()
            }
        })
        .collect();

    (labels, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_pads_degenerate_ranges() {
        assert_eq!(span(&[5.0, 5.0]), (4.0, 6.0));
        assert_eq!(span(&[]), (0.0, 1.0));
        assert_eq!(span(&[1.0, 3.0]), (1.0, 3.0));
    }

    #[test]
    fn test_bin_samples_counts_everything() {
        let samples = vec![0.0, 0.1, 0.2, 0.9, 1.0];
        let (labels, counts) = bin_samples(&samples, 2);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.iter().sum::<f64>(), samples.len() as f64);
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_bin_samples_ignores_non_finite() {
        let samples = vec![f64::NAN, 1.0, 2.0, f64::INFINITY];
        let (_, counts) = bin_samples(&samples, 4);
        assert_eq!(counts.iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn test_fmt_tick_scales() {
        assert_eq!(fmt_tick(42.0), "42");
        assert_eq!(fmt_tick(0.5), "0.50");
        assert_eq!(fmt_tick(25_000.0), "25k");
        assert_eq!(fmt_tick(2_500_000.0), "2.5M");
    }

    #[test]
    fn test_surface_reset_queues_run() {
        let mut surface = ScriptSurface::new();
        assert!(!surface.needs_run);

        surface.inputs.insert(
            "Rate".to_string(),
            InputValue::Number(3.0),
        );
        surface.reset();

        assert!(surface.needs_run);
        assert!(surface.inputs.is_empty());
        assert!(surface.last_result.is_none());
    }
}
