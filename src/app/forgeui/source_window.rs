//! Generated-source viewer.
//!
//! Shows the current artifact in a code view with mode-appropriate
//! highlighting, for anyone who wants to inspect what the model actually
//! returned before trusting what it renders as.

use eframe::egui;
use egui_code_editor::{CodeEditor, ColorTheme, Syntax};
use std::collections::BTreeSet;

use crate::app::session::EngineMode;

pub struct SourceWindow {
    pub open: bool,
    buffer: String,
}

impl Default for SourceWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceWindow {
    pub fn new() -> Self {
        Self {
            open: false,
            buffer: String::new(),
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, artifact: Option<&str>, mode: Option<EngineMode>) {
        if !self.open {
            return;
        }

        // The buffer trails the session artifact; edits here are discarded
        let current = artifact.unwrap_or("");
        if self.buffer != current {
            self.buffer = current.to_string();
        }

        let syntax = match mode {
            Some(EngineMode::Visual) => markup_syntax(),
            _ => script_syntax(),
        };

        let mut open = self.open;
        egui::Window::new("Generated Source")
            .open(&mut open)
            .default_size([680.0, 480.0])
            .resizable(true)
            .collapsible(false)
            .show(ctx, |ui| {
                if self.buffer.is_empty() {
                    ui.weak("Nothing generated yet.");
                    return;
                }

                egui::ScrollArea::vertical().show(ui, |ui| {
                    CodeEditor::default()
                        .id_source("generated_source")
                        .with_rows(24)
                        .with_fontsize(13.0)
                        .with_theme(ColorTheme::GRUVBOX)
                        .with_syntax(syntax)
                        .with_numlines(true)
                        .show(ui, &mut self.buffer);
                });
            });
        self.open = open;
    }
}

fn script_syntax() -> Syntax {
    Syntax::new("javascript")
        .with_case_sensitive(true)
        .with_comment("//")
        .with_comment_multiline(["/*", "*/"])
        .with_keywords(BTreeSet::from([
            "const", "let", "var", "function", "return", "if", "else", "for", "while", "of",
            "in", "new", "typeof", "throw", "try", "catch", "finally", "switch", "case",
            "break", "continue", "class", "extends", "this",
        ]))
        .with_types(BTreeSet::from([
            "true", "false", "null", "undefined", "NaN", "Infinity",
        ]))
        .with_special(BTreeSet::from([
            "ui", "DataTable", "num", "plotx", "plot", "console", "Math", "JSON",
        ]))
}

fn markup_syntax() -> Syntax {
    Syntax::new("html")
        .with_case_sensitive(false)
        .with_comment_multiline(["<!--", "-->"])
        .with_keywords(BTreeSet::from([
            "html", "head", "body", "div", "span", "script", "style", "link", "meta", "title",
            "section", "header", "footer", "nav", "main", "button", "input", "form", "img",
        ]))
        .with_types(BTreeSet::from(["class", "id", "src", "href", "rel", "type"]))
        .with_special(BTreeSet::from(["DOCTYPE"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntaxes_are_distinct() {
        assert_ne!(script_syntax().language, markup_syntax().language);
    }

    #[test]
    fn test_window_starts_closed_and_empty() {
        let window = SourceWindow::new();
        assert!(!window.open);
        assert!(window.buffer.is_empty());
    }
}
