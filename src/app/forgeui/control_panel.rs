//! The control panel (left sidebar).
//!
//! Credential status and entry, the engine selector, quick-boot prompts,
//! theme picker, and the debug toggle.

use eframe::egui;
use egui::RichText;

use super::app::ForgeApp;
use super::theme::ThemeChoice;
use crate::app::credentials::CredentialSource;
use crate::app::session::EngineMode;

/// Canned intents that prefill the input and pick the right engine.
const QUICK_PROMPTS: &[(&str, &str, EngineMode)] = &[
    (
        "Calc: Mortgage Estimator",
        "Create a mortgage calculator with sliders for principal, rate, and years. \
         Show the monthly payment and a pie chart of total interest vs principal.",
        EngineMode::Logic,
    ),
    (
        "Vis: Cyberpunk Landing",
        "A landing page for 'Neon Coffee' with a dark theme, glowing neon buttons, \
         a menu grid, and a footer.",
        EngineMode::Visual,
    ),
];

impl ForgeApp {
    pub(super) fn show_control_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("control_panel")
            .default_width(250.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.label(RichText::new("UI FORGE").size(18.0).strong());
                ui.weak(format!(
                    "v{} | {} | generative interface engine",
                    env!("CARGO_PKG_VERSION"),
                    env!("GIT_COMMIT"),
                ));
                ui.separator();

                self.credential_section(ui);
                ui.separator();

                ui.label(RichText::new("ENGINE SELECTOR").strong());
                ui.radio_value(
                    &mut self.selected_mode,
                    EngineMode::Logic,
                    "Logic Architect",
                );
                ui.weak("Calculators, graphs, tools");
                ui.radio_value(
                    &mut self.selected_mode,
                    EngineMode::Visual,
                    "Visual Designer",
                );
                ui.weak("Landing pages, cards, visuals");
                ui.separator();

                ui.label(RichText::new("QUICK BOOT").strong());
                for (label, intent, mode) in QUICK_PROMPTS {
                    if ui.button(*label).clicked() {
                        self.intent_input = intent.to_string();
                        self.session.last_prompt = intent.to_string();
                        self.selected_mode = *mode;
                    }
                }
                ui.separator();

                egui::ComboBox::from_label("Theme")
                    .selected_text(self.theme.to_string())
                    .show_ui(ui, |ui| {
                        for choice in [
                            ThemeChoice::Latte,
                            ThemeChoice::Frappe,
                            ThemeChoice::Macchiato,
                            ThemeChoice::Mocha,
                        ] {
                            ui.selectable_value(&mut self.theme, choice, choice.to_string());
                        }
                    });

                if ui
                    .checkbox(&mut self.debug_mode, "Debug protocol")
                    .changed()
                {
                    crate::set_verbose_tracing(self.debug_mode);
                }
            });
    }

    fn credential_section(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("ACCESS KEY").strong());

        let resolved = self.credentials.resolve();

        match &resolved {
            Some(credential) if credential.source != CredentialSource::ManualEntry => {
                ui.colored_label(
                    egui::Color32::from_rgb(166, 227, 161),
                    format!("Cloud access enabled ({})", credential.source.label()),
                );
                return;
            }
            _ => {}
        }

        // No ambient key: offer the masked field
        let entry = self.credentials.manual_entry();
        {
            let mut text = entry.borrow_mut();
            ui.add(
                egui::TextEdit::singleline(&mut *text)
                    .password(true)
                    .hint_text("Gemini API key"),
            );
        }

        match resolved {
            Some(_) => {
                ui.colored_label(
                    egui::Color32::from_rgb(166, 227, 161),
                    "Manual key set",
                );
            }
            None => {
                ui.colored_label(
                    ui.visuals().warn_fg_color,
                    "Enter a key to start.",
                );
                ui.hyperlink_to(
                    "Get a free key",
                    "https://aistudio.google.com/app/apikey",
                );
            }
        }
    }
}
