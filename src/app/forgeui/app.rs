//! The main application type.
//!
//! `ForgeApp` owns the per-session context and wires the panels together:
//! the control panel (credentials, engine selector, quick prompts), the
//! builder panel (intent input and BUILD), and the render surfaces. One
//! build runs synchronously per BUILD click; there is no background work
//! and no cancellation.

use eframe::egui;
use egui::RichText;

use super::script_surface::ScriptSurface;
use super::source_window::SourceWindow;
use super::theme::{load_theme_overrides, ThemeChoice};
use crate::app::credentials::CredentialResolver;
use crate::app::gemini_client::GeminiClient;
use crate::app::session::{self, BuildOutcome, EngineMode, RenderState, SessionContext};
use crate::app::webview;

const PREVIEW_WINDOW_TITLE: &str = "Live Preview - UI Forge";

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ForgeApp {
    pub theme: ThemeChoice,
    pub corner_radius: u8,
    pub debug_mode: bool,

    #[serde(skip)]
    pub session: SessionContext,
    #[serde(skip)]
    pub credentials: CredentialResolver,
    #[serde(skip)]
    pub selected_mode: EngineMode,
    #[serde(skip)]
    pub intent_input: String,
    #[serde(skip)]
    script_surface: ScriptSurface,
    #[serde(skip)]
    pub source_window: SourceWindow,
    #[serde(skip)]
    last_error: Option<String>,
    #[serde(skip)]
    missing_key: bool,
    #[serde(skip)]
    preview_error: Option<String>,
}

impl Default for ForgeApp {
    fn default() -> Self {
        Self {
            theme: ThemeChoice::default(),
            corner_radius: 2,
            debug_mode: false,
            session: SessionContext::new(),
            credentials: CredentialResolver::standard(),
            selected_mode: EngineMode::Logic,
            intent_input: String::new(),
            script_surface: ScriptSurface::new(),
            source_window: SourceWindow::new(),
            last_error: None,
            missing_key: false,
            preview_error: None,
        }
    }
}

impl ForgeApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: ForgeApp = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        // Optional per-user style file wins over persisted UI state
        let overrides = load_theme_overrides();
        if let Some(theme) = overrides.theme.as_deref().and_then(ThemeChoice::from_name) {
            app.theme = theme;
        }
        if let Some(corner_radius) = overrides.corner_radius {
            app.corner_radius = corner_radius;
        }

        crate::set_verbose_tracing(app.debug_mode);

        app
    }

    /// One BUILD click: resolve the key, run the synchronous build, route the
    /// artifact to its render surface.
    pub(super) fn trigger_build(&mut self) {
        self.last_error = None;
        self.preview_error = None;
        self.missing_key = false;

        let intent = self.intent_input.trim().to_string();
        if intent.is_empty() {
            return;
        }

        let credential = self.credentials.resolve();
        let client = GeminiClient::new(
            credential
                .as_ref()
                .map(|c| c.secret().to_string())
                .unwrap_or_default(),
        );
        let mode = self.selected_mode;

        log_info!("Build triggered ({})", mode.display_name());

        // The build is synchronous, so the staged progress is visible in the
        // log rather than repainted live
        let outcome = session::run_build(
            &mut self.session,
            credential.as_ref(),
            &client,
            &intent,
            mode,
            &mut |percent, stage| {
                log_info!("Build progress {}%: {}", percent, stage);
            },
        );

        match outcome {
            BuildOutcome::MissingKey => {
                self.missing_key = true;
            }
            BuildOutcome::Completed => match mode {
                EngineMode::Logic => self.script_surface.reset(),
                EngineMode::Visual => self.open_preview(),
            },
            BuildOutcome::Failed(e) => {
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Spawn (or respawn) the markup preview window for the current artifact.
    pub(super) fn open_preview(&mut self) {
        let Some(artifact) = self.session.artifact.as_deref() else {
            return;
        };

        if let Err(e) = webview::spawn_preview_process(artifact, PREVIEW_WINDOW_TITLE) {
            log_error!("Failed to spawn preview window: {}", e);
            self.preview_error = Some(e.to_string());
        }
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.heading(RichText::new("UI FORGE").size(26.0).strong());
                ui.weak("State your intent. The system will forge the interface.");
            });
            ui.add_space(10.0);

            // Intent row
            let mut build_clicked = false;
            ui.horizontal(|ui| {
                let input_width = (ui.available_width() - 90.0).max(120.0);
                let response = ui.add_sized(
                    [input_width, 26.0],
                    egui::TextEdit::singleline(&mut self.intent_input)
                        .hint_text("> Describe the tool or interface you need..."),
                );
                let entered =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui
                    .add_sized([80.0, 26.0], egui::Button::new(RichText::new("BUILD").strong()))
                    .clicked()
                    || entered
                {
                    build_clicked = true;
                }
            });

            if build_clicked {
                self.trigger_build();
            }

            if self.missing_key {
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    "ACCESS KEY MISSING - add a key in the control panel.",
                );
            }
            if let Some(error) = &self.last_error {
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    format!("GENERATION FAILED: {}", error),
                );
            }
            if let Some(error) = &self.preview_error {
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    format!("PREVIEW FAILED: {}", error),
                );
            }

            if self.session.render_state() == RenderState::Idle {
                return;
            }

            ui.separator();

            match self.session.mode {
                Some(EngineMode::Logic) => {
                    ui.weak("RUNTIME: SCRIPT KERNEL ACTIVE");
                    let artifact = self.session.artifact.clone().unwrap_or_default();
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .auto_shrink([false, true])
                            .show(ui, |ui| {
                                self.script_surface.show(ui, &artifact, self.debug_mode);
                            });
                    });
                }
                Some(EngineMode::Visual) => {
                    ui.weak("RUNTIME: WEBVIEW RENDERER ACTIVE");
                    ui.label("The page is shown in its own preview window.");
                    if ui.button("Reopen preview").clicked() {
                        self.open_preview();
                    }
                }
                None => {}
            }

            ui.add_space(6.0);
            if ui.button("View generated source").clicked() {
                self.source_window.open = !self.source_window.open;
            }
        });
    }
}

impl eframe::App for ForgeApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);

        self.show_control_panel(ctx);
        self.render_central_panel(ctx);

        self.source_window
            .show(ctx, self.session.artifact.as_deref(), self.session.mode);
    }
}
