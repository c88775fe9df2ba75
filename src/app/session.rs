//! Per-session state and the build sequence.
//!
//! All mutable state for one interactive session lives in an explicit
//! [`SessionContext`] owned by the application and passed to handlers; there
//! are no framework-managed globals. The context is created at startup and
//! discarded at exit - nothing persists across sessions.

use std::time::Duration;

use crate::app::credentials::Credential;
use crate::app::gemini_client::{strip_code_fences, GenerationError, TextGenerator};
use crate::app::prompts;

/// Which engine interprets the next artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EngineMode {
    /// Generated JavaScript, executed on the script surface.
    Logic,
    /// Generated HTML, embedded in the webview preview.
    Visual,
}

impl EngineMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            EngineMode::Logic => "Logic Architect",
            EngineMode::Visual => "Visual Designer",
        }
    }
}

/// Render-path state: nothing generated yet, or an artifact on display.
///
/// `ArtifactReady` persists across later failed generations - a failed build
/// leaves the previous artifact rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    ArtifactReady,
}

/// The three pieces of session state: latest artifact, its mode, and the most
/// recent intent (used to prefill the input field on redraw).
#[derive(Debug, Default)]
pub struct SessionContext {
    pub artifact: Option<String>,
    pub mode: Option<EngineMode>,
    pub last_prompt: String,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_state(&self) -> RenderState {
        if self.artifact.is_some() {
            RenderState::ArtifactReady
        } else {
            RenderState::Idle
        }
    }

    /// Overwrite the cached artifact and active mode after a successful
    /// generation. The artifact is stored fence-stripped.
    fn store_artifact(&mut self, artifact: String, mode: EngineMode) {
        self.artifact = Some(artifact);
        self.mode = Some(mode);
    }
}

/// Result of one BUILD click.
#[derive(Debug)]
pub enum BuildOutcome {
    /// No credential from any provider; the generation client was not invoked.
    MissingKey,
    /// Artifact generated, stripped, and stored.
    Completed,
    /// The remote call failed; the session is unchanged.
    Failed(GenerationError),
}

/// Cosmetic pause between progress stages.
const STAGE_DELAY: Duration = Duration::from_millis(500);

/// Run one synchronous build: compile the prompt, call the generator, strip
/// fences, store the artifact. Progress is purely cosmetic - fixed
/// percentages with fixed delays, no real parallelism and no cancellation.
///
/// With no credential the generator must not be invoked; the caller shows the
/// missing-key warning. On failure the previous artifact and mode stay
/// rendered.
pub fn run_build(
    session: &mut SessionContext,
    credential: Option<&Credential>,
    generator: &dyn TextGenerator,
    intent: &str,
    mode: EngineMode,
    progress: &mut dyn FnMut(u8, &str),
) -> BuildOutcome {
    if credential.is_none() {
        log_warn!("Build requested without a resolved API key");
        return BuildOutcome::MissingKey;
    }

    session.last_prompt = intent.to_string();

    progress(0, "Parsing intent...");
    std::thread::sleep(STAGE_DELAY);

    let stage = match mode {
        EngineMode::Logic => "Forging logic modules...",
        EngineMode::Visual => "Compiling visual assets...",
    };
    progress(40, stage);

    let prompt = prompts::compile(intent, mode);
    let completion = match generator.generate(&prompt) {
        Ok(text) => text,
        Err(e) => {
            log_error!("Generation failed: {}", e);
            return BuildOutcome::Failed(e);
        }
    };

    let artifact = strip_code_fences(&completion);
    log_info!(
        "Generation completed: {} chars ({} mode)",
        artifact.len(),
        mode.display_name()
    );
    session.store_artifact(artifact, mode);

    progress(100, "Rendering interface...");
    std::thread::sleep(STAGE_DELAY);

    BuildOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = SessionContext::new();
        assert_eq!(session.render_state(), RenderState::Idle);
        assert!(session.artifact.is_none());
        assert!(session.mode.is_none());
        assert!(session.last_prompt.is_empty());
    }

    #[test]
    fn test_store_artifact_sets_mode_and_state() {
        let mut session = SessionContext::new();
        session.store_artifact("ui.text('hi');".to_string(), EngineMode::Logic);

        assert_eq!(session.render_state(), RenderState::ArtifactReady);
        assert_eq!(session.mode, Some(EngineMode::Logic));
    }

    #[test]
    fn test_store_artifact_overwrites_previous() {
        let mut session = SessionContext::new();
        session.store_artifact("first".to_string(), EngineMode::Logic);
        session.store_artifact("<html></html>".to_string(), EngineMode::Visual);

        assert_eq!(session.artifact.as_deref(), Some("<html></html>"));
        assert_eq!(session.mode, Some(EngineMode::Visual));
    }

    #[test]
    fn test_engine_mode_display_names() {
        assert_eq!(EngineMode::Logic.display_name(), "Logic Architect");
        assert_eq!(EngineMode::Visual.display_name(), "Visual Designer");
    }
}
