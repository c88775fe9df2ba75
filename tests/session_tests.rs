//! Build-sequence behavior: fence handling, missing-key gating, and mode
//! bookkeeping, driven through stub generators.

use std::cell::{Cell, RefCell};

use pretty_assertions::assert_eq;
use uiforge::app::credentials::{
    Credential, CredentialProvider, CredentialResolver, CredentialSource,
};
use uiforge::app::gemini_client::{GenerationError, TextGenerator};
use uiforge::app::session::{run_build, BuildOutcome, EngineMode, RenderState, SessionContext};

/// Generator stub that records every call.
struct StubGenerator {
    response: RefCell<Vec<Result<String, String>>>,
    calls: Cell<usize>,
}

impl StubGenerator {
    fn returning(text: &str) -> Self {
        Self {
            response: RefCell::new(vec![Ok(text.to_string())]),
            calls: Cell::new(0),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            response: RefCell::new(vec![Err(message.to_string())]),
            calls: Cell::new(0),
        }
    }

    fn sequence(responses: Vec<Result<String, String>>) -> Self {
        Self {
            response: RefCell::new(responses),
            calls: Cell::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl TextGenerator for StubGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.set(self.calls.get() + 1);
        let mut responses = self.response.borrow_mut();
        let next = if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses[0].clone()
        };
        next.map_err(GenerationError::Transport)
    }
}

struct TestKeyProvider;

impl CredentialProvider for TestKeyProvider {
    fn source(&self) -> CredentialSource {
        CredentialSource::Environment
    }

    fn resolve(&self) -> Option<String> {
        Some("test-key".to_string())
    }
}

fn test_credential() -> Credential {
    CredentialResolver::with_providers(vec![Box::new(TestKeyProvider)])
        .resolve()
        .expect("test provider always yields")
}

fn no_progress() -> impl FnMut(u8, &str) {
    |_, _| {}
}

#[test]
fn test_fenced_completion_is_stored_stripped() {
    let mut session = SessionContext::new();
    let credential = test_credential();
    let generator =
        StubGenerator::returning("```javascript\nui.heading(\"Budget\");\nui.text(\"hi\");\n```");

    let outcome = run_build(
        &mut session,
        Some(&credential),
        &generator,
        "a budget tool",
        EngineMode::Logic,
        &mut no_progress(),
    );

    assert!(matches!(outcome, BuildOutcome::Completed));
    assert_eq!(
        session.artifact.as_deref(),
        Some("ui.heading(\"Budget\");\nui.text(\"hi\");")
    );
    assert_eq!(session.mode, Some(EngineMode::Logic));
    assert_eq!(session.last_prompt, "a budget tool");
    assert_eq!(session.render_state(), RenderState::ArtifactReady);
}

#[test]
fn test_missing_key_blocks_without_invoking_generator() {
    let mut session = SessionContext::new();
    let generator = StubGenerator::returning("should never be seen");

    let outcome = run_build(
        &mut session,
        None,
        &generator,
        "anything",
        EngineMode::Logic,
        &mut no_progress(),
    );

    assert!(matches!(outcome, BuildOutcome::MissingKey));
    assert_eq!(generator.calls(), 0);
    assert!(session.artifact.is_none());
    assert_eq!(session.render_state(), RenderState::Idle);
}

#[test]
fn test_failed_generation_preserves_previous_artifact() {
    let mut session = SessionContext::new();
    let credential = test_credential();

    let first = StubGenerator::returning("```html\n<html><body>v1</body></html>\n```");
    let outcome = run_build(
        &mut session,
        Some(&credential),
        &first,
        "v1 page",
        EngineMode::Visual,
        &mut no_progress(),
    );
    assert!(matches!(outcome, BuildOutcome::Completed));

    let second = StubGenerator::failing("connection reset by peer");
    let outcome = run_build(
        &mut session,
        Some(&credential),
        &second,
        "v2 page",
        EngineMode::Visual,
        &mut no_progress(),
    );

    match outcome {
        BuildOutcome::Failed(e) => assert!(e.to_string().contains("connection reset")),
        other => panic!("expected failure, got {:?}", other),
    }

    // The previous artifact stays rendered; only the prompt moved on
    assert_eq!(
        session.artifact.as_deref(),
        Some("<html><body>v1</body></html>")
    );
    assert_eq!(session.mode, Some(EngineMode::Visual));
    assert_eq!(session.render_state(), RenderState::ArtifactReady);
    assert_eq!(session.last_prompt, "v2 page");
}

#[test]
fn test_mode_switch_between_generations_flips_render_path() {
    let mut session = SessionContext::new();
    let credential = test_credential();
    let generator = StubGenerator::sequence(vec![
        Ok("ui.text('calculator');".to_string()),
        Ok("<html><body>page</body></html>".to_string()),
    ]);

    run_build(
        &mut session,
        Some(&credential),
        &generator,
        "a calculator",
        EngineMode::Logic,
        &mut no_progress(),
    );
    assert_eq!(session.mode, Some(EngineMode::Logic));

    run_build(
        &mut session,
        Some(&credential),
        &generator,
        "a page",
        EngineMode::Visual,
        &mut no_progress(),
    );
    assert_eq!(session.mode, Some(EngineMode::Visual));
    assert_eq!(
        session.artifact.as_deref(),
        Some("<html><body>page</body></html>")
    );
    assert_eq!(generator.calls(), 2);
}

#[test]
fn test_progress_stages_are_fixed_and_ordered() {
    let mut session = SessionContext::new();
    let credential = test_credential();
    let generator = StubGenerator::returning("ui.text('x');");

    let mut stages: Vec<(u8, String)> = Vec::new();
    run_build(
        &mut session,
        Some(&credential),
        &generator,
        "x",
        EngineMode::Logic,
        &mut |percent, stage| stages.push((percent, stage.to_string())),
    );

    let percents: Vec<u8> = stages.iter().map(|(p, _)| *p).collect();
    assert_eq!(percents, vec![0, 40, 100]);
    assert!(stages[0].1.contains("Parsing"));
    assert!(stages[2].1.contains("Rendering"));
}

#[test]
fn test_already_clean_completion_is_untouched() {
    let mut session = SessionContext::new();
    let credential = test_credential();
    let body = "<html><body><script>alert(1)</script></body></html>";
    let generator = StubGenerator::returning(body);

    run_build(
        &mut session,
        Some(&credential),
        &generator,
        "page with script",
        EngineMode::Visual,
        &mut no_progress(),
    );

    // No sanitization anywhere between the model and the artifact store
    assert_eq!(session.artifact.as_deref(), Some(body));
}
