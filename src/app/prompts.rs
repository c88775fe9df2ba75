//! Fixed prompt templates for the two engine modes.
//!
//! The user's intent is interpolated verbatim into the selected template - no
//! validation, no escaping. That makes the compiled prompt a prompt-injection
//! surface by design; the artifact is rendered in a sandbox either way.

#![warn(clippy::all, rust_2018_idioms)]

use crate::app::script_runtime::bindings;
use crate::app::session::EngineMode;

/// Anti-fencing instruction for script generation. The template test pins
/// this wording so fence-handling stays honest end to end.
pub const LOGIC_NO_FENCE_RULE: &str = "Return ONLY raw JavaScript code. NO markdown fences.";

/// Anti-fencing instruction for markup generation.
pub const VISUAL_NO_FENCE_RULE: &str = "Return ONLY raw HTML. NO markdown fences.";

const LOGIC_TEMPLATE: &str = r#"
You are an expert dashboard engineer writing JavaScript for the UI Forge script surface.

Task: write a COMPLETE, RUNNABLE JavaScript program that satisfies: "{{USER_INTENT}}".

CRITICAL RULES:
1. Return ONLY raw JavaScript code. NO markdown fences.
2. Use ONLY the pre-bound helper names: ui, DataTable, num, plotx, plot. No other globals exist (console is available for debugging).
3. Do NOT try to configure the host window or page chrome; there is no page-config call and no DOM.
4. Create interactive widgets (ui.slider, ui.numberInput, ui.checkbox) and use their returned values.
5. Group related widgets side by side with ui.columns.
6. Declare every variable before use; the whole program re-runs on every interaction.

{{HELPER_API_DOCS}}
"#;

const VISUAL_TEMPLATE: &str = r#"
You are a world-class frontend engineer.

Task: create a single-file HTML/CSS/JS page that satisfies: "{{USER_INTENT}}".

CRITICAL RULES:
1. Return ONLY raw HTML. NO markdown fences.
2. Use Tailwind CSS via its CDN script tag (<script src="https://cdn.tailwindcss.com"></script>).
3. Include Font Awesome for icons.
4. Make it BEAUTIFUL: gradients, shadows, rounded corners, modern typography.
5. Make it RESPONSIVE and centered.
6. One self-contained document - no external files beyond the CDN links.
"#;

/// Fill the mode's template with the verbatim intent. The logic template
/// additionally embeds the generated documentation for the five helper
/// bindings so the model knows exactly what API surface exists.
pub fn compile(intent: &str, mode: EngineMode) -> String {
    match mode {
        EngineMode::Logic => LOGIC_TEMPLATE
            .replace("{{HELPER_API_DOCS}}", &bindings::api_documentation())
            .replace("{{USER_INTENT}}", intent),
        EngineMode::Visual => VISUAL_TEMPLATE.replace("{{USER_INTENT}}", intent),
    }
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logic_prompt_contains_verbatim_intent() {
        let intent = "A mortgage calculator with sliders for principal, rate, and years";
        let prompt = compile(intent, EngineMode::Logic);
        assert!(prompt.contains(intent));
    }

    #[test]
    fn test_visual_prompt_contains_verbatim_intent() {
        let intent = "A landing page for 'Neon Coffee' with a dark theme & glowing buttons";
        let prompt = compile(intent, EngineMode::Visual);
        assert!(prompt.contains(intent));
    }

    #[test]
    fn test_templates_carry_their_no_fence_rule() {
        assert!(compile("x", EngineMode::Logic).contains(LOGIC_NO_FENCE_RULE));
        assert!(compile("x", EngineMode::Visual).contains(VISUAL_NO_FENCE_RULE));
    }

    #[test]
    fn test_logic_prompt_names_all_helper_bindings() {
        let prompt = compile("anything", EngineMode::Logic);
        for name in ["ui", "DataTable", "num", "plotx", "plot"] {
            assert!(prompt.contains(name), "missing helper name {}", name);
        }
    }

    #[test]
    fn test_logic_prompt_embeds_helper_docs() {
        let prompt = compile("anything", EngineMode::Logic);
        assert!(prompt.contains("Available script APIs"));
        assert!(!prompt.contains("{{HELPER_API_DOCS}}"));
    }

    #[test]
    fn test_placeholders_fully_substituted() {
        for mode in [EngineMode::Logic, EngineMode::Visual] {
            let prompt = compile("intent text", mode);
            assert!(!prompt.contains("{{USER_INTENT}}"));
        }
    }

    #[test]
    fn test_visual_prompt_demands_cdn_styling() {
        let prompt = compile("a pricing page", EngineMode::Visual);
        assert!(prompt.contains("cdn.tailwindcss.com"));
        assert!(prompt.contains("Font Awesome"));
    }
}
