//! Client for the hosted text-generation endpoint.
//!
//! One fixed model, one prompt in, one completion out: a single blocking
//! `generateContent` call against the Gemini REST API. No streaming, no
//! retries, no multi-turn context. Completions are post-processed with
//! [`strip_code_fences`] because the model is told not to emit fence markers
//! but sometimes does anyway.

use serde::{Deserialize, Serialize};

/// The one model identifier this application talks to.
pub const GENERATION_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Why a generation call failed. Every variant is surfaced to the user as a
/// single message and is recoverable by clicking BUILD again.
#[derive(Debug)]
pub enum GenerationError {
    /// Connection, TLS, or body-decoding failure.
    Transport(String),
    /// The endpoint answered with a non-success status.
    Api { status: u16, message: String },
    /// A success response without any completion text.
    EmptyCompletion,
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::Transport(msg) => write!(f, "transport failure: {}", msg),
            GenerationError::Api { status, message } => {
                write!(f, "generation endpoint returned {}: {}", status, message)
            }
            GenerationError::EmptyCompletion => write!(f, "model returned no completion text"),
        }
    }
}

impl std::error::Error for GenerationError {}

/// Anything that can turn a compiled prompt into completion text. The real
/// implementation is [`GeminiClient`]; tests substitute stubs.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Blocking HTTP client for the fixed Gemini model.
pub struct GeminiClient {
    api_key: String,
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: format!("{}/{}:generateContent", API_BASE, GENERATION_MODEL),
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        log_debug!("Sending generation request ({} prompt chars)", prompt.len());

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Auth failures land here too (400/403 with a JSON error body)
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .map(|detail| detail.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                });
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}

/// Remove a leading fence marker (optionally tagged with a language name), a
/// trailing bare fence marker, and surrounding whitespace. Fences inside the
/// body are left alone, and stripping an already-stripped artifact is a
/// no-op.
pub fn strip_code_fences(text: &str) -> String {
    let mut stripped = text.trim();

    if let Some(rest) = stripped.strip_prefix("```") {
        // Drop the whole fence line; the tag ("html", "javascript") goes with it
        stripped = match rest.split_once('\n') {
            Some((_tag, body)) => body,
            None => "",
        };
    }

    stripped = stripped.trim_end();
    if let Some(body) = stripped.strip_suffix("```") {
        stripped = body.trim_end();
    }

    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_tagged_leading_and_bare_trailing_fence() {
        let raw = "```javascript\nconst x = 1;\nui.text(x);\n```";
        assert_eq!(strip_code_fences(raw), "const x = 1;\nui.text(x);");
    }

    #[test]
    fn test_strip_html_fence_with_surrounding_whitespace() {
        let raw = "\n\n```html\n<!DOCTYPE html>\n<html></html>\n```\n\n";
        assert_eq!(strip_code_fences(raw), "<!DOCTYPE html>\n<html></html>");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let raw = "```html\n<div>hello</div>\n```";
        let once = strip_code_fences(raw);
        let twice = strip_code_fences(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unfenced_text_passes_through() {
        let raw = "const total = num.sum([1, 2, 3]);";
        assert_eq!(strip_code_fences(raw), raw);
    }

    #[test]
    fn test_interior_fences_are_preserved() {
        let raw = "```html\n<pre>```js\nlet x;\n```</pre>\n<footer></footer>\n```";
        let stripped = strip_code_fences(raw);
        assert!(stripped.contains("```js"));
        assert!(stripped.starts_with("<pre>"));
        assert!(stripped.ends_with("</footer>"));
    }

    #[test]
    fn test_bare_fence_pair_only() {
        assert_eq!(strip_code_fences("```\n```"), "");
        assert_eq!(strip_code_fences("```"), "");
    }

    #[test]
    fn test_generation_error_display() {
        let e = GenerationError::Api {
            status: 403,
            message: "API key not valid".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "generation endpoint returned 403: API key not valid"
        );

        let e = GenerationError::Transport("connection refused".to_string());
        assert!(e.to_string().contains("connection refused"));
    }
}
