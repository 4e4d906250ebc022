//! Core `TextGenerator` trait and `GeminiClient` implementation.
//!
//! `GeminiClient` calls the Gemini `generateContent` REST endpoint.  All
//! connection details come from [`AiConfig`]; nothing is hardcoded.  The API
//! key is resolved at construction (config value, then the `GEMINI_API_KEY`
//! environment variable) but its absence is only surfaced when a call is
//! actually made, never at startup.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AiConfig;

// ---------------------------------------------------------------------------
// AiError
// ---------------------------------------------------------------------------

/// Errors that can occur during a generation call.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    /// No API key in config and `GEMINI_API_KEY` is unset.
    #[error("API key is not configured. Set GEMINI_API_KEY or ai.api_key in settings.toml")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("AI request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("AI request timed out")]
    Timeout,

    /// The service rejected the call with HTTP 429.
    #[error("Quota exceeded (429). Please wait a moment or try again later.")]
    Quota,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse AI response: {0}")]
    Parse(String),

    /// The model returned a response with no usable text content.
    #[error("No data returned from AI")]
    EmptyResponse,
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else {
            AiError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: String,
    /// Full prompt text.
    pub prompt: String,
    /// Enable web-search grounding for this call.
    pub grounding: bool,
}

/// A web citation returned alongside a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

/// The typed response shape at the collaborator boundary.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// Concatenated text of all response parts.
    pub text: String,
    /// Web sources backing the answer, in response order (not yet
    /// deduplicated — callers that care dedup by uri).
    pub sources: Vec<GroundingSource>,
}

// ---------------------------------------------------------------------------
// TextGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for AI text generation.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn TextGenerator>`).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AiError>;
}

// Compile-time assertion: Box<dyn TextGenerator> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TextGenerator>) {}
};

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls the Gemini `generateContent` REST endpoint.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, models, timeout) come
/// exclusively from the [`AiConfig`] passed to [`GeminiClient::from_config`].
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build a `GeminiClient` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &AiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()));

        Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    /// Send `request` to the configured endpoint.
    ///
    /// HTTP 429 is special-cased to [`AiError::Quota`]; all other non-success
    /// statuses surface as [`AiError::Request`] with the raw status line.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AiError> {
        let key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );

        let mut body = serde_json::json!({
            "contents": [
                { "role": "user", "parts": [ { "text": request.prompt } ] }
            ]
        });
        if request.grounding {
            body["tools"] = serde_json::json!([ { "google_search": {} } ]);
        }

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AiError::Quota);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AiError::Request(format!("HTTP {status}: {detail}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        Ok(parse_generate_response(&json)?)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Extract the answer text and grounding sources from a raw response body.
///
/// Text is the concatenation of all `candidates[0].content.parts[*].text`
/// fields; returns [`AiError::EmptyResponse`] when no non-empty text is
/// present.  Grounding chunks without a `web.uri` are skipped; a chunk with
/// no title falls back to `"Market Data"`.
fn parse_generate_response(json: &serde_json::Value) -> Result<GenerateResponse, AiError> {
    let candidate = &json["candidates"][0];

    let mut text = String::new();
    if let Some(parts) = candidate["content"]["parts"].as_array() {
        for part in parts {
            if let Some(t) = part["text"].as_str() {
                text.push_str(t);
            }
        }
    }

    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }

    let mut sources = Vec::new();
    if let Some(chunks) = candidate["groundingMetadata"]["groundingChunks"].as_array() {
        for chunk in chunks {
            let Some(uri) = chunk["web"]["uri"].as_str() else {
                continue;
            };
            let title = chunk["web"]["title"]
                .as_str()
                .filter(|t| !t.is_empty())
                .unwrap_or("Market Data");
            sources.push(GroundingSource {
                uri: uri.to_string(),
                title: title.to_string(),
            });
        }
    }

    Ok(GenerateResponse { text, sources })
}

// ---------------------------------------------------------------------------
// MockGenerator (test double shared by market and negotiation tests)
// ---------------------------------------------------------------------------

/// Scripted test double: returns pre-configured responses in order; when the
/// script runs out it repeats `fallback` (an error for `failing`, otherwise
/// [`AiError::EmptyResponse`]).
#[cfg(test)]
pub struct MockGenerator {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<GenerateResponse, AiError>>>,
    fallback: AiError,
    /// Requests seen, in call order.
    pub calls: std::sync::Mutex<Vec<GenerateRequest>>,
}

#[cfg(test)]
impl MockGenerator {
    pub fn new(responses: Vec<Result<GenerateResponse, AiError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().collect()),
            fallback: AiError::EmptyResponse,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Single fixed text response with no sources.
    pub fn ok(text: &str) -> Self {
        Self::new(vec![Ok(GenerateResponse {
            text: text.to_string(),
            sources: Vec::new(),
        })])
    }

    /// Always fails with the given error.
    pub fn failing(err: AiError) -> Self {
        Self {
            responses: std::sync::Mutex::new(std::collections::VecDeque::new()),
            fallback: err,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AiError> {
        self.calls.lock().unwrap().push(request.clone());
        let mut queue = self.responses.lock().unwrap();
        match queue.pop_front() {
            Some(response) => response,
            None => Err(self.fallback.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;

    fn make_config(api_key: Option<&str>) -> AiConfig {
        AiConfig {
            api_key: api_key.map(|s| s.to_string()),
            ..AiConfig::default()
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let config = make_config(Some("test-key"));
        let _client = GeminiClient::from_config(&config);
    }

    /// Verify that `GeminiClient` is object-safe (usable as `dyn TextGenerator`).
    #[test]
    fn client_is_object_safe() {
        let config = make_config(Some("test-key"));
        let client: Box<dyn TextGenerator> = Box::new(GeminiClient::from_config(&config));
        drop(client);
    }

    /// A configured empty-string key counts as missing.
    #[tokio::test]
    async fn empty_api_key_surfaces_missing_key_at_call_time() {
        // Shield the test from an ambient GEMINI_API_KEY.
        let saved = std::env::var("GEMINI_API_KEY").ok();
        std::env::remove_var("GEMINI_API_KEY");

        let client = GeminiClient::from_config(&make_config(Some("")));
        let request = GenerateRequest {
            model: "gemini-2.0-flash".into(),
            prompt: "hello".into(),
            grounding: false,
        };
        let result = client.generate(&request).await;
        assert!(matches!(result, Err(AiError::MissingApiKey)));

        if let Some(key) = saved {
            std::env::set_var("GEMINI_API_KEY", key);
        }
    }

    // -----------------------------------------------------------------------
    // Response body parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_text_and_sources() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [ { "text": "Tomato prices are " }, { "text": "stable." } ] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://agmarknet.gov.in", "title": "Agmarknet" } },
                        { "web": { "uri": "https://example.org" } },
                        { "retrievedContext": {} }
                    ]
                }
            }]
        });

        let response = parse_generate_response(&json).expect("parse");
        assert_eq!(response.text, "Tomato prices are stable.");
        assert_eq!(response.sources.len(), 2);
        assert_eq!(response.sources[0].title, "Agmarknet");
        // Missing title falls back to the generic label.
        assert_eq!(response.sources[1].title, "Market Data");
    }

    #[test]
    fn empty_text_is_an_error() {
        let json = serde_json::json!({
            "candidates": [{ "content": { "parts": [ { "text": "   " } ] } }]
        });
        assert!(matches!(
            parse_generate_response(&json),
            Err(AiError::EmptyResponse)
        ));
    }

    #[test]
    fn missing_candidates_is_an_error() {
        let json = serde_json::json!({});
        assert!(matches!(
            parse_generate_response(&json),
            Err(AiError::EmptyResponse)
        ));
    }

    #[test]
    fn no_grounding_metadata_yields_empty_sources() {
        let json = serde_json::json!({
            "candidates": [{ "content": { "parts": [ { "text": "answer" } ] } }]
        });
        let response = parse_generate_response(&json).expect("parse");
        assert!(response.sources.is_empty());
    }

    // -----------------------------------------------------------------------
    // Error display wording (surfaced directly to the user)
    // -----------------------------------------------------------------------

    #[test]
    fn quota_error_mentions_429() {
        let msg = AiError::Quota.to_string();
        assert!(msg.contains("429"));
        assert!(msg.to_lowercase().contains("quota"));
    }

    #[test]
    fn missing_key_error_names_the_env_var() {
        assert!(AiError::MissingApiKey.to_string().contains("GEMINI_API_KEY"));
    }
}
