//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AiConfig
// ---------------------------------------------------------------------------

/// Settings for the Gemini text-generation client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Base URL of the Gemini REST endpoint.
    pub base_url: String,
    /// API key. `None` means fall back to the `GEMINI_API_KEY` environment
    /// variable at client construction. A missing key is surfaced at the
    /// first AI invocation, not at startup.
    pub api_key: Option<String>,
    /// Model identifier used for market price queries (grounded search).
    pub market_model: String,
    /// Model identifier used for negotiation mediation turns.
    pub negotiation_model: String,
    /// Maximum seconds to wait for a generation response before timing out.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            market_model: "gemini-3-flash-preview".into(),
            negotiation_model: "gemini-2.0-flash".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech capture and synthesis collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Capture source language as a BCP-47 tag (e.g. `"hi-IN"`).
    pub recognition_language: String,
    /// Synthesis target voice locale (e.g. `"en-IN"`).
    pub synthesis_voice: String,
    /// Synthesis playback rate (1.0 = normal speed).
    pub synthesis_rate: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            recognition_language: "hi-IN".into(),
            synthesis_voice: "en-IN".into(),
            synthesis_rate: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Settings for the negotiation session engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Milliseconds the stop-guard stays armed after an intentional stop.
    /// Capture-engine "ended" events inside this window must not restart
    /// capture.
    pub stop_guard_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { stop_guard_ms: 300 }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use mandi_bridge::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini client settings.
    pub ai: AiConfig,
    /// Speech capture / synthesis settings.
    pub speech: SpeechConfig,
    /// Negotiation session settings.
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.ai.base_url, loaded.ai.base_url);
        assert_eq!(original.ai.api_key, loaded.ai.api_key);
        assert_eq!(original.ai.market_model, loaded.ai.market_model);
        assert_eq!(original.ai.negotiation_model, loaded.ai.negotiation_model);
        assert_eq!(original.ai.timeout_secs, loaded.ai.timeout_secs);

        assert_eq!(
            original.speech.recognition_language,
            loaded.speech.recognition_language
        );
        assert_eq!(original.speech.synthesis_voice, loaded.speech.synthesis_voice);
        assert_eq!(original.speech.synthesis_rate, loaded.speech.synthesis_rate);

        assert_eq!(original.session.stop_guard_ms, loaded.session.stop_guard_ms);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.ai.market_model, default.ai.market_model);
        assert_eq!(
            config.speech.recognition_language,
            default.speech.recognition_language
        );
        assert_eq!(config.session.stop_guard_ms, default.session.stop_guard_ms);
    }

    /// Verify default values match the design notes.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.ai.base_url, "https://generativelanguage.googleapis.com");
        assert!(cfg.ai.api_key.is_none());
        assert_eq!(cfg.ai.market_model, "gemini-3-flash-preview");
        assert_eq!(cfg.ai.negotiation_model, "gemini-2.0-flash");
        assert_eq!(cfg.speech.recognition_language, "hi-IN");
        assert_eq!(cfg.speech.synthesis_voice, "en-IN");
        assert_eq!(cfg.session.stop_guard_ms, 300);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.ai.api_key = Some("test-key".into());
        cfg.ai.market_model = "gemini-exp".into();
        cfg.ai.timeout_secs = 10;
        cfg.speech.recognition_language = "ta-IN".into();
        cfg.session.stop_guard_ms = 500;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.ai.api_key, Some("test-key".into()));
        assert_eq!(loaded.ai.market_model, "gemini-exp");
        assert_eq!(loaded.ai.timeout_secs, 10);
        assert_eq!(loaded.speech.recognition_language, "ta-IN");
        assert_eq!(loaded.session.stop_guard_ms, 500);
    }
}
