//! Configuration module for Mandi Bridge.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the AI client,
//! the speech collaborators and the negotiation session, `AppPaths` for
//! cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AiConfig, AppConfig, SessionConfig, SpeechConfig};
