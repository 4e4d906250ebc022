//! AI text-generation boundary.
//!
//! This module provides:
//! * [`TextGenerator`] — async trait implemented by all generation backends.
//! * [`GeminiClient`] — Gemini REST client (the production backend).
//! * [`GenerateRequest`] / [`GenerateResponse`] — the typed request/response
//!   shapes at the collaborator boundary.
//! * [`GroundingSource`] — a web citation returned alongside a grounded
//!   answer, deduplicated by uri.
//! * [`AiError`] — error variants for generation calls.
//! * [`prompt`] — the two prompt templates (market query, negotiation).
//!
//! Two call sites use this boundary with different model identifiers:
//! the market searcher (grounded search enabled) and the negotiation
//! engine (plain generation). No retry policy is implemented — a single
//! failed call surfaces an error immediately.

pub mod client;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{
    AiError, GeminiClient, GenerateRequest, GenerateResponse, GroundingSource, TextGenerator,
};
pub use prompt::{market_prompt, negotiation_prompt};

// test-only re-export so sibling-module test code can import MockGenerator
// without `use crate::ai::client::MockGenerator`.
#[cfg(test)]
pub use client::MockGenerator;
