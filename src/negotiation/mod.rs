//! Voice negotiation: turn-taking session state machine and async engine.
//!
//! # Architecture
//!
//! ```text
//! SpeechRecognizer ──RecognitionEvent──▶ ┌──────────────────────┐
//! SpeechSynthesizer ──SynthesisEvent──▶  │  NegotiationEngine   │
//! user (start/stop) ──SessionEvent────▶  │  (async interpreter) │
//!                                        └──────────┬───────────┘
//!                                                   │ SessionEvent
//!                                                   ▼
//!                                       NegotiationSession (pure FSM)
//!                                                   │ SessionAction
//!                                                   ▼
//!                             StartCapture / InvokeAi / Speak / ...
//! ```
//!
//! [`NegotiationSession`] is a pure transition function over
//! [`SessionEvent`]s — every state and transition is independently testable
//! without async machinery.  [`NegotiationEngine`] interprets the emitted
//! [`SessionAction`]s against the real collaborators (capture, synthesis,
//! AI) on the tokio event loop.

pub mod engine;
pub mod session;
pub mod transcript;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use engine::NegotiationEngine;
pub use session::{NegotiationSession, SessionAction, SessionEvent, SessionStatus};
pub use transcript::{Speaker, TranscriptLog, TranscriptionItem};
