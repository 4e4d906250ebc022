//! Speech capture and synthesis collaborator seams.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────┐          ┌─────────────────────────┐
//! │ SpeechRecognizer(trait)│          │ SpeechSynthesizer(trait)│
//! │  start(tx) / stop()    │          │  speak(text, tx)/cancel │
//! └──────────┬─────────────┘          └───────────┬─────────────┘
//!            │ RecognitionEvent                   │ SynthesisEvent
//!            ▼                                    ▼
//!      negotiation engine  ◀──────────────────────┘
//! ```
//!
//! Both traits are event-driven: implementations push lifecycle events into
//! a `tokio::sync::mpsc` channel handed to them, mirroring the callback
//! surface of platform speech engines.  The engine owns at most one active
//! capture and one active playback per session; `speak` on a synthesizer
//! supersedes (cancels) any utterance still playing.
//!
//! [`console`] provides the terminal adapters used by the binary:
//! stdin lines act as finalized utterances, replies are printed.

pub mod console;

use thiserror::Error;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Lifecycle and transcript events emitted by a capture engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Capture is live and listening.
    Started,
    /// A partial (revisable) transcript of the current utterance.
    Interim(String),
    /// A finalized utterance — the engine will not revise it further.
    Final(String),
    /// Capture stopped on its own (platform silence timeout, stream end).
    Ended,
    /// A runtime capture error; capture may or may not continue.
    Error(String),
}

/// Playback lifecycle events emitted by a synthesis engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisEvent {
    Started,
    Finished,
}

// ---------------------------------------------------------------------------
// RecognizerError
// ---------------------------------------------------------------------------

/// Errors that prevent speech capture from starting.
#[derive(Debug, Clone, Error)]
pub enum RecognizerError {
    /// No capture engine exists on this platform. Terminal for the session.
    #[error("Speech recognition is not supported on this platform")]
    Unsupported,

    /// The capture engine exists but could not start.
    #[error("Speech capture unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Continuous speech capture with interim results.
///
/// Implementations must be `Send + Sync` so they can be held behind an
/// `Arc<dyn SpeechRecognizer>`.  The source language is implementation
/// configuration (see [`SpeechConfig`](crate::config::SpeechConfig)).
pub trait SpeechRecognizer: Send + Sync {
    /// Begin capture, pushing events into `events`.
    ///
    /// A successful return means capture is starting; [`RecognitionEvent::Started`]
    /// confirms it is live.  Calling `start` again after [`RecognitionEvent::Ended`]
    /// restarts capture (the engine uses this to keep listening continuous).
    fn start(&self, events: mpsc::Sender<RecognitionEvent>) -> Result<(), RecognizerError>;

    /// Stop capture. Idempotent; a final [`RecognitionEvent::Ended`] may
    /// still be delivered afterwards.
    fn stop(&self);
}

/// Best-effort speech playback.
///
/// Synthesis failures are swallowed by implementations — playback is a
/// non-critical feature and must never take the session down.
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`, superseding any utterance still playing.  Emits
    /// [`SynthesisEvent::Started`] and [`SynthesisEvent::Finished`] into
    /// `events`.
    fn speak(&self, text: &str, events: mpsc::Sender<SynthesisEvent>);

    /// Cancel any in-flight utterance. Idempotent.
    fn cancel(&self);
}

// Compile-time assertions: both traits must be object-safe.
const _: fn() = || {
    fn _recognizer(_: Box<dyn SpeechRecognizer>) {}
    fn _synthesizer(_: Box<dyn SpeechSynthesizer>) {}
};

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use console::{ConsoleSynthesizer, LineRecognizer};

// test-only re-exports so the negotiation engine tests can import the mocks
// without reaching into the console module.
#[cfg(test)]
pub use mock::{MockRecognizer, MockSynthesizer};

// ---------------------------------------------------------------------------
// Mocks (test doubles shared by negotiation engine tests)
// ---------------------------------------------------------------------------
