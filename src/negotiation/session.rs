//! Negotiation session state machine.
//!
//! [`NegotiationSession`] is an explicit session object with a single
//! dispatcher, [`handle`](NegotiationSession::handle): feed it a
//! [`SessionEvent`], get back the [`SessionAction`]s the caller must carry
//! out.  It performs no I/O itself, which makes every transition testable
//! without async machinery or real collaborators.
//!
//! # State machine
//!
//! ```text
//! Idle ──Start/CaptureStarted──▶ Listening
//!    Listening ──FinalTranscript──▶ Connecting   (AI call issued)
//!    Connecting ──AiResolved──▶ (speak reply)
//!               ──SynthesisStarted──▶ Speaking
//!    Speaking ──SynthesisFinished──▶ Listening   (next queued utterance, if any)
//! any state ──Stop──▶ Idle          (cancel synthesis, stop capture, guard armed)
//! Connecting ──AiFailed──▶ Idle     (session ended, manual restart only)
//! ```
//!
//! # Ordering guarantees
//!
//! At most one AI call is in flight per session.  Utterances finalized while
//! a call is pending are queued FIFO and dispatched one at a time after the
//! current reply's synthesis finishes, so the transcript always records
//! user/model pairs in utterance-finalization order — even if the platform
//! capture engine keeps recognizing in the background.
//!
//! A stop-guard window follows every intentional stop: the capture engine's
//! own "ended" event inside that window must not restart capture.  AI
//! results that resolve after the session went idle are dropped.

use std::collections::VecDeque;

use crate::negotiation::transcript::TranscriptLog;

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The single process-wide status value of a negotiation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session running.
    Idle,
    /// An utterance was finalized; the AI call is pending.
    Connecting,
    /// Capture is live and waiting for speech.
    Listening,
    /// The mediator's reply is being played back.
    Speaking,
}

impl SessionStatus {
    /// Returns `true` for every status except [`SessionStatus::Idle`].
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionStatus::Idle)
    }

    /// A short human-readable label suitable for a status indicator.
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Listening => "listening",
            SessionStatus::Speaking => "speaking",
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

// ---------------------------------------------------------------------------
// Events and actions
// ---------------------------------------------------------------------------

/// Everything that can happen to a session, from the user or a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// User starts a session.
    Start,
    /// User ends the session.
    Stop,
    /// Capture engine reports it is live.
    CaptureStarted,
    /// Partial (revisable) transcript of the current utterance.
    InterimTranscript(String),
    /// A finalized utterance.
    FinalTranscript(String),
    /// Capture engine stopped on its own (e.g. platform silence timeout).
    CaptureEnded,
    /// Capture engine reported a runtime error.
    CaptureFailed(String),
    /// The AI call for `utterance` produced `reply`.
    AiResolved { utterance: String, reply: String },
    /// The AI call failed; the message is user-facing.
    AiFailed(String),
    /// Playback of the current reply started.
    SynthesisStarted,
    /// Playback of the current reply completed.
    SynthesisFinished,
    /// The post-stop guard window elapsed.
    StopGuardElapsed,
}

/// Side effects the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Start (or restart) the capture engine.
    StartCapture,
    /// Stop the capture engine.
    StopCapture,
    /// Cancel any in-flight playback.
    CancelSynthesis,
    /// Issue the AI call for this utterance.
    InvokeAi(String),
    /// Play this reply.
    Speak(String),
    /// Arm the stop-guard timer.
    ScheduleStopGuard,
    /// Show this error to the user.
    SurfaceError(String),
}

// ---------------------------------------------------------------------------
// NegotiationSession
// ---------------------------------------------------------------------------

/// Owns all per-session state: status, transient buffers, the single-flight
/// AI queue, and the transcript log.
#[derive(Debug, Default)]
pub struct NegotiationSession {
    status: SessionStatus,
    /// Session is running (distinct from status: an auto-restarting capture
    /// engine can briefly be down while the session stays active).
    active: bool,
    /// Stop-guard armed: suppress capture auto-restart.
    stopping: bool,
    /// Interim recognition buffer shown while the user is mid-utterance.
    current_input: String,
    /// The most recent mediator reply.
    current_output: String,
    /// Utterance whose AI call is pending, if any.
    in_flight: Option<String>,
    /// Utterances finalized while an AI call was pending, FIFO.
    queued: VecDeque<String>,
    transcript: TranscriptLog,
    last_error: Option<String>,
}

impl NegotiationSession {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Dispatcher
    // -----------------------------------------------------------------------

    /// Apply one event and return the actions the caller must perform.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::Start => self.on_start(),
            SessionEvent::Stop => self.on_stop(),
            SessionEvent::CaptureStarted => self.on_capture_started(),
            SessionEvent::InterimTranscript(text) => self.on_interim(text),
            SessionEvent::FinalTranscript(text) => self.on_final(text),
            SessionEvent::CaptureEnded => self.on_capture_ended(),
            SessionEvent::CaptureFailed(message) => self.on_capture_failed(message),
            SessionEvent::AiResolved { utterance, reply } => self.on_ai_resolved(utterance, reply),
            SessionEvent::AiFailed(message) => self.on_ai_failed(message),
            SessionEvent::SynthesisStarted => self.on_synthesis_started(),
            SessionEvent::SynthesisFinished => self.on_synthesis_finished(),
            SessionEvent::StopGuardElapsed => {
                self.stopping = false;
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn on_start(&mut self) -> Vec<SessionAction> {
        if self.active {
            return Vec::new();
        }
        self.active = true;
        self.stopping = false;
        self.current_input.clear();
        self.current_output.clear();
        self.in_flight = None;
        self.queued.clear();
        self.transcript.clear();
        self.last_error = None;
        vec![SessionAction::StartCapture]
    }

    fn on_stop(&mut self) -> Vec<SessionAction> {
        if !self.active {
            return Vec::new();
        }
        self.active = false;
        self.stopping = true;
        self.status = SessionStatus::Idle;
        self.current_input.clear();
        self.current_output.clear();
        self.in_flight = None;
        self.queued.clear();
        vec![
            SessionAction::CancelSynthesis,
            SessionAction::StopCapture,
            SessionAction::ScheduleStopGuard,
        ]
    }

    fn on_capture_started(&mut self) -> Vec<SessionAction> {
        if self.active {
            self.status = SessionStatus::Listening;
            self.last_error = None;
        }
        Vec::new()
    }

    fn on_interim(&mut self, text: String) -> Vec<SessionAction> {
        let trimmed = text.trim();
        if self.active && !trimmed.is_empty() {
            self.current_input = trimmed.to_string();
        }
        Vec::new()
    }

    fn on_final(&mut self, text: String) -> Vec<SessionAction> {
        let utterance = text.trim().to_string();
        if !self.active || utterance.is_empty() {
            return Vec::new();
        }
        self.current_input = utterance.clone();

        if self.in_flight.is_some() {
            // Single-flight: hold this utterance until the current turn
            // (call + playback) completes.
            self.queued.push_back(utterance);
            return Vec::new();
        }

        self.in_flight = Some(utterance.clone());
        self.status = SessionStatus::Connecting;
        vec![SessionAction::InvokeAi(utterance)]
    }

    fn on_capture_ended(&mut self) -> Vec<SessionAction> {
        if self.active && !self.stopping {
            // Platform silence timeout etc. — keep listening continuous.
            return vec![SessionAction::StartCapture];
        }
        Vec::new()
    }

    fn on_capture_failed(&mut self, message: String) -> Vec<SessionAction> {
        self.last_error = Some(message.clone());
        vec![SessionAction::SurfaceError(message)]
    }

    fn on_ai_resolved(&mut self, utterance: String, reply: String) -> Vec<SessionAction> {
        if !self.active {
            // Resolved after stop: must not resurrect the session.
            return Vec::new();
        }
        self.in_flight = None;
        self.transcript.record_exchange(&utterance, &reply);
        self.current_input.clear();
        self.current_output = reply.clone();
        vec![SessionAction::Speak(reply)]
    }

    fn on_ai_failed(&mut self, message: String) -> Vec<SessionAction> {
        if !self.active {
            return Vec::new();
        }
        // The session is over; only a manual restart recovers.
        self.active = false;
        self.status = SessionStatus::Idle;
        self.in_flight = None;
        self.queued.clear();
        self.last_error = Some(message.clone());
        vec![
            SessionAction::StopCapture,
            SessionAction::SurfaceError(message),
        ]
    }

    fn on_synthesis_started(&mut self) -> Vec<SessionAction> {
        if self.active {
            self.status = SessionStatus::Speaking;
        }
        Vec::new()
    }

    fn on_synthesis_finished(&mut self) -> Vec<SessionAction> {
        if !self.active {
            return Vec::new();
        }
        self.status = SessionStatus::Listening;

        if let Some(next) = self.queued.pop_front() {
            self.in_flight = Some(next.clone());
            self.status = SessionStatus::Connecting;
            return vec![SessionAction::InvokeAi(next)];
        }
        Vec::new()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop-guard currently armed.
    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    pub fn current_output(&self) -> &str {
        &self.current_output
    }

    pub fn transcript(&self) -> &TranscriptLog {
        &self.transcript
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
