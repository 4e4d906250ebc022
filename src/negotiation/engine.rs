//! Negotiation engine — async interpreter for the session state machine.
//!
//! [`NegotiationEngine`] owns a [`NegotiationSession`] and drives it from a
//! `tokio::sync::mpsc` channel of [`SessionEvent`]s.  The session decides;
//! the engine executes: every [`SessionAction`] returned by a transition is
//! carried out here against the real collaborators (capture engine, AI
//! client, playback engine).
//!
//! # Event flow
//!
//! ```text
//! user / CLI ──Start/Stop──▶ events channel ──▶ session.handle(event)
//!                                                     │ actions
//!          ┌──────────────────────────────────────────┤
//!          ▼                    ▼                     ▼
//!   recognizer.start()   spawn AI call          synthesizer.speak()
//!     (forwarder task      (resolves to           (forwarder task
//!      maps capture         AiResolved /           maps playback
//!      events back in)      AiFailed)              events back in)
//! ```
//!
//! AI calls run on spawned tasks so a `Stop` arriving mid-call is processed
//! immediately; the late result lands on an idle session and is dropped.
//! The engine keeps its own sender clone, so the loop ends via the session
//! going idle rather than channel closure.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::ai::{negotiation_prompt, AiError, GenerateRequest, TextGenerator};
use crate::speech::{RecognitionEvent, SpeechRecognizer, SpeechSynthesizer, SynthesisEvent};

use super::session::{NegotiationSession, SessionAction, SessionEvent};

/// Reply spoken when the model answers with no usable text.
pub const FALLBACK_REPLY: &str = "I could not generate a response right now.";

// ---------------------------------------------------------------------------
// NegotiationEngine
// ---------------------------------------------------------------------------

/// Drives a complete negotiation session.
///
/// Create with [`NegotiationEngine::new`], send [`SessionEvent::Start`] on
/// the events channel, then await [`run`](Self::run).  `run` returns the
/// final session once it has gone idle (user stop, AI failure, or capture
/// becoming unavailable).
pub struct NegotiationEngine {
    session: NegotiationSession,
    generator: Arc<dyn TextGenerator>,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Model used for mediation replies (ungrounded, latency-sensitive).
    model: String,
    stop_guard: Duration,
    /// Self-sender: collaborator tasks feed their events back through this.
    events_tx: mpsc::Sender<SessionEvent>,
    /// Set once `Start` has been seen, so a pre-start idle session does not
    /// end the loop immediately.
    started: bool,
}

impl NegotiationEngine {
    /// Create an engine wired to its collaborators.
    ///
    /// `events_tx` must be a sender for the same channel whose receiver is
    /// later passed to [`run`](Self::run).
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        model: impl Into<String>,
        stop_guard: Duration,
        events_tx: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            session: NegotiationSession::new(),
            generator,
            recognizer,
            synthesizer,
            model: model.into(),
            stop_guard,
            events_tx,
            started: false,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until the session has started and gone fully idle (stop-guard
    /// included), then return it for inspection.
    pub async fn run(mut self, mut events_rx: mpsc::Receiver<SessionEvent>) -> NegotiationSession {
        while let Some(event) = events_rx.recv().await {
            if matches!(event, SessionEvent::Start) {
                self.started = true;
            }
            log::debug!("negotiation: event {event:?}");

            let actions = self.session.handle(event);
            for action in actions {
                self.perform(action).await;
            }

            if self.started && !self.session.is_active() && !self.session.is_stopping() {
                break;
            }
        }

        log::info!("negotiation: session ended");
        self.session
    }

    // -----------------------------------------------------------------------
    // Action interpreter
    // -----------------------------------------------------------------------

    async fn perform(&mut self, action: SessionAction) {
        match action {
            SessionAction::StartCapture => self.start_capture().await,
            SessionAction::StopCapture => self.recognizer.stop(),
            SessionAction::CancelSynthesis => self.synthesizer.cancel(),
            SessionAction::InvokeAi(utterance) => self.invoke_ai(utterance),
            SessionAction::Speak(text) => self.speak(text),
            SessionAction::ScheduleStopGuard => self.schedule_stop_guard(),
            SessionAction::SurfaceError(message) => {
                log::error!("negotiation: {message}");
            }
        }
    }

    /// Start capture and forward its events into the session channel.
    ///
    /// A start failure is terminal: the failure is surfaced and the session
    /// is stopped through the normal event path.
    async fn start_capture(&mut self) {
        let (capture_tx, mut capture_rx) = mpsc::channel(32);

        if let Err(e) = self.recognizer.start(capture_tx) {
            log::warn!("negotiation: capture failed to start: {e}");
            let _ = self
                .events_tx
                .send(SessionEvent::CaptureFailed(e.to_string()))
                .await;
            let _ = self.events_tx.send(SessionEvent::Stop).await;
            return;
        }

        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = capture_rx.recv().await {
                let mapped = match event {
                    RecognitionEvent::Started => SessionEvent::CaptureStarted,
                    RecognitionEvent::Interim(text) => SessionEvent::InterimTranscript(text),
                    RecognitionEvent::Final(text) => SessionEvent::FinalTranscript(text),
                    RecognitionEvent::Ended => SessionEvent::CaptureEnded,
                    RecognitionEvent::Error(message) => SessionEvent::CaptureFailed(message),
                };
                if events_tx.send(mapped).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Spawn the AI call for one utterance.
    ///
    /// Runs on its own task so `Stop` is never blocked behind a slow call.
    /// An empty model answer becomes [`FALLBACK_REPLY`] rather than an error.
    fn invoke_ai(&self, utterance: String) {
        let generator = Arc::clone(&self.generator);
        let model = self.model.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let request = GenerateRequest {
                model,
                prompt: negotiation_prompt(&utterance),
                grounding: false,
            };

            let event = match generator.generate(&request).await {
                Ok(response) => SessionEvent::AiResolved {
                    utterance,
                    reply: response.text.trim().to_string(),
                },
                Err(AiError::EmptyResponse) => SessionEvent::AiResolved {
                    utterance,
                    reply: FALLBACK_REPLY.to_string(),
                },
                Err(e) => SessionEvent::AiFailed(e.to_string()),
            };
            let _ = events_tx.send(event).await;
        });
    }

    /// Play a reply and forward its playback events into the session channel.
    fn speak(&self, text: String) {
        let (playback_tx, mut playback_rx) = mpsc::channel(8);

        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = playback_rx.recv().await {
                let mapped = match event {
                    SynthesisEvent::Started => SessionEvent::SynthesisStarted,
                    SynthesisEvent::Finished => SessionEvent::SynthesisFinished,
                };
                if events_tx.send(mapped).await.is_err() {
                    break;
                }
            }
        });

        self.synthesizer.speak(&text, playback_tx);
    }

    /// Arm the post-stop guard window.
    fn schedule_stop_guard(&self) {
        let events_tx = self.events_tx.clone();
        let guard = self.stop_guard;
        tokio::spawn(async move {
            tokio::time::sleep(guard).await;
            let _ = events_tx.send(SessionEvent::StopGuardElapsed).await;
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
