//! Terminal adapters for the speech traits.
//!
//! [`LineRecognizer`] treats each stdin line as one finalized utterance; no
//! interim events are produced.  [`ConsoleSynthesizer`] prints replies
//! instead of playing audio.  Together they let the negotiation engine run
//! end-to-end in a terminal without a platform speech stack.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use super::{
    RecognitionEvent, RecognizerError, SpeechRecognizer, SpeechSynthesizer, SynthesisEvent,
};

// ---------------------------------------------------------------------------
// LineRecognizer
// ---------------------------------------------------------------------------

/// Reads stdin on a dedicated blocking thread and emits each non-empty line
/// as a [`RecognitionEvent::Final`].
///
/// Stdin reads cannot be interrupted, so [`stop`](SpeechRecognizer::stop)
/// sets a flag and the thread exits on the next line (or EOF).  Once stdin
/// is exhausted a restart returns [`RecognizerError::Unavailable`] so the
/// session's continuous-listening restart does not spin.
pub struct LineRecognizer {
    stopping: std::sync::Arc<AtomicBool>,
    exhausted: std::sync::Arc<AtomicBool>,
}

impl LineRecognizer {
    pub fn new() -> Self {
        Self {
            stopping: std::sync::Arc::new(AtomicBool::new(false)),
            exhausted: std::sync::Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for LineRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechRecognizer for LineRecognizer {
    fn start(&self, events: mpsc::Sender<RecognitionEvent>) -> Result<(), RecognizerError> {
        if self.exhausted.load(Ordering::SeqCst) {
            return Err(RecognizerError::Unavailable("input stream closed".into()));
        }

        self.stopping.store(false, Ordering::SeqCst);
        let stopping = std::sync::Arc::clone(&self.stopping);
        let exhausted = std::sync::Arc::clone(&self.exhausted);

        std::thread::Builder::new()
            .name("line-recognizer".into())
            .spawn(move || {
                let _ = events.blocking_send(RecognitionEvent::Started);

                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    if stopping.load(Ordering::SeqCst) {
                        return;
                    }
                    match line {
                        Ok(line) => {
                            let trimmed = line.trim();
                            if trimmed.is_empty() {
                                continue;
                            }
                            if events
                                .blocking_send(RecognitionEvent::Final(trimmed.to_string()))
                                .is_err()
                            {
                                return;
                            }
                        }
                        Err(e) => {
                            let _ = events.blocking_send(RecognitionEvent::Error(e.to_string()));
                            return;
                        }
                    }
                }

                exhausted.store(true, Ordering::SeqCst);
                let _ = events.blocking_send(RecognitionEvent::Ended);
            })
            .map_err(|e| RecognizerError::Unavailable(e.to_string()))?;

        Ok(())
    }

    fn stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// ConsoleSynthesizer
// ---------------------------------------------------------------------------

/// Prints replies to stdout instead of playing audio.
///
/// Playback is instantaneous, so `Started` and `Finished` are emitted
/// back-to-back and [`cancel`](SpeechSynthesizer::cancel) has nothing to do.
pub struct ConsoleSynthesizer {
    voice: String,
}

impl ConsoleSynthesizer {
    /// `voice` is the configured synthesis locale, shown with each reply.
    pub fn new(voice: &str) -> Self {
        Self {
            voice: voice.to_string(),
        }
    }
}

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn speak(&self, text: &str, events: mpsc::Sender<SynthesisEvent>) {
        let _ = events.try_send(SynthesisEvent::Started);
        println!("[mediator {}] {}", self.voice, text);
        let _ = events.try_send(SynthesisEvent::Finished);
    }

    fn cancel(&self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_synthesizer_emits_start_then_finish() {
        let (tx, mut rx) = mpsc::channel(4);
        let synth = ConsoleSynthesizer::new("en-IN");

        synth.speak("A fair range is 2300 to 2600 per quintal.", tx);

        assert_eq!(rx.recv().await, Some(SynthesisEvent::Started));
        assert_eq!(rx.recv().await, Some(SynthesisEvent::Finished));
    }

    #[test]
    fn exhausted_line_recognizer_refuses_restart() {
        let recognizer = LineRecognizer::new();
        recognizer.exhausted.store(true, Ordering::SeqCst);

        let (tx, _rx) = mpsc::channel(4);
        let result = recognizer.start(tx);
        assert!(matches!(result, Err(RecognizerError::Unavailable(_))));
    }
}
