//! Append-only transcript log for one negotiation session.

use std::time::{SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// Speaker / TranscriptionItem
// ---------------------------------------------------------------------------

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Model,
}

/// One entry of the conversation feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionItem {
    pub speaker: Speaker,
    pub text: String,
    /// Unix milliseconds at the moment the entry was appended.
    pub timestamp_ms: u64,
}

// ---------------------------------------------------------------------------
// TranscriptLog
// ---------------------------------------------------------------------------

/// Ordered, append-only log of user/model turns.
///
/// Entries are only ever appended while a session runs; the log is cleared
/// as a whole when a new session starts.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    items: Vec<TranscriptionItem>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one user/model exchange, user turn first.  Both entries are
    /// timestamped at receipt time (now), matching how the reply and the
    /// utterance it answers land together.
    pub fn record_exchange(&mut self, utterance: &str, reply: &str) {
        let timestamp_ms = now_ms();
        self.items.push(TranscriptionItem {
            speaker: Speaker::User,
            text: utterance.to_string(),
            timestamp_ms,
        });
        self.items.push(TranscriptionItem {
            speaker: Speaker::Model,
            text: reply.to_string(),
            timestamp_ms,
        });
    }

    /// Drop all entries (new session).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[TranscriptionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let log = TranscriptLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn exchange_appends_user_then_model() {
        let mut log = TranscriptLog::new();
        log.record_exchange("टमाटर का भाव", "A fair range is 2300-2600.");

        assert_eq!(log.len(), 2);
        assert_eq!(log.items()[0].speaker, Speaker::User);
        assert_eq!(log.items()[0].text, "टमाटर का भाव");
        assert_eq!(log.items()[1].speaker, Speaker::Model);
        assert_eq!(log.items()[1].text, "A fair range is 2300-2600.");
        // Both halves of one exchange share a receipt timestamp.
        assert_eq!(log.items()[0].timestamp_ms, log.items()[1].timestamp_ms);
    }

    #[test]
    fn exchanges_accumulate_in_order() {
        let mut log = TranscriptLog::new();
        log.record_exchange("U1", "R1");
        log.record_exchange("U2", "R2");

        let texts: Vec<&str> = log.items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["U1", "R1", "U2", "R2"]);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = TranscriptLog::new();
        log.record_exchange("U1", "R1");
        log.clear();
        assert!(log.is_empty());
    }
}
