//! Session state: what one user has uploaded, transcribed and asked.

use serde::Serialize;

use llamaocr_core::{ChatTurn, HistoryEntry, OcrError, OcrRecord};

/// Retention limits applied to a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionLimits {
    /// Oldest chat turns are evicted beyond this many. `None` = unbounded.
    pub max_chat_turns: Option<usize>,
}

/// Active state of one user's session.
#[derive(Debug, Default)]
pub struct SessionContext {
    /// Every successful transcription, oldest first. Never deduplicated.
    history: Vec<OcrRecord>,
    /// Index into `history` of the result questions are asked against.
    current: Option<usize>,
    /// One flat list shared by all transcriptions.
    chat: Vec<ChatTurn>,
    limits: SessionLimits,
}

/// Serializable view of a session, returned to the page.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub current: Option<OcrRecord>,
    pub history: Vec<HistoryEntry>,
    pub chat: Vec<ChatTurn>,
}

impl SessionContext {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    /// Append a successful transcription and make it current. Returns its index.
    pub fn record_ocr(&mut self, record: OcrRecord) -> usize {
        self.history.push(record);
        let index = self.history.len() - 1;
        self.current = Some(index);
        index
    }

    pub fn current(&self) -> Option<&OcrRecord> {
        self.current.and_then(|i| self.history.get(i))
    }

    pub fn history(&self) -> &[OcrRecord] {
        &self.history
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .enumerate()
            .map(|(index, record)| HistoryEntry {
                index,
                filename: record.filename.clone(),
                created_at: record.created_at,
            })
            .collect()
    }

    /// Read-only lookup of a past transcription. Does not change the current result.
    pub fn history_entry(&self, index: usize) -> Result<&OcrRecord, OcrError> {
        self.history.get(index).ok_or(OcrError::HistoryIndexOutOfRange {
            index,
            len: self.history.len(),
        })
    }

    /// Record the user's question and return the transcription to ask against.
    ///
    /// Nothing is recorded when the question is blank or no result is current.
    pub fn begin_question(&mut self, question: &str) -> Result<String, OcrError> {
        if question.trim().is_empty() {
            return Err(OcrError::EmptyQuestion);
        }
        let text = self.current().ok_or(OcrError::NoCurrentResult)?.text.clone();
        self.push_turn(ChatTurn::user(question));
        Ok(text)
    }

    pub fn record_answer(&mut self, answer: impl Into<String>) {
        self.push_turn(ChatTurn::assistant(answer));
    }

    pub fn chat(&self) -> &[ChatTurn] {
        &self.chat
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current: self.current().cloned(),
            history: self.history_entries(),
            chat: self.chat.clone(),
        }
    }

    fn push_turn(&mut self, turn: ChatTurn) {
        self.chat.push(turn);
        if let Some(max) = self.limits.max_chat_turns {
            if self.chat.len() > max {
                let excess = self.chat.len() - max;
                self.chat.drain(..excess);
            }
        }
    }
}
