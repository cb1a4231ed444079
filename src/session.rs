//! UI-agnostic conversation state
//!
//! Holds the chat transcript, the document summary, and the in-flight flags
//! for the two backend requests. All mutation goes through the operations
//! below so the request lifecycle can be tested without a terminal or a
//! network connection.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A single turn in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Per-run conversation state. Nothing here survives a restart.
#[derive(Debug, Default)]
pub struct Session {
    /// Summary of the most recently uploaded document
    pub summary: Option<String>,
    /// Append-only transcript; insertion order is display order
    pub transcript: Vec<ChatMessage>,
    /// Current draft text, cleared when a question is submitted
    pub pending_input: String,
    pub upload_in_flight: bool,
    pub answer_in_flight: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an upload as started. Called just before the request is spawned.
    pub fn begin_upload(&mut self) {
        self.upload_in_flight = true;
    }

    /// Record the outcome of an upload. A new summary fully replaces the
    /// previous one; on failure the previous summary is kept and the error
    /// goes to the log only.
    pub fn finish_upload(&mut self, result: Result<String>) {
        match result {
            Ok(summary) => {
                self.summary = Some(summary);
            }
            Err(err) => {
                tracing::warn!("upload failed: {err:#}");
            }
        }
        self.upload_in_flight = false;
    }

    /// Take the drafted question for sending. Appends the user message to
    /// the transcript immediately (before the request resolves), clears the
    /// draft, and marks the answer as in flight. A whitespace-only draft is
    /// a no-op and leaves everything untouched.
    pub fn take_question(&mut self) -> Option<String> {
        if self.pending_input.trim().is_empty() {
            return None;
        }
        let question = std::mem::take(&mut self.pending_input);
        self.transcript.push(ChatMessage {
            role: ChatRole::User,
            content: question.clone(),
        });
        self.answer_in_flight = true;
        Some(question)
    }

    /// Record the outcome of an ask. Success appends the assistant message;
    /// failure appends nothing, so the transcript keeps only the user turn.
    pub fn finish_question(&mut self, result: Result<String>) {
        match result {
            Ok(answer) => {
                self.transcript.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: answer,
                });
            }
            Err(err) => {
                tracing::warn!("ask failed: {err:#}");
            }
        }
        self.answer_in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn upload_success_replaces_summary() {
        let mut session = Session::new();
        session.begin_upload();
        assert!(session.upload_in_flight);
        session.finish_upload(Ok("Q3 revenue rose 4%.".to_string()));

        assert_eq!(session.summary.as_deref(), Some("Q3 revenue rose 4%."));
        assert!(!session.upload_in_flight);
        assert!(session.transcript.is_empty());

        // A later upload overwrites, never accumulates
        session.begin_upload();
        session.finish_upload(Ok("A different document.".to_string()));
        assert_eq!(session.summary.as_deref(), Some("A different document."));
    }

    #[test]
    fn upload_failure_keeps_previous_summary() {
        let mut session = Session::new();
        session.finish_upload(Ok("First summary".to_string()));

        session.begin_upload();
        session.finish_upload(Err(anyhow!("connection refused")));

        assert_eq!(session.summary.as_deref(), Some("First summary"));
        assert!(!session.upload_in_flight);
    }

    #[test]
    fn question_appends_user_message_immediately() {
        let mut session = Session::new();
        session.pending_input = "What was the revenue change?".to_string();

        let question = session.take_question().unwrap();
        assert_eq!(question, "What was the revenue change?");
        assert!(session.pending_input.is_empty());
        assert!(session.answer_in_flight);

        // User turn is visible before any response arrives
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.transcript[0].role, ChatRole::User);
        assert_eq!(session.transcript[0].content, "What was the revenue change?");
    }

    #[test]
    fn answer_follows_user_message() {
        let mut session = Session::new();
        session.pending_input = "Who wrote this report?".to_string();
        session.take_question().unwrap();
        session.finish_question(Ok("The finance team.".to_string()));

        assert_eq!(session.transcript.len(), 2);
        assert_eq!(session.transcript[0].role, ChatRole::User);
        assert_eq!(session.transcript[1].role, ChatRole::Assistant);
        assert_eq!(session.transcript[1].content, "The finance team.");
        assert!(!session.answer_in_flight);
    }

    #[test]
    fn blank_input_is_a_noop() {
        let mut session = Session::new();
        session.pending_input = "   \t ".to_string();

        assert!(session.take_question().is_none());
        assert_eq!(session.pending_input, "   \t ");
        assert!(session.transcript.is_empty());
        assert!(!session.answer_in_flight);
    }

    #[test]
    fn failed_ask_keeps_only_user_message() {
        let mut session = Session::new();
        session.pending_input = "Any risks mentioned?".to_string();
        session.take_question().unwrap();
        session.finish_question(Err(anyhow!("network error")));

        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.transcript[0].role, ChatRole::User);
        assert!(!session.answer_in_flight);
    }
}
