use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One question and the answer it got. Never changed after it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    user: String,
    ai: String,
}

impl QaPair {
    pub fn new(user: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ai: ai.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn ai(&self) -> &str {
        &self.ai
    }
}

/// Conversation state of one browsing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    chat_history: Vec<QaPair>,
    last_response: Option<String>,
    last_question: Option<String>,
    last_interaction_time: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            chat_history: Vec::new(),
            last_response: None,
            last_question: None,
            last_interaction_time: now,
        }
    }

    pub fn chat_history(&self) -> &[QaPair] {
        &self.chat_history
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    pub fn last_question(&self) -> Option<&str> {
        self.last_question.as_deref()
    }

    pub fn last_interaction_time(&self) -> DateTime<Utc> {
        self.last_interaction_time
    }

    /// Marks a submit. The timestamp only ever moves forward.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_interaction_time {
            self.last_interaction_time = now;
        }
    }

    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        let question = question.into();
        let answer = answer.into();
        self.chat_history.push(QaPair::new(question.clone(), answer.clone()));
        self.last_question = Some(question);
        self.last_response = Some(answer);
    }

    pub fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_interaction_time > timeout
    }

    /// Clears history and the last exchange when the session has been idle
    /// for longer than `timeout`. Returns whether anything was cleared.
    pub fn maybe_expire(&mut self, now: DateTime<Utc>, timeout: Duration) -> bool {
        if !self.is_idle(now, timeout) {
            return false;
        }
        let had_state = !self.chat_history.is_empty()
            || self.last_response.is_some()
            || self.last_question.is_some();

        self.chat_history.clear();
        self.last_response = None;
        self.last_question = None;
        had_state
    }
}
