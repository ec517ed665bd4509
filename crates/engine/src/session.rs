use dlwatch_core::Token;
use serde_json::json;

/// Why a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// The cookie carried this cycle's token.
    Matched,
    /// The cookie stayed absent until the attempts ran out.
    GaveUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Pending,
    Done(CompletionReason),
}

/// Per-click polling state: the awaited token and the attempts left.
#[derive(Debug)]
pub struct PollSession {
    token: Token,
    remaining: u32,
    ticks: u32,
}

impl PollSession {
    pub fn new(token: Token, attempts: u32) -> Self {
        Self {
            token,
            remaining: attempts,
            ticks: 0,
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Feed one tick's cookie read.
    ///
    /// The session gives up on the first tick that finds the counter at zero
    /// with no cookie, so `attempts = n` gives up on tick `n + 1`. An empty
    /// value counts as absent; a present but foreign value keeps it polling.
    pub fn observe(&mut self, cookie: Option<&str>) -> Observation {
        self.ticks += 1;
        if self.token.matches(cookie) {
            return Observation::Done(CompletionReason::Matched);
        }
        if cookie.is_none_or(str::is_empty) && self.remaining == 0 {
            return Observation::Done(CompletionReason::GaveUp);
        }
        self.remaining = self.remaining.saturating_sub(1);
        Observation::Pending
    }

    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "token": self.token.as_str(),
            "remaining": self.remaining,
            "ticks": self.ticks,
        })
    }
}
