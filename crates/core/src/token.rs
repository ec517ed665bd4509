use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-click handshake value: the click time in epoch milliseconds.
///
/// Two clicks inside the same millisecond share a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token(String);

impl Token {
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self(millis.to_string())
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact comparison against a cookie read; an absent cookie never matches.
    pub fn matches(&self, cookie: Option<&str>) -> bool {
        cookie == Some(self.0.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn tokens_a_few_millis_apart_differ() {
        let first = Token::now();
        std::thread::sleep(Duration::from_millis(2));
        let second = Token::now();
        assert_ne!(first, second);
        assert!(first.as_str().parse::<u128>().unwrap() < second.as_str().parse::<u128>().unwrap());
    }

    #[test]
    fn matches_is_exact() {
        let token = Token::from_millis(1_700_000_000_123);
        assert!(token.matches(Some("1700000000123")));
        assert!(!token.matches(Some("0")));
        assert!(!token.matches(Some("1700000000123 ")));
        assert!(!token.matches(None));
    }
}
