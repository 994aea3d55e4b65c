//! Transient user notices: one line of feedback with a severity and an
//! expiry.  Expired notices disappear on the next draw.

use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
    deadline: Instant,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self::with_ttl(text, NoticeLevel::Info, DEFAULT_TTL)
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self::with_ttl(text, NoticeLevel::Warn, DEFAULT_TTL)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with_ttl(text, NoticeLevel::Error, DEFAULT_TTL)
    }

    pub fn with_ttl(text: impl Into<String>, level: NoticeLevel, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            level,
            deadline: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_notice_is_not_expired() {
        let n = Notice::info("saved");
        assert!(!n.is_expired());
        assert_eq!(n.level, NoticeLevel::Info);
    }

    #[test]
    fn zero_ttl_notice_expires_immediately() {
        let n = Notice::with_ttl("gone", NoticeLevel::Warn, Duration::ZERO);
        assert!(n.is_expired());
    }
}
