//! Fetch tokens for discarding superseded snapshot loads.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one snapshot load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchToken(u64);

impl FetchToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic token issuer.
///
/// Each load takes a token before its first chain call and may only commit
/// while its token is still the most recently issued one.
#[derive(Debug, Default)]
pub struct FetchGuard {
    latest: AtomicU64,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token newer than every token handed out so far.
    pub fn issue(&self) -> FetchToken {
        FetchToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Most recently issued token value, 0 before the first load.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let guard = FetchGuard::new();
        assert_eq!(guard.latest(), 0);

        let first = guard.issue();
        let second = guard.issue();
        assert!(second > first);
        assert_eq!(guard.latest(), second.value());
    }

    #[test]
    fn test_only_latest_is_current() {
        let guard = FetchGuard::new();
        let first = guard.issue();
        assert!(guard.is_current(first));

        let second = guard.issue();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }
}
