//! Request-generation tokens for dashboard loads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic counter tagging each dashboard load.
///
/// Every new load calls [`LoadGeneration::issue`]; a finished load may only
/// publish its result while [`LoadGeneration::is_current`] still holds for
/// its token. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration {
    latest: Arc<AtomicU64>,
}

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return its token. Tokens start at 1.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Most recently issued token, 0 before the first load.
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// `true` if no newer load has been issued since `token`.
    pub fn is_current(&self, token: u64) -> bool {
        token != 0 && token == self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let gen = LoadGeneration::new();
        assert_eq!(gen.current(), 0);
        let a = gen.issue();
        let b = gen.issue();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn test_only_latest_is_current() {
        let gen = LoadGeneration::new();
        let first = gen.issue();
        assert!(gen.is_current(first));
        let second = gen.issue();
        assert!(!gen.is_current(first));
        assert!(gen.is_current(second));
    }

    #[test]
    fn test_zero_is_never_current() {
        let gen = LoadGeneration::new();
        assert!(!gen.is_current(0));
    }

    #[test]
    fn test_clones_share_counter() {
        let gen = LoadGeneration::new();
        let other = gen.clone();
        let token = gen.issue();
        assert!(other.is_current(token));
        other.issue();
        assert!(!gen.is_current(token));
    }
}
