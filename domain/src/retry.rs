//! Bounded retry counter shared by every retry tier.

/// Attempt counter with a ceiling. Ephemeral; never persisted.
///
/// ```
/// use mods_domain::RetryContext;
///
/// let mut retry = RetryContext::new(3);
/// let mut attempts = 0;
/// while retry.next_attempt() {
///     attempts += 1;
/// }
/// assert_eq!(attempts, 3);
/// assert!(retry.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    attempt: usize,
    max_attempts: usize,
}

impl RetryContext {
    /// A ceiling of zero is treated as one attempt.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            attempt: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Start the next attempt. Returns false once the ceiling is reached.
    pub fn next_attempt(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.attempt += 1;
        true
    }

    /// One-based number of the current attempt (0 before the first).
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn is_last(&self) -> bool {
        self.attempt == self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_up_to_ceiling() {
        let mut retry = RetryContext::new(2);
        assert_eq!(retry.attempt(), 0);
        assert!(retry.next_attempt());
        assert!(!retry.is_last());
        assert!(retry.next_attempt());
        assert!(retry.is_last());
        assert!(!retry.next_attempt());
        assert_eq!(retry.attempt(), 2);
    }

    #[test]
    fn test_zero_ceiling_allows_one_attempt() {
        let mut retry = RetryContext::new(0);
        assert_eq!(retry.max_attempts(), 1);
        assert!(retry.next_attempt());
        assert!(!retry.next_attempt());
    }
}
