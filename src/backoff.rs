//! # Fibonacci Backoff
//!
//! Progressive backoff for retrying short network operations, such as delivering an outcome
//! to a CloudFormation response URL. It grows more slowly than exponential backoff, which
//! suits a handful of retries inside a single invocation.
//!
//! ## Usage
//!
//! ```rust
//! use msf_blueprint_handlers::backoff::FibonacciBackoff;
//!
//! let mut backoff = FibonacciBackoff::new(250, 2000);
//! assert_eq!(backoff.next_backoff_millis(), 250);
//! assert_eq!(backoff.next_backoff_millis(), 250);
//! assert_eq!(backoff.next_backoff_millis(), 500);
//! assert_eq!(backoff.next_backoff_millis(), 750);
//! ```

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, capped at `max_millis`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    prev_millis: u64,
    current_millis: u64,
    max_millis: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff with minimum and maximum values in milliseconds
    #[must_use]
    pub fn new(min_millis: u64, max_millis: u64) -> Self {
        Self {
            prev_millis: 0,
            current_millis: min_millis,
            max_millis,
        }
    }

    /// Get the next backoff in milliseconds and advance the sequence
    pub fn next_backoff_millis(&mut self) -> u64 {
        let result = self.current_millis;
        let next = self.prev_millis.saturating_add(self.current_millis);
        self.prev_millis = self.current_millis;
        self.current_millis = std::cmp::min(next, self.max_millis);
        result
    }

    /// Get the next backoff as a `Duration` and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_millis(self.next_backoff_millis())
    }
}
