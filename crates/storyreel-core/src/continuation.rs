//! Single-use continuations for host-gated steps.
//!
//! A hook receives a [`Continuation`] and resumes it whenever the host is
//! ready, possibly much later and possibly from another thread. Resuming only
//! posts a token into a [`ContinuationMailbox`]; the session drains the
//! mailbox on its own schedule, so no engine code runs inside the host's
//! call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Token identifying one gated step.
pub type GateToken = u64;

/// Queue of resumed gate tokens shared between a session and its
/// continuations.
#[derive(Debug, Default, Clone)]
pub struct ContinuationMailbox {
    resumed: Arc<Mutex<VecDeque<GateToken>>>,
    next_token: Arc<AtomicU64>,
}

impl ContinuationMailbox {
    /// Creates an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a continuation bound to a fresh token.
    #[must_use]
    pub fn issue(&self) -> Continuation {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;
        Continuation {
            token,
            fired: Arc::new(AtomicBool::new(false)),
            mailbox: Arc::clone(&self.resumed),
        }
    }

    /// Removes and returns every token resumed since the last drain, in
    /// resumption order.
    #[must_use]
    pub fn drain(&self) -> Vec<GateToken> {
        let mut queue = self
            .resumed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        queue.drain(..).collect()
    }
}

/// Single-use completion signal handed to a host hook.
///
/// Clones share the same fired flag: only the first `resume` across all
/// clones has an effect.
#[derive(Debug, Clone)]
pub struct Continuation {
    token: GateToken,
    fired: Arc<AtomicBool>,
    mailbox: Arc<Mutex<VecDeque<GateToken>>>,
}

impl Continuation {
    /// Signals the session to proceed. Subsequent calls are no-ops.
    pub fn resume(&self) {
        if self.fired.swap(true, Ordering::AcqRel) {
            return;
        }
        self.mailbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(self.token);
    }

    /// Returns true once any clone of this continuation has been resumed.
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Returns the gate token this continuation resolves.
    #[must_use]
    pub fn token(&self) -> GateToken {
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_posts_token_once() {
        // Arrange
        let mailbox = ContinuationMailbox::new();
        let continuation = mailbox.issue();
        let clone = continuation.clone();

        // Act
        continuation.resume();
        continuation.resume();
        clone.resume();

        // Assert
        assert_eq!(mailbox.drain(), vec![continuation.token()]);
        assert!(clone.is_resumed());
        assert!(mailbox.drain().is_empty());
    }

    #[test]
    fn test_tokens_are_distinct_and_drained_in_resume_order() {
        let mailbox = ContinuationMailbox::new();
        let first = mailbox.issue();
        let second = mailbox.issue();

        second.resume();
        first.resume();

        assert_ne!(first.token(), second.token());
        assert_eq!(mailbox.drain(), vec![second.token(), first.token()]);
    }

    #[test]
    fn test_unresumed_continuation_posts_nothing() {
        let mailbox = ContinuationMailbox::new();
        let continuation = mailbox.issue();

        assert!(!continuation.is_resumed());
        assert!(mailbox.drain().is_empty());
    }

    #[test]
    fn test_continuation_can_be_resumed_from_another_thread() {
        let mailbox = ContinuationMailbox::new();
        let continuation = mailbox.issue();
        let token = continuation.token();

        std::thread::spawn(move || continuation.resume())
            .join()
            .unwrap();

        assert_eq!(mailbox.drain(), vec![token]);
    }
}
