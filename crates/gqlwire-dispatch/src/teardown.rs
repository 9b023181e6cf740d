//! One-shot subscription teardown.
//!
//! A streaming response reaches `unsubscribe()` from two independent
//! triggers: the source finishing on its own, and the response body being
//! dropped by the transport (client disconnect or a failed write). Whichever
//! fires first wins the flag; every later trigger is a no-op.
//!
//! ```text
//! Open ──(completed | disconnected)──▶ Unsubscribing ──(body ends/dropped)──▶ Closed
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use gqlwire_core::Unsubscribe;
use tracing::debug;

/// What caused the teardown to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// The value source ended.
    Completed,
    /// The body was dropped before the source ended.
    Disconnected,
}

impl fmt::Display for TeardownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::Disconnected => "disconnected",
        })
    }
}

/// Shared handle guarding a single `unsubscribe()` call.
///
/// Cloning yields another handle to the same flag.
#[derive(Clone)]
pub struct Teardown {
    inner: Arc<Inner>,
}

struct Inner {
    fired: AtomicBool,
    // Only makes the `FnOnce` shareable; `fired` is the guard.
    unsubscribe: Mutex<Option<Unsubscribe>>,
}

impl Teardown {
    pub fn new(unsubscribe: Unsubscribe) -> Self {
        Self {
            inner: Arc::new(Inner {
                fired: AtomicBool::new(false),
                unsubscribe: Mutex::new(Some(unsubscribe)),
            }),
        }
    }

    /// Run `unsubscribe()` if no trigger has fired yet.
    ///
    /// Returns `true` only for the call that actually unsubscribed.
    pub fn fire(&self, reason: TeardownReason) -> bool {
        if self
            .inner
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let unsubscribe = self
            .inner
            .unsubscribe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        debug!(%reason, "unsubscribing");
        if let Some(unsubscribe) = unsubscribe {
            unsubscribe();
        }
        true
    }

    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("fired", &self.is_fired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting() -> (Teardown, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let teardown = Teardown::new(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        (teardown, count)
    }

    #[test]
    fn fires_once() {
        let (teardown, count) = counting();
        assert!(!teardown.is_fired());

        assert!(teardown.fire(TeardownReason::Disconnected));
        assert!(!teardown.fire(TeardownReason::Disconnected));
        assert!(teardown.is_fired());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disconnect_after_completion_is_noop() {
        let (teardown, count) = counting();
        assert!(teardown.fire(TeardownReason::Completed));
        assert!(!teardown.clone().fire(TeardownReason::Disconnected));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn racing_triggers_unsubscribe_once() {
        for _ in 0..64 {
            let (teardown, count) = counting();
            let barrier = Arc::new(std::sync::Barrier::new(2));

            let handles: Vec<_> = [TeardownReason::Completed, TeardownReason::Disconnected]
                .into_iter()
                .map(|reason| {
                    let teardown = teardown.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        teardown.fire(reason)
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();

            assert_eq!(winners, 1);
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn reason_display() {
        assert_eq!(TeardownReason::Completed.to_string(), "completed");
        assert_eq!(TeardownReason::Disconnected.to_string(), "disconnected");
    }
}
