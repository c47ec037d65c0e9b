#![forbid(unsafe_code)]

//! The number bridge: the one capability the shell calls out to.
//!
//! A bridge takes an integer and answers with an integer, later, through a
//! one-shot [`Reply`]. How and where the answer is computed is the
//! implementation's business; the caller only promises not to block on it.
//!
//! There is no error channel. An implementation that cannot answer simply
//! drops the `Reply`, which the caller observes as "never completes".
//!
//! Implementations provided here:
//!
//! | type | behaviour |
//! |------|-----------|
//! | [`NativeBridge`] | in-process Rust; answers `input + step` from a worker thread after `latency` |
//! | [`EchoBridge`] | answers `input` immediately on the calling thread |
//! | [`SilentBridge`] | never answers |
//! | [`manual::ManualBridge`] | parks calls until the test resolves them |

use std::fmt;
use std::thread;
use std::time::Duration;

/// One-shot completion handle for a bridge call.
pub struct Reply {
    deliver: Box<dyn FnOnce(i64) + Send>,
}

impl Reply {
    /// Wrap a completion callback.
    pub fn new(deliver: impl FnOnce(i64) + Send + 'static) -> Self {
        Self {
            deliver: Box::new(deliver),
        }
    }

    /// Deliver the result. Consumes the handle, so a call answers at most once.
    pub fn resolve(self, value: i64) {
        (self.deliver)(value);
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply").finish_non_exhaustive()
    }
}

/// A capability that turns one integer into another, asynchronously.
pub trait NumberBridge: Send + Sync {
    /// Start computing a number for `input`; answer through `reply`.
    ///
    /// Must return without waiting for the answer.
    fn get_number(&self, input: i64, reply: Reply);

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// In-process Rust implementation of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeBridge {
    /// Added to the input (wrapping on overflow).
    pub step: i64,
    /// Simulated time spent on the native side before answering.
    pub latency: Duration,
}

impl Default for NativeBridge {
    fn default() -> Self {
        Self {
            step: 1,
            latency: Duration::ZERO,
        }
    }
}

impl NativeBridge {
    /// The value this bridge answers for `input`.
    #[inline]
    pub const fn compute(&self, input: i64) -> i64 {
        input.wrapping_add(self.step)
    }
}

impl NumberBridge for NativeBridge {
    fn get_number(&self, input: i64, reply: Reply) {
        let this = *self;
        let spawned = thread::Builder::new()
            .name("sbridge-native".into())
            .spawn(move || {
                if !this.latency.is_zero() {
                    thread::sleep(this.latency);
                }
                let value = this.compute(input);
                tracing::debug!(input, value, "native bridge answered");
                reply.resolve(value);
            });
        if let Err(err) = spawned {
            // The reply went down with the closure: the call never completes.
            tracing::warn!(%err, input, "native bridge could not start a worker");
        }
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

/// Answers every call with its own input, synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoBridge;

impl NumberBridge for EchoBridge {
    fn get_number(&self, input: i64, reply: Reply) {
        reply.resolve(input);
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// Never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentBridge;

impl NumberBridge for SilentBridge {
    fn get_number(&self, input: i64, reply: Reply) {
        tracing::trace!(input, "silent bridge dropping call");
        drop(reply);
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}

pub mod manual {
    //! A bridge whose calls are answered by hand, in any order.

    use super::{NumberBridge, Reply};
    use std::sync::{Mutex, PoisonError};

    /// A call waiting for an answer.
    #[derive(Debug)]
    pub struct PendingCall {
        /// The integer the caller passed in.
        pub input: i64,
        reply: Reply,
    }

    impl PendingCall {
        /// Answer this call.
        pub fn resolve(self, value: i64) {
            self.reply.resolve(value);
        }
    }

    /// Records calls instead of answering them.
    #[derive(Debug, Default)]
    pub struct ManualBridge {
        pending: Mutex<Vec<PendingCall>>,
    }

    impl ManualBridge {
        /// Create a bridge with no pending calls.
        pub fn new() -> Self {
            Self::default()
        }

        fn calls(&self) -> std::sync::MutexGuard<'_, Vec<PendingCall>> {
            self.pending.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Inputs of the unanswered calls, oldest first.
        pub fn pending_inputs(&self) -> Vec<i64> {
            self.calls().iter().map(|c| c.input).collect()
        }

        /// Number of unanswered calls.
        pub fn pending_len(&self) -> usize {
            self.calls().len()
        }

        /// Answer the `index`-th oldest unanswered call.
        ///
        /// Returns `false` if there is no such call.
        pub fn resolve(&self, index: usize, value: i64) -> bool {
            let call = {
                let mut calls = self.calls();
                if index >= calls.len() {
                    return false;
                }
                calls.remove(index)
            };
            // Lock released before the callback runs.
            call.resolve(value);
            true
        }

        /// Answer every unanswered call, oldest first, with `f(input)`.
        pub fn resolve_all(&self, f: impl Fn(i64) -> i64) -> usize {
            let calls = std::mem::take(&mut *self.calls());
            let n = calls.len();
            for call in calls {
                let value = f(call.input);
                call.resolve(value);
            }
            n
        }

        /// Forget every unanswered call without answering it.
        pub fn abandon_all(&self) -> usize {
            let calls = std::mem::take(&mut *self.calls());
            calls.len()
        }
    }

    impl NumberBridge for ManualBridge {
        fn get_number(&self, input: i64, reply: Reply) {
            self.calls().push(PendingCall { input, reply });
        }

        fn name(&self) -> &'static str {
            "manual"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::manual::ManualBridge;
    use super::*;
    use std::sync::mpsc;

    fn call(bridge: &dyn NumberBridge, input: i64) -> mpsc::Receiver<i64> {
        let (tx, rx) = mpsc::channel();
        bridge.get_number(
            input,
            Reply::new(move |v| {
                let _ = tx.send(v);
            }),
        );
        rx
    }

    #[test]
    fn native_adds_step_on_worker_thread() {
        let bridge = NativeBridge {
            step: 5,
            latency: Duration::from_millis(1),
        };
        let rx = call(&bridge, 10);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(15));
    }

    #[test]
    fn native_wraps_on_overflow() {
        let bridge = NativeBridge::default();
        assert_eq!(bridge.compute(i64::MAX), i64::MIN);
    }

    #[test]
    fn echo_answers_immediately() {
        let rx = call(&EchoBridge, -7);
        assert_eq!(rx.try_recv(), Ok(-7));
    }

    #[test]
    fn silent_never_answers() {
        let rx = call(&SilentBridge, 1);
        assert_eq!(rx.recv_timeout(Duration::from_millis(20)), Err(mpsc::RecvTimeoutError::Disconnected));
    }

    #[test]
    fn manual_resolves_out_of_order() {
        let bridge = ManualBridge::new();
        let first = call(&bridge, 1);
        let second = call(&bridge, 2);
        assert_eq!(bridge.pending_inputs(), vec![1, 2]);

        assert!(bridge.resolve(1, 20));
        assert_eq!(second.try_recv(), Ok(20));
        assert!(first.try_recv().is_err());

        assert!(bridge.resolve(0, 10));
        assert_eq!(first.try_recv(), Ok(10));
        assert!(!bridge.resolve(0, 0));
    }

    #[test]
    fn manual_resolve_all_and_abandon() {
        let bridge = ManualBridge::new();
        let a = call(&bridge, 3);
        let b = call(&bridge, 4);
        assert_eq!(bridge.resolve_all(|n| n * 10), 2);
        assert_eq!((a.try_recv(), b.try_recv()), (Ok(30), Ok(40)));

        let c = call(&bridge, 5);
        assert_eq!(bridge.abandon_all(), 1);
        assert_eq!(bridge.pending_len(), 0);
        assert!(c.try_recv().is_err());
    }

    #[test]
    fn names_are_distinct() {
        let names = [
            NativeBridge::default().name(),
            EchoBridge.name(),
            SilentBridge.name(),
            ManualBridge::new().name(),
        ];
        let mut sorted = names.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }
}
