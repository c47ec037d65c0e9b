#![forbid(unsafe_code)]

//! Handle for delivering messages back onto the UI thread.
//!
//! Effects and external callbacks run wherever their owner decides (often a
//! worker thread). They never touch the model directly: they hand their result
//! to a [`Dispatcher`], and the runtime applies it through `Model::update` on
//! the thread that owns the model.

use std::fmt;
use std::sync::mpsc;

/// Cloneable sender into a program's message queue.
///
/// Sending after the program has been torn down is not an error: the message
/// is dropped and [`send`](Self::send) returns `false`.
pub struct Dispatcher<M> {
    sender: mpsc::Sender<M>,
}

impl<M> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M> fmt::Debug for Dispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl<M: Send + 'static> Dispatcher<M> {
    /// Create a dispatcher together with the receiving end of its queue.
    pub fn channel() -> (Self, mpsc::Receiver<M>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    /// Queue `msg` for the UI thread. Returns `false` if nobody is listening.
    pub fn send(&self, msg: M) -> bool {
        let delivered = self.sender.send(msg).is_ok();
        if !delivered {
            tracing::debug!("message dropped: program no longer running");
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_reaches_receiver_in_order() {
        let (dispatch, rx) = Dispatcher::channel();
        assert!(dispatch.send(1));
        assert!(dispatch.clone().send(2));
        assert_eq!(rx.try_iter().collect::<Vec<i64>>(), vec![1, 2]);
    }

    #[test]
    fn send_after_receiver_dropped_is_silent() {
        let (dispatch, rx) = Dispatcher::<i64>::channel();
        drop(rx);
        assert!(!dispatch.send(7));
    }

    #[test]
    fn send_from_another_thread() {
        let (dispatch, rx) = Dispatcher::channel();
        std::thread::spawn(move || {
            dispatch.send(42_i64);
        })
        .join()
        .unwrap();
        assert_eq!(rx.recv().unwrap(), 42);
    }
}
