//! Single-shot bridge between a native callback and the calling thread.
//!
//! The native adapter request hands its result to a C callback. Today that
//! callback fires inline, before the request call returns; the contract here
//! must not depend on it. [`oneshot`] gives the trampoline a [`Sender`] to
//! fill from wherever the callback runs, and the caller a [`Receiver`] future
//! that is already resolved in the inline case and parks via its waker in the
//! deferred one. Blocking on the receiver holds no lock, so a callback
//! delivered from another thread (or a re-entered event loop) can always get
//! through.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

struct Slot<T> {
    value: Option<T>,
    waker: Option<Waker>,
}

/// Fills the slot; consumed on use, so a request resolves at most once.
pub(crate) struct Sender<T>(Arc<Mutex<Slot<T>>>);

/// Future side of the slot; ready as soon as the sender has fired.
pub(crate) struct Receiver<T>(Arc<Mutex<Slot<T>>>);

pub(crate) fn oneshot<T>() -> (Sender<T>, Receiver<T>) {
    let slot = Arc::new(Mutex::new(Slot {
        value: None,
        waker: None,
    }));
    (Sender(slot.clone()), Receiver(slot))
}

impl<T> Sender<T> {
    pub(crate) fn send(self, value: T) {
        let waker = {
            let mut slot = self.0.lock().expect("request slot lock poisoned");
            slot.value = Some(value);
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T> Future for Receiver<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let mut slot = self.0.lock().expect("request slot lock poisoned");
        match slot.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}
