use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

struct SharedState {
    cancelled: bool,
    wakers: Vec<Waker>,
}

/// One-shot cancellation flag shared between a running session and whoever may stop it.
/// Cloning yields another handle to the same flag.
#[derive(Clone)]
pub struct CancelSignal(Arc<Mutex<SharedState>>);

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(SharedState {
            cancelled: false,
            wakers: Vec::with_capacity(2),
        })))
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idempotent
    pub fn cancel(&self) {
        let mut lock = self.lock();
        if lock.cancelled {
            return;
        }
        lock.cancelled = true;
        let wakers = mem::take(&mut lock.wakers);
        drop(lock);
        wakers.into_iter().for_each(Waker::wake);
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Resolves once `cancel` has been called. Never resolves otherwise.
    pub fn cancelled(&self) -> Cancelled {
        Cancelled(self.clone())
    }
}

pub struct Cancelled(CancelSignal);

impl Future for Cancelled {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut lock = self.0.lock();
        if lock.cancelled {
            Poll::Ready(())
        } else {
            if !lock.wakers.iter().any(|w| cx.waker().will_wake(w)) {
                lock.wakers.push(cx.waker().clone());
            }
            Poll::Pending
        }
    }
}
