//! Request coalescing for bursty callers
//!
//! A [`Throttle`] runs a call right away when the previous one is at least
//! `wait` old. Otherwise the call is parked for `wait`, replacing whatever
//! was parked before it, so a burst of calls executes once with the newest
//! arguments.

use crate::error::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};

type Operation<A, T> = dyn Fn(A) -> BoxFuture<'static, Result<T>> + Send + Sync;

/// Wraps an async operation with a coalescing window
pub struct Throttle<A, T> {
    shared: Arc<Shared<A, T>>,
}

struct Shared<A, T> {
    operation: Box<Operation<A, T>>,
    wait: Duration,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    last_call: Option<Instant>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl<A, T> Shared<A, T> {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A, T> Throttle<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    pub fn new<F, Fut>(wait: Duration, operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let operation: Box<Operation<A, T>> = Box::new(move |args| operation(args).boxed());
        Self {
            shared: Arc::new(Shared {
                operation,
                wait,
                state: Mutex::new(State::default()),
            }),
        }
    }

    pub fn wait(&self) -> Duration {
        self.shared.wait
    }

    /// Whether a deferred call is waiting for its window
    pub fn has_pending(&self) -> bool {
        self.shared
            .lock_state()
            .pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Submit a call
    ///
    /// Must be called from within a tokio runtime. A deferred call that gets
    /// replaced before its window ends resolves to [`Error::Superseded`].
    pub fn call(&self, args: A) -> ThrottledCall<T> {
        let now = Instant::now();
        let wait = self.shared.wait;
        let mut state = self.shared.lock_state();

        let ready = match state.last_call {
            Some(last) => now.duration_since(last) >= wait,
            None => true,
        };
        if ready {
            state.last_call = Some(now);
            drop(state);
            return ThrottledCall::Immediate((self.shared.operation)(args));
        }

        if let Some(previous) = state.pending.take() {
            tracing::debug!("Replacing pending throttled call");
            previous.abort();
        }

        state.generation += 1;
        let generation = state.generation;
        let (tx, rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);

        state.pending = Some(tokio::spawn(async move {
            sleep(wait).await;
            {
                let mut state = shared.lock_state();
                if state.generation == generation {
                    state.pending = None;
                }
                state.last_call = Some(now);
            }

            let result = (shared.operation)(args).await;
            // The caller may have stopped waiting
            let _ = tx.send(result);
        }));

        ThrottledCall::Deferred(rx)
    }
}

impl<A, T> Drop for Throttle<A, T> {
    fn drop(&mut self) {
        if let Some(pending) = self.shared.lock_state().pending.take() {
            pending.abort();
        }
    }
}

/// Result of [`Throttle::call`]
pub enum ThrottledCall<T> {
    /// The operation runs when this future is polled
    Immediate(BoxFuture<'static, Result<T>>),
    /// The operation runs once the window ends, unless replaced first
    Deferred(oneshot::Receiver<Result<T>>),
}

impl<T> ThrottledCall<T> {
    pub fn is_deferred(&self) -> bool {
        matches!(self, ThrottledCall::Deferred(_))
    }
}

impl<T> Future for ThrottledCall<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut() {
            ThrottledCall::Immediate(future) => future.as_mut().poll(cx),
            ThrottledCall::Deferred(receiver) => Pin::new(receiver)
                .poll(cx)
                .map(|received| received.unwrap_or_else(|_| Err(Error::Superseded))),
        }
    }
}
