//! One-shot result handles.
//!
//! A [`Deferred`] is awaited by a caller while the paired [`Resolver`] is held by whoever
//! produces the value. Resolving consumes the resolver, so each handle settles at most once,
//! and sending never blocks the resolving side.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::Error;

/// Create a linked resolver/deferred pair.
pub fn deferred<T>() -> (Resolver<T>, Deferred<T>) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx }, Deferred { rx })
}

/// Settling side of a [`Deferred`].
#[derive(Debug)]
pub struct Resolver<T> {
    tx: oneshot::Sender<Result<T, Error>>,
}

impl<T> Resolver<T> {
    /// Fulfil the deferred value.
    ///
    /// Returns `false` when the waiting side has already gone away.
    pub fn resolve(self, value: T) -> bool {
        self.tx.send(Ok(value)).is_ok()
    }

    /// Fail the deferred value.
    pub fn reject(self, err: Error) -> bool {
        self.tx.send(Err(err)).is_ok()
    }

    /// Whether the waiting side was dropped.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Awaitable side of a one-shot result.
///
/// If the resolver is dropped without settling, the deferred completes with
/// [`Error::ServiceFailed`].
#[derive(Debug)]
pub struct Deferred<T> {
    rx: oneshot::Receiver<Result<T, Error>>,
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::ServiceFailed("job ended without a result".into()))),
            Poll::Pending => Poll::Pending,
        }
    }
}
