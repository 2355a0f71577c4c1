//! Cancellable live-query handle.
//!
//! A [`Subscription`] yields full snapshots (never diffs) produced by a
//! background task. Dropping the handle aborts the producer.

use std::future::Future;

use tokio::{sync::mpsc, task::AbortHandle};

/// Default buffer between a producer and its consumer. Producers block once
/// the consumer falls this far behind.
pub const DEFAULT_CAPACITY: usize = 8;

/// A standing query delivering `Result<T, E>` emissions until cancelled.
#[derive(Debug)]
pub struct Subscription<T, E> {
  rx:       mpsc::Receiver<Result<T, E>>,
  producer: AbortHandle,
}

/// The producer side of a [`Subscription`].
#[derive(Debug)]
pub struct Emitter<T, E> {
  tx: mpsc::Sender<Result<T, E>>,
}

impl<T, E> Emitter<T, E> {
  /// Deliver an emission. Returns `false` once the consumer has gone away,
  /// at which point the producer should stop.
  pub async fn emit(&self, item: Result<T, E>) -> bool { self.tx.send(item).await.is_ok() }
}

impl<T, E> Subscription<T, E>
where
  T: Send + 'static,
  E: Send + 'static,
{
  /// Spawn `producer` on the current tokio runtime and return the consumer
  /// handle.
  pub fn spawn<F, Fut>(capacity: usize, producer: F) -> Self
  where
    F: FnOnce(Emitter<T, E>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
  {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(producer(Emitter { tx }));
    Self { rx, producer: handle.abort_handle() }
  }
}

impl<T, E> Subscription<T, E> {
  /// Wait for the next emission. `None` means the producer has stopped.
  pub async fn next(&mut self) -> Option<Result<T, E>> { self.rx.recv().await }

  /// Stop the producer. Equivalent to dropping the handle.
  pub fn cancel(self) {}
}

impl<T, E> Drop for Subscription<T, E> {
  fn drop(&mut self) {
    self.producer.abort();
    tracing::debug!("subscription cancelled");
  }
}
