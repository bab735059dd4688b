use crate::{Error, OperationCancelled, QueueClosed, Result};
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use std::{
    future::Future,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};
use tokio::sync::{
    mpsc::{self, UnboundedSender},
    oneshot,
};

/// Cooperative cancellation flag shared between a caller and the queue.
///
/// The queue reads it exactly once, at the instant the operation would
/// start running. Cancelling an operation that already started is between
/// the operation and whoever handed it the token.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type QueuedWork = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Future returned by [`OperationsQueue::shutdown`], the same shared
/// instance on every call.
pub type ShutdownFuture = Shared<BoxFuture<'static, ()>>;

/// Serializes asynchronous operations against a resource that forbids
/// concurrent use.
///
/// Producers enqueue from any task. A single consumer drains the backlog in
/// strict FIFO order and never lets two operations overlap: the next one
/// starts only after the previous one settled, so a slow operation stalls
/// everything behind it on purpose. Each operation gets its own
/// independently awaitable result and a failure settles only that
/// operation, the consumer moves on to the next one.
pub struct OperationsQueue {
    inner: Mutex<QueueInner>,
}

struct QueueInner {
    backlog: Option<UnboundedSender<QueuedWork>>,
    drained: Option<oneshot::Receiver<()>>,
    shutdown: Option<ShutdownFuture>,
}

impl OperationsQueue {
    /// Create the queue and spawn its consumer on the ambient tokio runtime.
    pub fn new() -> Self {
        let (backlog, mut receiver) = mpsc::unbounded_channel::<QueuedWork>();
        let (drained_tx, drained) = oneshot::channel();
        tokio::spawn(async move {
            while let Some(work) = receiver.recv().await {
                work().await;
            }
            let _ = drained_tx.send(());
        });
        Self {
            inner: Mutex::new(QueueInner {
                backlog: Some(backlog),
                drained: Some(drained),
                shutdown: None,
            }),
        }
    }

    /// Append an operation to the backlog.
    ///
    /// Returns immediately. The handle settles once the operation ran,
    /// failed, or was skipped because its token was already cancelled when
    /// its turn came. Fails fast with [`QueueClosed`] once shutdown has been
    /// requested.
    pub fn enqueue<T, F, Fut>(
        &self,
        work: F,
        token: CancellationToken,
    ) -> Result<OperationHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (settle, handle) = oneshot::channel();
        let queued: QueuedWork = Box::new(move || {
            async move {
                if token.is_cancelled() {
                    settle_operation(settle, Err(Error::new(OperationCancelled)));
                    return;
                }
                let result = match AssertUnwindSafe(async move { work().await })
                    .catch_unwind()
                    .await
                {
                    Ok(result) => result,
                    Err(..) => {
                        log::error!("A queued operation panicked, the queue keeps running");
                        Err(Error::msg("The operation panicked while running"))
                    }
                };
                settle_operation(settle, result);
            }
            .boxed()
        });
        let inner = self.inner.lock().expect("operations queue lock poisoned");
        let Some(backlog) = inner.backlog.as_ref() else {
            return Err(Error::new(QueueClosed));
        };
        if backlog.send(queued).is_err() {
            return Err(Error::new(QueueClosed));
        }
        Ok(OperationHandle { receiver: handle })
    }

    /// Run a synchronous computation through the queue without blocking the
    /// consumer from a system resource standpoint.
    pub fn enqueue_blocking<T, F>(
        &self,
        f: F,
        token: CancellationToken,
    ) -> Result<OperationHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.enqueue(
            move || async move { tokio::task::spawn_blocking(f).await? },
            token,
        )
    }

    /// Close the queue to new operations and drain it.
    ///
    /// Operations already in the backlog still run, in order, and nothing
    /// is cancelled. The returned future settles after the last queued
    /// operation settled. Idempotent: every call returns the same shared
    /// future.
    pub fn shutdown(&self) -> ShutdownFuture {
        let mut inner = self.inner.lock().expect("operations queue lock poisoned");
        if let Some(shutdown) = &inner.shutdown {
            return shutdown.clone();
        }
        // Dropping the sender lets the consumer finish the backlog and exit.
        inner.backlog = None;
        let drained = inner.drained.take();
        let shutdown = async move {
            if let Some(drained) = drained {
                let _ = drained.await;
            }
        }
        .boxed()
        .shared();
        inner.shutdown = Some(shutdown.clone());
        shutdown
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.inner
            .lock()
            .expect("operations queue lock poisoned")
            .shutdown
            .is_some()
    }
}

impl Default for OperationsQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Deliver the result, exactly once per operation.
fn settle_operation<T>(settle: oneshot::Sender<Result<T>>, result: Result<T>) {
    if settle.send(result).is_err() {
        log::debug!("An operation settled after its handle was dropped");
    }
}

/// The independently awaitable result of one enqueued operation.
///
/// Settles exactly once: with the operation's output, with its error, or
/// with [`OperationCancelled`] when the token was triggered before start.
pub struct OperationHandle<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> std::fmt::Debug for OperationHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationHandle").finish_non_exhaustive()
    }
}

impl<T> Future for OperationHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(context)
            .map(|settled| match settled {
                Ok(result) => result,
                Err(..) => Err(Error::msg("The operation was dropped without settling")),
            })
    }
}
