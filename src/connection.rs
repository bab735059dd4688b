use crate::{
    CancellationToken, Executor, OperationHandle, OperationsQueue, Result, ShutdownFuture,
};
use std::{future::Future, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// An established session with the database.
pub trait Connection: Executor {
    /// Open a connection to the given URL.
    fn connect(url: &str) -> impl Future<Output = Result<impl Connection>>;

    /// Wrap the connection so that every access goes through an operations
    /// queue, one operation at a time.
    fn into_serial(self) -> SerialConnection<Self>
    where
        Self: 'static,
    {
        SerialConnection::new(self)
    }
}

/// A connection with affinity to one operations queue.
///
/// While the queue is active it is the only sanctioned path to the
/// executor: operations run strictly one at a time, in enqueue order, which
/// is what makes a connection that forbids concurrent statement execution
/// usable from many tasks at once. Bypassing the queue breaks that
/// guarantee.
pub struct SerialConnection<E: Executor> {
    executor: Arc<Mutex<E>>,
    queue: OperationsQueue,
}

impl<E: Executor + 'static> SerialConnection<E> {
    /// Wrap the executor. Must be called inside a tokio runtime, the queue
    /// consumer is spawned right away.
    pub fn new(executor: E) -> Self {
        Self {
            executor: Arc::new(Mutex::new(executor)),
            queue: OperationsQueue::new(),
        }
    }

    /// Schedule exclusive use of the connection.
    ///
    /// The closure receives the guarded executor once all previously
    /// enqueued operations have settled. The lock is uncontended, the queue
    /// never overlaps operations, it only materializes the exclusive borrow.
    pub fn enqueue<T, F, Fut>(
        &self,
        f: F,
        token: CancellationToken,
    ) -> Result<OperationHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(OwnedMutexGuard<E>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let executor = self.executor.clone();
        self.queue
            .enqueue(move || async move { f(executor.lock_owned().await).await }, token)
    }

    /// Close the queue to new operations and drain the pending ones.
    pub fn shutdown(&self) -> ShutdownFuture {
        self.queue.shutdown()
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.queue.is_shutdown()
    }
}
