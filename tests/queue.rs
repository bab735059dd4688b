#[cfg(test)]
mod tests {
    use cask::{
        CancellationToken, Error, OperationCancelled, OperationsQueue, QueueClosed, future,
    };
    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        time::Duration,
    };
    use tokio::time::sleep;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[tokio::test]
    async fn operations_settle_in_enqueue_order_without_overlap() {
        init_logs();
        let queue = OperationsQueue::new();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..5usize {
            let running = running.clone();
            let peak = peak.clone();
            let finished = finished.clone();
            // Later operations are faster, overlap would reorder them.
            let delay = Duration::from_millis(40 - i as u64 * 7);
            let handle = queue
                .enqueue(
                    move || async move {
                        let current = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(current, Ordering::SeqCst);
                        sleep(delay).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        finished.lock().unwrap().push(i);
                        Ok(i)
                    },
                    CancellationToken::new(),
                )
                .expect("queue accepts operations");
            handles.push(handle);
        }
        let results = future::join_all(handles).await;
        let results = results
            .into_iter()
            .map(|r| r.expect("operation succeeds"))
            .collect::<Vec<_>>();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
        assert_eq!(*finished.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pre_triggered_cancellation_skips_the_work() {
        init_logs();
        let queue = OperationsQueue::new();
        let cancelled = CancellationToken::new();
        cancelled.cancel();
        let invoked = Arc::new(AtomicBool::new(false));
        let first = queue
            .enqueue(|| async { Ok(1) }, CancellationToken::new())
            .unwrap();
        let skipped = {
            let invoked = invoked.clone();
            queue
                .enqueue(
                    move || async move {
                        invoked.store(true, Ordering::SeqCst);
                        Ok(2)
                    },
                    cancelled,
                )
                .unwrap()
        };
        let last = queue
            .enqueue(|| async { Ok(3) }, CancellationToken::new())
            .unwrap();
        assert_eq!(first.await.unwrap(), 1);
        let error = skipped.await.expect_err("was cancelled before start");
        assert!(error.is::<OperationCancelled>());
        assert!(!invoked.load(Ordering::SeqCst));
        assert_eq!(last.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn a_failing_operation_does_not_abort_the_queue() {
        init_logs();
        let queue = OperationsQueue::new();
        let failing = queue
            .enqueue::<i32, _, _>(
                || async { Err(Error::msg("statement failed")) },
                CancellationToken::new(),
            )
            .unwrap();
        let next = queue
            .enqueue(|| async { Ok(7) }, CancellationToken::new())
            .unwrap();
        let error = failing.await.expect_err("carries the operation error");
        assert_eq!(error.to_string(), "statement failed");
        assert_eq!(next.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn a_panicking_operation_does_not_abort_the_queue() {
        init_logs();
        let queue = OperationsQueue::new();
        let exploding = queue
            .enqueue::<(), _, _>(|| async { panic!("boom") }, CancellationToken::new())
            .unwrap();
        let next = queue
            .enqueue(|| async { Ok("still running") }, CancellationToken::new())
            .unwrap();
        assert!(exploding.await.is_err());
        assert_eq!(next.await.unwrap(), "still running");
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_drains_the_backlog() {
        init_logs();
        let queue = OperationsQueue::new();
        let completed = Arc::new(AtomicBool::new(false));
        let slow = {
            let completed = completed.clone();
            queue
                .enqueue(
                    move || async move {
                        sleep(Duration::from_millis(30)).await;
                        completed.store(true, Ordering::SeqCst);
                        Ok(())
                    },
                    CancellationToken::new(),
                )
                .unwrap()
        };
        let first = queue.shutdown();
        let second = queue.shutdown();
        assert!(first.ptr_eq(&second));
        assert!(queue.is_shutdown());
        let rejected = queue
            .enqueue(|| async { Ok(0) }, CancellationToken::new())
            .expect_err("the queue is closed");
        assert!(rejected.is::<QueueClosed>());
        first.await;
        // Shutdown settles only after the queued work has settled.
        assert!(completed.load(Ordering::SeqCst));
        slow.await.expect("the queued operation still ran");
        second.await;
    }

    #[tokio::test]
    async fn blocking_work_runs_off_the_consumer() {
        init_logs();
        let queue = OperationsQueue::new();
        let handle = queue
            .enqueue_blocking(
                || {
                    std::thread::sleep(Duration::from_millis(5));
                    Ok(21 * 2)
                },
                CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn dropping_a_handle_does_not_disturb_the_queue() {
        init_logs();
        let queue = OperationsQueue::new();
        let dropped = queue
            .enqueue(|| async { Ok(1) }, CancellationToken::new())
            .unwrap();
        drop(dropped);
        let kept = queue
            .enqueue(|| async { Ok(2) }, CancellationToken::new())
            .unwrap();
        assert_eq!(kept.await.unwrap(), 2);
    }
}
