//! Dispatcher: the one cross-thread hand-off point of the engine.
//!
//! # Invariants
//! - Jobs run in FIFO order, exactly once each.
//! - A drain runs only the jobs queued when it started; jobs queued while it
//!   runs (including by the jobs themselves) run on the next drain.
//! - Jobs only ever execute on the thread that owns the `Dispatcher`.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// A deferred unit of work. Receives the frame context when drained.
pub type Job<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Cloneable, `Send` producer side of a [`Dispatcher`].
pub struct DispatchHandle<C> {
    sender: Sender<Job<C>>,
}

impl<C> Clone for DispatchHandle<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C> DispatchHandle<C> {
    /// Queue a job. Returns false if the dispatcher has been dropped.
    pub fn enqueue<F>(&self, job: F) -> bool
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.sender.send(Box::new(job)).is_ok()
    }
}

/// Per-drain statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub executed: usize,
    pub deferred: usize,
}

/// Deferred-work queue, drained synchronously once per frame.
///
/// `C` is the context handed to each job (the scene, the host, ...). Use
/// `Dispatcher<()>` for context-free jobs.
pub struct Dispatcher<C = ()> {
    sender: Sender<Job<C>>,
    receiver: Receiver<Job<C>>,
    total_executed: u64,
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            total_executed: 0,
        }
    }

    /// A producer handle that can be moved to other threads.
    pub fn handle(&self) -> DispatchHandle<C> {
        DispatchHandle {
            sender: self.sender.clone(),
        }
    }

    /// Queue a job from the owning thread.
    pub fn enqueue<F>(&self, job: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        // The receiver lives as long as `self`, so this send cannot fail.
        let _ = self.sender.send(Box::new(job));
    }

    /// Number of queued jobs.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    pub fn total_executed(&self) -> u64 {
        self.total_executed
    }

    /// Run every job that was queued when the drain started.
    pub fn drain(&mut self, context: &mut C) -> DrainStats {
        let _span = tracing::debug_span!("dispatch_drain").entered();
        let budget = self.receiver.len();
        let mut executed = 0;
        while executed < budget {
            match self.receiver.try_recv() {
                Ok(job) => {
                    job(context);
                    executed += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        self.total_executed += executed as u64;
        let stats = DrainStats {
            executed,
            deferred: self.receiver.len(),
        };
        if executed > 0 {
            tracing::trace!(
                executed = stats.executed,
                deferred = stats.deferred,
                "dispatcher drained"
            );
        }
        stats
    }
}

pub fn crate_info() -> &'static str {
    "lakeside-dispatch v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn enqueued_job_runs_exactly_once() {
        let mut dispatcher: Dispatcher<u32> = Dispatcher::new();
        let mut counter = 0;
        dispatcher.enqueue(|c| *c += 1);
        assert_eq!(dispatcher.pending(), 1);

        let stats = dispatcher.drain(&mut counter);
        assert_eq!(stats.executed, 1);
        assert_eq!(counter, 1);

        dispatcher.drain(&mut counter);
        assert_eq!(counter, 1);
        assert_eq!(dispatcher.total_executed(), 1);
    }

    #[test]
    fn jobs_run_in_fifo_order() {
        let mut dispatcher: Dispatcher<Vec<u32>> = Dispatcher::new();
        for i in 0..5 {
            dispatcher.enqueue(move |log| log.push(i));
        }
        let mut log = Vec::new();
        dispatcher.drain(&mut log);
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn jobs_queued_during_drain_run_next_frame() {
        let mut dispatcher: Dispatcher<Vec<&'static str>> = Dispatcher::new();
        let handle = dispatcher.handle();
        dispatcher.enqueue(move |log| {
            log.push("first");
            handle.enqueue(|log| log.push("requeued"));
        });

        let mut log = Vec::new();
        let stats = dispatcher.drain(&mut log);
        assert_eq!(log, vec!["first"]);
        assert_eq!(stats, DrainStats { executed: 1, deferred: 1 });

        dispatcher.drain(&mut log);
        assert_eq!(log, vec!["first", "requeued"]);
    }

    #[test]
    fn self_requeueing_job_does_not_block_drain() {
        fn requeue(handle: DispatchHandle<u32>) -> Job<u32> {
            Box::new(move |count| {
                *count += 1;
                let next = handle.clone();
                handle.enqueue(requeue(next));
            })
        }

        let mut dispatcher: Dispatcher<u32> = Dispatcher::new();
        dispatcher.enqueue(requeue(dispatcher.handle()));
        let mut count = 0;
        for _ in 0..3 {
            dispatcher.drain(&mut count);
        }
        assert_eq!(count, 3);
        assert_eq!(dispatcher.pending(), 1);
    }

    #[test]
    fn enqueue_from_other_threads() {
        let mut dispatcher: Dispatcher<()> = Dispatcher::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let handle = dispatcher.handle();
                let ran = Arc::clone(&ran);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let ran = Arc::clone(&ran);
                        assert!(handle.enqueue(move |_| {
                            ran.fetch_add(1, Ordering::SeqCst);
                        }));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        // Nothing runs off the owning thread.
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        let stats = dispatcher.drain(&mut ());
        assert_eq!(stats.executed, 100);
        assert_eq!(ran.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn handle_reports_dropped_dispatcher() {
        let dispatcher: Dispatcher<()> = Dispatcher::new();
        let handle = dispatcher.handle();
        drop(dispatcher);
        assert!(!handle.enqueue(|_| {}));
    }
}
