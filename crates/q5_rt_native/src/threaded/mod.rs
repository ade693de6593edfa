mod handle;
mod task;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub use handle::TaskHandle;
use parking_lot::{Condvar, Mutex};
use q5_error::{DbError, Result, ResultExt};
use task::QueuedTask;
use tracing::{debug, error, trace};

/// Fixed size thread pool draining a shared FIFO queue.
///
/// Tasks are executed in submission order (though with more than one worker,
/// tasks may complete out of order). Idle workers sleep on a condvar until
/// there's something to do or the pool is shut down.
pub struct ThreadedExecutor {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    num_threads: usize,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<QueueState>,
    /// Signalled on every submit, and on shutdown.
    available: Condvar,
}

#[derive(Debug)]
struct QueueState {
    tasks: VecDeque<QueuedTask>,
    /// Set once shutdown starts. Workers exit once this is set and the queue
    /// is empty.
    stopped: bool,
    next_task_id: u64,
}

impl fmt::Debug for ThreadedExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadedExecutor")
            .field("num_threads", &self.num_threads)
            .finish_non_exhaustive()
    }
}

impl ThreadedExecutor {
    /// Create an executor with one worker per available core.
    pub fn try_new_default() -> Result<Self> {
        Self::try_new(num_cpus::get())
    }

    /// Create an executor with `num_threads` workers.
    ///
    /// A thread count of zero is bumped up to one.
    pub fn try_new(num_threads: usize) -> Result<Self> {
        let num_threads = num_threads.max(1);

        let mut executor = ThreadedExecutor {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    tasks: VecDeque::new(),
                    stopped: false,
                    next_task_id: 0,
                }),
                available: Condvar::new(),
            }),
            workers: Vec::with_capacity(num_threads),
            num_threads,
        };

        for idx in 0..num_threads {
            let shared = executor.shared.clone();
            // On error, already spawned workers get joined when `executor`
            // drops.
            let worker = thread::Builder::new()
                .name(format!("q5_worker_{idx}"))
                .spawn(move || worker_loop(&shared))
                .context("Failed to spawn worker thread")?;
            executor.workers.push(worker);
        }

        debug!(num_threads, "started threaded executor");

        Ok(executor)
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Queue `work` for execution, returning a handle to its result.
    ///
    /// Only blocks to take the queue lock. Errors if the executor has been
    /// shut down, the work is not queued in that case.
    pub fn submit<F, T>(&self, work: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = futures::channel::oneshot::channel();

        let id = {
            let mut state = self.shared.state.lock();
            if state.stopped {
                return Err(DbError::new("Executor stopped"));
            }

            let id = state.next_task_id;
            state.next_task_id += 1;
            state.tasks.push_back(QueuedTask::new(id, work, tx));

            id
        };

        self.shared.available.notify_one();
        trace!(task_id = id, "submitted task");

        Ok(TaskHandle::new(id, rx))
    }

    /// Stop the executor.
    ///
    /// Workers finish everything already in the queue before exiting, and
    /// this blocks until all of them have been joined. New submissions are
    /// rejected from the moment this is called.
    ///
    /// Calling this more than once is a no-op.
    pub fn shutdown(&mut self) -> Result<()> {
        {
            let mut state = self.shared.state.lock();
            if state.stopped && self.workers.is_empty() {
                return Ok(());
            }
            state.stopped = true;
        }

        self.shared.available.notify_all();

        let mut panicked = 0;
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                panicked += 1;
            }
        }

        debug!(num_threads = self.num_threads, "threaded executor shut down");

        if panicked > 0 {
            return Err(DbError::new("Worker threads panicked").with_field("count", panicked));
        }

        Ok(())
    }
}

impl Drop for ThreadedExecutor {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!(%e, "failed to cleanly shut down executor");
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                if let Some(task) = state.tasks.pop_front() {
                    break task;
                }
                if state.stopped {
                    return;
                }
                shared.available.wait(&mut state);
            }
        };

        trace!(task_id = task.id(), "executing task");
        task.execute();
    }
}
