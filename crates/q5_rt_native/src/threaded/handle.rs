use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use q5_error::{DbError, Result};

/// Handle to the result of a task submitted to the `ThreadedExecutor`.
///
/// Either block on it with `join`, or await it.
pub struct TaskHandle<T> {
    id: u64,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: u64, rx: oneshot::Receiver<Result<T>>) -> Self {
        TaskHandle { id, rx }
    }

    /// Id assigned to the task at submission, increasing in submission order.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block the current thread until the task completes.
    ///
    /// Returns the task's output, or the error (or panic) that occurred while
    /// running it.
    pub fn join(self) -> Result<T> {
        futures::executor::block_on(self)
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.rx.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(DbError::new(
                "Task dropped before producing a result",
            )
            .with_field("task_id", self.id))),
            Poll::Pending => Poll::Pending,
        }
    }
}
