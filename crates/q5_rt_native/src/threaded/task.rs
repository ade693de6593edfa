use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use futures::channel::oneshot;
use q5_error::{DbError, Result};

/// A unit of work sitting in the executor queue.
///
/// The closure owns the sending half of the task's result channel, so running
/// it always resolves the matching `TaskHandle`.
pub(crate) struct QueuedTask {
    id: u64,
    run: Box<dyn FnOnce() + Send + 'static>,
}

impl fmt::Debug for QueuedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedTask")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl QueuedTask {
    pub(crate) fn new<F, T>(id: u64, work: F, tx: oneshot::Sender<Result<T>>) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let run = Box::new(move || {
            let result = match panic::catch_unwind(AssertUnwindSafe(work)) {
                Ok(result) => result,
                Err(payload) => Err(DbError::new(format!(
                    "Task panicked: {}",
                    panic_message(payload.as_ref())
                ))
                .with_field("task_id", id)),
            };

            // Handle may have been dropped, nobody to tell.
            let _ = tx.send(result);
        });

        QueuedTask { id, run }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn execute(self) {
        (self.run)()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
