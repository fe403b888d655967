//! Defines Tempo Runtime task runner.
use std::future::Future;

use log::error;
use parking_lot::Mutex;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::OnceCell;
use tokio::task;
use tokio::task::JoinHandle;

use crate::errors::{Error, RuntimeError, Unknown};

/// Represents the result of a TaskResult.
/// A task may return either () or Result<(), Error> for flexibility which
/// will be converted to TaskResult sent to the runtime.
pub enum TaskResult {
    Ok,
    Err(Error),
}

/// Represents a handler for a task.
pub type TaskHandler = JoinHandle<Result<(), Error>>;

/// Globally accessible runtime transmitter(TX)/receiver(RX) (not initialised yet)
pub static RUNTIME_TX: OnceCell<Mutex<Option<UnboundedSender<UnboundedReceiver<TaskResult>>>>> =
    OnceCell::const_new();
pub static RUNTIME_RX: OnceCell<Mutex<Option<UnboundedReceiver<UnboundedReceiver<TaskResult>>>>> =
    OnceCell::const_new();

impl From<Result<(), Error>> for TaskResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(_) => TaskResult::Ok,
            Err(e) => TaskResult::Err(e),
        }
    }
}

impl From<()> for TaskResult {
    fn from(_: ()) -> Self {
        TaskResult::Ok
    }
}

/// Initializes the runtime channel used by [`run()`] (done by `#[tempo::runtime]`).
pub async fn init_task_channel() {
    // If no receiver is configured, create a new one (with associated sender).
    RUNTIME_RX
        .get_or_init(|| async {
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<UnboundedReceiver<TaskResult>>();

            // Set the runtime sender.
            RUNTIME_TX
                .get_or_init(|| async { Mutex::new(Some(tx)) })
                .await;

            // Set the runtime receiver.
            Mutex::new(Some(rx))
        })
        .await;
}

/// Waits for every task registered by [`run()`] to complete (done by `#[tempo::runtime]`).
///
/// Tasks registered while waiting (ie: spawned by a task itself) are waited as well.
/// Failing tasks are logged.
pub async fn wait_task_channel() {
    // The receiver is taken out of the cell so that no lock is held while awaiting.
    let receiver = RUNTIME_RX.get().and_then(|cell| cell.lock().take());
    let Some(mut receiver) = receiver else {
        return;
    };

    // We receive the task specific receiver...
    while let Ok(mut task_receiver) = receiver.try_recv() {
        // ...and the task result through that receiver.
        if let Some(TaskResult::Err(err)) = task_receiver.recv().await {
            error!("Task failed: {}", err);
        }
    }

    if let Some(cell) = RUNTIME_RX.get() {
        *cell.lock() = Some(receiver);
    }
}

/// Runs a given future as a Tokio task while ensuring the main function (marked by `#[tempo::runtime]`)
/// will not finish before all tasks running are done.
/// This is done by using a globally accessible channel to communicate the handlers to be waited by the
/// runtime.
///
/// # Parameters
/// * `future`: A future that implements `Future<Output = ()>`, `Send`, and has a `'static` lifetime.
///
/// # Errors
/// Returns a `RuntimeError` if called outside a tokio runtime or before the runtime channel has been
/// initialized (see `#[tempo::runtime]`).
///
/// # Example
/// ```
/// use tempo::utils::task;
///
/// #[tempo::runtime]
/// async fn main() {
///     task::run(async move {
///         // whatever
///     }).unwrap();
/// }
/// ```
pub fn run<F, T>(future: F) -> Result<TaskHandler, Error>
where
    F: Future<Output = T> + Send + 'static,
    T: Into<TaskResult> + Send + 'static,
{
    tokio::runtime::Handle::try_current().map_err(|_| RuntimeError)?;

    // Create a transmitter(tx)/receiver(rx) unique to this task.
    let (task_tx, task_rx) = tokio::sync::mpsc::unbounded_channel();

    // Forget the tasks already over: only the pending ones go back to the runtime.
    let mut pending = sweep_task_channel();
    pending.push(task_rx);

    // --
    // Send the receiver(rx) side of the task-channels to the runtime.
    {
        let cell = RUNTIME_TX.get().ok_or(RuntimeError)?;
        let mut lock = cell.lock();
        let runtime_tx = lock.as_mut().ok_or(RuntimeError)?;
        for task_rx in pending {
            runtime_tx.send(task_rx).map_err(|err| Unknown {
                info: err.to_string(),
            })?;
        }
    }

    // --
    // Create a task to run our future: note how we capture the tx...
    let handler = task::spawn(async move {
        // ...to send the result of the future through that channel.
        let result = future.await.into();
        task_tx.send(result).map_err(|err| Unknown {
            info: err.to_string(),
        })?;
        Ok(())
    });

    Ok(handler)
}

/// Takes the task receivers out of the runtime channel without waiting: results of finished tasks
/// are consumed (failures are logged), receivers of pending tasks are returned.
///
/// Does nothing while [`wait_task_channel()`] holds the runtime receiver.
fn sweep_task_channel() -> Vec<UnboundedReceiver<TaskResult>> {
    let mut pending = vec![];
    let Some(cell) = RUNTIME_RX.get() else {
        return pending;
    };
    let mut lock = cell.lock();
    let Some(receiver) = lock.as_mut() else {
        return pending;
    };

    while let Ok(mut task_receiver) = receiver.try_recv() {
        match task_receiver.try_recv() {
            Ok(TaskResult::Ok) => {}
            Ok(TaskResult::Err(err)) => error!("Task failed: {}", err),
            // Aborted (or panicked) task: no result will ever come.
            Err(TryRecvError::Disconnected) => {}
            Err(TryRecvError::Empty) => pending.push(task_receiver),
        }
    }
    pending
}

#[macro_export]
macro_rules! pause {
    ($ms:expr) => {
        tokio::time::sleep(tokio::time::Duration::from_millis($ms as u64)).await
    };
}

#[macro_export]
macro_rules! pause_sync {
    ($ms:expr) => {
        std::thread::sleep(std::time::Duration::from_millis($ms as u64))
    };
}
