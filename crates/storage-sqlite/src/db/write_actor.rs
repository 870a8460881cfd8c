//! Single-writer task for all database mutations.
//!
//! SQLite tolerates many readers but only one writer; funneling every
//! write through one task with one dedicated connection also gives the
//! upper layers their serialization guarantee: a check-then-write job and
//! a bulk update can never interleave, because each job runs to
//! completion inside an immediate transaction before the next is taken.

use std::any::Any;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use cartlist_core::errors::Result;

// Jobs are type-erased so one channel can carry every return type.
type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) -> Result<Box<dyn Any + Send>> + Send>;
type WriteReply = oneshot::Sender<Result<Box<dyn Any + Send>>>;

/// Handle for submitting jobs to the writer task.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(WriteJob, WriteReply)>,
}

impl WriteHandle {
    /// Runs `job` on the writer's dedicated connection inside an
    /// immediate transaction. Jobs are applied strictly in submission
    /// order.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (ret_tx, ret_rx) = oneshot::channel();
        self.tx
            .send((
                Box::new(move |conn| job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("database writer task stopped");

        ret_rx
            .await
            .expect("database writer task dropped the reply")
            .map(|boxed| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("writer job result type mismatch"))
            })
    }
}

/// Spawns the writer task. It holds one pooled connection for its whole
/// lifetime and terminates when the last `WriteHandle` is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(WriteJob, WriteReply)>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("no database connection available for the writer task");

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Into::into);
            // The requester may have given up waiting; that is its call.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
