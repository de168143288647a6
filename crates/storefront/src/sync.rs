//! Outbound best-effort sync queue.
//!
//! Local cart mutations are mirrored to the remote cart resource through
//! this queue rather than ad hoc fire-and-forget calls, which makes the
//! best-effort contract explicit and testable:
//!
//! - ops are issued in enqueue order (completion order is up to the server)
//! - a failed op is logged and dropped; it never blocks, retries, or rolls
//!   back the local mutation that produced it
//! - nothing is cancellable; dropping every queue handle shuts the worker
//!   down after the backlog drains

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rindhouse_core::ProductId;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::remote::RemoteCart;

/// A single remote cart mutation to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOp {
    Add { product_id: ProductId, quantity: u32 },
    Update { product_id: ProductId, quantity: u32 },
    Remove { product_id: ProductId },
    Clear,
}

impl SyncOp {
    /// Operation name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Remove { .. } => "remove",
            Self::Clear => "clear",
        }
    }
}

/// A queued op with its correlation id and enqueue time.
#[derive(Debug)]
struct SyncTask {
    id: Uuid,
    op: SyncOp,
    enqueued_at: DateTime<Utc>,
}

enum QueueMessage {
    Task(SyncTask),
    Flush(oneshot::Sender<()>),
}

/// Handle to the outbound sync worker. Cheaply cloneable.
#[derive(Clone)]
pub struct SyncQueue {
    tx: mpsc::UnboundedSender<QueueMessage>,
}

impl SyncQueue {
    /// Spawn the worker task executing ops against the remote cart.
    ///
    /// Must be called from within a tokio runtime. The worker exits once
    /// every handle is dropped and the backlog is drained.
    #[must_use]
    pub fn spawn(remote: Arc<dyn RemoteCart>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(remote, rx));
        Self { tx }
    }

    /// Enqueue an op. Never blocks the caller; if the worker is already
    /// gone (teardown) the op is dropped, which best-effort permits.
    pub fn enqueue(&self, op: SyncOp) {
        let task = SyncTask {
            id: Uuid::new_v4(),
            op,
            enqueued_at: Utc::now(),
        };
        debug!(task_id = %task.id, op = task.op.name(), "enqueued remote cart sync op");
        if self.tx.send(QueueMessage::Task(task)).is_err() {
            warn!("sync worker stopped; dropping remote cart op");
        }
    }

    /// Wait until every previously enqueued op has been attempted.
    ///
    /// Used by tests and graceful teardown; the reconciler itself never
    /// waits on the queue.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(QueueMessage::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

async fn run_worker(remote: Arc<dyn RemoteCart>, mut rx: mpsc::UnboundedReceiver<QueueMessage>) {
    while let Some(message) = rx.recv().await {
        match message {
            QueueMessage::Task(task) => {
                let result = match &task.op {
                    SyncOp::Add {
                        product_id,
                        quantity,
                    } => remote.add(product_id, *quantity).await,
                    SyncOp::Update {
                        product_id,
                        quantity,
                    } => remote.update(product_id, *quantity).await,
                    SyncOp::Remove { product_id } => remote.remove(product_id).await,
                    SyncOp::Clear => remote.clear().await,
                };

                if let Err(e) = result {
                    warn!(
                        task_id = %task.id,
                        op = task.op.name(),
                        enqueued_at = %task.enqueued_at,
                        error = %e,
                        "remote cart sync failed; local state stands"
                    );
                }
            }
            QueueMessage::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("sync worker exiting");
}
