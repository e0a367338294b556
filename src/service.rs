//! Serialized access to a kernel shared between tasks.
//!
//! A single tokio task owns the kernel and drains an mpsc mailbox, so at most
//! one ingestion runs at a time. After every ingestion the task republishes a
//! [`KernelStatus`] on a watch channel; readers copy the latest snapshot
//! without ever touching the kernel.

use serde_json::json;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::error::{KernelError, KernelResult};
use crate::kernel::{IngestResult, Kernel};
use crate::logging::{self, log, obj, Domain, Level};
use crate::status::KernelStatus;

pub const MAILBOX_CAPACITY: usize = 256;

enum Request {
    Ingest {
        label: String,
        sentiment: f64,
        reply: oneshot::Sender<KernelResult<IngestResult>>,
    },
}

#[derive(Debug, Clone)]
pub struct KernelHandle {
    tx: mpsc::Sender<Request>,
    status: watch::Receiver<KernelStatus>,
}

impl KernelHandle {
    pub async fn ingest(
        &self,
        label: impl Into<String>,
        sentiment: f64,
    ) -> KernelResult<IngestResult> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Ingest {
                label: label.into(),
                sentiment,
                reply,
            })
            .await
            .map_err(|_| KernelError::ServiceClosed)?;
        rx.await.map_err(|_| KernelError::ServiceClosed)?
    }

    /// Latest published snapshot.
    pub fn status(&self) -> KernelStatus {
        self.status.borrow().clone()
    }

    /// Wait until a newer snapshot than the last one seen is published.
    pub async fn changed(&mut self) -> KernelResult<KernelStatus> {
        self.status.changed().await.map_err(|_| KernelError::ServiceClosed)?;
        Ok(self.status.borrow_and_update().clone())
    }
}

pub struct KernelService;

impl KernelService {
    /// Move the kernel into its own task. The task ends once every handle is dropped.
    pub fn spawn<C>(kernel: Kernel<C>) -> (KernelHandle, JoinHandle<Kernel<C>>)
    where
        C: Clock + 'static,
    {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let (status_tx, status_rx) = watch::channel(kernel.status());
        let task = tokio::spawn(run(kernel, rx, status_tx));
        (
            KernelHandle {
                tx,
                status: status_rx,
            },
            task,
        )
    }
}

async fn run<C: Clock>(
    mut kernel: Kernel<C>,
    mut rx: mpsc::Receiver<Request>,
    status_tx: watch::Sender<KernelStatus>,
) -> Kernel<C> {
    log(Level::Debug, Domain::Service, "started", obj(&[]));
    while let Some(req) = rx.recv().await {
        match req {
            Request::Ingest {
                label,
                sentiment,
                reply,
            } => {
                let result = kernel.ingest(&label, sentiment);
                match &result {
                    Ok(r) => {
                        status_tx.send_replace(kernel.status());
                        if let Some(p) = &r.pattern {
                            logging::log_pattern(
                                p.direction.as_str(),
                                p.strength,
                                p.window_size,
                                r.adaptation_score,
                            );
                        }
                    }
                    Err(err) => logging::log_rejected(&err.to_string()),
                }
                // caller may have given up waiting
                let _ = reply.send(result);
            }
        }
    }
    log(
        Level::Debug,
        Domain::Service,
        "stopped",
        obj(&[("total_inputs", json!(kernel.total_inputs()))]),
    );
    kernel
}
