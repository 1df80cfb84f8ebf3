use bytes::Bytes;
use daisylink_channel::Channel;
use daisylink_frame::{FrameError, FrameWriter};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Result, TransportError};

/// Single owner of a channel's write side.
///
/// Producers enqueue complete, already-framed byte strings through
/// [`WriterHandle`]s. One task drains the queue and writes each item to the
/// channel in full before taking the next, so items never interleave.
pub struct SerializedWriter {
    handle: WriterHandle,
    task: JoinHandle<()>,
}

/// Cloneable producer side of a [`SerializedWriter`].
#[derive(Debug, Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Bytes>,
}

impl SerializedWriter {
    /// Start the writer task. Must be called inside a tokio runtime.
    ///
    /// The task stops when `cancel` fires or every handle is dropped; items
    /// still queued at that point are discarded.
    pub fn spawn<C: Channel>(writer: FrameWriter<C>, depth: usize, cancel: CancellationToken) -> Self {
        let (tx, rx) = mpsc::channel(depth.max(1));
        let task = tokio::spawn(run_writer(writer, rx, cancel));
        Self {
            handle: WriterHandle { tx },
            task,
        }
    }

    /// A new producer handle.
    pub fn handle(&self) -> WriterHandle {
        self.handle.clone()
    }

    /// True once the writer task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the writer task to exit.
    pub async fn join(self) {
        drop(self.handle);
        if let Err(err) = self.task.await {
            warn!(error = %err, "writer task panicked");
        }
    }

    /// Like [`join`](SerializedWriter::join) for owners that cannot give up
    /// the writer. Must not be awaited again after it returns.
    pub(crate) async fn wait(&mut self) {
        if let Err(err) = (&mut self.task).await {
            warn!(error = %err, "writer task panicked");
        }
    }
}

impl WriterHandle {
    /// Queue `frame`, waiting for a free slot.
    pub async fn enqueue(&self, frame: Bytes) -> Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| TransportError::QueueClosed)
    }

    /// Queue `frame` only if a slot is free right now.
    pub fn try_enqueue(&self, frame: Bytes) -> Result<()> {
        self.tx.try_send(frame).map_err(|err| match err {
            TrySendError::Full(_) => TransportError::QueueFull,
            TrySendError::Closed(_) => TransportError::QueueClosed,
        })
    }

    /// True once the writer task has stopped accepting items.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn run_writer<C: Channel>(
    mut writer: FrameWriter<C>,
    mut rx: mpsc::Receiver<Bytes>,
    cancel: CancellationToken,
) {
    info!("writer task started");
    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(frame) => frame,
                None => break,
            },
        };

        if let Err(err) = write_frame(&mut writer, &frame).await {
            warn!(error = %err, len = frame.len(), "dropping frame after write failure");
        }
    }
    rx.close();
    info!(discarded = rx.len(), "writer task stopped");
}

/// Write all of `frame`, yielding to the scheduler while the channel is
/// full.
async fn write_frame<C: Channel>(writer: &mut FrameWriter<C>, frame: &[u8]) -> std::result::Result<(), FrameError> {
    let mut offset = 0usize;
    while offset < frame.len() {
        match writer.try_write(&frame[offset..])? {
            Some(n) => offset += n,
            None => tokio::task::yield_now().await,
        }
    }
    writer.flush()
}
