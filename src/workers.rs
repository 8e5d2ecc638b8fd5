//! Decode worker pool
//!
//! Each worker pulls `FrameTask`s from the bounded crossbeam channel with a
//! bounded wait, decodes + normalizes + thumbnails the file, and pushes a
//! `DecodedFrame` into the unbounded result channel.
//!
//! # Exit conditions
//!
//! - `FrameTask::Sentinel` received (normal completion, one per worker)
//! - `ShutdownFlag` observed between fetches
//! - channel disconnected (all senders/receivers dropped)
//!
//! Failed decodes are logged and dropped: no retry, the slot stays empty.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, error, trace};

use crate::config::FETCH_TIMEOUT;
use crate::decode::{FrameDecoder, normalize, thumbnail};
use crate::error::ViewerError;
use crate::frame::{DecodedFrame, FrameTask};
use crate::shutdown::ShutdownFlag;

/// Why a worker loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    Sentinel,
    Shutdown,
    Disconnected,
}

/// Per-worker tally returned from the thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub decoded: usize,
    pub failed: usize,
    pub exit: WorkerExit,
}

/// Everything a worker needs; cloned into each thread.
#[derive(Clone)]
pub struct WorkerContext {
    pub tasks: Receiver<FrameTask>,
    pub results: Sender<DecodedFrame>,
    pub shutdown: ShutdownFlag,
    pub decoder: Arc<dyn FrameDecoder>,
    pub thumbnail_box: (u32, u32),
}

/// Decode one file into a display-ready frame.
pub fn process_task(
    decoder: &dyn FrameDecoder,
    index: usize,
    path: &Path,
    thumbnail_box: (u32, u32),
) -> Result<DecodedFrame, ViewerError> {
    let decoded = decoder.decode(path)?;
    let rgb = normalize(decoded);
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(ViewerError::Image(format!("{}: empty image", path.display())));
    }

    let thumb = thumbnail(rgb, thumbnail_box);
    let (width, height) = thumb.dimensions();
    Ok(DecodedFrame::new(index, thumb.into_raw(), width, height))
}

/// Worker loop. Runs on its own thread until sentinel, shutdown or disconnect.
pub fn run_worker(worker_id: usize, ctx: WorkerContext) -> WorkerReport {
    debug!("Worker {} started", worker_id);

    let mut report = WorkerReport {
        worker_id,
        decoded: 0,
        failed: 0,
        exit: WorkerExit::Shutdown,
    };

    while !ctx.shutdown.is_set() {
        let task = match ctx.tasks.recv_timeout(FETCH_TIMEOUT) {
            Ok(task) => task,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                report.exit = WorkerExit::Disconnected;
                break;
            }
        };

        let (index, path) = match task {
            FrameTask::Sentinel => {
                report.exit = WorkerExit::Sentinel;
                break;
            }
            FrameTask::Frame { index, path } => (index, path),
        };

        match process_task(ctx.decoder.as_ref(), index, &path, ctx.thumbnail_box) {
            Ok(frame) => {
                trace!("Worker {} decoded frame {} ({}x{})", worker_id, index, frame.width, frame.height);
                if ctx.results.send(frame).is_err() {
                    debug!("Worker {}: result channel closed", worker_id);
                    report.exit = WorkerExit::Disconnected;
                    break;
                }
                report.decoded += 1;
            }
            Err(e) => {
                error!("Frame {} ({}) dropped: {}", index, path.display(), e);
                report.failed += 1;
            }
        }
    }

    debug!(
        "Worker {} stopped ({:?}, decoded {}, failed {})",
        worker_id, report.exit, report.decoded, report.failed
    );
    report
}

/// Handles of the spawned decode threads.
pub struct Workers {
    handles: Vec<thread::JoinHandle<WorkerReport>>,
}

impl Workers {
    /// Spawn `num_threads` workers sharing one context.
    pub fn spawn(num_threads: usize, ctx: WorkerContext) -> io::Result<Self> {
        let mut handles = Vec::with_capacity(num_threads);

        for worker_id in 0..num_threads {
            let ctx = ctx.clone();
            let handle = thread::Builder::new()
                .name(format!("flipbook-worker-{}", worker_id))
                .spawn(move || run_worker(worker_id, ctx))?;
            handles.push(handle);
        }

        debug!("Workers initialized: {} threads", num_threads);
        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Block until every worker has exited.
    ///
    /// A panicked worker is logged and left out of the result.
    pub fn join(self) -> Vec<WorkerReport> {
        let mut reports = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => error!("Decode worker panicked"),
            }
        }
        reports
    }
}
