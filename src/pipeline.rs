//! Decode pipeline lifecycle: spawn feeder + workers, coordinated shutdown.
//!
//! ```text
//! feeder ──bounded(TASK_QUEUE_SIZE)──> workers xN ──unbounded──> ResultCollector (UI thread)
//! ```
//!
//! Shutdown order: set flag -> one extra sentinel per worker (non-blocking)
//! -> join feeder -> join workers. Only after `shutdown()` returns may the
//! window be closed.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use log::{debug, error, info, warn};

use crate::config::{SEND_TIMEOUT, TASK_QUEUE_SIZE};
use crate::decode::FrameDecoder;
use crate::feeder::{FeedReport, run_feeder};
use crate::frame::{DecodedFrame, FrameTask};
use crate::shutdown::ShutdownFlag;
use crate::workers::{WorkerContext, WorkerReport, Workers};

/// Summary of a finished pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub feed: Option<FeedReport>,
    pub workers: Vec<WorkerReport>,
}

/// Running decode threads plus the channel ends the UI side needs.
pub struct Pipeline {
    shutdown: ShutdownFlag,
    tasks: Sender<FrameTask>,
    feeder: thread::JoinHandle<FeedReport>,
    workers: Workers,
}

impl Pipeline {
    /// Start the feeder and `num_workers` decode workers.
    ///
    /// Returns the pipeline and the receiving end of the result channel.
    pub fn start(
        paths: Vec<PathBuf>,
        num_workers: usize,
        decoder: Arc<dyn FrameDecoder>,
        thumbnail_box: (u32, u32),
        shutdown: ShutdownFlag,
    ) -> io::Result<(Self, Receiver<DecodedFrame>)> {
        let num_workers = num_workers.max(1);
        let (task_tx, task_rx) = bounded(TASK_QUEUE_SIZE);
        let (result_tx, result_rx) = unbounded();

        info!("Starting pipeline: {} frames, {} workers", paths.len(), num_workers);

        let feeder = {
            let tasks = task_tx.clone();
            let shutdown = shutdown.clone();
            thread::Builder::new()
                .name("flipbook-feeder".into())
                .spawn(move || run_feeder(paths, tasks, shutdown, num_workers, SEND_TIMEOUT))?
        };

        let ctx = WorkerContext {
            tasks: task_rx,
            results: result_tx,
            shutdown: shutdown.clone(),
            decoder,
            thumbnail_box,
        };
        let workers = match Workers::spawn(num_workers, ctx) {
            Ok(w) => w,
            Err(e) => {
                // Let the feeder wind down before bailing out
                shutdown.trigger();
                join_feeder(feeder);
                return Err(e);
            }
        };

        Ok((
            Self {
                shutdown,
                tasks: task_tx,
                feeder,
                workers,
            },
            result_rx,
        ))
    }

    /// Stop everything and wait for all threads. Consumes the pipeline, so
    /// it runs at most once.
    pub fn shutdown(self) -> ShutdownReport {
        info!("Shutting down pipeline");
        self.shutdown.trigger();

        // Extra sentinels in case the feeder already exited; never block the UI thread here
        for _ in 0..self.workers.len() {
            match self.tasks.try_send(FrameTask::Sentinel) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("Task queue full, workers will exit via shutdown flag");
                    break;
                }
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
        drop(self.tasks);

        let feed = join_feeder(self.feeder);
        let workers = self.workers.join();

        debug!("Pipeline stopped: feed {:?}, {} workers joined", feed, workers.len());
        ShutdownReport { feed, workers }
    }
}

/// Wait for the feeder; a panic is logged and reported as `None`.
fn join_feeder(feeder: thread::JoinHandle<FeedReport>) -> Option<FeedReport> {
    match feeder.join() {
        Ok(report) => Some(report),
        Err(_) => {
            error!("Feeder thread panicked");
            None
        }
    }
}
