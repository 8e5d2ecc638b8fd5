//! UI-thread coordinator: timers, frame buffer, playback and shutdown.
//!
//! Three timer-driven loops share the UI thread:
//!
//! - `Tick::Collect` every `RESULTS_CHECK_DELAY`: drain results, fast-path frame 0
//! - `Tick::CheckLoading` every `LOADING_DELAY` until frame 0 exists
//! - `Tick::Play` every playback period once playing
//!
//! Every tick does bounded, non-blocking work. `Viewer` is generic over the
//! display `Surface` so the whole loop runs headless in tests.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::{error, info};

use crate::collector::ResultCollector;
use crate::config::{LOADING_DELAY, RESULTS_CHECK_DELAY, ViewerConfig};
use crate::decode::FrameDecoder;
use crate::display::Surface;
use crate::frame::{DecodedFrame, FrameBuffer};
use crate::pipeline::{Pipeline, ShutdownReport};
use crate::player::{PlaybackState, Player};
use crate::scheduler::Scheduler;
use crate::shutdown::ShutdownFlag;

/// Scheduled UI callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Collect,
    CheckLoading,
    Play,
}

pub struct Viewer<S: Surface> {
    surface: S,
    buffer: FrameBuffer,
    player: Player,
    collector: ResultCollector,
    scheduler: Scheduler<Tick>,
    shutdown: ShutdownFlag,
    pipeline: Option<Pipeline>,
    /// Result channel disconnected: no more frames will arrive
    results_done: bool,
    closed: bool,
}

impl<S: Surface> Viewer<S> {
    /// Viewer over `total` frames fed by `results`. No timers run until `start()`.
    pub fn new(
        surface: S,
        total: usize,
        period: Duration,
        results: Receiver<DecodedFrame>,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            surface,
            buffer: FrameBuffer::new(total),
            player: Player::new(total, period),
            collector: ResultCollector::new(results),
            scheduler: Scheduler::new(),
            shutdown,
            pipeline: None,
            results_done: false,
            closed: false,
        }
    }

    /// Attach the decode threads this viewer must stop on shutdown.
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Full startup: allocate buffer, spawn feeder and workers, start timers.
    pub fn launch(
        surface: S,
        paths: Vec<PathBuf>,
        config: &ViewerConfig,
        decoder: Arc<dyn FrameDecoder>,
        now: Instant,
    ) -> io::Result<Self> {
        let total = paths.len();
        let shutdown = ShutdownFlag::new();
        let (pipeline, results) =
            Pipeline::start(paths, config.num_workers, decoder, config.thumbnail_box, shutdown.clone())?;

        let mut viewer = Self::new(surface, total, config.period(), results, shutdown).with_pipeline(pipeline);
        viewer.start(now);
        Ok(viewer)
    }

    /// Enter WaitingForFirstFrame and begin draining results.
    pub fn start(&mut self, now: Instant) {
        self.scheduler.schedule(now, Duration::ZERO, Tick::CheckLoading);
        self.scheduler.schedule(now, Duration::ZERO, Tick::Collect);
    }

    /// Run every tick due at `now`. Returns how many ran.
    pub fn run_due(&mut self, now: Instant) -> usize {
        let due = self.scheduler.take_due(now);
        let count = due.len();
        for tick in due {
            self.on_tick(tick, now);
        }
        count
    }

    fn on_tick(&mut self, tick: Tick, now: Instant) {
        match tick {
            Tick::Collect => {
                let report = self.collector.drain(&mut self.buffer);
                if report.first_frame {
                    self.show(0);
                }
                if report.disconnected && !self.results_done {
                    self.results_done = true;
                    info!(
                        "Decoding finished: {}/{} frames loaded",
                        self.buffer.loaded(),
                        self.buffer.len()
                    );
                }
                if !self.shutdown.is_set() {
                    self.scheduler.schedule(now, RESULTS_CHECK_DELAY, Tick::Collect);
                }
            }
            Tick::CheckLoading => {
                if self.player.check_loading(&self.buffer) {
                    self.show(0);
                    self.scheduler.schedule(now, self.player.period(), Tick::Play);
                } else {
                    self.scheduler.schedule(now, LOADING_DELAY, Tick::CheckLoading);
                }
            }
            Tick::Play => {
                if self.shutdown.is_set() {
                    return;
                }
                if let Some(target) = self.player.tick(&self.buffer) {
                    self.show(target);
                }
                self.scheduler.schedule(now, self.player.period(), Tick::Play);
            }
        }
    }

    /// Render slot `index`; the cursor moves only if the render succeeded.
    fn show(&mut self, index: usize) {
        let Some(frame) = self.buffer.get(index) else {
            return;
        };
        match self.surface.render(frame) {
            Ok(()) => self.player.mark_shown(index),
            Err(e) => error!("Failed to show frame {}: {}", index, e),
        }
    }

    /// Stop decode threads and all timers. Only the first call does anything.
    ///
    /// Blocks until the feeder and every worker have exited.
    pub fn shutdown(&mut self) -> Option<ShutdownReport> {
        if self.closed {
            return None;
        }
        self.closed = true;

        info!("Shutting down");
        self.shutdown.trigger();
        let report = self.pipeline.take().map(Pipeline::shutdown);
        self.scheduler.cancel_all();
        Some(report.unwrap_or(ShutdownReport { feed: None, workers: Vec::new() }))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Earliest pending timer
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// When the window next needs a repaint.
    ///
    /// Once every slot is filled or the workers are gone, `Collect` keeps
    /// ticking but no longer wakes the UI on its own.
    pub fn repaint_deadline(&self) -> Option<Instant> {
        if self.is_collecting() {
            self.scheduler.next_deadline()
        } else {
            self.scheduler.next_deadline_where(|t| *t != Tick::Collect)
        }
    }

    /// More decoded frames may still arrive
    pub fn is_collecting(&self) -> bool {
        !self.results_done && self.buffer.loaded() < self.buffer.len()
    }

    pub fn status(&self) -> &str {
        self.player.status()
    }

    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    pub fn current(&self) -> usize {
        self.player.current()
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn total(&self) -> usize {
        self.player.total()
    }
}
