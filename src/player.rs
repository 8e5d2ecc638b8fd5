//! Playback state machine
//!
//! **Why**: Frames decode out of order and some never decode at all, but the
//! display must stay strictly sequential and never flash an empty frame.
//!
//! # States
//!
//! - `WaitingForFirstFrame`: polled on `LOADING_DELAY` until slot 0 is filled
//! - `Playing`: one tick per period, target is always `(current + 1) % N`
//!
//! # Timing Model
//!
//! FPS-based: each tick has fixed duration (1000/fps ms).
//! If the target frame is not loaded: keep showing the last good frame and
//! retry the same target next tick (no skipping ahead).

use std::time::Duration;

use log::{debug, info};

use crate::frame::FrameBuffer;

/// Index following `current` in a looping sequence of `total` frames.
pub fn next_index(current: usize, total: usize) -> usize {
    if total == 0 { 0 } else { (current + 1) % total }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    WaitingForFirstFrame,
    Playing,
}

/// Playback cursor and status line
#[derive(Debug, Clone)]
pub struct Player {
    state: PlaybackState,
    current: usize,
    total: usize,
    period: Duration,
    status: String,
}

impl Player {
    pub fn new(total: usize, period: Duration) -> Self {
        info!("Player initialized: {} frames, period {:?}", total, period);
        Self {
            state: PlaybackState::WaitingForFirstFrame,
            current: 0,
            total,
            period,
            status: "Initializing".to_string(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the last frame successfully shown
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Waiting-state poll. Returns `true` (and switches to `Playing`) once
    /// frame 0 is available; the caller then renders it.
    pub fn check_loading(&mut self, buffer: &FrameBuffer) -> bool {
        if buffer.is_ready(0) {
            debug!("First frame ready, starting playback");
            self.state = PlaybackState::Playing;
            return true;
        }
        self.status = format!("Loading first frame ({}/{})", buffer.loaded(), self.total);
        false
    }

    /// Playing-state tick. Returns the index to render, or `None` to hold.
    ///
    /// The cursor itself only moves in `mark_shown`, after a successful render.
    pub fn tick(&mut self, buffer: &FrameBuffer) -> Option<usize> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        let target = next_index(self.current, self.total);
        self.status = format!("Frame {}/{}, loaded: {}", target + 1, self.total, buffer.loaded());

        buffer.is_ready(target).then_some(target)
    }

    /// Record that `index` is now on screen.
    pub fn mark_shown(&mut self, index: usize) {
        self.current = index;
    }
}
