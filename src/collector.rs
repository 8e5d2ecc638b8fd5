//! Result collector: UI-side drain of the unbounded result channel.
//!
//! Runs on the UI thread, so it only uses `try_recv` and never blocks.

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, trace};

use crate::frame::{DecodedFrame, FrameBuffer};

/// Outcome of one drain pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Frames written into the buffer this pass
    pub received: usize,
    /// Slot 0 was filled this pass (render it right away)
    pub first_frame: bool,
    /// All workers are gone and the channel is empty
    pub disconnected: bool,
}

pub struct ResultCollector {
    results: Receiver<DecodedFrame>,
}

impl ResultCollector {
    pub fn new(results: Receiver<DecodedFrame>) -> Self {
        Self { results }
    }

    /// Move every frame currently available into `buffer`.
    pub fn drain(&self, buffer: &mut FrameBuffer) -> DrainReport {
        let mut report = DrainReport::default();

        loop {
            match self.results.try_recv() {
                Ok(frame) => {
                    let index = frame.index;
                    if buffer.insert(frame) {
                        trace!("Collected frame {} ({}/{})", index, buffer.loaded(), buffer.len());
                        report.received += 1;
                        report.first_frame |= index == 0;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    report.disconnected = true;
                    break;
                }
            }
        }

        if report.received > 0 {
            debug!("Drained {} frames, loaded {}/{}", report.received, buffer.loaded(), buffer.len());
        }
        report
    }
}
