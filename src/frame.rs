//! Pipeline messages and the frame buffer
//!
//! **Flow**: feeder sends `FrameTask` -> worker sends `DecodedFrame` ->
//! collector writes it into `FrameBuffer` -> player reads it.
//!
//! # Frame Buffer
//!
//! Fixed length N, one slot per source file, pre-allocated empty.
//! Slots are written at most once and never cleared. Workers finish out of
//! order, so writes are random-access by index.

use log::warn;
use std::path::PathBuf;

/// Unit of work on the bounded task channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameTask {
    /// Decode file `path` into slot `index`
    Frame { index: usize, path: PathBuf },
    /// No more work: the receiving worker exits
    Sentinel,
}

/// Decoded, thumbnailed frame: packed RGB8 rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub index: usize,
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedFrame {
    pub fn new(index: usize, pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self { index, pixels, width, height }
    }

    /// Byte length implied by the dimensions (3 bytes per pixel)
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Indexed, append-only store of decoded frames
#[derive(Debug)]
pub struct FrameBuffer {
    slots: Vec<Option<DecodedFrame>>,
    loaded: usize,
}

impl FrameBuffer {
    /// Create buffer with `len` empty slots
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            loaded: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of filled slots
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn get(&self, index: usize) -> Option<&DecodedFrame> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn is_ready(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Store frame in its slot.
    ///
    /// Returns `false` (and keeps the existing content) when the index is out
    /// of range or the slot is already filled.
    pub fn insert(&mut self, frame: DecodedFrame) -> bool {
        let index = frame.index;
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(frame);
                self.loaded += 1;
                true
            }
            Some(_) => {
                warn!("Frame {} already loaded, ignoring duplicate", index);
                false
            }
            None => {
                warn!("Frame index {} out of range (buffer len {})", index, self.slots.len());
                false
            }
        }
    }
}
