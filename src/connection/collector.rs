//! Size-prefixed frame collection.
//!
//! Every frame on the stream is a little-endian `u32` payload size followed by the
//! payload. The collector is fed one byte at a time and reports when a full frame
//! is available.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::config::DEFAULT_MAX_FRAME_SIZE;

const SIZE_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum CollectorState {
    WaitingSize,
    WaitingData,
    Collected,
    ErrorState,
}

#[derive(Debug, Clone)]
pub struct Collector {
    state: CollectorState,
    size_bytes: [u8; SIZE_PREFIX_LEN],
    size_read: usize,
    next_size: u32,
    data: BytesMut,
    max_frame_size: u32,
}

impl Collector {
    pub fn new(max_frame_size: u32) -> Self {
        Self {
            state: CollectorState::WaitingSize,
            size_bytes: [0; SIZE_PREFIX_LEN],
            size_read: 0,
            next_size: 0,
            data: BytesMut::new(),
            max_frame_size,
        }
    }

    /// Feed one byte. Bytes arriving after a complete frame, or in the error
    /// state, are ignored until [`Collector::reset`].
    pub fn collect(&mut self, byte: u8) -> CollectorState {
        match self.state {
            CollectorState::WaitingSize => {
                self.size_bytes[self.size_read] = byte;
                self.size_read += 1;
                if self.size_read == SIZE_PREFIX_LEN {
                    self.begin_frame(u32::from_le_bytes(self.size_bytes));
                }
            }
            CollectorState::WaitingData => {
                self.data.put_u8(byte);
                if self.data.len() == self.next_size as usize {
                    trace!(size = self.next_size, "Frame collected");
                    self.state = CollectorState::Collected;
                }
            }
            CollectorState::Collected | CollectorState::ErrorState => {}
        }
        self.state
    }

    fn begin_frame(&mut self, size: u32) {
        self.next_size = size;
        if size > self.max_frame_size {
            warn!(size, max = self.max_frame_size, "Frame size exceeds limit");
            self.state = CollectorState::ErrorState;
        } else if size == 0 {
            self.state = CollectorState::Collected;
        } else {
            self.data.reserve(size as usize);
            self.state = CollectorState::WaitingData;
        }
    }

    pub fn reset(&mut self) {
        self.state = CollectorState::WaitingSize;
        self.size_read = 0;
        self.next_size = 0;
        self.data.clear();
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn data_ready(&self) -> bool {
        self.state == CollectorState::Collected
    }

    pub fn error_state(&self) -> bool {
        self.state == CollectorState::ErrorState
    }

    /// Payload size announced by the current frame.
    pub fn next_size(&self) -> u32 {
        self.next_size
    }

    /// Payload bytes collected so far.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

/// Prefix `payload` with its little-endian size.
pub fn encode_with_size(payload: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(SIZE_PREFIX_LEN + payload.len());
    // frames are bounded by the collector limit, far below u32::MAX
    frame.put_u32_le(payload.len() as u32);
    frame.put_slice(payload);
    frame.freeze()
}
