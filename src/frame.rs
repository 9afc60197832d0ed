use std::ops::Range;
use std::time::Duration;

use bytes::Bytes;

use crate::error::MapError;

/// Timestamp metadata carried by every frame. `None` mirrors the host
/// pipeline's "unset" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTiming {
    pub pts: Option<Duration>,
    pub dts: Option<Duration>,
    pub duration: Option<Duration>,
}

impl FrameTiming {
    pub fn new(pts: Option<Duration>, dts: Option<Duration>, duration: Option<Duration>) -> Self {
        Self { pts, dts, duration }
    }
}

/// Seam between the core and the host pipeline's buffer representation.
///
/// The defuser only ever reads payloads and carves sub-range views out of
/// them; it never allocates storage. Implementations must keep the backing
/// storage alive as long as any view of it, so the two halves of a split
/// frame stay valid independently of each other and of the original.
pub trait FrameBuffer: Sized {
    fn size(&self) -> usize;

    /// Maps the whole payload for reading. `Bytes`-backed frames cannot
    /// fail; backings tied to device memory may.
    fn map_read(&self) -> Result<Bytes, MapError>;

    /// Zero-copy view of a sub-range of the payload.
    fn slice(&self, range: Range<usize>) -> Self;

    fn timing(&self) -> FrameTiming;

    fn with_timing(self, timing: FrameTiming) -> Self;
}

/// Default frame representation: a refcounted payload plus timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Bytes,
    pub timing: FrameTiming,
}

impl Frame {
    pub fn new(payload: Bytes, timing: FrameTiming) -> Self {
        Self { payload, timing }
    }
}

impl FrameBuffer for Frame {
    fn size(&self) -> usize {
        self.payload.len()
    }

    fn map_read(&self) -> Result<Bytes, MapError> {
        Ok(self.payload.clone())
    }

    fn slice(&self, range: Range<usize>) -> Self {
        Self {
            payload: self.payload.slice(range),
            timing: self.timing,
        }
    }

    fn timing(&self) -> FrameTiming {
        self.timing
    }

    fn with_timing(mut self, timing: FrameTiming) -> Self {
        self.timing = timing;
        self
    }
}
