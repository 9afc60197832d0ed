//! Length-prefixed frame records for running the defuser over recorded
//! streams offline. Each record is a `u32` payload length, then pts, dts and
//! duration as little-endian nanosecond counts (`u64::MAX` = unset), then
//! the payload bytes. This framing belongs to the CLI tool, not the core.

use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::frame::{Frame, FrameTiming};

const UNSET: u64 = u64::MAX;
const HEADER_LEN: usize = 4 + 3 * 8;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CaptureError {
    #[error("truncated record header: {0} bytes left")]
    TruncatedHeader(usize),

    #[error("truncated payload: record claims {expected} bytes, {left} left")]
    TruncatedPayload { expected: usize, left: usize },
}

fn encode_ts(ts: Option<Duration>) -> u64 {
    match ts {
        Some(d) => d.as_nanos().min(u128::from(UNSET - 1)) as u64,
        None => UNSET,
    }
}

fn decode_ts(raw: u64) -> Option<Duration> {
    (raw != UNSET).then(|| Duration::from_nanos(raw))
}

/// Reads frames out of a capture held in memory. Payloads are zero-copy
/// slices of the capture buffer.
pub struct CaptureReader {
    buf: Bytes,
}

impl CaptureReader {
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    pub fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        if self.buf.len() < HEADER_LEN {
            return Err(CaptureError::TruncatedHeader(self.buf.len()));
        }

        let len = self.buf.get_u32_le() as usize;
        let timing = FrameTiming::new(
            decode_ts(self.buf.get_u64_le()),
            decode_ts(self.buf.get_u64_le()),
            decode_ts(self.buf.get_u64_le()),
        );

        if self.buf.len() < len {
            return Err(CaptureError::TruncatedPayload {
                expected: len,
                left: self.buf.len(),
            });
        }
        let payload = self.buf.split_to(len);

        Ok(Some(Frame::new(payload, timing)))
    }
}

/// Accumulates frames back into the capture format.
#[derive(Default)]
pub struct CaptureWriter {
    buf: BytesMut,
}

impl CaptureWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: &Frame) {
        self.buf.put_u32_le(frame.payload.len() as u32);
        self.buf.put_u64_le(encode_ts(frame.timing.pts));
        self.buf.put_u64_le(encode_ts(frame.timing.dts));
        self.buf.put_u64_le(encode_ts(frame.timing.duration));
        self.buf.put_slice(&frame.payload);
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn frame(payload: &[u8], pts_ms: u64) -> Frame {
        Frame::new(
            Bytes::copy_from_slice(payload),
            FrameTiming::new(
                Some(Duration::from_millis(pts_ms)),
                Some(Duration::from_millis(pts_ms)),
                Some(Duration::from_millis(33)),
            ),
        )
    }

    #[test]
    fn roundtrip() {
        let frames = [frame(b"first", 0), frame(b"second payload", 33)];
        let mut writer = CaptureWriter::new();
        for f in &frames {
            writer.push(f);
        }

        let mut reader = CaptureReader::new(writer.into_bytes());
        for f in &frames {
            assert_eq!(reader.next_frame().unwrap().as_ref(), Some(f));
        }
        assert_eq!(reader.next_frame().unwrap(), None);
    }

    #[test]
    fn unset_timestamps_survive() {
        let f = Frame::new(Bytes::from_static(b"x"), FrameTiming::default());
        let mut writer = CaptureWriter::new();
        writer.push(&f);

        let mut reader = CaptureReader::new(writer.into_bytes());
        let read = reader.next_frame().unwrap().unwrap();
        assert_eq!(read.timing, FrameTiming::default());
    }

    #[test]
    fn truncated_header_is_an_error() {
        let mut reader = CaptureReader::new(Bytes::from_static(&[0x05, 0x00]));
        assert_eq!(
            reader.next_frame().unwrap_err(),
            CaptureError::TruncatedHeader(2)
        );
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let mut writer = CaptureWriter::new();
        writer.push(&frame(b"payload", 0));
        let full = writer.into_bytes();
        let cut = full.slice(0..full.len() - 3);

        let mut reader = CaptureReader::new(cut);
        assert_eq!(
            reader.next_frame().unwrap_err(),
            CaptureError::TruncatedPayload {
                expected: 7,
                left: 4,
            }
        );
    }
}
