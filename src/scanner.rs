use serde::{Deserialize, Serialize};

/// JPEG start-of-image marker.
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// Fractional bounds of the payload region searched for the embedded SOI.
///
/// The marker bytes legitimately recur inside entropy-coded data, so scanning
/// the whole payload would false-positive. A fused buffer's second frame
/// starts near the middle of the combined payload; these bounds have been
/// retuned against the producing hardware before, hence configuration rather
/// than constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchWindow {
    pub lo: f64,
    pub hi: f64,
}

impl Default for SearchWindow {
    fn default() -> Self {
        Self { lo: 0.375, hi: 0.75 }
    }
}

impl SearchWindow {
    /// Concrete index range scanned in a payload of `len` bytes. The start is
    /// inclusive and at least 1 (offset 0 is the frame's own SOI); the end is
    /// exclusive and clamped so the two-byte match stays in bounds.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = ((self.lo * len as f64) as usize).max(1);
        let end = ((self.hi * len as f64) as usize).min(len.saturating_sub(1));
        (start, end)
    }
}

/// Locates the SOI of the second embedded frame inside a suspected fused
/// payload. Returns `None` when the payload is not a well-formed JPEG start
/// or no marker lies in the window; neither is an error, the caller forwards
/// the frame unmodified.
pub fn find_soi(payload: &[u8], window: &SearchWindow) -> Option<usize> {
    if payload.len() < 2 || payload[..2] != SOI {
        tracing::warn!(
            leader = ?payload.get(..2),
            "payload does not start with SOI, presuming not fused"
        );
        metrics::counter!("defuse_invalid_leader_total").increment(1);
        return None;
    }

    let (start, end) = window.bounds(payload.len());
    tracing::trace!(start, end, len = payload.len(), "scanning for embedded SOI");

    for i in start..end {
        if payload[i] == SOI[0] && payload[i + 1] == SOI[1] {
            tracing::debug!(offset = i, "embedded SOI found");
            return Some(i);
        }
    }

    tracing::warn!(start, end, "no SOI in search window");
    metrics::counter!("defuse_soi_miss_total").increment(1);
    None
}
