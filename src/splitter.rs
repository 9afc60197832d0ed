use serde::{Deserialize, Serialize};

use crate::frame::{FrameBuffer, FrameTiming};

/// Which half of a split absorbs the one-duration timestamp shift. The
/// element this crate replaces changed its mind between revisions, so both
/// are first-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// First half keeps the input timing; second is stamped one duration
    /// later.
    #[default]
    ShiftSecondForward,
    /// Second half keeps the input pts; first is stamped one duration
    /// earlier (saturating at zero).
    ShiftFirstBack,
}

impl TimestampPolicy {
    fn apply(self, timing: FrameTiming) -> (FrameTiming, FrameTiming) {
        // Without a duration there is nothing to shift by; both halves
        // inherit the input timing unchanged.
        let Some(duration) = timing.duration else {
            return (timing, timing);
        };
        match self {
            Self::ShiftSecondForward => {
                let second = FrameTiming {
                    pts: timing.pts.map(|pts| pts + duration),
                    ..timing
                };
                (timing, second)
            }
            Self::ShiftFirstBack => {
                let first = FrameTiming {
                    pts: timing.pts.map(|pts| pts.saturating_sub(duration)),
                    ..timing
                };
                (first, timing)
            }
        }
    }
}

/// Splits a fused frame at `offset` into two disjoint zero-copy views of the
/// original storage. Precondition: `0 < offset < frame.size()`.
pub fn split<F: FrameBuffer>(frame: &F, offset: usize, policy: TimestampPolicy) -> (F, F) {
    debug_assert!(offset > 0 && offset < frame.size());

    let (first_timing, second_timing) = policy.apply(frame.timing());
    let first = frame.slice(0..offset).with_timing(first_timing);
    let second = frame.slice(offset..frame.size()).with_timing(second_timing);
    (first, second)
}
