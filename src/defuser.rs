use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::DefuseError;
use crate::estimator::SizeEstimator;
use crate::frame::FrameBuffer;
use crate::scanner::{self, SearchWindow};
use crate::slot::PendingSlot;
use crate::splitter::{self, TimestampPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefuserConfig {
    /// A frame larger than this ratio times the expected size is suspected
    /// to be two fused frames.
    pub oversize_ratio: f64,
    pub window: SearchWindow,
    /// Expected size used until the size history has real observations.
    pub default_expected_size: u64,
    pub timestamp_policy: TimestampPolicy,
}

impl Default for DefuserConfig {
    fn default() -> Self {
        Self {
            oversize_ratio: 1.5,
            window: SearchWindow::default(),
            default_expected_size: 250_000,
            timestamp_policy: TimestampPolicy::default(),
        }
    }
}

#[derive(Debug)]
struct DefuserState<F> {
    estimator: SizeEstimator,
    pending: PendingSlot<F>,
}

/// Detects fused frames in an ordered stream and re-emits them as two
/// correctly timed frames.
///
/// One instance per stream; constructed at stream start, dropped at stream
/// end. A pending split-off frame still held at drop is discarded unless the
/// host calls [`Defuser::flush`] first.
#[derive(Debug)]
pub struct Defuser<F> {
    config: DefuserConfig,
    state: Mutex<DefuserState<F>>,
}

impl<F: FrameBuffer> Defuser<F> {
    pub fn new(config: DefuserConfig) -> Self {
        tracing::info!(?config, "defuser initialized");
        Self {
            state: Mutex::new(DefuserState {
                estimator: SizeEstimator::new(config.default_expected_size),
                pending: PendingSlot::new(),
            }),
            config,
        }
    }

    pub fn config(&self) -> &DefuserConfig {
        &self.config
    }

    /// One processing step. Output order: a pending frame from the previous
    /// step first, then this step's own output.
    ///
    /// The whole step runs under one lock acquisition: the host may call
    /// into the same instance concurrently, and the flush-then-store
    /// sequence must not interleave with another step or frame order would
    /// corrupt.
    pub fn process(&self, frame: F) -> Result<Vec<F>, DefuseError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let mut out = Vec::with_capacity(2);
        if let Some(pending) = state.pending.take() {
            tracing::trace!("flushing pending frame");
            out.push(pending);
        }

        let size = frame.size() as u64;
        let expected = state.estimator.observe(size);
        metrics::histogram!("defuse_frame_size_bytes").record(size as f64);

        if (size as f64) <= self.config.oversize_ratio * expected as f64 {
            tracing::trace!(size, expected, "pass-through");
            out.push(frame);
            return Ok(out);
        }

        tracing::debug!(size, expected, "oversized frame, scanning for embedded SOI");
        let payload = match frame.map_read() {
            Ok(payload) => payload,
            Err(err) => {
                // Hard failure must not lose the already-drained pending
                // frame; put it back for the next step.
                if let Some(pending) = out.pop() {
                    let _ = state.pending.store(pending);
                }
                return Err(err.into());
            }
        };

        match scanner::find_soi(&payload, &self.config.window) {
            Some(offset) => {
                metrics::counter!("defuse_split_frames_total").increment(1);
                let (first, second) =
                    splitter::split(&frame, offset, self.config.timestamp_policy);
                out.push(first);
                if state.pending.store(second).is_some() {
                    // unreachable while every step drains the slot first;
                    // dropping the old occupant beats corrupting frame order
                    tracing::error!("pending slot already occupied, dropped previous frame");
                    metrics::counter!("defuse_pending_overwrites_total").increment(1);
                }
            }
            None => {
                // oversized but not detectably fused, forward as-is
                out.push(frame);
            }
        }

        Ok(out)
    }

    /// Drains a pending split-off frame. The element this crate derives from
    /// silently dropped it at stream end; hosts that need lossless draining
    /// call this from their teardown path.
    pub fn flush(&self) -> Option<F> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pending.take()
    }
}
