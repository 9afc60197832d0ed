/// Holds the second half of a just-split fused frame until the next
/// processing step, so it can be emitted ahead of the next incoming frame.
#[derive(Debug)]
pub struct PendingSlot<F> {
    inner: Option<F>,
}

impl<F> PendingSlot<F> {
    pub fn new() -> Self {
        Self { inner: None }
    }

    /// Empties the slot and returns the occupant, if any.
    pub fn take(&mut self) -> Option<F> {
        self.inner.take()
    }

    /// Stores a frame, returning any displaced occupant. A `Some` return is
    /// a contract violation: the caller must have drained the slot earlier
    /// in the same step.
    #[must_use]
    pub fn store(&mut self, frame: F) -> Option<F> {
        self.inner.replace(frame)
    }
}

impl<F> Default for PendingSlot<F> {
    fn default() -> Self {
        Self::new()
    }
}
