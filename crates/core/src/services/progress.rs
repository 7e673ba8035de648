use crate::errors::CoreError;

/// Receives feedback from long-running passes (aggregation, archive loading).
///
/// Purely informational: nothing in the engine depends on what a sink does.
/// Any `FnMut(usize, usize)` closure is a sink.
pub trait ProgressSink {
    /// `done` out of `total` units finished. `done` never decreases within a pass.
    fn on_progress(&mut self, done: usize, total: usize);

    /// A non-fatal failure for one ticker; the pass continues.
    fn on_ticker_error(&mut self, _symbol: &str, _error: &CoreError) {}
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, done: usize, total: usize) {
        self(done, total)
    }
}
