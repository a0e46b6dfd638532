/// Sink for byte-level progress reports from the conversion passes.
///
/// Each pass calls [`update`](Progress::update) after every input line with
/// the cumulative raw byte count and the file's total size, then once more
/// with `(total, total)` before [`finish`](Progress::finish). Implementors
/// decide how (and how often) to render; the passes themselves never touch
/// the terminal.
pub trait Progress {
    fn update(&mut self, bytes_read: u64, total_bytes: u64);

    /// Called once when a pass completes, after the final update.
    fn finish(&mut self) {}
}

/// Discards all progress reports.
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&mut self, _bytes_read: u64, _total_bytes: u64) {}
}
