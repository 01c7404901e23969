//! Per-frame progress reporting.
//!
//! Fired once per frame by the driver. Implementations may forward to a
//! UI thread; nothing here feeds back into decoding.

/// Receives per-frame progress and status messages.
pub trait ProgressObserver {
    /// Called once per frame.
    ///
    /// `current` is the frame's sequence number, `last_success` the
    /// sequence of the last frame that contributed a packet, `total` the
    /// estimated symbols needed (0 until the header is known), and
    /// `processed` the running frame count.
    fn on_frame(&mut self, current: u64, last_success: u64, total: u32, processed: u64) {
        let _ = (current, last_success, total, processed);
    }

    /// Called with human-readable status messages, including the final
    /// SHA-1 digest.
    fn on_status(&mut self, message: &str) {
        let _ = message;
    }
}

/// Discards all progress events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {}

/// Forwards progress to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_frame(&mut self, current: u64, last_success: u64, total: u32, processed: u64) {
        tracing::debug!(current, last_success, total, processed, "frame");
    }

    fn on_status(&mut self, message: &str) {
        tracing::info!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(u64, u64, u32, u64)>,
        messages: Vec<String>,
    }

    impl ProgressObserver for Recorder {
        fn on_frame(&mut self, current: u64, last_success: u64, total: u32, processed: u64) {
            self.frames.push((current, last_success, total, processed));
        }

        fn on_status(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    #[test]
    fn test_observer_records_events() {
        let mut recorder = Recorder::default();
        recorder.on_frame(3, 2, 40, 5);
        recorder.on_status("sha1 abc");

        assert_eq!(recorder.frames, vec![(3, 2, 40, 5)]);
        assert_eq!(recorder.messages, vec!["sha1 abc"]);
    }

    #[test]
    fn test_null_progress_is_silent() {
        let mut progress = NullProgress;
        progress.on_frame(1, 0, 0, 1);
        progress.on_status("ignored");
    }
}
