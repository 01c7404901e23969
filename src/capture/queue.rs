//! Bounded frame queue between the demuxer and the decode pipeline.
//!
//! Producers (camera or video demuxer threads) push frames; the single
//! pipeline driver blocks on `take`. When the producer outruns the decoder
//! the oldest queued frame is discarded: frames are cheap for a camera to
//! replace, and the fountain code makes any individual frame expendable.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use super::Frame;

/// Default queue capacity when none is specified.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

struct QueueInner {
    frames: VecDeque<Frame>,
    closed: bool,
    dropped: u64,
}

/// A bounded FIFO of raw frames, the only cross-thread boundary in the core.
///
/// `take` is the driver's sole suspension point. Closing the queue wakes
/// every blocked taker with `None`, which the driver treats as the
/// interrupt signal.
#[derive(Clone)]
pub struct FrameQueue {
    inner: Arc<(Mutex<QueueInner>, Condvar)>,
    capacity: usize,
}

impl FrameQueue {
    /// Creates a queue holding at most `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new((
                Mutex::new(QueueInner {
                    frames: VecDeque::with_capacity(capacity.min(DEFAULT_QUEUE_CAPACITY)),
                    closed: false,
                    dropped: 0,
                }),
                Condvar::new(),
            )),
            capacity: capacity.max(1),
        }
    }

    /// Pushes a frame, evicting the oldest queued frame when full.
    ///
    /// Returns `false` if the queue has been closed (the frame is dropped).
    pub fn push(&self, frame: Frame) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut inner = lock.lock().expect("frame queue poisoned");
        if inner.closed {
            return false;
        }
        if inner.frames.len() >= self.capacity {
            inner.frames.pop_front();
            inner.dropped += 1;
            tracing::trace!(dropped = inner.dropped, "queue full, dropped oldest frame");
        }
        inner.frames.push_back(frame);
        cvar.notify_one();
        true
    }

    /// Blocks until a frame is available or the queue is closed.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn take(&self) -> Option<Frame> {
        let (lock, cvar) = &*self.inner;
        let mut inner = lock.lock().expect("frame queue poisoned");
        loop {
            if let Some(frame) = inner.frames.pop_front() {
                return Some(frame);
            }
            if inner.closed {
                return None;
            }
            inner = cvar.wait(inner).expect("frame queue poisoned");
        }
    }

    /// Closes the queue, waking all blocked takers.
    ///
    /// Frames already queued remain available until drained.
    pub fn close(&self) {
        let (lock, cvar) = &*self.inner;
        let mut inner = lock.lock().expect("frame queue poisoned");
        inner.closed = true;
        cvar.notify_all();
    }

    /// Number of frames currently queued.
    pub fn len(&self) -> usize {
        let (lock, _) = &*self.inner;
        lock.lock().expect("frame queue poisoned").frames.len()
    }

    /// Returns true if no frames are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total frames evicted due to backpressure.
    pub fn dropped(&self) -> u64 {
        let (lock, _) = &*self.inner;
        lock.lock().expect("frame queue poisoned").dropped
    }
}
