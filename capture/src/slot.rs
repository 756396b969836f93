//! Latest-frame slot.
//!
//! One slot per device. The device's capture thread is the only writer;
//! display and recorder read from the control thread. Replacement happens
//! under the slot's mutex, so a reader sees either the previous frame or the
//! new one, never a partially written buffer.

use crate::frame::VideoFrame;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct SlotState {
    frame: Option<VideoFrame>,
    generation: u64,
}

/// Shared handle to a device's most recent frame.
#[derive(Clone, Default)]
pub struct FrameSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot already holding `frame`.
    pub fn seeded(frame: VideoFrame) -> Self {
        let slot = Self::new();
        slot.store(frame);
        slot
    }

    /// Replaces the held frame. The old buffer is dropped outside the lock.
    pub fn store(&self, frame: VideoFrame) {
        let previous = {
            let mut state = self.lock();
            state.generation += 1;
            state.frame.replace(frame)
        };
        drop(previous);
    }

    /// Returns a copy of the held frame, if any.
    pub fn latest(&self) -> Option<VideoFrame> {
        self.lock().frame.clone()
    }

    /// Number of frames stored since creation. Lets readers detect staleness.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_empty(&self) -> bool {
        self.lock().frame.is_none()
    }

    pub fn clear(&self) {
        let previous = self.lock().frame.take();
        drop(previous);
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // A panicking writer cannot leave a half-replaced Option behind.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn frame(width: i32) -> VideoFrame {
        VideoFrame::filled(width, 2, (0, 0, 0)).unwrap()
    }

    #[test]
    fn test_new_slot_is_empty() {
        let slot = FrameSlot::new();
        assert!(slot.is_empty());
        assert!(slot.latest().is_none());
        assert_eq!(slot.generation(), 0);
    }

    #[test]
    fn test_store_replaces_frame() {
        let slot = FrameSlot::seeded(frame(4));
        slot.store(frame(8));

        assert_eq!(slot.latest().unwrap().width(), 8);
        assert_eq!(slot.generation(), 2);
    }

    #[test]
    fn test_clear_keeps_generation() {
        let slot = FrameSlot::seeded(frame(4));
        slot.clear();
        assert!(slot.is_empty());
        assert_eq!(slot.generation(), 1);
    }

    #[test]
    fn test_reader_sees_whole_frames_from_writer_thread() {
        let slot = FrameSlot::new();
        let writer_slot = slot.clone();

        let writer = thread::spawn(move || {
            for width in 1..=50 {
                writer_slot.store(frame(width));
            }
        });

        for _ in 0..50 {
            if let Some(seen) = slot.latest() {
                assert_eq!(seen.data().cols(), seen.width());
            }
        }
        writer.join().unwrap();

        assert_eq!(slot.latest().unwrap().width(), 50);
        assert_eq!(slot.generation(), 50);
    }
}
