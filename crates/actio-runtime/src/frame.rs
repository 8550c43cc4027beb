//! Frame loop
//!
//! Drives per-frame actions off host ticks. The document counter runs
//! for the life of the document; the scene counter restarts at zero on
//! every scene load.

/// Frame loop state
#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    scene_frames: u64,
    document_frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the loop. Starting an already-running loop is a no-op.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop the loop and reset the scene counter. The document counter
    /// keeps its value across scene changes.
    pub fn stop(&mut self) {
        self.running = false;
        self.scene_frames = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance one frame. Returns the counters for the fired frame,
    /// or None when the loop is not running.
    pub fn tick(&mut self) -> Option<(u64, u64)> {
        if !self.running {
            return None;
        }
        self.scene_frames += 1;
        self.document_frames += 1;
        Some((self.scene_frames, self.document_frames))
    }

    pub fn scene_frames(&self) -> u64 {
        self.scene_frames
    }

    pub fn document_frames(&self) -> u64 {
        self.document_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_only_while_running() {
        let mut frames = FrameLoop::new();
        assert_eq!(frames.tick(), None);

        frames.start();
        assert_eq!(frames.tick(), Some((1, 1)));
        assert_eq!(frames.tick(), Some((2, 2)));
    }

    #[test]
    fn test_stop_resets_scene_counter_only() {
        let mut frames = FrameLoop::new();
        frames.start();
        frames.tick();
        frames.tick();

        frames.stop();
        assert_eq!(frames.tick(), None);

        frames.start();
        assert_eq!(frames.tick(), Some((1, 3)));
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut frames = FrameLoop::new();
        frames.start();
        frames.tick();
        frames.start();
        assert_eq!(frames.scene_frames(), 1);
    }
}
