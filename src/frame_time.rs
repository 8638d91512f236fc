use bevy_ecs::prelude::*;
use std::time::Duration;
use web_time::Instant;

/// Time step of the current frame, clamped so a hitch (tab switch, headset
/// taken off) can't launch the rig through the ground.
#[derive(Resource, Debug)]
pub struct FrameTime {
    last: Instant,
    max_delta: f32,
    /// Seconds since the previous frame, at most `max_delta`.
    pub delta: f32,
    /// Frames since start.
    pub frame: u64,
}

impl FrameTime {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: Instant::now(),
            max_delta,
            delta: 0.0,
            frame: 0,
        }
    }

    /// Measures the wall-clock time since the last frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        self.advance(elapsed);
    }

    /// Uses a duration measured by the caller, e.g. from XR frame timestamps.
    pub fn advance(&mut self, elapsed: Duration) {
        self.delta = elapsed.as_secs_f32().min(self.max_delta);
        self.frame += 1;
    }

    pub fn every(&self, frames: u64) -> bool {
        frames > 0 && self.frame % frames == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_frames_are_clamped() {
        let mut frame_time = FrameTime::new(0.1);
        frame_time.advance(Duration::from_millis(16));
        assert!((frame_time.delta - 0.016).abs() < 1e-6);
        frame_time.advance(Duration::from_secs(3));
        assert_eq!(frame_time.delta, 0.1);
        assert_eq!(frame_time.frame, 2);
    }

    #[test]
    fn every_counts_frames() {
        let mut frame_time = FrameTime::new(0.1);
        let hits = (0..360)
            .filter(|_| {
                frame_time.advance(Duration::from_millis(11));
                frame_time.every(180)
            })
            .count();
        assert_eq!(hits, 2);
        assert!(!frame_time.every(0));
    }
}
