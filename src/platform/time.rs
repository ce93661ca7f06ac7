//! Frame gate for the external animation callback

use crate::consts::{FRAME_INTERVAL_MS, MAX_FRAME_DT};

/// Accepts at most one frame per interval and measures the delta between
/// accepted frames
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval_ms: f64,
    /// Phase-aligned time of the last accepted frame
    last_frame_ms: f64,
    /// Raw timestamp of the last accepted frame
    last_accepted_ms: Option<f64>,
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL_MS)
    }
}

impl FramePacer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_frame_ms: 0.0,
            last_accepted_ms: None,
        }
    }

    /// Offer a frame at `now_ms`. Returns the delta in seconds to simulate,
    /// or None if the frame is skipped.
    pub fn accept(&mut self, now_ms: f64) -> Option<f32> {
        let elapsed = now_ms - self.last_frame_ms;
        if elapsed < self.interval_ms {
            return None;
        }
        // Carry the remainder so the cadence doesn't drift
        self.last_frame_ms = now_ms - (elapsed % self.interval_ms);

        let dt = match self.last_accepted_ms {
            Some(prev) => ((now_ms - prev) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_accepted_ms = Some(now_ms);
        Some(dt.clamp(0.0, MAX_FRAME_DT))
    }

    /// Forget the previous frame (tab regained focus, game restarted)
    pub fn reset(&mut self) {
        self.last_frame_ms = 0.0;
        self.last_accepted_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_thin_frames() {
        let mut pacer = FramePacer::new(16.0);
        assert_eq!(pacer.accept(100.0), Some(0.0));
        assert_eq!(pacer.accept(108.0), None);
        let dt = pacer.accept(117.0).unwrap();
        assert!((dt - 0.017).abs() < 1e-6);
    }

    #[test]
    fn test_remainder_carried() {
        let mut pacer = FramePacer::new(16.0);
        pacer.accept(160.0);
        // 20ms elapsed: next gate aligns to 176, not 180
        assert!(pacer.accept(180.0).is_some());
        assert!(pacer.accept(190.0).is_none());
        assert!(pacer.accept(196.0).is_some());
    }

    #[test]
    fn test_long_stall_clamped() {
        let mut pacer = FramePacer::default();
        pacer.accept(1000.0);
        assert_eq!(pacer.accept(6000.0), Some(MAX_FRAME_DT));
        pacer.reset();
        assert_eq!(pacer.accept(7000.0), Some(0.0));
    }
}
