use std::time::{Duration, Instant};

/// Continuous, cancellable frame scheduling for the window loop.
///
/// While active a frame is due every `1 / fps` seconds, or on every
/// iteration when uncapped. Cancelling stops further frames for good until
/// [`FrameLoop::request`] is called again.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    active: bool,
    frame_interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FrameLoop {
    pub fn new(target_fps: Option<f32>) -> Self {
        let frame_interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .and_then(|fps| Duration::try_from_secs_f32(1.0 / fps).ok());
        Self {
            active: false,
            frame_interval,
            last_frame: None,
        }
    }

    pub fn request(&mut self) {
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn frame_interval(&self) -> Option<Duration> {
        self.frame_interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        match (self.frame_interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.active {
            return None;
        }
        match (self.frame_interval, self.last_frame) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_loop_never_schedules() {
        let frames = FrameLoop::new(None);
        let now = Instant::now();
        assert!(!frames.ready_for_frame(now));
        assert_eq!(frames.next_deadline(), None);
    }

    #[test]
    fn uncapped_loop_is_always_ready() {
        let mut frames = FrameLoop::new(None);
        frames.request();
        let now = Instant::now();
        frames.mark_rendered(now);
        assert!(frames.ready_for_frame(now));
        assert_eq!(frames.next_deadline(), None);
    }

    #[test]
    fn capped_loop_waits_for_interval() {
        let mut frames = FrameLoop::new(Some(4.0));
        frames.request();
        let start = Instant::now();
        assert!(frames.ready_for_frame(start));
        frames.mark_rendered(start);
        assert!(!frames.ready_for_frame(start + Duration::from_millis(100)));
        assert!(frames.ready_for_frame(start + Duration::from_millis(250)));
        assert_eq!(frames.next_deadline(), Some(start + Duration::from_millis(250)));
    }

    #[test]
    fn cancel_stops_scheduling() {
        let mut frames = FrameLoop::new(Some(60.0));
        frames.request();
        frames.cancel();
        assert!(!frames.is_active());
        assert!(!frames.ready_for_frame(Instant::now()));
    }

    #[test]
    fn zero_fps_is_uncapped() {
        assert_eq!(FrameLoop::new(Some(0.0)).frame_interval(), None);
    }

    #[test]
    fn unrepresentable_interval_is_uncapped() {
        assert_eq!(FrameLoop::new(Some(1e-30)).frame_interval(), None);
        assert_eq!(FrameLoop::new(Some(f32::INFINITY)).frame_interval(), None);
    }
}
