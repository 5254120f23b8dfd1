use std::time::{Duration, Instant};

/// Easing curves for the displacement tween.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Quadratic ease-out, `1 - (1 - t)^2`.
    #[default]
    EaseOut,
    EaseInOut,
    Smoothstep,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => clamped,
            Easing::EaseOut => 1.0 - (1.0 - clamped) * (1.0 - clamped),
            Easing::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            Easing::EaseInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
        }
    }
}

/// Wall-clock driven interpolation between two values.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing, now: Instant) -> Self {
        Self {
            from,
            to,
            start: now,
            duration,
            easing,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    /// Value at `now` and whether the tween has run its full duration.
    pub fn sample(&self, now: Instant) -> (f32, bool) {
        if self.duration.is_zero() {
            return (self.to, true);
        }
        let elapsed = now.saturating_duration_since(self.start);
        let progress = elapsed.as_secs_f32() / self.duration.as_secs_f32().max(f32::EPSILON);
        let finished = progress >= 1.0;
        if finished {
            return (self.to, true);
        }
        let eased = self.easing.sample(progress);
        (self.from + (self.to - self.from) * eased, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_curve_increases_monotonically() {
        let curve = Easing::Linear;
        let mut last = 0.0;
        for step in 0..=10 {
            let sample = curve.sample(step as f32 / 10.0);
            assert!(sample >= last - f32::EPSILON);
            last = sample;
        }
    }

    #[test]
    fn ease_out_decelerates() {
        let curve = Easing::EaseOut;
        assert!((curve.sample(0.0) - 0.0).abs() < 1e-6);
        assert!((curve.sample(0.5) - 0.75).abs() < 1e-6);
        assert!((curve.sample(1.0) - 1.0).abs() < 1e-6);
        let first_half = curve.sample(0.5) - curve.sample(0.0);
        let second_half = curve.sample(1.0) - curve.sample(0.5);
        assert!(first_half > second_half);
    }

    #[test]
    fn smoothstep_matches_expected_values() {
        let curve = Easing::Smoothstep;
        assert!((curve.sample(0.0) - 0.0).abs() < 1e-6);
        assert!((curve.sample(0.5) - 0.5).abs() < 1e-6);
        assert!((curve.sample(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ease_in_out_accelerates_then_decelerates() {
        let curve = Easing::EaseInOut;
        let first = curve.sample(0.25);
        let mid = curve.sample(0.5);
        let last = curve.sample(0.75);
        assert!(first < mid);
        assert!(last > mid);
        assert!((curve.sample(0.0) - 0.0).abs() < 1e-6);
        assert!((curve.sample(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tween_reports_progress_and_completion() {
        let start = Instant::now();
        let tween = Tween::new(0.0, 1.0, Duration::from_millis(100), Easing::Linear, start);
        let (value, finished) = tween.sample(start + Duration::from_millis(50));
        assert!((value - 0.5).abs() < 0.05);
        assert!(!finished);
        let (value, finished) = tween.sample(start + Duration::from_millis(150));
        assert_eq!(value, 1.0);
        assert!(finished);
    }

    #[test]
    fn tween_starts_from_current_value() {
        let start = Instant::now();
        let tween = Tween::new(0.4, 1.0, Duration::from_secs(1), Easing::Linear, start);
        let (value, _) = tween.sample(start);
        assert!((value - 0.4).abs() < 1e-6);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let start = Instant::now();
        let tween = Tween::new(0.0, 1.0, Duration::ZERO, Easing::EaseOut, start);
        assert_eq!(tween.sample(start), (1.0, true));
    }
}
