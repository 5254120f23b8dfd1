use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::prelude::*;
use slideconfig::{CycleOrder, SlideshowConfig};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CadenceError {
    #[error("cadence needs at least one image")]
    Empty,
    #[error("cadence interval must be greater than zero")]
    ZeroInterval,
}

/// Decides which image the slideshow should switch to next and when.
///
/// Index 0 is assumed to be on screen when the cadence starts, matching what
/// the slider shows right after initialization.
pub struct Cadence {
    len: usize,
    interval: Duration,
    order: CycleOrder,
    upcoming: VecDeque<usize>,
    current: usize,
    last_switch: Instant,
    rng: StdRng,
}

impl Cadence {
    pub fn new(
        len: usize,
        interval: Duration,
        order: CycleOrder,
        now: Instant,
    ) -> Result<Self, CadenceError> {
        Self::with_seed(len, interval, order, now, rand::random())
    }

    pub fn with_seed(
        len: usize,
        interval: Duration,
        order: CycleOrder,
        now: Instant,
        seed: u64,
    ) -> Result<Self, CadenceError> {
        if len == 0 {
            return Err(CadenceError::Empty);
        }
        if interval.is_zero() {
            return Err(CadenceError::ZeroInterval);
        }
        Ok(Self {
            len,
            interval,
            order,
            upcoming: VecDeque::new(),
            current: 0,
            last_switch: now,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn from_config(config: &SlideshowConfig, now: Instant) -> Result<Self, CadenceError> {
        Self::new(
            config.images.len(),
            config.cadence.interval,
            config.cadence.order,
            now,
        )
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_deadline(&self) -> Instant {
        self.last_switch + self.interval
    }

    /// Returns the next index once the interval has elapsed since the last switch.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        if self.len <= 1 {
            return None;
        }
        if now.saturating_duration_since(self.last_switch) < self.interval {
            return None;
        }
        self.last_switch = now;
        Some(self.advance())
    }

    /// Advances immediately and restarts the interval.
    pub fn skip(&mut self, now: Instant) -> Option<usize> {
        if self.len <= 1 {
            self.last_switch = now;
            return None;
        }
        self.last_switch = now;
        Some(self.advance())
    }

    fn advance(&mut self) -> usize {
        if self.upcoming.is_empty() {
            self.refill();
        }
        // refill always yields `len` entries, so the queue is non-empty here
        let index = self.upcoming.pop_front().unwrap_or(self.current);
        self.current = index;
        index
    }

    fn refill(&mut self) {
        let len = self.len;
        match self.order {
            CycleOrder::Sequential => {
                let current = self.current;
                self.upcoming
                    .extend((1..=len).map(|offset| (current + offset) % len));
            }
            CycleOrder::Shuffle => {
                let mut order: Vec<usize> = (0..len).collect();
                order.shuffle(&mut self.rng);
                if len > 1 && order[0] == self.current {
                    let swap_with = self.rng.gen_range(1..len);
                    order.swap(0, swap_with);
                }
                self.upcoming.extend(order);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(cadence: &mut Cadence, start: Instant, count: usize) -> Vec<usize> {
        let mut now = start;
        (0..count)
            .map(|_| {
                now += cadence.interval();
                cadence.tick(now).expect("switch due")
            })
            .collect()
    }

    #[test]
    fn sequential_starts_at_one_and_wraps() {
        let start = Instant::now();
        let mut cadence =
            Cadence::with_seed(3, Duration::from_secs(5), CycleOrder::Sequential, start, 1)
                .unwrap();
        assert_eq!(collect(&mut cadence, start, 7), vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn waits_for_interval() {
        let start = Instant::now();
        let mut cadence =
            Cadence::with_seed(2, Duration::from_secs(5), CycleOrder::Sequential, start, 1)
                .unwrap();
        assert_eq!(cadence.tick(start + Duration::from_secs(4)), None);
        assert_eq!(cadence.tick(start + Duration::from_secs(5)), Some(1));
        assert_eq!(cadence.tick(start + Duration::from_secs(6)), None);
        assert_eq!(
            cadence.next_deadline(),
            start + Duration::from_secs(10)
        );
    }

    #[test]
    fn single_image_never_switches() {
        let start = Instant::now();
        let mut cadence =
            Cadence::with_seed(1, Duration::from_secs(1), CycleOrder::Shuffle, start, 9).unwrap();
        assert_eq!(cadence.tick(start + Duration::from_secs(10)), None);
        assert_eq!(cadence.skip(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn shuffle_visits_every_image_per_cycle() {
        let start = Instant::now();
        let mut cadence =
            Cadence::with_seed(5, Duration::from_secs(1), CycleOrder::Shuffle, start, 42).unwrap();
        let seen = collect(&mut cadence, start, 15);
        for cycle in seen.chunks(5) {
            let mut sorted = cycle.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn shuffle_never_repeats_on_screen_image() {
        let start = Instant::now();
        for seed in 0..32 {
            let mut cadence =
                Cadence::with_seed(3, Duration::from_secs(1), CycleOrder::Shuffle, start, seed)
                    .unwrap();
            let mut previous = cadence.current();
            for index in collect(&mut cadence, start, 30) {
                assert_ne!(index, previous, "seed {seed} repeated {index}");
                previous = index;
            }
        }
    }

    #[test]
    fn skip_advances_immediately() {
        let start = Instant::now();
        let mut cadence =
            Cadence::with_seed(3, Duration::from_secs(5), CycleOrder::Sequential, start, 1)
                .unwrap();
        assert_eq!(cadence.skip(start), Some(1));
        assert_eq!(cadence.current(), 1);
        assert_eq!(cadence.tick(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn rejects_empty_and_zero_interval() {
        let now = Instant::now();
        assert_eq!(
            Cadence::new(0, Duration::from_secs(1), CycleOrder::Sequential, now).err(),
            Some(CadenceError::Empty)
        );
        assert_eq!(
            Cadence::new(2, Duration::ZERO, CycleOrder::Sequential, now).err(),
            Some(CadenceError::ZeroInterval)
        );
    }

    #[test]
    fn builds_from_config() {
        let config = SlideshowConfig::from_toml_str(
            r#"
version = 1
images = ["a.png", "b.png"]

[cadence]
interval = "2s"
"#,
        )
        .unwrap();
        let now = Instant::now();
        let mut cadence = Cadence::from_config(&config, now).unwrap();
        assert_eq!(cadence.interval(), Duration::from_secs(2));
        assert_eq!(cadence.tick(now + Duration::from_secs(2)), Some(1));
    }
}
