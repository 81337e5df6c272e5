//! Running summary statistics for a single chain.

use num_traits::Float;
use std::collections::VecDeque;

use crate::core::{Point, Sample};

/// Sliding window length for the acceptance-rate estimate.
const ACCEPT_WINDOW: usize = 100;

/// Accumulates per-chain statistics sample by sample: a windowed
/// acceptance rate plus running mean and variance of the position,
/// without retaining the samples themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTracker<T> {
    n: u64,
    accept_queue: VecDeque<bool>,
    accepted_in_window: usize,
    mean: Point<T>,
    mean_sq: Point<T>,
}

/// A point-in-time snapshot of a [`ChainTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainStats<T> {
    pub n: u64,
    pub p_accept: T,
    pub mean: Point<T>,
    pub var: Point<T>,
}

impl<T: Float> ChainTracker<T> {
    pub fn new() -> Self {
        Self {
            n: 0,
            accept_queue: VecDeque::with_capacity(ACCEPT_WINDOW + 1),
            accepted_in_window: 0,
            mean: Point::new(T::zero(), T::zero()),
            mean_sq: Point::new(T::zero(), T::zero()),
        }
    }

    /// Folds one emitted sample into the running totals.
    pub fn update(&mut self, sample: &Sample<T>) {
        self.n += 1;

        self.accept_queue.push_back(sample.accepted);
        if sample.accepted {
            self.accepted_in_window += 1;
        }
        if self.accept_queue.len() > ACCEPT_WINDOW && self.accept_queue.pop_front() == Some(true) {
            self.accepted_in_window -= 1;
        }

        let n = T::from(self.n).unwrap();
        let p = sample.point;
        let sq = Point::new(p.x * p.x, p.y * p.y);
        self.mean = (self.mean * (n - T::one()) + p) * n.recip();
        self.mean_sq = (self.mean_sq * (n - T::one()) + sq) * n.recip();
    }

    /// Acceptance rate over the most recent window of samples.
    pub fn acceptance_rate(&self) -> T {
        if self.accept_queue.is_empty() {
            return T::zero();
        }
        T::from(self.accepted_in_window).unwrap() / T::from(self.accept_queue.len()).unwrap()
    }

    /// Sample variance of each coordinate, zero until two samples exist.
    pub fn var(&self) -> Point<T> {
        if self.n < 2 {
            return Point::new(T::zero(), T::zero());
        }
        let n = T::from(self.n).unwrap();
        let correction = n / (n - T::one());
        let centered = self.mean_sq - Point::new(self.mean.x * self.mean.x, self.mean.y * self.mean.y);
        centered * correction
    }

    pub fn stats(&self) -> ChainStats<T> {
        ChainStats {
            n: self.n,
            p_accept: self.acceptance_rate(),
            mean: self.mean,
            var: self.var(),
        }
    }
}

impl<T: Float> Default for ChainTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}
