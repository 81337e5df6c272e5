use num_traits::Float;
use rand::Rng;
use std::collections::VecDeque;
use std::ops::{Add, Mul, Neg, Sub};

use crate::distributions::TargetDistribution;

/// A position in the plane, used both for chain states and for gradients
/// and momenta, which live in the same space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T: Float> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Dot product with another point.
    pub fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// Squared Euclidean norm.
    pub fn norm_sq(&self) -> T {
        self.x * self.x + self.y * self.y
    }
}

impl<T: Float> Add for Point<T> {
    type Output = Point<T>;

    fn add(self, rhs: Point<T>) -> Point<T> {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Float> Sub for Point<T> {
    type Output = Point<T>;

    fn sub(self, rhs: Point<T>) -> Point<T> {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: Float> Mul<T> for Point<T> {
    type Output = Point<T>;

    fn mul(self, rhs: T) -> Point<T> {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl<T: Float> Neg for Point<T> {
    type Output = Point<T>;

    fn neg(self) -> Point<T> {
        Point::new(-self.x, -self.y)
    }
}

/// One emitted chain position, tagged with whether the proposal that
/// produced it was accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    pub point: Point<T>,
    pub accepted: bool,
}

/// The outcome of a single kernel step: the next chain position, the
/// accept flag, and for path-traversing kernels the intermediate points
/// (slice bracket endpoints, leapfrog trajectory).
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal<T> {
    pub point: Point<T>,
    pub accepted: bool,
    pub path: Option<Vec<Point<T>>>,
}

/// Tunable knobs shared by all kernels. Each kernel reads only the subset
/// it cares about: `step_size` scales random-walk proposals and slice
/// brackets, the `leapfrog_*` pair configures the Hamiltonian integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams<T> {
    pub step_size: T,
    pub leapfrog_steps: usize,
    pub leapfrog_epsilon: T,
}

impl<T: Float> Default for KernelParams<T> {
    fn default() -> Self {
        Self {
            step_size: T::one(),
            leapfrog_steps: 20,
            leapfrog_epsilon: T::from(0.1).unwrap(),
        }
    }
}

/**
The mutable record of a single chain: its current position, a bounded
FIFO history of emitted samples, and the trajectory of the most recent
step for kernels that traverse a path.

The history evicts its oldest sample once `capacity` is reached, and the
current position always equals the most recently recorded sample (or the
seed position before any step). Exactly one live component owns a
`ChainState`; concurrent chains each get their own.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState<T> {
    position: Point<T>,
    history: VecDeque<Sample<T>>,
    capacity: usize,
    last_trajectory: Option<Vec<Point<T>>>,
}

impl<T: Float> ChainState<T> {
    /// Creates a chain seeded at `origin` with an empty history.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(origin: Point<T>, capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");
        Self {
            position: origin,
            history: VecDeque::with_capacity(capacity),
            capacity,
            last_trajectory: None,
        }
    }

    /// The current chain position.
    pub fn position(&self) -> Point<T> {
        self.position
    }

    /// The bounded sample history, oldest first.
    pub fn history(&self) -> &VecDeque<Sample<T>> {
        &self.history
    }

    /// Maximum number of samples retained in the history.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Intermediate points of the most recent step, if the kernel produced any.
    pub fn last_trajectory(&self) -> Option<&[Point<T>]> {
        self.last_trajectory.as_deref()
    }

    /// Folds one kernel outcome into the chain: appends the sample
    /// (evicting the oldest beyond capacity), moves the position, and
    /// replaces the stored trajectory.
    pub(crate) fn record(&mut self, proposal: Proposal<T>) {
        let Proposal {
            point,
            accepted,
            path,
        } = proposal;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(Sample { point, accepted });
        self.position = point;
        self.last_trajectory = path;
    }

    /// Re-seeds the chain at `origin`, clearing history and trajectory.
    pub(crate) fn reset(&mut self, origin: Point<T>) {
        self.position = origin;
        self.history.clear();
        self.last_trajectory = None;
    }
}

/// The shared interface implemented by every sampling algorithm: one
/// update from `current`, drawing randomness from `rng` only.
///
/// Kernels carry no chain state of their own; everything they need comes
/// in through the arguments, so a kernel value can be reused across
/// chains and steps.
pub trait TransitionKernel<T, D>
where
    T: Float,
    D: TargetDistribution<T>,
{
    fn step<R: Rng>(
        &self,
        current: &Point<T>,
        target: &D,
        params: &KernelParams<T>,
        rng: &mut R,
    ) -> Proposal<T>;
}

/// The Metropolis accept test in log space: draws `u ~ Uniform(0,1)` and
/// accepts when `log_ratio > ln u`, i.e. with probability
/// `min(1, exp(log_ratio))`.
pub fn metropolis_accept<T, R>(log_ratio: T, rng: &mut R) -> bool
where
    T: Float,
    R: Rng,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    let u: T = rng.gen();
    log_ratio > u.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_at(x: f64, y: f64) -> Proposal<f64> {
        Proposal {
            point: Point::new(x, y),
            accepted: true,
            path: None,
        }
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(-0.5, 4.0);
        assert_eq!(a + b, Point::new(0.5, 6.0));
        assert_eq!(a - b, Point::new(1.5, -2.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert_eq!(-a, Point::new(-1.0, -2.0));
        assert_eq!(a.dot(&b), 7.5);
        assert_eq!(a.norm_sq(), 5.0);
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut chain = ChainState::new(Point::new(0.0, 0.0), 3);
        for i in 0..5 {
            chain.record(sample_at(i as f64, 0.0));
        }
        assert_eq!(chain.history().len(), 3);
        let xs: Vec<f64> = chain.history().iter().map(|s| s.point.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn position_tracks_last_sample() {
        let mut chain = ChainState::new(Point::new(0.1, 0.1), 8);
        assert_eq!(chain.position(), Point::new(0.1, 0.1));
        chain.record(sample_at(2.0, -1.0));
        assert_eq!(chain.position(), chain.history().back().unwrap().point);
    }

    #[test]
    fn record_replaces_trajectory() {
        let mut chain = ChainState::new(Point::new(0.0, 0.0), 4);
        chain.record(Proposal {
            point: Point::new(1.0, 1.0),
            accepted: true,
            path: Some(vec![Point::new(0.5, 0.5)]),
        });
        assert_eq!(chain.last_trajectory(), Some(&[Point::new(0.5, 0.5)][..]));
        chain.record(sample_at(2.0, 2.0));
        assert!(chain.last_trajectory().is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut chain = ChainState::new(Point::new(0.1, 0.1), 4);
        chain.record(sample_at(3.0, 3.0));
        chain.reset(Point::new(0.1, 0.1));
        assert_eq!(chain.position(), Point::new(0.1, 0.1));
        assert!(chain.history().is_empty());
        assert!(chain.last_trajectory().is_none());
    }

    #[test]
    fn positive_log_ratio_always_accepts() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(metropolis_accept(0.1, &mut rng));
        }
    }

    #[test]
    fn neg_infinite_log_ratio_never_accepts() {
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..1000 {
            assert!(!metropolis_accept(f64::NEG_INFINITY, &mut rng));
        }
    }

    #[test]
    fn acceptance_frequency_matches_ratio() {
        // log_ratio = ln(0.5) should accept about half the time.
        let mut rng = SmallRng::seed_from_u64(3);
        let trials = 20_000;
        let accepted = (0..trials)
            .filter(|_| metropolis_accept(0.5f64.ln(), &mut rng))
            .count();
        let rate = accepted as f64 / trials as f64;
        assert!(
            (rate - 0.5).abs() < 0.02,
            "Expected acceptance rate near 0.5, got {rate}"
        );
    }
}
