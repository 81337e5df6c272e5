//! Elliptical slice sampling.
//!
//! Treats the target as a likelihood against an implicit standard-normal
//! prior: an auxiliary normal draw defines an ellipse through the current
//! state, and a shrinking angle bracket searches the ellipse for a point
//! whose log-density clears a threshold drawn under the current one.

use num_traits::Float;
use rand::Rng;
use rand_distr::uniform::SampleUniform;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

use crate::core::{KernelParams, Point, Proposal, TransitionKernel};
use crate::distributions::TargetDistribution;

/// Cap on angle-bracket shrink iterations before giving up on the step.
const BRACKET_CAP: usize = 50;

/// Elliptical slice sampling over the ellipse spanned by the current
/// state and an auxiliary `N(0, I)` vector. Every accepted point clears
/// the step's log-density threshold; exhausting the bracket rejects the
/// step and keeps the chain in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EllipticalSlice;

impl<T, D> TransitionKernel<T, D> for EllipticalSlice
where
    T: Float + SampleUniform,
    D: TargetDistribution<T>,
    StandardNormal: rand_distr::Distribution<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    fn step<R: Rng>(
        &self,
        current: &Point<T>,
        target: &D,
        _params: &KernelParams<T>,
        rng: &mut R,
    ) -> Proposal<T> {
        let nu = Point::new(rng.sample(StandardNormal), rng.sample(StandardNormal));
        let u: T = rng.gen();
        let threshold = target.unnorm_log_prob(current) + u.ln();

        let two_pi = T::from(2.0 * PI).unwrap();
        let mut theta = rng.gen_range(T::zero()..two_pi);
        let mut theta_min = theta - two_pi;
        let mut theta_max = theta;

        for _ in 0..BRACKET_CAP {
            let candidate = *current * theta.cos() + nu * theta.sin();
            if target.unnorm_log_prob(&candidate) > threshold {
                return Proposal {
                    point: candidate,
                    accepted: true,
                    path: None,
                };
            }
            if theta < T::zero() {
                theta_min = theta;
            } else {
                theta_max = theta;
            }
            theta = rng.gen_range(theta_min..theta_max);
        }
        Proposal {
            point: *current,
            accepted: false,
            path: None,
        }
    }
}
