/*!
# Metropolis-family kernels

Two rejection-based kernels sharing the Metropolis accept test:

- [`RandomWalkMetropolis`] perturbs the current state with isotropic
  Gaussian noise of standard deviation `step_size`. The proposal is
  symmetric, so no proposal-density correction enters the ratio.
- [`IndependentMetropolisHastings`] draws the candidate from a fixed
  origin-centered Gaussian regardless of the current state, and corrects
  the acceptance ratio for the proposal density in both directions.

## Example

```rust
use mcmc_gallery::core::{KernelParams, Point, TransitionKernel};
use mcmc_gallery::distributions::IsotropicGaussian;
use mcmc_gallery::metropolis::RandomWalkMetropolis;
use rand::{rngs::SmallRng, SeedableRng};

let mut rng = SmallRng::seed_from_u64(42);
let proposal = RandomWalkMetropolis.step(
    &Point::new(0.1, 0.1),
    &IsotropicGaussian::default(),
    &KernelParams::default(),
    &mut rng,
);
assert!(proposal.path.is_none());
```
*/

use num_traits::Float;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::core::{metropolis_accept, KernelParams, Point, Proposal, TransitionKernel};
use crate::distributions::TargetDistribution;

/// Random Walk Metropolis: symmetric Gaussian perturbations of the
/// current state, scaled by `step_size`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomWalkMetropolis;

impl<T, D> TransitionKernel<T, D> for RandomWalkMetropolis
where
    T: Float,
    D: TargetDistribution<T>,
    StandardNormal: rand_distr::Distribution<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    fn step<R: Rng>(
        &self,
        current: &Point<T>,
        target: &D,
        params: &KernelParams<T>,
        rng: &mut R,
    ) -> Proposal<T> {
        let sigma = params.step_size;
        let proposed = Point::new(
            current.x + sigma * rng.sample(StandardNormal),
            current.y + sigma * rng.sample(StandardNormal),
        );
        let log_ratio = target.unnorm_log_prob(&proposed) - target.unnorm_log_prob(current);
        if metropolis_accept(log_ratio, rng) {
            Proposal {
                point: proposed,
                accepted: true,
                path: None,
            }
        } else {
            Proposal {
                point: *current,
                accepted: false,
                path: None,
            }
        }
    }
}

/**
Independent Metropolis–Hastings: candidates are drawn from a fixed
isotropic Gaussian centered at the origin, independent of the current
state.

Because the proposal ignores where the chain is, the acceptance ratio
carries the proposal-density correction:

`log α = [logp(x') + logq(x)] − [logp(x) + logq(x')]`

The proposal width is a property of the kernel, not a tunable parameter;
the default matches the fixed `σ = 1.5` of the reference sampler.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndependentMetropolisHastings<T> {
    pub proposal_std: T,
}

impl<T: Float> Default for IndependentMetropolisHastings<T> {
    fn default() -> Self {
        Self {
            proposal_std: T::from(1.5).unwrap(),
        }
    }
}

impl<T: Float> IndependentMetropolisHastings<T> {
    /// Log-density of the proposal at `point`, up to the normalizer,
    /// which cancels between the forward and backward terms.
    fn log_q(&self, point: &Point<T>) -> T {
        let var = self.proposal_std * self.proposal_std;
        -point.norm_sq() / (T::from(2.0).unwrap() * var)
    }
}

impl<T, D> TransitionKernel<T, D> for IndependentMetropolisHastings<T>
where
    T: Float,
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
        let sigma = self.proposal_std;
        let proposed = Point::new(
            sigma * rng.sample(StandardNormal),
            sigma * rng.sample(StandardNormal),
        );
        let log_ratio = (target.unnorm_log_prob(&proposed) + self.log_q(current))
            - (target.unnorm_log_prob(current) + self.log_q(&proposed));
        if metropolis_accept(log_ratio, rng) {
            Proposal {
                point: proposed,
                accepted: true,
                path: None,
            }
        } else {
            Proposal {
                point: *current,
                accepted: false,
                path: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::IsotropicGaussian;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn rwm_rejection_keeps_current_state() {
        let target = IsotropicGaussian::default();
        let params = KernelParams {
            step_size: 5.0,
            ..KernelParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let start = Point::new(0.0, 0.0);
        let mut saw_rejection = false;
        for _ in 0..200 {
            let proposal = RandomWalkMetropolis.step(&start, &target, &params, &mut rng);
            if !proposal.accepted {
                saw_rejection = true;
                assert_eq!(proposal.point, start);
            }
        }
        assert!(saw_rejection, "Expected a large step size to reject often.");
    }

    #[test]
    fn rwm_small_steps_mostly_accept() {
        let target = IsotropicGaussian::default();
        let params = KernelParams {
            step_size: 0.05,
            ..KernelParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(12);
        let mut position = Point::new(0.1, 0.1);
        let mut accepted = 0;
        for _ in 0..1000 {
            let proposal = RandomWalkMetropolis.step(&position, &target, &params, &mut rng);
            if proposal.accepted {
                accepted += 1;
            }
            position = proposal.point;
        }
        assert!(
            accepted > 900,
            "Expected tiny steps to accept nearly always, got {accepted}/1000"
        );
    }

    #[test]
    fn independent_mh_matching_proposal_accepts_everything() {
        // When the proposal equals the target, the corrected ratio is
        // exactly zero and every candidate is accepted.
        let target = IsotropicGaussian { std: 1.0 };
        let kernel = IndependentMetropolisHastings { proposal_std: 1.0 };
        let params = KernelParams::default();
        let mut rng = SmallRng::seed_from_u64(13);
        let mut position = Point::new(0.1, 0.1);
        for _ in 0..1000 {
            let proposal = kernel.step(&position, &target, &params, &mut rng);
            assert!(proposal.accepted);
            position = proposal.point;
        }
    }

    #[test]
    fn independent_mh_proposals_ignore_current_state() {
        // From a far-away state, accepted candidates should land near the
        // proposal's origin, not near the current state.
        let target = IsotropicGaussian::default();
        let kernel = IndependentMetropolisHastings::<f64>::default();
        let params = KernelParams::default();
        let mut rng = SmallRng::seed_from_u64(14);
        let far = Point::new(100.0, 100.0);
        let mut moved = 0;
        for _ in 0..100 {
            let proposal = kernel.step(&far, &target, &params, &mut rng);
            if proposal.accepted {
                moved += 1;
                assert!(proposal.point.norm_sq() < 100.0);
            }
        }
        assert!(moved > 90, "Expected to escape the far tail, got {moved}");
    }
}
