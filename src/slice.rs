/*!
# Slice-family kernels

Both kernels here sample along a random direction through the current
state: draw a log-density threshold under the current point, bracket the
acceptable segment of the line, then shrink the bracket around rejected
candidates until one lands above the threshold.

- [`SliceSampler`] starts from a randomly positioned bracket of width
  `step_size` and grows it outward in fixed increments (step-out).
- [`HitAndRun`] starts from a unit bracket and grows it by doubling.

Accepted points are guaranteed to lie above the threshold, so a returned
move is always a valid sample. If the shrink loop exhausts its iteration
cap the kernel returns the unmoved current state flagged as rejected;
this is a bounded-work fallback, not an error.
*/

use num_traits::Float;
use rand::Rng;
use rand_distr::uniform::SampleUniform;
use std::f64::consts::PI;

use crate::core::{KernelParams, Point, Proposal, TransitionKernel};
use crate::distributions::TargetDistribution;

/// Cap on step-out increments per bracket side.
const STEP_OUT_CAP: usize = 100;
/// Cap on shrink-sample draws for the slice sampler.
const SHRINK_CAP: usize = 100;
/// Cap on doubling rounds per bracket side for hit-and-run.
const DOUBLING_CAP: usize = 20;
/// Cap on shrink-sample draws for hit-and-run.
const HIT_AND_RUN_SHRINK_CAP: usize = 50;

/// Draws a unit direction vector at a uniform angle.
fn random_direction<T, R>(rng: &mut R) -> Point<T>
where
    T: Float + SampleUniform,
    R: Rng,
{
    let theta = rng.gen_range(T::zero()..T::from(2.0 * PI).unwrap());
    Point::new(theta.cos(), theta.sin())
}

/// Log-density threshold under the current point: `logp(current) + ln u`.
fn slice_threshold<T, D, R>(target: &D, current: &Point<T>, rng: &mut R) -> T
where
    T: Float,
    D: TargetDistribution<T>,
    R: Rng,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    let u: T = rng.gen();
    target.unnorm_log_prob(current) + u.ln()
}

fn offset<T: Float>(current: &Point<T>, dir: &Point<T>, t: T) -> Point<T> {
    *current + *dir * t
}

/// Repeatedly samples a distance inside the bracket, accepting the first
/// candidate above the threshold and shrinking the bracket side that
/// produced each rejection. Returns the accepted point (if any) together
/// with the final bracket.
fn shrink_sample<T, D, R>(
    target: &D,
    current: &Point<T>,
    dir: &Point<T>,
    threshold: T,
    bracket: (T, T),
    cap: usize,
    rng: &mut R,
) -> (Option<Point<T>>, (T, T))
where
    T: Float + SampleUniform,
    D: TargetDistribution<T>,
    R: Rng,
{
    let (mut left, mut right) = bracket;
    for _ in 0..cap {
        if left >= right {
            break;
        }
        let dist = rng.gen_range(left..right);
        let candidate = offset(current, dir, dist);
        if target.unnorm_log_prob(&candidate) > threshold {
            return (Some(candidate), (left, right));
        }
        if dist < T::zero() {
            left = dist;
        } else {
            right = dist;
        }
    }
    (None, (left, right))
}

/**
Slice sampling along a uniformly random direction, with step-out
bracketing.

The initial bracket has width `step_size` and is positioned uniformly at
random so the current point lies inside it. Each side is then extended in
`step_size` increments while the endpoint's log-density stays above the
threshold. The final bracket endpoints are reported as the step's path,
for rendering the searched segment.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceSampler;

impl<T, D> TransitionKernel<T, D> for SliceSampler
where
    T: Float + SampleUniform,
    D: TargetDistribution<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    fn step<R: Rng>(
        &self,
        current: &Point<T>,
        target: &D,
        params: &KernelParams<T>,
        rng: &mut R,
    ) -> Proposal<T> {
        let threshold = slice_threshold(target, current, rng);
        let dir = random_direction(rng);
        let width = params.step_size;

        let u: T = rng.gen();
        let mut left = -(width * u);
        let mut right = left + width;

        let mut steps = 0;
        while steps < STEP_OUT_CAP
            && target.unnorm_log_prob(&offset(current, &dir, left)) > threshold
        {
            left = left - width;
            steps += 1;
        }
        steps = 0;
        while steps < STEP_OUT_CAP
            && target.unnorm_log_prob(&offset(current, &dir, right)) > threshold
        {
            right = right + width;
            steps += 1;
        }

        let (found, (left, right)) =
            shrink_sample(target, current, &dir, threshold, (left, right), SHRINK_CAP, rng);
        let path = Some(vec![
            offset(current, &dir, left),
            offset(current, &dir, right),
        ]);
        match found {
            Some(point) => Proposal {
                point,
                accepted: true,
                path,
            },
            None => Proposal {
                point: *current,
                accepted: false,
                path,
            },
        }
    }
}

/**
Hit-and-run sampling: a random direction, a doubling bracket search, and
the same shrink loop as slice sampling.

Differs from [`SliceSampler`] in how the bracket grows (each side doubles
instead of stepping out in fixed increments) and in reporting no path.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitAndRun;

impl<T, D> TransitionKernel<T, D> for HitAndRun
where
    T: Float + SampleUniform,
    D: TargetDistribution<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    fn step<R: Rng>(
        &self,
        current: &Point<T>,
        target: &D,
        _params: &KernelParams<T>,
        rng: &mut R,
    ) -> Proposal<T> {
        let threshold = slice_threshold(target, current, rng);
        let dir = random_direction(rng);
        let two = T::from(2.0).unwrap();

        let mut left = -T::one();
        let mut right = T::one();
        let mut rounds = 0;
        while rounds < DOUBLING_CAP
            && target.unnorm_log_prob(&offset(current, &dir, left)) > threshold
        {
            left = left * two;
            rounds += 1;
        }
        rounds = 0;
        while rounds < DOUBLING_CAP
            && target.unnorm_log_prob(&offset(current, &dir, right)) > threshold
        {
            right = right * two;
            rounds += 1;
        }

        let (found, _) = shrink_sample(
            target,
            current,
            &dir,
            threshold,
            (left, right),
            HIT_AND_RUN_SHRINK_CAP,
            rng,
        );
        match found {
            Some(point) => Proposal {
                point,
                accepted: true,
                path: None,
            },
            None => Proposal {
                point: *current,
                accepted: false,
                path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Donut, IsotropicGaussian};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn directions_are_unit_length() {
        let mut rng = SmallRng::seed_from_u64(21);
        for _ in 0..100 {
            let dir: Point<f64> = random_direction(&mut rng);
            assert!((dir.norm_sq() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn threshold_sits_below_current_log_density() {
        let target = IsotropicGaussian::default();
        let mut rng = SmallRng::seed_from_u64(22);
        let current = Point::new(0.7, -0.3);
        let lp = target.unnorm_log_prob(&current);
        for _ in 0..100 {
            assert!(slice_threshold(&target, &current, &mut rng) <= lp);
        }
    }

    #[test]
    fn shrink_sample_respects_threshold() {
        let target = Donut::default();
        let mut rng = SmallRng::seed_from_u64(23);
        let current = Point::new(2.5, 0.0);
        for _ in 0..200 {
            let threshold = slice_threshold(&target, &current, &mut rng);
            let dir = random_direction(&mut rng);
            let (found, _) = shrink_sample(
                &target,
                &current,
                &dir,
                threshold,
                (-2.0, 2.0),
                SHRINK_CAP,
                &mut rng,
            );
            if let Some(point) = found {
                assert!(target.unnorm_log_prob(&point) > threshold);
            }
        }
    }

    #[test]
    fn slice_on_a_gaussian_nearly_always_moves() {
        let target = IsotropicGaussian::default();
        let params = KernelParams::default();
        let mut rng = SmallRng::seed_from_u64(24);
        let mut position = Point::new(0.1, 0.1);
        let mut accepted = 0;
        for _ in 0..500 {
            let proposal = SliceSampler.step(&position, &target, &params, &mut rng);
            if proposal.accepted {
                accepted += 1;
                assert!(target.unnorm_log_prob(&proposal.point).is_finite());
            }
            position = proposal.point;
        }
        assert!(
            accepted > 480,
            "Expected slice sampling on a Gaussian to nearly always move, got {accepted}/500"
        );
    }

    #[test]
    fn slice_reports_bracket_endpoints() {
        let target = IsotropicGaussian::default();
        let params = KernelParams::default();
        let mut rng = SmallRng::seed_from_u64(25);
        let proposal = SliceSampler.step(&Point::new(0.1, 0.1), &target, &params, &mut rng);
        let path = proposal.path.expect("slice steps always report a bracket");
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn hit_and_run_reports_no_path() {
        let target = IsotropicGaussian::default();
        let params = KernelParams::default();
        let mut rng = SmallRng::seed_from_u64(26);
        let mut position = Point::new(0.1, 0.1);
        let mut accepted = 0;
        for _ in 0..500 {
            let proposal = HitAndRun.step(&position, &target, &params, &mut rng);
            assert!(proposal.path.is_none());
            if proposal.accepted {
                accepted += 1;
            }
            position = proposal.point;
        }
        assert!(accepted > 480, "Expected hit-and-run to nearly always move");
    }
}
