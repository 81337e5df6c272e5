/*!
Defines the catalog of 2D target densities the engine can sample from,
along with the traits for evaluating unnormalized log-probabilities and
their gradients.

All densities are pure closed-form functions, generic over the
floating-point precision (e.g., `f32` or `f64`) via [`num_traits::Float`].
Normalizing constants are dropped throughout; only density ratios enter
the accept/reject logic, so they never matter.

# Examples

```rust
use mcmc_gallery::core::Point;
use mcmc_gallery::distributions::{Donut, GradientTarget, TargetDistribution};

let donut = Donut::default();
let lp = donut.unnorm_log_prob(&Point::new(2.5, 0.0));
let grad = donut.grad_log_prob(&Point::new(1.0, 0.0));
println!("log-density {lp}, gradient ({}, {})", grad.x, grad.y);
```
*/

use num_traits::Float;

use crate::core::Point;

/// Guard added to radii before dividing, so the donut density stays
/// finite at the exact origin.
const RADIAL_EPS: f64 = 1e-9;

/// A continuous target distribution over the plane.
pub trait TargetDistribution<T: Float> {
    /// Returns the log of the unnormalized density at `point`.
    fn unnorm_log_prob(&self, point: &Point<T>) -> T;
}

/// A target that additionally exposes the exact analytic gradient of its
/// log-density. The gradient must match [`TargetDistribution::unnorm_log_prob`]
/// precisely; a mismatch silently skews the stationary distribution of
/// gradient-based kernels.
pub trait GradientTarget<T: Float>: TargetDistribution<T> {
    /// Returns `(d logp/dx, d logp/dy)` at `point`.
    fn grad_log_prob(&self, point: &Point<T>) -> Point<T>;
}

/**
An isotropic Gaussian centered at the origin.

With the default `std = 1` this is the standard normal,
`logp = -0.5 (x² + y²)`.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotropicGaussian<T> {
    pub std: T,
}

impl<T: Float> Default for IsotropicGaussian<T> {
    fn default() -> Self {
        Self { std: T::one() }
    }
}

impl<T: Float> TargetDistribution<T> for IsotropicGaussian<T> {
    fn unnorm_log_prob(&self, point: &Point<T>) -> T {
        -T::from(0.5).unwrap() * point.norm_sq() / (self.std * self.std)
    }
}

impl<T: Float> GradientTarget<T> for IsotropicGaussian<T> {
    fn grad_log_prob(&self, point: &Point<T>) -> Point<T> {
        let inv_var = (self.std * self.std).recip();
        Point::new(-point.x * inv_var, -point.y * inv_var)
    }
}

/**
A mixture of two unit-variance isotropic Gaussians.

The default modes sit at (-1.5, -1.5) and (1.5, 1.5). The log-density is
the log of the sum of the two component densities (equal weights, shared
normalizer dropped), evaluated via log-sum-exp so neither mode underflows
far from the other.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BimodalGaussian<T> {
    pub mode_a: Point<T>,
    pub mode_b: Point<T>,
}

impl<T: Float> Default for BimodalGaussian<T> {
    fn default() -> Self {
        let offset = T::from(1.5).unwrap();
        Self {
            mode_a: Point::new(-offset, -offset),
            mode_b: Point::new(offset, offset),
        }
    }
}

impl<T: Float> BimodalGaussian<T> {
    fn component_log_probs(&self, point: &Point<T>) -> (T, T) {
        let half = T::from(0.5).unwrap();
        let lp_a = -half * (*point - self.mode_a).norm_sq();
        let lp_b = -half * (*point - self.mode_b).norm_sq();
        (lp_a, lp_b)
    }
}

impl<T: Float> TargetDistribution<T> for BimodalGaussian<T> {
    fn unnorm_log_prob(&self, point: &Point<T>) -> T {
        let (lp_a, lp_b) = self.component_log_probs(point);
        let m = lp_a.max(lp_b);
        m + ((lp_a - m).exp() + (lp_b - m).exp()).ln()
    }
}

impl<T: Float> GradientTarget<T> for BimodalGaussian<T> {
    fn grad_log_prob(&self, point: &Point<T>) -> Point<T> {
        // Responsibility-weighted sum of the component gradients.
        let (lp_a, lp_b) = self.component_log_probs(point);
        let m = lp_a.max(lp_b);
        let (wa, wb) = ((lp_a - m).exp(), (lp_b - m).exp());
        let total = wa + wb;
        let (wa, wb) = (wa / total, wb / total);
        (self.mode_a - *point) * wa + (self.mode_b - *point) * wb
    }
}

/**
A density concentrated on a ring around the origin.

`logp = -tightness * (r - radius)²` with `r = √(x² + y²)`. Defaults:
radius 2.5, tightness 2. A small additive epsilon keeps the gradient
finite at the exact origin, where `r = 0` would otherwise divide by zero.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Donut<T> {
    pub radius: T,
    pub tightness: T,
}

impl<T: Float> Default for Donut<T> {
    fn default() -> Self {
        Self {
            radius: T::from(2.5).unwrap(),
            tightness: T::from(2.0).unwrap(),
        }
    }
}

impl<T: Float> Donut<T> {
    fn guarded_radius(&self, point: &Point<T>) -> T {
        point.norm_sq().sqrt() + T::from(RADIAL_EPS).unwrap()
    }
}

impl<T: Float> TargetDistribution<T> for Donut<T> {
    fn unnorm_log_prob(&self, point: &Point<T>) -> T {
        let r = self.guarded_radius(point);
        let d = r - self.radius;
        -self.tightness * d * d
    }
}

impl<T: Float> GradientTarget<T> for Donut<T> {
    fn grad_log_prob(&self, point: &Point<T>) -> Point<T> {
        let r = self.guarded_radius(point);
        let two = T::from(2.0).unwrap();
        let dlogp_dr = -two * self.tightness * (r - self.radius);
        Point::new(dlogp_dr * point.x / r, dlogp_dr * point.y / r)
    }
}

/**
A Rosenbrock-shaped ("banana") density.

`logp = -scale * ((a - x)² + b (y - x²)²)`. The defaults `a = 1`,
`b = 5`, `scale = 0.1` give the classic curved ridge through (1, 1).
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rosenbrock<T> {
    pub a: T,
    pub b: T,
    pub scale: T,
}

impl<T: Float> Default for Rosenbrock<T> {
    fn default() -> Self {
        Self {
            a: T::one(),
            b: T::from(5.0).unwrap(),
            scale: T::from(0.1).unwrap(),
        }
    }
}

impl<T: Float> TargetDistribution<T> for Rosenbrock<T> {
    fn unnorm_log_prob(&self, point: &Point<T>) -> T {
        let (x, y) = (point.x, point.y);
        let t1 = self.a - x;
        let t2 = y - x * x;
        -self.scale * (t1 * t1 + self.b * t2 * t2)
    }
}

impl<T: Float> GradientTarget<T> for Rosenbrock<T> {
    fn grad_log_prob(&self, point: &Point<T>) -> Point<T> {
        let (x, y) = (point.x, point.y);
        let two = T::from(2.0).unwrap();
        let four = T::from(4.0).unwrap();
        let ridge = y - x * x;
        let gx = self.scale * (two * (self.a - x) + four * self.b * x * ridge);
        let gy = -two * self.scale * self.b * ridge;
        Point::new(gx, gy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Compares the analytic gradient against a central finite difference
    /// of the log-density.
    fn check_gradient<D: GradientTarget<f64>>(target: &D, point: Point<f64>) {
        let h = 1e-4;
        let num_x = (target.unnorm_log_prob(&Point::new(point.x + h, point.y))
            - target.unnorm_log_prob(&Point::new(point.x - h, point.y)))
            / (2.0 * h);
        let num_y = (target.unnorm_log_prob(&Point::new(point.x, point.y + h))
            - target.unnorm_log_prob(&Point::new(point.x, point.y - h)))
            / (2.0 * h);
        let grad = target.grad_log_prob(&point);
        assert_abs_diff_eq!(grad.x, num_x, epsilon = 1e-5);
        assert_abs_diff_eq!(grad.y, num_y, epsilon = 1e-5);
    }

    fn probe_points() -> Vec<Point<f64>> {
        vec![
            Point::new(0.3, 0.2),
            Point::new(-1.0, 2.0),
            Point::new(1.5, -0.5),
            Point::new(-2.2, -1.7),
        ]
    }

    #[test]
    fn gaussian_log_prob_values() {
        let gauss = IsotropicGaussian::default();
        assert_abs_diff_eq!(gauss.unnorm_log_prob(&Point::new(0.0, 0.0)), 0.0);
        assert_abs_diff_eq!(gauss.unnorm_log_prob(&Point::new(1.0, 0.0)), -0.5);
        assert_abs_diff_eq!(gauss.unnorm_log_prob(&Point::new(1.0, 1.0)), -1.0);
    }

    #[test]
    fn gaussian_wide_std_flattens() {
        let wide = IsotropicGaussian { std: 2.0 };
        assert_abs_diff_eq!(wide.unnorm_log_prob(&Point::new(2.0, 0.0)), -0.5);
    }

    #[test]
    fn bimodal_is_symmetric_across_modes() {
        let bimodal = BimodalGaussian::<f64>::default();
        let lp_a = bimodal.unnorm_log_prob(&Point::new(-1.5, -1.5));
        let lp_b = bimodal.unnorm_log_prob(&Point::new(1.5, 1.5));
        assert_abs_diff_eq!(lp_a, lp_b, epsilon = 1e-12);
    }

    #[test]
    fn bimodal_midpoint_value() {
        // At the midpoint both components contribute exp(-0.5 * 4.5).
        let bimodal = BimodalGaussian::<f64>::default();
        let expected = (2.0 * (-2.25f64).exp()).ln();
        assert_abs_diff_eq!(
            bimodal.unnorm_log_prob(&Point::new(0.0, 0.0)),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn donut_peaks_on_the_ring() {
        let donut = Donut::<f64>::default();
        let on_ring = donut.unnorm_log_prob(&Point::new(2.5, 0.0));
        assert_abs_diff_eq!(on_ring, 0.0, epsilon = 1e-8);
        assert!(donut.unnorm_log_prob(&Point::new(1.0, 0.0)) < on_ring);
        assert!(donut.unnorm_log_prob(&Point::new(4.0, 0.0)) < on_ring);
    }

    #[test]
    fn donut_is_finite_at_origin() {
        let donut = Donut::<f64>::default();
        let lp = donut.unnorm_log_prob(&Point::new(0.0, 0.0));
        let grad = donut.grad_log_prob(&Point::new(0.0, 0.0));
        assert!(lp.is_finite());
        assert!(grad.x.is_finite() && grad.y.is_finite());
    }

    #[test]
    fn rosenbrock_peaks_at_unit_point() {
        let banana = Rosenbrock::<f64>::default();
        assert_abs_diff_eq!(banana.unnorm_log_prob(&Point::new(1.0, 1.0)), 0.0);
        assert!(banana.unnorm_log_prob(&Point::new(0.0, 0.0)) < 0.0);
    }

    #[test]
    fn gradients_match_finite_differences() {
        for point in probe_points() {
            check_gradient(&IsotropicGaussian::default(), point);
            check_gradient(&BimodalGaussian::default(), point);
            check_gradient(&Donut::default(), point);
            check_gradient(&Rosenbrock::default(), point);
        }
    }
}
