/*!
# Sampler engine

The engine owns one chain and drives whichever kernel is selected, one
step at a time, folding each outcome into the chain's bounded history.
It is the boundary consumed by an embedding application: a rendering
loop calls [`SamplerEngine::advance`] once per tick with however many
steps it wants, then reads the position, history, and last trajectory
back out for drawing. The engine itself assumes no timer or event loop.

Targets and kernels are picked from fixed catalogs ([`TargetKind`],
[`KernelKind`]); unknown names fail at selection time, before any
stepping occurs. All randomness flows through a single seeded
generator, so a seeded engine replays the same chain exactly.

## Example

```rust
use mcmc_gallery::engine::{KernelKind, SamplerEngine, TargetKind};

let mut engine = SamplerEngine::<f64>::new(TargetKind::Donut, KernelKind::Slice).set_seed(42);
let batch = engine.advance(100)?;
assert_eq!(batch.samples.len(), 100);
assert!(batch.accepted <= 100);
# Ok::<(), mcmc_gallery::engine::EngineError>(())
```
*/

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use num_traits::Float;
use rand::rngs::SmallRng;
use rand::{thread_rng, Rng, SeedableRng};
use rand_distr::uniform::SampleUniform;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::core::{ChainState, KernelParams, Point, Sample, TransitionKernel};
use crate::distributions::{
    BimodalGaussian, Donut, GradientTarget, IsotropicGaussian, Rosenbrock, TargetDistribution,
};
use crate::elliptical::EllipticalSlice;
use crate::hmc::HamiltonianMonteCarlo;
use crate::metropolis::{IndependentMetropolisHastings, RandomWalkMetropolis};
use crate::slice::{HitAndRun, SliceSampler};

/// Default bound on the sample history kept by a chain.
pub const DEFAULT_HISTORY_CAPACITY: usize = 2000;

/// Everything that can go wrong at the engine boundary. Kernel-level
/// search exhaustion is not an error; it surfaces as a rejected sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown target distribution `{0}`")]
    UnknownTarget(String),
    #[error("unknown transition kernel `{0}`")]
    UnknownKernel(String),
    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter {
        name: &'static str,
        value: String,
    },
    #[error("advance requires at least one step")]
    EmptyBatch,
}

/// The catalog of target densities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Gaussian,
    Bimodal,
    Donut,
    Banana,
}

impl TargetKind {
    pub const ALL: [TargetKind; 4] = [
        TargetKind::Gaussian,
        TargetKind::Bimodal,
        TargetKind::Donut,
        TargetKind::Banana,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TargetKind::Gaussian => "gaussian",
            TargetKind::Bimodal => "bimodal",
            TargetKind::Donut => "donut",
            TargetKind::Banana => "banana",
        }
    }
}

impl FromStr for TargetKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaussian" => Ok(TargetKind::Gaussian),
            "bimodal" => Ok(TargetKind::Bimodal),
            "donut" => Ok(TargetKind::Donut),
            "banana" => Ok(TargetKind::Banana),
            other => Err(EngineError::UnknownTarget(other.to_string())),
        }
    }
}

/// The catalog of chain-update algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    RandomWalk,
    IndependentMh,
    Slice,
    Elliptical,
    HitAndRun,
    Hmc,
}

impl KernelKind {
    pub const ALL: [KernelKind; 6] = [
        KernelKind::RandomWalk,
        KernelKind::IndependentMh,
        KernelKind::Slice,
        KernelKind::Elliptical,
        KernelKind::HitAndRun,
        KernelKind::Hmc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KernelKind::RandomWalk => "rwm",
            KernelKind::IndependentMh => "mh",
            KernelKind::Slice => "slice",
            KernelKind::Elliptical => "elliptical",
            KernelKind::HitAndRun => "hitnrun",
            KernelKind::Hmc => "hmc",
        }
    }
}

impl FromStr for KernelKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rwm" => Ok(KernelKind::RandomWalk),
            "mh" => Ok(KernelKind::IndependentMh),
            "slice" => Ok(KernelKind::Slice),
            "elliptical" => Ok(KernelKind::Elliptical),
            "hitnrun" => Ok(KernelKind::HitAndRun),
            "hmc" => Ok(KernelKind::Hmc),
            other => Err(EngineError::UnknownKernel(other.to_string())),
        }
    }
}

/// A catalog density instantiated with its default constants, dispatched
/// behind one value so the engine can swap targets at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetModel<T> {
    Gaussian(IsotropicGaussian<T>),
    Bimodal(BimodalGaussian<T>),
    Donut(Donut<T>),
    Banana(Rosenbrock<T>),
}

impl<T: Float> TargetModel<T> {
    pub fn from_kind(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Gaussian => TargetModel::Gaussian(IsotropicGaussian::default()),
            TargetKind::Bimodal => TargetModel::Bimodal(BimodalGaussian::default()),
            TargetKind::Donut => TargetModel::Donut(Donut::default()),
            TargetKind::Banana => TargetModel::Banana(Rosenbrock::default()),
        }
    }
}

impl<T: Float> TargetDistribution<T> for TargetModel<T> {
    fn unnorm_log_prob(&self, point: &Point<T>) -> T {
        match self {
            TargetModel::Gaussian(d) => d.unnorm_log_prob(point),
            TargetModel::Bimodal(d) => d.unnorm_log_prob(point),
            TargetModel::Donut(d) => d.unnorm_log_prob(point),
            TargetModel::Banana(d) => d.unnorm_log_prob(point),
        }
    }
}

impl<T: Float> GradientTarget<T> for TargetModel<T> {
    fn grad_log_prob(&self, point: &Point<T>) -> Point<T> {
        match self {
            TargetModel::Gaussian(d) => d.grad_log_prob(point),
            TargetModel::Bimodal(d) => d.grad_log_prob(point),
            TargetModel::Donut(d) => d.grad_log_prob(point),
            TargetModel::Banana(d) => d.grad_log_prob(point),
        }
    }
}

/// Summary of one `advance` call: how many proposals were accepted and
/// every sample emitted, in step order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<T> {
    pub accepted: usize,
    pub samples: Vec<Sample<T>>,
}

/// The fixed position chains are (re-)seeded at.
fn chain_origin<T: Float>() -> Point<T> {
    let c = T::from(0.1).unwrap();
    Point::new(c, c)
}

/**
Drives one Markov chain with a selected target and kernel.

The engine performs no randomness itself beyond handing its generator to
the kernel, and holds the only live reference to its [`ChainState`].
Switching target or kernel re-seeds the chain at the fixed origin, since
samples from the previous configuration are not draws from the new one.
*/
#[derive(Debug, Clone)]
pub struct SamplerEngine<T: Float> {
    target_kind: TargetKind,
    target: TargetModel<T>,
    kernel: KernelKind,
    params: KernelParams<T>,
    chain: ChainState<T>,
    seed: u64,
    rng: SmallRng,
}

impl<T> SamplerEngine<T>
where
    T: Float + fmt::Debug + SampleUniform,
    StandardNormal: rand_distr::Distribution<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    /// Creates an engine with default parameters and a history capacity
    /// of [`DEFAULT_HISTORY_CAPACITY`], seeded from entropy.
    pub fn new(target: TargetKind, kernel: KernelKind) -> Self {
        let seed = thread_rng().gen::<u64>();
        Self {
            target_kind: target,
            target: TargetModel::from_kind(target),
            kernel,
            params: KernelParams::default(),
            chain: ChainState::new(chain_origin(), DEFAULT_HISTORY_CAPACITY),
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Re-seeds the random source so runs can be reproduced exactly.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Replaces the chain with one bounded at `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.chain = ChainState::new(chain_origin(), capacity);
        self
    }

    /// Switches the target density and re-seeds the chain.
    pub fn select_target(&mut self, kind: TargetKind) {
        self.target_kind = kind;
        self.target = TargetModel::from_kind(kind);
        self.reset();
    }

    /// Switches the transition kernel and re-seeds the chain.
    pub fn select_kernel(&mut self, kind: KernelKind) {
        self.kernel = kind;
        self.reset();
    }

    /// Replaces the full parameter set, rejecting out-of-range values
    /// rather than clamping them.
    pub fn set_params(&mut self, params: KernelParams<T>) -> Result<(), EngineError> {
        ensure_positive("step_size", params.step_size)?;
        ensure_positive("leapfrog_epsilon", params.leapfrog_epsilon)?;
        if params.leapfrog_steps == 0 {
            return Err(EngineError::InvalidParameter {
                name: "leapfrog_steps",
                value: "0".to_string(),
            });
        }
        self.params = params;
        Ok(())
    }

    pub fn set_step_size(&mut self, step_size: T) -> Result<(), EngineError> {
        ensure_positive("step_size", step_size)?;
        self.params.step_size = step_size;
        Ok(())
    }

    pub fn set_leapfrog_steps(&mut self, steps: usize) -> Result<(), EngineError> {
        if steps == 0 {
            return Err(EngineError::InvalidParameter {
                name: "leapfrog_steps",
                value: "0".to_string(),
            });
        }
        self.params.leapfrog_steps = steps;
        Ok(())
    }

    pub fn set_leapfrog_epsilon(&mut self, epsilon: T) -> Result<(), EngineError> {
        ensure_positive("leapfrog_epsilon", epsilon)?;
        self.params.leapfrog_epsilon = epsilon;
        Ok(())
    }

    /// Re-seeds the chain at the origin, clearing history and trajectory.
    /// Parameters and selections are kept.
    pub fn reset(&mut self) {
        self.chain.reset(chain_origin());
    }

    pub fn target(&self) -> TargetKind {
        self.target_kind
    }

    pub fn kernel(&self) -> KernelKind {
        self.kernel
    }

    pub fn params(&self) -> &KernelParams<T> {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The current chain position.
    pub fn position(&self) -> Point<T> {
        self.chain.position()
    }

    /// The bounded sample history, oldest first.
    pub fn history(&self) -> &VecDeque<Sample<T>> {
        self.chain.history()
    }

    /// Intermediate points of the most recent step, for kernels that
    /// traverse a path.
    pub fn last_trajectory(&self) -> Option<&[Point<T>]> {
        self.chain.last_trajectory()
    }

    /**
    Advances the chain by `steps` kernel invocations, returning every
    emitted sample and the accepted count.

    Asking for zero steps is a contract violation and is rejected with
    [`EngineError::EmptyBatch`] rather than treated as a no-op.
    */
    pub fn advance(&mut self, steps: usize) -> Result<BatchResult<T>, EngineError> {
        if steps == 0 {
            return Err(EngineError::EmptyBatch);
        }
        let mut samples = Vec::with_capacity(steps);
        let mut accepted = 0;
        for _ in 0..steps {
            let current = self.chain.position();
            let proposal = match self.kernel {
                KernelKind::RandomWalk => {
                    RandomWalkMetropolis.step(&current, &self.target, &self.params, &mut self.rng)
                }
                KernelKind::IndependentMh => IndependentMetropolisHastings::default().step(
                    &current,
                    &self.target,
                    &self.params,
                    &mut self.rng,
                ),
                KernelKind::Slice => {
                    SliceSampler.step(&current, &self.target, &self.params, &mut self.rng)
                }
                KernelKind::Elliptical => {
                    EllipticalSlice.step(&current, &self.target, &self.params, &mut self.rng)
                }
                KernelKind::HitAndRun => {
                    HitAndRun.step(&current, &self.target, &self.params, &mut self.rng)
                }
                KernelKind::Hmc => {
                    HamiltonianMonteCarlo.step(&current, &self.target, &self.params, &mut self.rng)
                }
            };
            if proposal.accepted {
                accepted += 1;
            }
            samples.push(Sample {
                point: proposal.point,
                accepted: proposal.accepted,
            });
            self.chain.record(proposal);
        }
        Ok(BatchResult { accepted, samples })
    }
}

fn ensure_positive<T: Float + fmt::Debug>(
    name: &'static str,
    value: T,
) -> Result<(), EngineError> {
    if value.is_finite() && value > T::zero() {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter {
            name,
            value: format!("{value:?}"),
        })
    }
}

/// Advances several independent engines in parallel, one chain each.
pub fn run_ensemble<T>(
    engines: &mut [SamplerEngine<T>],
    steps: usize,
) -> Result<Vec<BatchResult<T>>, EngineError>
where
    T: Float + fmt::Debug + SampleUniform + Send + Sync,
    StandardNormal: rand_distr::Distribution<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    engines
        .par_iter_mut()
        .map(|engine| engine.advance(steps))
        .collect()
}

/// Like [`run_ensemble`], with a progress bar per chain.
pub fn run_ensemble_progress<T>(
    engines: &mut [SamplerEngine<T>],
    steps: usize,
) -> Result<Vec<BatchResult<T>>, EngineError>
where
    T: Float + fmt::Debug + SampleUniform + Send + Sync,
    StandardNormal: rand_distr::Distribution<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    if steps == 0 {
        return Err(EngineError::EmptyBatch);
    }
    let multi = MultiProgress::new();
    let pb_style = ProgressStyle::default_bar()
        .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("##-");

    engines
        .par_iter_mut()
        .enumerate()
        .map(|(i, engine)| {
            let pb = multi.add(ProgressBar::new(steps as u64));
            pb.set_prefix(format!("Chain {i}"));
            pb.set_style(pb_style.clone());

            let mut samples = Vec::with_capacity(steps);
            let mut accepted = 0;
            for _ in 0..steps {
                let batch = engine.advance(1)?;
                accepted += batch.accepted;
                samples.extend(batch.samples);
                pb.inc(1);
            }
            pb.finish_with_message("Done!");
            Ok(BatchResult { accepted, samples })
        })
        .collect()
}
