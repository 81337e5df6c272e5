//! A small terminal demo: drives the sampling engine the way a rendering
//! loop would, one batch of steps per frame, printing chain statistics as
//! it goes. Pass a target and kernel name, e.g. `demo banana hmc`.

use mcmc_gallery::engine::{KernelKind, SamplerEngine, TargetKind};
use mcmc_gallery::stats::ChainTracker;
use std::env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    const FRAMES: usize = 60;
    const STEPS_PER_FRAME: usize = 250;

    let args: Vec<String> = env::args().collect();
    let target: TargetKind = args.get(1).map(String::as_str).unwrap_or("donut").parse()?;
    let kernel: KernelKind = args.get(2).map(String::as_str).unwrap_or("slice").parse()?;

    let mut engine = SamplerEngine::<f64>::new(target, kernel).set_seed(42);
    let mut tracker = ChainTracker::new();

    println!("Sampling `{}` with `{}`", target.name(), kernel.name());
    for frame in 0..FRAMES {
        let batch = engine.advance(STEPS_PER_FRAME)?;
        for sample in &batch.samples {
            tracker.update(sample);
        }
        if (frame + 1) % 10 == 0 {
            let stats = tracker.stats();
            println!(
                "frame {:3}: n={:6} p(accept)≈{:.2} mean=({:+.2}, {:+.2}) var=({:.2}, {:.2})",
                frame + 1,
                stats.n,
                stats.p_accept,
                stats.mean.x,
                stats.mean.y,
                stats.var.x,
                stats.var.y
            );
        }
    }

    let position = engine.position();
    println!("Final position: ({:.3}, {:.3})", position.x, position.y);
    println!("History holds the last {} samples", engine.history().len());
    if let Some(path) = engine.last_trajectory() {
        println!("Last step searched {} path points", path.len());
    }
    Ok(())
}
