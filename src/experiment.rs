use crate::world::World;
use anyhow::{Context, Result};
use clustering_common::{MetricSample, SimulationConfig, WorldSnapshot};
use log::{debug, info, trace};
use rand::Rng;
use rayon::prelude::*;
use std::time::Instant;

/// Identifies one replica: a sweep point plus a 1-based run number, and its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaSpec {
    pub cooldown: u32,
    pub threshold: u32,
    pub run: u32,
    pub seed: u64,
}

/// Everything a finished replica hands back to the aggregator.
#[derive(Debug, Clone)]
pub struct ReplicaOutcome {
    pub spec: ReplicaSpec,
    pub samples: Vec<MetricSample>,
    pub final_snapshot: Option<WorldSnapshot>,
}

/// Totals for a whole sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub combinations: usize,
    pub replicas: usize,
    pub samples: usize,
}

// SplitMix64 finaliser
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derives an independent seed for one replica from the base seed and its coordinates.
pub fn replica_seed(base_seed: u64, cooldown: u32, threshold: u32, run: u32) -> u64 {
    let mut h = mix64(base_seed);
    h = mix64(h ^ cooldown as u64);
    h = mix64(h ^ threshold as u64);
    mix64(h ^ run as u64)
}

/// Runs one replica to completion, sampling metrics every `sample_interval` iterations.
pub fn run_replica(config: &SimulationConfig, spec: ReplicaSpec, keep_snapshot: bool) -> Result<ReplicaOutcome> {
    let params = config.get_sim_params(spec.threshold, spec.cooldown)?;
    let mut world = World::from_seed(params, spec.seed)
        .with_context(|| format!("Failed to build world for C={}, T={}, run {}", spec.cooldown, spec.threshold, spec.run))?;
    world.add_objects(&config.objects)?;
    let ants_added = world.add_ants(config.agents.count);
    debug!(
        "Replica C={} T={} run {} seeded {:#x}: {} objects, {} ants",
        spec.cooldown, spec.threshold, spec.run, spec.seed, world.total_objects(), ants_added
    );
    world.log_census();

    let iterations = config.experiment.iterations;
    let sample_interval = config.experiment.sample_interval.max(1);
    let initial_objects = world.total_objects();
    let mut samples = Vec::with_capacity((iterations / sample_interval) as usize + 1);

    for iteration in 0..iterations {
        let step_start = Instant::now();
        world
            .step(iteration)
            .with_context(|| format!("Simulation step {} failed (C={}, T={}, run {})", iteration, spec.cooldown, spec.threshold, spec.run))?;
        trace!("Iteration {} completed in {:.3} ms", iteration, step_start.elapsed().as_secs_f64() * 1000.0);

        if iteration % sample_interval == 0 {
            debug_assert_eq!(world.total_objects(), initial_objects, "objects must be conserved");
            let sample = MetricSample {
                cooldown: spec.cooldown,
                threshold: spec.threshold,
                run: spec.run,
                iteration,
                average_cluster_size: world.average_cluster_size(),
                interaction_count: world.interaction_count(),
            };
            info!(
                "C: {}, T: {}, Exp: {}, Iter: {}/{}, Cluster: {:.4}, Interact: {}",
                sample.cooldown, sample.threshold, sample.run, iteration, iterations,
                sample.average_cluster_size, sample.interaction_count
            );
            samples.push(sample);
        }
    }

    world.log_census();
    let final_snapshot = keep_snapshot.then(|| {
        let mut snapshot = world.snapshot(iterations);
        snapshot.run = spec.run;
        snapshot
    });
    Ok(ReplicaOutcome { spec, samples, final_snapshot })
}

/// Runs every sweep point. Replicas of one point run in parallel; once all of them finish
/// their outcomes are handed to `sink` in run order, one point at a time.
pub fn run_sweep<F>(config: &SimulationConfig, keep_snapshots: bool, mut sink: F) -> Result<SweepSummary>
where
    F: FnMut(&[ReplicaOutcome]) -> Result<()>,
{
    let base_seed = config.experiment.seed.unwrap_or_else(|| rand::rng().random());
    info!("Base seed: {}", base_seed);

    let mut summary = SweepSummary::default();
    for (cooldown, threshold) in config.sweep_points() {
        info!("Running experiments for Cooldown = {}, Threshold = {}...", cooldown, threshold);
        let point_start = Instant::now();

        let outcomes = (1..=config.experiment.runs)
            .into_par_iter()
            .map(|run| {
                let spec = ReplicaSpec {
                    cooldown,
                    threshold,
                    run,
                    seed: replica_seed(base_seed, cooldown, threshold, run),
                };
                run_replica(config, spec, keep_snapshots)
            })
            .collect::<Result<Vec<_>>>()?;

        sink(&outcomes)?;

        summary.combinations += 1;
        summary.replicas += outcomes.len();
        summary.samples += outcomes.iter().map(|o| o.samples.len()).sum::<usize>();
        info!(
            "Cooldown = {}, Threshold = {} finished in {:.2} s",
            cooldown, threshold, point_start.elapsed().as_secs_f64()
        );
    }
    Ok(summary)
}
