//! Batch runner.
//!
//! Issues many independent engine invocations in parallel using rayon, each
//! with its own seed, and aggregates their outcomes into one [`Summary`].

use std::path::Path;
use std::time::Instant;

use battle_core::combatant::Combatant;
use battle_core::engine::BattleEngine;
use battle_core::error::{BattleError, ValidationError};
use battle_core::outcome::BattleOutcome;
use battle_core::runner::{resolve_seed, EngineBackend};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::report::Summary;

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of engine invocations
    pub runs: u32,
    /// Simulations per invocation
    pub simulations_per_run: u32,
    /// Maximum parallel invocations (0 = use rayon default)
    pub parallel: usize,
    /// Seed of the first run; later runs count up from it (0 = random start)
    pub seed_start: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            runs: 10,
            simulations_per_run: 1,
            parallel: 0,
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for `runs` invocations
    pub fn new(runs: u32) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    /// Set simulations per invocation
    pub fn with_simulations(mut self, simulations_per_run: u32) -> Self {
        self.simulations_per_run = simulations_per_run;
        self
    }

    /// Set parallelism
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Run index
    pub run_index: u32,
    /// Seed used
    pub seed: u32,
    /// Error message
    pub message: String,
}

/// Results from a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Aggregate over every successful simulation
    pub summary: Summary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Failed runs
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Seed of run `index`. Counts up from `base` through `u32::MAX`, then
/// continues at 1, so seeds are never zero and distinct across up to
/// `u32::MAX` runs.
fn run_seed(base: u32, index: u32) -> u32 {
    let offset = (u64::from(base.max(1)) - 1 + u64::from(index)) % u64::from(u32::MAX);
    // offset < u32::MAX, so the seed fits.
    u32::try_from(offset + 1).unwrap_or(u32::MAX)
}

/// Run the batch described by `config`.
///
/// Failed runs are logged and recorded in [`BatchResults::errors`].
///
/// # Errors
///
/// Fails when `config.runs` is zero or every run fails; in the latter case
/// the first run's error is returned.
pub fn run_batch<B>(
    engine: &BattleEngine<B>,
    attackers: &[Combatant],
    defenders: &[Combatant],
    config: BatchConfig,
) -> Result<BatchResults, BattleError>
where
    B: EngineBackend + Sync,
{
    let start = Instant::now();
    let base_seed = resolve_seed(config.seed_start);
    info!(
        runs = config.runs,
        simulations_per_run = config.simulations_per_run,
        base_seed,
        "Starting batch run"
    );

    let run_one = |i: u32| {
        let seed = run_seed(base_seed, i);
        let result = engine.simulate(attackers, defenders, seed, config.simulations_per_run);
        match &result {
            Ok(_) => debug!(run = i, seed, "Run finished"),
            Err(e) => warn!(run = i, seed, "Run failed: {e}"),
        }
        (i, seed, result)
    };

    let run_all = || -> Vec<(u32, u32, Result<Vec<BattleOutcome>, BattleError>)> {
        (0..config.runs).into_par_iter().map(run_one).collect()
    };
    let pool = (config.parallel > 0).then(|| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel)
            .build()
    });
    let results = match pool {
        Some(Ok(pool)) => pool.install(run_all),
        Some(Err(e)) => {
            warn!("Cannot build a pool of {} threads, using the default: {e}", config.parallel);
            run_all()
        }
        None => run_all(),
    };

    let mut outcomes = Vec::new();
    let mut errors = Vec::new();
    let mut first_error = None;
    for (run_index, seed, result) in results {
        match result {
            Ok(mut batch) => outcomes.append(&mut batch),
            Err(e) => {
                errors.push(BatchError {
                    run_index,
                    seed,
                    message: e.to_string(),
                });
                first_error.get_or_insert(e);
            }
        }
    }

    let Some(summary) = Summary::from_outcomes(attackers, defenders, &outcomes) else {
        return Err(first_error.unwrap_or_else(|| ValidationError::NoSimulations.into()));
    };
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        simulations = outcomes.len(),
        failed_runs = errors.len(),
        duration_seconds,
        "Batch complete"
    );

    Ok(BatchResults {
        config,
        summary,
        duration_seconds,
        errors,
    })
}
