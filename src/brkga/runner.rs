//! BRKGA evolutionary loop.

use super::config::BrkgaConfig;
use super::engine::Brkga;
use super::types::Decoder;
use crate::error::{BrkgaError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Result of a BRKGA optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrkgaRunResult {
    /// The best random-key chromosome found.
    pub best_keys: Vec<f64>,

    /// Fitness of the best solution.
    pub best_fitness: f64,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether terminated due to stagnation.
    pub stagnated: bool,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best fitness after initialization and after each generation.
    pub fitness_history: Vec<f64>,
}

/// Drives a [`Brkga`] engine for a bounded number of generations.
///
/// Every `exchange_interval` generations (when non-zero and `K > 1`) the
/// populations trade their `exchange_count` best chromosomes.
pub struct BrkgaRunner;

impl BrkgaRunner {
    /// Runs BRKGA optimization.
    pub fn run<D: Decoder>(decoder: &D, config: &BrkgaConfig) -> Result<BrkgaRunResult> {
        Self::run_with_cancel(decoder, config, None)
    }

    /// Runs BRKGA with an optional cancellation token.
    ///
    /// The flag is checked between generations; the best solution found so
    /// far is returned once it is set.
    pub fn run_with_cancel<D: Decoder>(
        decoder: &D,
        config: &BrkgaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<BrkgaRunResult> {
        if config.max_generations == 0 {
            return Err(BrkgaError::InvalidConfig(
                "max_generations must be at least 1".into(),
            ));
        }
        let exchanging = config.exchange_interval > 0 && config.num_populations > 1;
        if exchanging
            && (config.exchange_count == 0 || config.exchange_count >= config.population_size)
        {
            return Err(BrkgaError::InvalidConfig(format!(
                "exchange_count must satisfy 0 < m < population_size ({}), got {}",
                config.population_size, config.exchange_count
            )));
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut engine = Brkga::with_seed(config, decoder, seed)?;

        let mut best_fitness = engine.best_fitness();
        let mut best_keys = engine.best_chromosome().to_vec();
        let mut fitness_history = Vec::with_capacity(config.max_generations + 1);
        fitness_history.push(best_fitness);

        let mut stagnation_counter = 0usize;
        let mut cancelled = false;

        for gen in 1..=config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            engine.evolve(1)?;
            if exchanging && gen % config.exchange_interval == 0 {
                engine.exchange_elite(config.exchange_count)?;
            }

            if engine.best_fitness() < best_fitness {
                best_fitness = engine.best_fitness();
                best_keys.copy_from_slice(engine.best_chromosome());
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }
            fitness_history.push(best_fitness);

            if config.stagnation_limit > 0 && stagnation_counter >= config.stagnation_limit {
                debug!(generation = gen, best_fitness, "stopping on stagnation");
                return Ok(BrkgaRunResult {
                    best_keys,
                    best_fitness,
                    generations: gen,
                    stagnated: true,
                    cancelled: false,
                    fitness_history,
                });
            }
        }

        Ok(BrkgaRunResult {
            best_keys,
            best_fitness,
            generations: fitness_history.len() - 1,
            stagnated: false,
            cancelled,
            fitness_history,
        })
    }
}
