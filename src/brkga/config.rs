//! BRKGA configuration.

use crate::error::{BrkgaError, Result};

/// Configuration for the BRKGA engine and runner.
///
/// # Parameters
///
/// The elite and mutant set sizes are derived from fractions of the
/// population: `pe = floor(elite_fraction * p)`, `pm = floor(mutant_fraction * p)`.
/// They must satisfy `1 <= pe` and `pe + pm <= p`. The remaining
/// `p - pe - pm` slots are filled by crossover offspring.
///
/// # Examples
///
/// ```
/// use u_brkga::brkga::BrkgaConfig;
///
/// let config = BrkgaConfig::new(50) // 50 random keys
///     .with_population_size(200)
///     .with_elite_fraction(0.20)
///     .with_mutant_fraction(0.15)
///     .with_elite_inheritance_prob(0.70)
///     .with_num_populations(3)
///     .with_max_workers(4);
/// assert_eq!(config.elite_count(), 40);
/// assert_eq!(config.crossover_count(), 130);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrkgaConfig {
    /// Number of random keys per chromosome (`n`).
    pub chromosome_length: usize,

    /// Number of chromosomes in each population (`p`).
    pub population_size: usize,

    /// Fraction of each population kept as elite (0.10–0.25 typical).
    pub elite_fraction: f64,

    /// Fraction of each population replaced by random mutants (0.10–0.30 typical).
    pub mutant_fraction: f64,

    /// Probability that an offspring inherits the elite parent's allele
    /// during biased uniform crossover (`rhoe`, 0.55–0.80 typical).
    pub elite_inheritance_prob: f64,

    /// Number of independent populations (`K`).
    pub num_populations: usize,

    /// Upper bound on decoding threads. `0` or `1` decodes in-process.
    pub max_workers: usize,

    /// Maximum number of generations executed by [`super::BrkgaRunner`].
    pub max_generations: usize,

    /// Generations between elite exchanges in [`super::BrkgaRunner`] (0 to disable).
    pub exchange_interval: usize,

    /// Elite chromosomes each population donates per exchange.
    pub exchange_count: usize,

    /// Generations with no improvement before the runner stops (0 to disable).
    pub stagnation_limit: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl BrkgaConfig {
    /// Creates a new configuration with the given chromosome length.
    pub fn new(chromosome_length: usize) -> Self {
        Self {
            chromosome_length,
            population_size: 100,
            elite_fraction: 0.20,
            mutant_fraction: 0.15,
            elite_inheritance_prob: 0.70,
            num_populations: 1,
            max_workers: 1,
            max_generations: 500,
            exchange_interval: 0,
            exchange_count: 2,
            stagnation_limit: 50,
            seed: None,
        }
    }

    pub fn with_population_size(mut self, p: usize) -> Self {
        self.population_size = p;
        self
    }

    pub fn with_elite_fraction(mut self, f: f64) -> Self {
        self.elite_fraction = f;
        self
    }

    pub fn with_mutant_fraction(mut self, f: f64) -> Self {
        self.mutant_fraction = f;
        self
    }

    pub fn with_elite_inheritance_prob(mut self, rhoe: f64) -> Self {
        self.elite_inheritance_prob = rhoe;
        self
    }

    pub fn with_num_populations(mut self, k: usize) -> Self {
        self.num_populations = k;
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Exchanges `count` elites between all populations every `interval` generations.
    pub fn with_exchange(mut self, interval: usize, count: usize) -> Self {
        self.exchange_interval = interval;
        self.exchange_count = count;
        self
    }

    pub fn with_stagnation_limit(mut self, n: usize) -> Self {
        self.stagnation_limit = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Elite set size `pe = floor(elite_fraction * p)`.
    pub fn elite_count(&self) -> usize {
        fraction_of(self.elite_fraction, self.population_size)
    }

    /// Mutant set size `pm = floor(mutant_fraction * p)`.
    pub fn mutant_count(&self) -> usize {
        fraction_of(self.mutant_fraction, self.population_size)
    }

    /// Offspring count `po = p - pe - pm`. Saturates at zero for invalid configs.
    pub fn crossover_count(&self) -> usize {
        self.population_size
            .saturating_sub(self.elite_count())
            .saturating_sub(self.mutant_count())
    }

    /// Validates the engine parameters.
    ///
    /// Runner-only settings (`max_generations`, exchange and stagnation) are
    /// checked by [`super::BrkgaRunner`] instead.
    pub fn validate(&self) -> Result<()> {
        if self.chromosome_length == 0 {
            return Err(invalid("chromosome_length must be at least 1"));
        }
        if self.population_size == 0 {
            return Err(invalid("population_size must be at least 1"));
        }
        if self.num_populations == 0 {
            return Err(invalid("num_populations must be at least 1"));
        }
        for (name, f) in [
            ("elite_fraction", self.elite_fraction),
            ("mutant_fraction", self.mutant_fraction),
        ] {
            if !f.is_finite() || f < 0.0 {
                return Err(invalid(format!("{name} must be a finite non-negative number, got {f}")));
            }
        }
        if !(0.0..=1.0).contains(&self.elite_inheritance_prob) {
            return Err(invalid(format!(
                "elite_inheritance_prob must lie in [0, 1], got {}",
                self.elite_inheritance_prob
            )));
        }

        let pe = self.elite_count();
        let pm = self.mutant_count();
        if pe == 0 {
            return Err(invalid(format!(
                "elite_fraction ({}) too small for population_size {}: no elite individuals",
                self.elite_fraction, self.population_size
            )));
        }
        if pe > self.population_size {
            return Err(invalid(format!(
                "elite set ({pe}) cannot exceed population_size ({})",
                self.population_size
            )));
        }
        if pe.saturating_add(pm) > self.population_size {
            return Err(invalid(format!(
                "elite ({pe}) + mutant ({pm}) sets cannot exceed population_size ({})",
                self.population_size
            )));
        }
        Ok(())
    }
}

fn fraction_of(fraction: f64, p: usize) -> usize {
    (fraction * p as f64).floor() as usize
}

fn invalid(msg: impl Into<String>) -> BrkgaError {
    BrkgaError::InvalidConfig(msg.into())
}
