//! Multi-population BRKGA engine.
//!
//! [`Brkga`] owns `K` independent populations, each double-buffered as a
//! `current`/`previous` pair. A generation writes `previous` from `current`
//! and then swaps the two, so no buffer is ever reallocated during a run and
//! `current` always holds the most recently sorted generation.

use super::config::BrkgaConfig;
use super::dispatch::FitnessDispatcher;
use super::evolution::{evolve_population, initialize_population, EvolutionParams};
use super::population::Population;
use super::types::Decoder;
use crate::error::{BrkgaError, Result};
use crate::random::{create_rng, RandomSource};
use rand::rngs::StdRng;
use tracing::{debug, instrument, trace};

/// BRKGA engine for minimization over `K` independent populations.
///
/// # Usage
///
/// ```
/// use u_brkga::brkga::{Brkga, BrkgaConfig, DecodeError, Decoder};
///
/// struct Sum;
///
/// impl Decoder for Sum {
///     fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
///         Ok(keys.iter().sum())
///     }
/// }
///
/// let config = BrkgaConfig::new(10)
///     .with_population_size(50)
///     .with_num_populations(2);
/// let mut engine = Brkga::with_seed(&config, Sum, 42).unwrap();
/// let before = engine.best_fitness();
/// engine.evolve(10).unwrap();
/// engine.exchange_elite(2).unwrap();
/// assert!(engine.best_fitness() <= before);
/// ```
pub struct Brkga<D: Decoder, R: RandomSource = StdRng> {
    params: EvolutionParams,
    k: usize,
    decoder: D,
    rng: R,
    dispatcher: FitnessDispatcher,
    current: Vec<Population>,
    previous: Vec<Population>,
    generation: usize,
}

impl<D: Decoder> Brkga<D, StdRng> {
    /// Creates an engine driven by a [`StdRng`] seeded with `seed`.
    pub fn with_seed(config: &BrkgaConfig, decoder: D, seed: u64) -> Result<Self> {
        Self::new(config, decoder, create_rng(seed))
    }
}

impl<D: Decoder, R: RandomSource> Brkga<D, R> {
    /// Validates `config`, allocates every population and initializes it with
    /// random keys, decoded and sorted.
    ///
    /// Fails on an invalid configuration, a worker pool that cannot be built
    /// or a decoder failure during initialization.
    pub fn new(config: &BrkgaConfig, decoder: D, rng: R) -> Result<Self> {
        config.validate()?;

        let params = EvolutionParams {
            n: config.chromosome_length,
            p: config.population_size,
            pe: config.elite_count(),
            pm: config.mutant_count(),
            rhoe: config.elite_inheritance_prob,
        };
        let k = config.num_populations;
        let dispatcher = FitnessDispatcher::new(config.max_workers)?;

        debug!(
            n = params.n,
            p = params.p,
            pe = params.pe,
            pm = params.pm,
            po = params.po(),
            rhoe = params.rhoe,
            k,
            max_workers = config.max_workers,
            "creating BRKGA engine"
        );

        let current = (0..k)
            .map(|_| Population::new(params.n, params.p))
            .collect::<Result<Vec<_>>>()?;

        let mut engine = Self {
            params,
            k,
            decoder,
            rng,
            dispatcher,
            previous: current.clone(),
            current,
            generation: 0,
        };
        for i in 0..k {
            engine.initialize(i)?;
        }
        Ok(engine)
    }

    /// Re-randomizes, decodes and sorts population `k`.
    ///
    /// The new keys are built in the spare buffer and published only once
    /// decoding succeeds; on failure population `k` is left as it was.
    pub fn initialize(&mut self, k: usize) -> Result<()> {
        self.check_population(k)?;
        self.randomize_spare(k)?;
        std::mem::swap(&mut self.current[k], &mut self.previous[k]);
        Ok(())
    }

    /// Re-initializes every population with brand new keys.
    ///
    /// Either every population is replaced or, on a decoder failure, none is.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> Result<()> {
        for i in 0..self.k {
            self.randomize_spare(i)?;
        }
        self.swap_buffers();
        self.generation = 0;
        Ok(())
    }

    /// Evolves every population for `generations` generations.
    ///
    /// Each generation is committed for all populations at once. A decoder
    /// failure aborts the call and leaves every population at the last
    /// generation that completed.
    #[instrument(level = "debug", skip(self))]
    pub fn evolve(&mut self, generations: usize) -> Result<()> {
        if generations == 0 {
            return Err(BrkgaError::InvalidArgument(
                "cannot evolve for 0 generations".into(),
            ));
        }

        for _ in 0..generations {
            for i in 0..self.k {
                evolve_population(
                    &self.current[i],
                    &mut self.previous[i],
                    &self.params,
                    &mut self.rng,
                    &self.decoder,
                    &self.dispatcher,
                )?;
            }
            self.swap_buffers();
            self.generation += 1;
            trace!(
                generation = self.generation,
                best_fitness = ?self.current.iter().map(Population::best_fitness).collect::<Vec<_>>(),
                "generation complete"
            );
        }
        Ok(())
    }

    /// Copies the `m` best chromosomes of every population into every other
    /// population, then re-sorts all of them.
    ///
    /// Each receiver loses its worst-ranked chromosomes, `m * (K - 1)` in
    /// total. Keeping `m * (K - 1) <= p - pe` leaves the receiver's elite set
    /// untouched; larger values are accepted and may displace elites.
    #[instrument(level = "debug", skip(self))]
    pub fn exchange_elite(&mut self, m: usize) -> Result<()> {
        let p = self.params.p;
        if m == 0 || m >= p {
            return Err(BrkgaError::InvalidArgument(format!(
                "exchange count must satisfy 0 < m < p ({p}), got {m}"
            )));
        }

        // Donor elites as they stand at the time of the call.
        let donors: Vec<Vec<(Vec<f64>, f64)>> = self
            .current
            .iter()
            .map(|pop| {
                pop.ranked()
                    .take(m)
                    .map(|(record, keys)| (keys.to_vec(), record.value))
                    .collect()
            })
            .collect();

        for (i, receiver) in self.current.iter_mut().enumerate() {
            let mut dest_rank = p;
            for (j, elites) in donors.iter().enumerate() {
                if j == i {
                    continue;
                }
                for (keys, value) in elites {
                    // Wraps back to rank p - 1 once m * (K - 1) exceeds p.
                    dest_rank = if dest_rank == 0 { p - 1 } else { dest_rank - 1 };
                    let slot = receiver.ranked_slot(dest_rank);
                    receiver.set_chromosome(slot, keys)?;
                    receiver.set_fitness(slot, *value)?;
                }
            }
        }

        for pop in &mut self.current {
            pop.sort();
        }
        Ok(())
    }

    /// Current (most recently sorted) generation of population `k`.
    pub fn population(&self, k: usize) -> Result<&Population> {
        self.check_population(k)?;
        Ok(&self.current[k])
    }

    /// Index of the population holding the overall best chromosome.
    ///
    /// Ties resolve to the lowest index.
    pub fn best_population(&self) -> usize {
        let mut best = 0;
        for i in 1..self.k {
            if self.current[i].best_fitness() < self.current[best].best_fitness() {
                best = i;
            }
        }
        best
    }

    /// Best chromosome across all populations.
    pub fn best_chromosome(&self) -> &[f64] {
        self.current[self.best_population()].best_chromosome()
    }

    /// Best fitness across all populations.
    pub fn best_fitness(&self) -> f64 {
        self.current[self.best_population()].best_fitness()
    }

    /// Generations evolved since construction or the last [`reset`](Self::reset).
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Chromosome length `n`.
    pub fn chromosome_length(&self) -> usize {
        self.params.n
    }

    /// Population size `p`.
    pub fn population_size(&self) -> usize {
        self.params.p
    }

    /// Elite set size `pe`.
    pub fn elite_count(&self) -> usize {
        self.params.pe
    }

    /// Mutant count `pm`.
    pub fn mutant_count(&self) -> usize {
        self.params.pm
    }

    /// Crossover offspring count `po = p - pe - pm`.
    pub fn crossover_count(&self) -> usize {
        self.params.po()
    }

    /// Elite inheritance probability `rhoe`.
    pub fn elite_inheritance_prob(&self) -> f64 {
        self.params.rhoe
    }

    /// Number of populations `K`.
    pub fn num_populations(&self) -> usize {
        self.k
    }

    /// Decoding worker bound.
    pub fn max_workers(&self) -> usize {
        self.dispatcher.max_workers()
    }

    /// The decoder this engine evaluates chromosomes with.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Fills the spare buffer of population `k` with decoded, sorted random keys.
    fn randomize_spare(&mut self, k: usize) -> Result<()> {
        initialize_population(
            &mut self.previous[k],
            &mut self.rng,
            &self.decoder,
            &self.dispatcher,
        )
    }

    fn swap_buffers(&mut self) {
        for (current, previous) in self.current.iter_mut().zip(&mut self.previous) {
            std::mem::swap(current, previous);
        }
    }

    fn check_population(&self, k: usize) -> Result<()> {
        if k >= self.k {
            return Err(BrkgaError::out_of_bounds("population", k, self.k));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brkga::DecodeError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{span, Event, Metadata, Subscriber};

    struct WeightedSum;

    impl Decoder for WeightedSum {
        fn decode(&self, keys: &[f64]) -> std::result::Result<f64, DecodeError> {
            Ok(keys.iter().enumerate().map(|(i, k)| (i + 1) as f64 * k).sum())
        }
    }

    /// Fails every call once `broken` is set.
    struct Switchable {
        broken: AtomicBool,
    }

    impl Decoder for Switchable {
        fn decode(&self, keys: &[f64]) -> std::result::Result<f64, DecodeError> {
            if self.broken.load(Ordering::Relaxed) {
                return Err("decoder offline".into());
            }
            Ok(keys.iter().sum())
        }
    }

    fn config(k: usize) -> BrkgaConfig {
        BrkgaConfig::new(6)
            .with_population_size(20)
            .with_elite_fraction(0.2)
            .with_mutant_fraction(0.1)
            .with_num_populations(k)
    }

    fn snapshot(pop: &Population) -> Vec<(Vec<f64>, f64)> {
        pop.ranked().map(|(r, keys)| (keys.to_vec(), r.value)).collect()
    }

    fn assert_sorted(pop: &Population) {
        for w in snapshot(pop).windows(2) {
            assert!(w[0].1 <= w[1].1);
        }
    }

    #[test]
    fn test_accessors() {
        let engine = Brkga::with_seed(&config(3).with_max_workers(2), WeightedSum, 1).unwrap();
        assert_eq!(engine.chromosome_length(), 6);
        assert_eq!(engine.population_size(), 20);
        assert_eq!(engine.elite_count(), 4);
        assert_eq!(engine.mutant_count(), 2);
        assert_eq!(engine.crossover_count(), 14);
        assert!((engine.elite_inheritance_prob() - 0.7).abs() < 1e-12);
        assert_eq!(engine.num_populations(), 3);
        assert_eq!(engine.max_workers(), 2);
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn test_construction_initializes_sorted_populations() {
        let engine = Brkga::with_seed(&config(2), WeightedSum, 2).unwrap();
        for k in 0..2 {
            let pop = engine.population(k).unwrap();
            assert_eq!(pop.size(), 20);
            assert_eq!(pop.chromosome_length(), 6);
            assert_sorted(pop);
        }
        assert_ne!(
            snapshot(engine.population(0).unwrap()),
            snapshot(engine.population(1).unwrap())
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = BrkgaConfig::new(4)
            .with_population_size(5)
            .with_elite_fraction(0.01);
        assert!(matches!(
            Brkga::with_seed(&cfg, WeightedSum, 1),
            Err(BrkgaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_evolve_zero_generations() {
        let mut engine = Brkga::with_seed(&config(1), WeightedSum, 3).unwrap();
        assert!(matches!(engine.evolve(0), Err(BrkgaError::InvalidArgument(_))));
    }

    #[test]
    fn test_evolve_keeps_shape_and_order() {
        let mut engine = Brkga::with_seed(&config(3), WeightedSum, 4).unwrap();
        let mut best = engine.best_fitness();
        for _ in 0..20 {
            engine.evolve(1).unwrap();
            for k in 0..3 {
                let pop = engine.population(k).unwrap();
                assert_eq!(pop.size(), 20);
                assert_eq!(pop.chromosome_length(), 6);
                assert_sorted(pop);
            }
            assert!(engine.best_fitness() <= best);
            best = engine.best_fitness();
        }
        assert_eq!(engine.generation(), 20);
    }

    #[test]
    fn test_evolve_deterministic_across_worker_counts() {
        let mut a = Brkga::with_seed(&config(2), WeightedSum, 5).unwrap();
        let mut b = Brkga::with_seed(&config(2).with_max_workers(4), WeightedSum, 5).unwrap();
        a.evolve(15).unwrap();
        b.evolve(15).unwrap();
        for k in 0..2 {
            assert_eq!(snapshot(a.population(k).unwrap()), snapshot(b.population(k).unwrap()));
        }
    }

    #[test]
    fn test_population_out_of_bounds() {
        let mut engine = Brkga::with_seed(&config(2), WeightedSum, 6).unwrap();
        assert!(matches!(
            engine.population(2),
            Err(BrkgaError::OutOfBounds { what: "population", index: 2, len: 2 })
        ));
        assert!(matches!(engine.initialize(5), Err(BrkgaError::OutOfBounds { .. })));
    }

    #[test]
    fn test_best_across_populations() {
        let mut engine = Brkga::with_seed(&config(4), WeightedSum, 7).unwrap();
        engine.evolve(3).unwrap();
        let expected = (0..4)
            .map(|k| engine.population(k).unwrap().best_fitness())
            .fold(f64::INFINITY, f64::min);
        assert_eq!(engine.best_fitness(), expected);
        assert_eq!(
            WeightedSum.decode(engine.best_chromosome()).unwrap(),
            engine.best_fitness()
        );
    }

    #[test]
    fn test_exchange_elite_bounds() {
        let mut engine = Brkga::with_seed(&config(2), WeightedSum, 8).unwrap();
        assert!(matches!(engine.exchange_elite(0), Err(BrkgaError::InvalidArgument(_))));
        assert!(matches!(engine.exchange_elite(20), Err(BrkgaError::InvalidArgument(_))));
        assert!(engine.exchange_elite(19).is_ok());
    }

    #[test]
    fn test_exchange_elite_copies_donor_elites() {
        let m = 2;
        let mut engine = Brkga::with_seed(&config(3), WeightedSum, 9).unwrap();
        engine.evolve(5).unwrap();

        let before: Vec<_> = (0..3).map(|k| snapshot(engine.population(k).unwrap())).collect();
        engine.exchange_elite(m).unwrap();

        for i in 0..3 {
            let after = snapshot(engine.population(i).unwrap());
            assert_eq!(after.len(), 20);
            assert_sorted(engine.population(i).unwrap());

            for (j, donor) in before.iter().enumerate() {
                if i == j {
                    continue;
                }
                for elite in &donor[..m] {
                    assert!(after.contains(elite), "population {i} is missing an elite of {j}");
                }
            }
            // The receiver's own elite set is untouched (m * (K - 1) <= p - pe).
            for own in &before[i][..engine.elite_count()] {
                assert!(after.contains(own));
            }
        }
    }

    #[test]
    fn test_exchange_elite_single_population_is_noop() {
        let mut engine = Brkga::with_seed(&config(1), WeightedSum, 10).unwrap();
        let before = snapshot(engine.population(0).unwrap());
        engine.exchange_elite(3).unwrap();
        assert_eq!(before, snapshot(engine.population(0).unwrap()));
    }

    #[test]
    fn test_reset_rerandomizes() {
        let mut engine = Brkga::with_seed(&config(2), WeightedSum, 11).unwrap();
        engine.evolve(4).unwrap();
        let before = snapshot(engine.population(0).unwrap());
        engine.reset().unwrap();
        assert_eq!(engine.generation(), 0);
        let after = engine.population(0).unwrap();
        assert_ne!(before, snapshot(after));
        assert_eq!(after.size(), 20);
        assert_sorted(after);
    }

    #[test]
    fn test_decoder_failure_keeps_last_generation() {
        let decoder = Switchable {
            broken: AtomicBool::new(false),
        };
        let mut engine = Brkga::with_seed(&config(1), decoder, 12).unwrap();
        engine.evolve(2).unwrap();
        let before = snapshot(engine.population(0).unwrap());

        engine.decoder().broken.store(true, Ordering::Relaxed);
        let err = engine.evolve(3).unwrap_err();
        assert!(matches!(err, BrkgaError::Decode { .. }));
        assert_eq!(engine.generation(), 2);
        assert_eq!(before, snapshot(engine.population(0).unwrap()));

        // Recovers from the last consistent state once the decoder is back.
        engine.decoder().broken.store(false, Ordering::Relaxed);
        engine.evolve(1).unwrap();
        assert_eq!(engine.generation(), 3);
        assert!(engine.best_fitness() <= before[0].1);
    }

    #[test]
    fn test_failed_generation_commits_nothing() {
        let decoder = Switchable {
            broken: AtomicBool::new(false),
        };
        let mut engine = Brkga::with_seed(&config(3), decoder, 14).unwrap();
        engine.evolve(1).unwrap();
        let before: Vec<_> = (0..3).map(|k| snapshot(engine.population(k).unwrap())).collect();

        engine.decoder().broken.store(true, Ordering::Relaxed);
        assert!(engine.evolve(1).is_err());
        for (k, expected) in before.iter().enumerate() {
            assert_eq!(expected, &snapshot(engine.population(k).unwrap()));
        }
    }

    #[test]
    fn test_failed_reset_commits_nothing() {
        let decoder = Switchable {
            broken: AtomicBool::new(false),
        };
        let mut engine = Brkga::with_seed(&config(2), decoder, 15).unwrap();
        engine.evolve(2).unwrap();
        let before: Vec<_> = (0..2).map(|k| snapshot(engine.population(k).unwrap())).collect();

        engine.decoder().broken.store(true, Ordering::Relaxed);
        assert!(matches!(engine.reset(), Err(BrkgaError::Decode { .. })));
        assert!(matches!(engine.initialize(1), Err(BrkgaError::Decode { .. })));
        assert_eq!(engine.generation(), 2);
        engine.decoder().broken.store(false, Ordering::Relaxed);

        for (k, expected) in before.iter().enumerate() {
            let pop = engine.population(k).unwrap();
            assert_eq!(expected, &snapshot(pop));
            for (record, keys) in pop.ranked() {
                assert_eq!(record.value, engine.decoder().decode(keys).unwrap());
            }
        }
        let best = engine.best_fitness();
        assert_eq!(engine.decoder().decode(engine.best_chromosome()).unwrap(), best);
    }

    #[test]
    fn test_initialize_replaces_one_population() {
        let mut engine = Brkga::with_seed(&config(2), WeightedSum, 16).unwrap();
        let before: Vec<_> = (0..2).map(|k| snapshot(engine.population(k).unwrap())).collect();
        engine.initialize(1).unwrap();
        assert_eq!(before[0], snapshot(engine.population(0).unwrap()));
        let after = engine.population(1).unwrap();
        assert_ne!(before[1], snapshot(after));
        assert_sorted(after);
    }

    /// Collects the `best_fitness` field of "generation complete" events.
    struct GenerationLog {
        best: Arc<Mutex<Vec<String>>>,
    }

    struct BestFitnessField(Option<String>);

    impl Visit for BestFitnessField {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "best_fitness" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl Subscriber for GenerationLog {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
            span::Id::from_u64(1)
        }
        fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
        fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
        fn event(&self, event: &Event<'_>) {
            let mut field = BestFitnessField(None);
            event.record(&mut field);
            if let Some(best) = field.0 {
                self.best.lock().unwrap().push(best);
            }
        }
        fn enter(&self, _: &span::Id) {}
        fn exit(&self, _: &span::Id) {}
    }

    #[test]
    fn test_generation_trace_reports_every_population() {
        let best = Arc::new(Mutex::new(Vec::new()));
        let log = GenerationLog { best: best.clone() };

        let mut engine = Brkga::with_seed(&config(3), WeightedSum, 17).unwrap();
        tracing::subscriber::with_default(log, || engine.evolve(2).unwrap());

        let best = best.lock().unwrap();
        assert_eq!(best.len(), 2);
        let per_population: Vec<String> = (0..3)
            .map(|k| format!("{:?}", engine.population(k).unwrap().best_fitness()))
            .collect();
        assert_eq!(best[1], format!("[{}]", per_population.join(", ")));
    }

    #[test]
    fn test_construction_surfaces_decoder_failure() {
        let decoder = Switchable {
            broken: AtomicBool::new(true),
        };
        assert!(matches!(
            Brkga::with_seed(&config(1), decoder, 13),
            Err(BrkgaError::Decode { index: 0, .. })
        ));
    }
}
