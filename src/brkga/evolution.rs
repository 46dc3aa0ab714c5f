//! One BRKGA generation: elite copy, biased crossover, mutants, decode, sort.

use super::dispatch::FitnessDispatcher;
use super::population::Population;
use super::types::Decoder;
use crate::error::Result;
use crate::random::RandomSource;

/// Population-shape parameters shared by every generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EvolutionParams {
    pub n: usize,
    pub p: usize,
    pub pe: usize,
    pub pm: usize,
    pub rhoe: f64,
}

impl EvolutionParams {
    pub fn po(&self) -> usize {
        self.p - self.pe - self.pm
    }
}

/// Fills `next` with the generation following the sorted population `current`.
///
/// Destination slot layout after the call:
/// - `0..pe`: elites, copied from ranks `0..pe` with their fitness
/// - `pe..p - pm`: biased crossover offspring
/// - `p - pm..p`: fresh mutants
///
/// Slots `pe..p` are decoded as one batch, then `next` is sorted. If decoding
/// fails `next` holds a partial generation and must not be published.
pub(crate) fn evolve_population<D, R>(
    current: &Population,
    next: &mut Population,
    params: &EvolutionParams,
    rng: &mut R,
    decoder: &D,
    dispatcher: &FitnessDispatcher,
) -> Result<()>
where
    D: Decoder + ?Sized,
    R: RandomSource + ?Sized,
{
    let EvolutionParams { n, p, pe, pm, rhoe } = *params;
    debug_assert_eq!(current.size(), p);
    debug_assert_eq!(next.size(), p);

    // Elites keep their fitness; they are never re-decoded.
    for rank in 0..pe {
        let slot = current.ranked_slot(rank);
        next.slot_keys_mut(rank).copy_from_slice(current.slot_keys(slot));
        next.fitness_mut()[rank] = current.slot_fitness(slot);
    }

    // Biased uniform crossover: one elite and one non-elite parent per child,
    // each allele inherited from the elite parent with probability rhoe.
    for child in pe..p - pm {
        let elite = current.slot_keys(current.ranked_slot(rng.rand_int(pe - 1)));
        let non_elite =
            current.slot_keys(current.ranked_slot(pe + rng.rand_int(p - pe - 1)));
        for (j, key) in next.slot_keys_mut(child).iter_mut().enumerate() {
            *key = if rng.rand() < rhoe {
                elite[j]
            } else {
                non_elite[j]
            };
        }
    }

    for key in next.keys_mut()[(p - pm) * n..].iter_mut() {
        *key = rng.rand();
    }

    let fitness = dispatcher.evaluate(decoder, &next.keys()[pe * n..], n)?;
    next.fitness_mut()[pe..].copy_from_slice(&fitness);

    next.sort();
    Ok(())
}

/// Fills `population` with uniformly random keys, decodes every slot and sorts.
pub(crate) fn initialize_population<D, R>(
    population: &mut Population,
    rng: &mut R,
    decoder: &D,
    dispatcher: &FitnessDispatcher,
) -> Result<()>
where
    D: Decoder + ?Sized,
    R: RandomSource + ?Sized,
{
    for key in population.keys_mut() {
        *key = rng.rand();
    }

    let fitness =
        dispatcher.evaluate(decoder, population.keys(), population.chromosome_length())?;
    population.fitness_mut().copy_from_slice(&fitness);

    population.sort();
    Ok(())
}
