//! Fixed-size chromosome store with a fitness ranking.
//!
//! A [`Population`] owns `p` chromosome *slots* of `n` keys each, stored in a
//! single contiguous buffer, plus one fitness value per slot. The *ranking*
//! is a permutation of slots ordered by `(fitness, slot)`; rank 0 is the
//! best chromosome. Slots never move, only the ranking does.
//!
//! The container never decodes or draws random numbers.

use crate::error::{BrkgaError, Result};

/// Fitness value of one chromosome together with the slot it lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessRecord {
    pub value: f64,
    pub slot: usize,
}

/// A population of random-key chromosomes.
#[derive(Debug, Clone)]
pub struct Population {
    n: usize,
    keys: Vec<f64>,
    fitness: Vec<f64>,
    ranking: Vec<usize>,
}

impl Population {
    /// Allocates `p` zeroed chromosomes of length `n`.
    ///
    /// Until [`sort`](Self::sort) is called the ranking is the identity.
    pub fn new(n: usize, p: usize) -> Result<Self> {
        if n == 0 {
            return Err(BrkgaError::InvalidConfig("chromosome size n cannot be zero".into()));
        }
        if p == 0 {
            return Err(BrkgaError::InvalidConfig("population size p cannot be zero".into()));
        }
        Ok(Self {
            n,
            keys: vec![0.0; n * p],
            fitness: vec![0.0; p],
            ranking: (0..p).collect(),
        })
    }

    /// Number of keys per chromosome.
    pub fn chromosome_length(&self) -> usize {
        self.n
    }

    /// Number of chromosomes.
    pub fn size(&self) -> usize {
        self.fitness.len()
    }

    /// Returns allele `gene` of the chromosome stored at `slot`.
    pub fn allele(&self, slot: usize, gene: usize) -> Result<f64> {
        let at = self.allele_index(slot, gene)?;
        Ok(self.keys[at])
    }

    /// Overwrites allele `gene` of the chromosome stored at `slot`.
    pub fn set_allele(&mut self, slot: usize, gene: usize, value: f64) -> Result<()> {
        let at = self.allele_index(slot, gene)?;
        self.keys[at] = value;
        Ok(())
    }

    /// Returns the chromosome at `rank` (0 = best after the last sort).
    pub fn chromosome(&self, rank: usize) -> Result<&[f64]> {
        let slot = self.slot_of_rank(rank)?;
        Ok(self.slot_keys(slot))
    }

    /// Returns the chromosome stored at `slot`, ignoring the ranking.
    pub fn chromosome_at_slot(&self, slot: usize) -> Result<&[f64]> {
        self.check_slot(slot)?;
        Ok(self.slot_keys(slot))
    }

    /// Replaces every key of the chromosome stored at `slot`.
    pub fn set_chromosome(&mut self, slot: usize, keys: &[f64]) -> Result<()> {
        self.check_slot(slot)?;
        if keys.len() != self.n {
            return Err(BrkgaError::InvalidArgument(format!(
                "chromosome has {} keys, expected {}",
                keys.len(),
                self.n
            )));
        }
        self.slot_keys_mut(slot).copy_from_slice(keys);
        Ok(())
    }

    /// Returns the fitness at `rank`.
    pub fn fitness(&self, rank: usize) -> Result<f64> {
        let slot = self.slot_of_rank(rank)?;
        Ok(self.fitness[slot])
    }

    /// Sets the fitness of the chromosome stored at `slot`.
    ///
    /// The ranking is stale until the next [`sort`](Self::sort).
    pub fn set_fitness(&mut self, slot: usize, value: f64) -> Result<()> {
        self.check_slot(slot)?;
        self.fitness[slot] = value;
        Ok(())
    }

    /// Returns the fitness record at `rank`.
    pub fn record(&self, rank: usize) -> Result<FitnessRecord> {
        let slot = self.slot_of_rank(rank)?;
        Ok(FitnessRecord {
            value: self.fitness[slot],
            slot,
        })
    }

    /// Fitness of the rank-0 chromosome.
    pub fn best_fitness(&self) -> f64 {
        self.fitness[self.ranking[0]]
    }

    /// The rank-0 chromosome.
    pub fn best_chromosome(&self) -> &[f64] {
        self.slot_keys(self.ranking[0])
    }

    /// Iterates `(record, keys)` pairs from best to worst.
    pub fn ranked(&self) -> impl Iterator<Item = (FitnessRecord, &[f64])> + '_ {
        self.ranking.iter().map(move |&slot| {
            (
                FitnessRecord {
                    value: self.fitness[slot],
                    slot,
                },
                self.slot_keys(slot),
            )
        })
    }

    /// Re-ranks chromosomes ascending by `(fitness, slot)`.
    ///
    /// Equal fitness values keep the lower slot first, so the ranking is a
    /// pure function of the stored values. NaN sorts after every number.
    pub fn sort(&mut self) {
        let fitness = &self.fitness;
        self.ranking
            .sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]).then(a.cmp(&b)));
    }

    /// Contiguous key buffer, slot-major.
    pub(crate) fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub(crate) fn keys_mut(&mut self) -> &mut [f64] {
        &mut self.keys
    }

    pub(crate) fn fitness_mut(&mut self) -> &mut [f64] {
        &mut self.fitness
    }

    pub(crate) fn slot_fitness(&self, slot: usize) -> f64 {
        self.fitness[slot]
    }

    /// Slot holding `rank`, without bounds reporting.
    pub(crate) fn ranked_slot(&self, rank: usize) -> usize {
        self.ranking[rank]
    }

    pub(crate) fn slot_keys(&self, slot: usize) -> &[f64] {
        &self.keys[slot * self.n..(slot + 1) * self.n]
    }

    pub(crate) fn slot_keys_mut(&mut self, slot: usize) -> &mut [f64] {
        let n = self.n;
        &mut self.keys[slot * n..(slot + 1) * n]
    }

    fn slot_of_rank(&self, rank: usize) -> Result<usize> {
        self.ranking
            .get(rank)
            .copied()
            .ok_or_else(|| BrkgaError::out_of_bounds("rank", rank, self.size()))
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.size() {
            return Err(BrkgaError::out_of_bounds("slot", slot, self.size()));
        }
        Ok(())
    }

    fn allele_index(&self, slot: usize, gene: usize) -> Result<usize> {
        self.check_slot(slot)?;
        if gene >= self.n {
            return Err(BrkgaError::out_of_bounds("gene", gene, self.n));
        }
        Ok(slot * self.n + gene)
    }
}
