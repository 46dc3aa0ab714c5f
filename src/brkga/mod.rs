//! Biased Random-Key Genetic Algorithm (BRKGA).
//!
//! BRKGA separates the evolutionary engine from the problem by using a
//! random-key representation: chromosomes are vectors of `f64` in `[0, 1)`,
//! and a user-provided **decoder** maps keys to a solution and its fitness.
//!
//! The engine handles population management (elite copy, mutant injection,
//! biased crossover, elite exchange between populations) entirely; the user
//! implements only [`Decoder`].
//!
//! # Key Types
//!
//! - [`Brkga`]: `K` double-buffered populations, `evolve` and `exchange_elite`
//! - [`Population`]: fixed-size chromosome store ranked by fitness
//! - [`FitnessDispatcher`]: sequential or bounded-parallel batch decoding
//! - [`BrkgaRunner`]: generation loop with elite exchange, stagnation and cancellation
//!
//! # References
//!
//! - Bean (1994), "Genetic algorithms and random keys for sequencing and optimization"
//! - Goncalves & Resende (2011), "Biased random-key genetic algorithms for
//!   combinatorial optimization", *J. Heuristics* 17(5), 487–525

mod config;
mod dispatch;
mod engine;
mod evolution;
mod population;
mod runner;
mod types;

pub use config::BrkgaConfig;
pub use dispatch::FitnessDispatcher;
pub use engine::Brkga;
pub use population::{FitnessRecord, Population};
pub use runner::{BrkgaRunResult, BrkgaRunner};
pub use types::{DecodeError, Decoder};
