//! Biased Random-Key Genetic Algorithm engine.
//!
//! Searches for a minimizer of a user-supplied objective by evolving one or
//! more independent populations of random-key chromosomes:
//!
//! - **Populations**: fixed-size chromosome stores ranked by fitness,
//!   double-buffered so a generation never reallocates.
//! - **Evolution**: elitism, biased per-gene crossover and mutant injection,
//!   with only the new individuals decoded.
//! - **Parallel decoding**: batches are decoded on a bounded worker pool and
//!   reassembled in request order.
//! - **Elite exchange**: island-model migration of the best chromosomes
//!   between populations, invoked by the caller between generations.
//!
//! The objective itself lives behind [`brkga::Decoder`] and randomness behind
//! [`random::RandomSource`]; with a fixed seed, a run is reproducible
//! bit-for-bit regardless of the worker count.
//!
//! # Example
//!
//! ```
//! use u_brkga::brkga::{BrkgaConfig, BrkgaRunner, DecodeError, Decoder};
//!
//! struct Sphere;
//!
//! impl Decoder for Sphere {
//!     fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
//!         Ok(keys.iter().map(|k| (k - 0.5).powi(2)).sum())
//!     }
//! }
//!
//! let config = BrkgaConfig::new(8)
//!     .with_population_size(60)
//!     .with_max_generations(50)
//!     .with_seed(42);
//! let result = BrkgaRunner::run(&Sphere, &config).unwrap();
//! assert!(result.best_fitness < 0.5);
//! ```

pub mod brkga;
pub mod error;
pub mod random;

pub use error::{BrkgaError, Result};
