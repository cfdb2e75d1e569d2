//! Evolutionary training engine for fixed-length genotypes.
//!
//! This crate is the domain-agnostic core of the trainer: it knows nothing
//! about the runner game or neural networks. It evolves populations of
//! [`Genotype`]s, scored by a caller-supplied fitness function, using
//! elitism plus tournament selection.
//!
//! # How Training Works
//!
//! 1. **Population** - Create a population of randomly generated genotypes
//! 2. **Evaluation** - Score every genotype with the fitness function, in
//!    parallel with a bounded number of workers
//! 3. **Selection** - Tournament selection picks two parents per child
//! 4. **Reproduction** - Crossover and mutation produce the next generation;
//!    the fittest genotype is carried over unchanged
//! 5. **Repeat** - Until the caller's fitness target is met
//!
//! The [`codec`] module persists a population as flat delimited text between
//! training runs.
//!
//! # Example
//!
//! ```
//! use dinorun_training::{Genotype, Population};
//! use rand::Rng as _;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut population = Population::random_with_seed(10, 42, |rng| {
//!     Genotype::generate(4, || rng.random::<f32>())
//! })?;
//!
//! population.evaluate(|genotype| genotype.genes().iter().sum::<f32>());
//! let best = population.fittest()?;
//! assert_eq!(best.len(), 4);
//!
//! let next = population.reproduce(|gene| -gene)?;
//! assert_eq!(next.size(), 10);
//! # Ok(())
//! # }
//! ```

pub use self::{
    genotype::Genotype,
    population::{FitnessStats, Population},
};

pub mod codec;
pub mod genotype;
pub mod population;

/// Invalid construction arguments. Fatal: callers get the error immediately
/// instead of a silently coerced value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("genotype length must be at least 1")]
    EmptyGenotype,
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("genotypes in a population must share one length: expected {expected}, found {found}")]
    MixedGenotypeLengths { expected: usize, found: usize },
    #[display("evaluation concurrency must be at least 1")]
    ZeroConcurrency,
}
