//! Populations and the evaluate/reproduce generation cycle.
//!
//! A [`Population`] owns a fixed-size collection of genotypes, their fitness
//! scores once [`Population::evaluate`] has run, and a private random number
//! generator used for selection. Higher fitness always means a better
//! candidate.
//!
//! # Generation cycle
//!
//! 1. [`Population::evaluate`] scores every member with the caller's fitness
//!    function
//! 2. [`Population::reproduce`] builds the next generation: the fittest
//!    member is copied unchanged into slot 0 (elitism), every other slot is
//!    filled by tournament selection, crossover, and mutation
//! 3. The caller replaces the old population with the returned one
//!
//! Because the elite is carried over unmodified, the best known fitness
//! never decreases across generations under a deterministic fitness
//! function.
//!
//! # Parallel evaluation
//!
//! `evaluate` fans the fitness calls out to a pool of scoped worker threads,
//! at most [`DEFAULT_MAX_CONCURRENCY`] in flight at once (tunable per
//! population via [`Population::with_max_concurrency`], never per call).
//! Workers pull member indices from a shared atomic counter, so each
//! genotype is evaluated exactly once and the pool blocks on a join rather
//! than polling. The call returns only after every score has been recorded.
//!
//! The fitness function must be pure and thread-safe; it is invoked
//! concurrently for different genotypes, never twice for the same one.
//!
//! # Evaluation failures
//!
//! If any fitness invocation fails, the whole round fails: the error names
//! the first failing member by index and the population stays un-evaluated.
//! No member ever keeps a default or partial score, so a failed round can
//! never bias selection toward genotypes that were skipped.

use std::{
    convert::Infallible,
    error::Error,
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use rand::{Rng, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;

use crate::{ConfigError, genotype::Genotype};

/// Probability that a child's gene comes from the second parent.
const CROSSOVER_PROBABILITY: f32 = 0.45;
/// Per-gene mutation probability applied to every child.
const MUTATION_PROBABILITY: f32 = 0.125;
/// Number of members drawn (with replacement) per tournament.
const TOURNAMENT_SIZE: usize = 5;

/// Default upper bound on concurrently running fitness evaluations.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// A fixed-size collection of genotypes plus their fitness scores for one
/// generation.
#[derive(Debug, Clone)]
pub struct Population<E> {
    members: Vec<Genotype<E>>,
    fitness: Option<Vec<f32>>,
    rng: Pcg32,
    max_concurrency: usize,
}

impl<E> Population<E> {
    /// Builds a population of `size` generated genotypes, seeding the
    /// population's random number generator from the operating system.
    ///
    /// `generator` is invoked `size` times sequentially with the
    /// population's generator.
    pub fn random<G>(size: usize, generator: G) -> Result<Self, ConfigError>
    where
        G: FnMut(&mut Pcg32) -> Result<Genotype<E>, ConfigError>,
    {
        Self::random_with_rng(size, Pcg32::from_os_rng(), generator)
    }

    /// Like [`Population::random`], but fully deterministic from `seed`.
    pub fn random_with_seed<G>(size: usize, seed: u64, generator: G) -> Result<Self, ConfigError>
    where
        G: FnMut(&mut Pcg32) -> Result<Genotype<E>, ConfigError>,
    {
        Self::random_with_rng(size, Pcg32::seed_from_u64(seed), generator)
    }

    fn random_with_rng<G>(size: usize, mut rng: Pcg32, mut generator: G) -> Result<Self, ConfigError>
    where
        G: FnMut(&mut Pcg32) -> Result<Genotype<E>, ConfigError>,
    {
        if size < 1 {
            return Err(ConfigError::EmptyPopulation);
        }
        let mut members = Vec::with_capacity(size);
        for _ in 0..size {
            members.push(generator(&mut rng)?);
        }
        Self::from_members(members, rng)
    }

    /// Wraps an existing genotype collection; its length becomes the
    /// population size.
    pub fn new(genotypes: Vec<Genotype<E>>) -> Result<Self, ConfigError> {
        Self::from_members(genotypes, Pcg32::from_os_rng())
    }

    fn from_members(members: Vec<Genotype<E>>, rng: Pcg32) -> Result<Self, ConfigError> {
        let Some(first) = members.first() else {
            return Err(ConfigError::EmptyPopulation);
        };
        // A shared gene length makes crossover between any two members
        // infallible, so reproduction cannot hit a length mismatch.
        let expected = first.len();
        for member in &members {
            if member.len() != expected {
                return Err(ConfigError::MixedGenotypeLengths {
                    expected,
                    found: member.len(),
                });
            }
        }
        Ok(Self {
            members,
            fitness: None,
            rng,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        })
    }

    /// Overrides the evaluation concurrency bound for this population and
    /// its descendants.
    pub fn with_max_concurrency(mut self, limit: usize) -> Result<Self, ConfigError> {
        if limit < 1 {
            return Err(ConfigError::ZeroConcurrency);
        }
        self.max_concurrency = limit;
        Ok(self)
    }

    /// Number of members. Fixed across generations.
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// All members in position order.
    #[must_use]
    pub fn genotypes(&self) -> &[Genotype<E>] {
        &self.members
    }

    /// Fitness scores indexed consistently with [`Population::genotypes`],
    /// or `None` before the first successful evaluation.
    #[must_use]
    pub fn fitness_scores(&self) -> Option<&[f32]> {
        self.fitness.as_deref()
    }

    /// Scores every member with an infallible fitness function.
    ///
    /// See [`Population::try_evaluate`] for the concurrency contract.
    pub fn evaluate<F>(&mut self, fitness: F)
    where
        E: Sync,
        F: Fn(&Genotype<E>) -> f32 + Sync,
    {
        match self.try_evaluate(|genotype| Ok::<_, Infallible>(fitness(genotype))) {
            Ok(()) => {}
            Err(error) => match error.source {},
        }
    }

    /// Scores every member in parallel, bounded by the population's
    /// concurrency limit.
    ///
    /// Blocks until every member has been scored exactly once. On failure
    /// the population keeps no scores at all; see the module documentation
    /// for the rationale.
    pub fn try_evaluate<F, X>(&mut self, fitness: F) -> Result<(), EvaluationError<X>>
    where
        E: Sync,
        F: Fn(&Genotype<E>) -> Result<f32, X> + Sync,
        X: Send,
    {
        self.fitness = None;
        let members = &self.members;
        let workers = self.max_concurrency.min(members.len());
        let next = AtomicUsize::new(0);

        let mut collected = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut local = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(genotype) = members.get(index) else {
                                break;
                            };
                            local.push((index, fitness(genotype)));
                        }
                        local
                    })
                })
                .collect();
            let mut all = Vec::with_capacity(members.len());
            for handle in handles {
                all.extend(handle.join().expect("fitness worker panicked"));
            }
            all
        });

        collected.sort_unstable_by_key(|(index, _)| *index);
        let mut scores = Vec::with_capacity(self.members.len());
        for (index, result) in collected {
            match result {
                Ok(score) => scores.push(score),
                Err(source) => return Err(EvaluationError { index, source }),
            }
        }
        debug_assert_eq!(scores.len(), self.members.len());
        self.fitness = Some(scores);
        Ok(())
    }

    /// Returns the member with the maximum fitness score.
    ///
    /// Ties break toward the lower position.
    pub fn fittest(&self) -> Result<&Genotype<E>, NotEvaluatedError> {
        let scores = self.fitness.as_ref().ok_or(NotEvaluatedError)?;
        Ok(&self.members[best_index(scores)])
    }

    /// The maximum fitness score of the current generation.
    pub fn best_score(&self) -> Result<f32, NotEvaluatedError> {
        let scores = self.fitness.as_ref().ok_or(NotEvaluatedError)?;
        Ok(scores[best_index(scores)])
    }

    /// Summary statistics over the current generation's fitness scores.
    pub fn fitness_stats(&self) -> Result<FitnessStats, NotEvaluatedError> {
        let scores = self.fitness.as_ref().ok_or(NotEvaluatedError)?;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0;
        for &score in scores {
            min = min.min(score);
            max = max.max(score);
            sum += score;
        }
        #[expect(clippy::cast_precision_loss)]
        let mean = sum / scores.len() as f32;
        Ok(FitnessStats { min, max, mean })
    }

    /// Returns a uniformly chosen member. Does not require evaluation.
    pub fn choose(&mut self) -> &Genotype<E> {
        self.members
            .choose(&mut self.rng)
            .expect("population is never empty")
    }
}

impl<E> Population<E>
where
    E: Clone,
{
    /// Produces the next generation.
    ///
    /// Slot 0 receives an unmodified copy of the fittest member. Every
    /// other slot is filled by one tournament: draw [`TOURNAMENT_SIZE`]
    /// members uniformly with replacement, rank them by fitness, and cross
    /// the top two; the child is then mutated gene-wise with `change`.
    ///
    /// The returned population has the same size and concurrency bound,
    /// no fitness scores yet, and a generator split off from this one.
    pub fn reproduce<C>(&mut self, mut change: C) -> Result<Self, NotEvaluatedError>
    where
        C: FnMut(&E) -> E,
    {
        let scores = self.fitness.as_ref().ok_or(NotEvaluatedError)?;
        let mut next = Vec::with_capacity(self.members.len());
        next.push(self.members[best_index(scores)].clone());
        for _ in 1..self.members.len() {
            let (first, second) = tournament_pair(&self.members, scores, &mut self.rng);
            let child = first
                .crossover(&mut self.rng, CROSSOVER_PROBABILITY, second)
                .expect("population members share one gene length");
            next.push(child.mutate(&mut self.rng, MUTATION_PROBABILITY, &mut change));
        }
        Ok(Self {
            members: next,
            fitness: None,
            rng: Pcg32::from_rng(&mut self.rng),
            max_concurrency: self.max_concurrency,
        })
    }
}

/// Index of the maximum score; the first one wins on ties.
fn best_index(scores: &[f32]) -> usize {
    let mut best = 0;
    for (index, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = index;
        }
    }
    best
}

/// Draws one tournament and returns its two fittest contenders, best first.
fn tournament_pair<'a, E, R>(
    members: &'a [Genotype<E>],
    scores: &[f32],
    rng: &mut R,
) -> (&'a Genotype<E>, &'a Genotype<E>)
where
    R: Rng + ?Sized,
{
    let mut contenders: Vec<usize> = (0..TOURNAMENT_SIZE)
        .map(|_| rng.random_range(0..members.len()))
        .collect();
    contenders.sort_unstable_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    (&members[contenders[0]], &members[contenders[1]])
}

/// Summary of a generation's fitness distribution, for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

/// A selection operation ran before [`Population::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("population has not been evaluated yet")]
pub struct NotEvaluatedError;

/// A fitness invocation failed, aborting the whole evaluation round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationError<X> {
    /// Position of the first member whose evaluation failed.
    pub index: usize,
    pub source: X,
}

impl<X> fmt::Display for EvaluationError<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fitness evaluation failed for genotype {}", self.index)
    }
}

impl<X> Error for EvaluationError<X>
where
    X: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
