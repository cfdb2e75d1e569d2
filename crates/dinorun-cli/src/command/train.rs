use std::path::PathBuf;

use anyhow::Context as _;
use dinorun_ai::{JumpPolicy as _, NetworkPolicy, WEIGHT_COUNT, WeightCountError};
use dinorun_engine::{Emulator, World};
use dinorun_training::{Genotype, Population, codec, population::DEFAULT_MAX_CONCURRENCY};
use rand::{Rng as _, SeedableRng as _};
use rand_distr::Normal;
use rand_pcg::Pcg32;

/// Seeded emulator runs per genotype; the mean distance is the fitness.
/// Every genotype of a run faces the same courses, so scores stay
/// comparable.
const GAMES_PER_GENOTYPE: u64 = 3;

/// Evolved weights stay inside [-1, 1], matching the network's input scale.
const WEIGHT_MIN: f32 = -1.0;
const WEIGHT_MAX: f32 = 1.0;

/// Standard deviation of the Gaussian perturbation applied when a gene
/// mutates.
const MUTATION_SIGMA: f32 = 0.25;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of genotypes per generation
    #[arg(long, default_value_t = 100)]
    population_size: usize,
    /// Stop once the fittest genotype survives this distance
    #[arg(long, default_value_t = 500.0)]
    target_fitness: f32,
    /// File the final population is saved to
    #[arg(long, default_value = "network.txt")]
    output: PathBuf,
    /// Upper bound on concurrently running fitness evaluations
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    max_concurrent_evaluations: usize,
    /// Master seed for reproducible runs (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Give up after this many generations even below the target
    #[arg(long)]
    max_generations: Option<u64>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        population_size,
        target_fitness,
        output,
        max_concurrent_evaluations,
        seed,
        max_generations,
    } = arg;

    let seed = seed.unwrap_or_else(rand::random);
    eprintln!("Training with master seed {seed}");

    let mut population = Population::random_with_seed(*population_size, seed, |rng| {
        Genotype::generate(WEIGHT_COUNT, || rng.random_range(0.0f32..1.0))
    })?
    .with_max_concurrency(*max_concurrent_evaluations)?;

    let emulator = Emulator::default();
    let course_seeds: Vec<u64> = (0..GAMES_PER_GENOTYPE)
        .map(|course| seed.wrapping_add(course))
        .collect();
    let fitness = |genotype: &Genotype<f32>| -> Result<f32, WeightCountError> {
        let policy = NetworkPolicy::from_weights(genotype.genes())?;
        let total: f32 = course_seeds
            .iter()
            .map(|&course_seed| {
                emulator.run(World::with_seed(course_seed), |world| policy.decide(world))
            })
            .sum();
        #[expect(clippy::cast_precision_loss)]
        let mean = total / GAMES_PER_GENOTYPE as f32;
        Ok(mean)
    };

    let jitter = Normal::new(0.0f32, MUTATION_SIGMA).expect("sigma is positive and finite");
    let mut change_rng = Pcg32::seed_from_u64(seed.wrapping_add(GAMES_PER_GENOTYPE));
    let mut change =
        |weight: &f32| (weight + change_rng.sample(jitter)).clamp(WEIGHT_MIN, WEIGHT_MAX);

    let mut generation: u64 = 0;
    loop {
        population
            .try_evaluate(&fitness)
            .with_context(|| format!("evaluating generation {generation}"))?;

        let best = population.best_score()?;
        let stats = population.fitness_stats()?;
        eprintln!(
            "Generation {generation:4}: best {best:8.1} | mean {:8.1} | min {:8.1}",
            stats.mean, stats.min
        );

        if best >= *target_fitness {
            eprintln!("Target fitness {target_fitness} reached after {generation} generations");
            break;
        }
        if max_generations.is_some_and(|limit| generation + 1 >= limit) {
            eprintln!(
                "Stopping after {} generations without reaching {target_fitness}",
                generation + 1
            );
            break;
        }
        population = population.reproduce(&mut change)?;
        generation += 1;
    }

    codec::save(output, &population, |weight: &f32| weight.to_string())
        .with_context(|| format!("saving population to {}", output.display()))?;
    eprintln!(
        "Saved {} genotypes to {}",
        population.size(),
        output.display()
    );

    Ok(())
}
