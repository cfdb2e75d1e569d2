use std::path::PathBuf;

use anyhow::Context as _;
use dinorun_ai::{JumpPolicy as _, NetworkPolicy, ThresholdPolicy, WeightCountError};
use dinorun_engine::{Emulator, World};
use dinorun_training::{Genotype, Population, codec};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum PolicyKind {
    /// The fittest network of a persisted population.
    #[default]
    Evolved,
    /// The hand-written distance-threshold baseline.
    Threshold,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Persisted population to load the network from
    #[arg(long, default_value = "network.txt")]
    network: PathBuf,
    /// Which jump policy drives the run
    #[arg(long, default_value = "evolved")]
    policy: PolicyKind,
    /// World seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        network,
        policy,
        seed,
    } = arg;

    let world_seed = seed.unwrap_or_else(rand::random);
    let emulator = Emulator::default();

    let distance = match policy {
        PolicyKind::Threshold => {
            let baseline = ThresholdPolicy::default();
            emulator.run(World::with_seed(world_seed), |world| baseline.decide(world))
        }
        PolicyKind::Evolved => {
            let mut population: Population<f32> = codec::load(network, |gene| gene.parse())
                .with_context(|| format!("loading population from {}", network.display()))?;

            // Scoring the loaded population on the played course picks the
            // member that actually handles it best.
            population
                .try_evaluate(|genotype: &Genotype<f32>| -> Result<f32, WeightCountError> {
                    let policy = NetworkPolicy::from_weights(genotype.genes())?;
                    Ok(emulator.run(World::with_seed(world_seed), |world| policy.decide(world)))
                })
                .context("scoring the loaded population")?;

            let fittest = population.fittest()?;
            let policy = NetworkPolicy::from_weights(fittest.genes())?;
            emulator.run(World::with_seed(world_seed), |world| policy.decide(world))
        }
    };

    eprintln!("Seed: {world_seed}");
    println!("{distance:.1}");

    Ok(())
}
