//! Fixed-length genotypes and their variation operators.
//!
//! A [`Genotype`] is an ordered, immutable sequence of genes. Every derived
//! genotype (via [`Genotype::mutate`] or [`Genotype::crossover`]) is a fresh
//! allocation of the same length; nothing is ever modified in place, so two
//! generations never alias each other's genes.
//!
//! Both operators draw one uniform value in `[0, 1)` per gene position, in
//! index order. Under a seeded generator the same genotype and probability
//! therefore always produce the same offspring.

use std::{error::Error, fmt};

use rand::Rng;

use crate::ConfigError;

/// Separator between genes in the serialized text form.
///
/// Gene writers must not emit this character or a newline; the format has no
/// escaping.
pub const GENE_SEPARATOR: &str = ";";

/// An ordered, fixed-length sequence of genes representing one candidate
/// solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype<E> {
    genes: Box<[E]>,
}

impl<E> Genotype<E> {
    /// Wraps an existing gene sequence.
    pub fn new(genes: Vec<E>) -> Result<Self, ConfigError> {
        if genes.is_empty() {
            return Err(ConfigError::EmptyGenotype);
        }
        Ok(Self {
            genes: genes.into_boxed_slice(),
        })
    }

    /// Builds a genotype by calling `generator` exactly `length` times, in
    /// index order.
    ///
    /// A generator closing over a seeded random number generator gets
    /// deterministic, sequential draws.
    pub fn generate<G>(length: usize, mut generator: G) -> Result<Self, ConfigError>
    where
        G: FnMut() -> E,
    {
        if length < 1 {
            return Err(ConfigError::EmptyGenotype);
        }
        let mut genes = Vec::with_capacity(length);
        for _ in 0..length {
            genes.push(generator());
        }
        Ok(Self {
            genes: genes.into_boxed_slice(),
        })
    }

    /// Number of genes. Fixed for the lifetime of the genotype.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Returns the gene at `index`.
    pub fn gene(&self, index: usize) -> Result<&E, GeneOutOfRangeError> {
        self.genes.get(index).ok_or(GeneOutOfRangeError {
            index,
            length: self.genes.len(),
        })
    }

    /// All genes in position order.
    #[must_use]
    pub fn genes(&self) -> &[E] {
        &self.genes
    }

    /// Serializes the genotype by applying `writer` to each gene in position
    /// order, joined with [`GENE_SEPARATOR`].
    pub fn serialize<W>(&self, writer: W) -> String
    where
        W: FnMut(&E) -> String,
    {
        self.genes
            .iter()
            .map(writer)
            .collect::<Vec<_>>()
            .join(GENE_SEPARATOR)
    }

    /// Parses a genotype from text produced by [`Genotype::serialize`].
    ///
    /// The resulting length equals the number of separated pieces; a failing
    /// `reader` aborts the parse with the offending gene position.
    pub fn deserialize<R, X>(text: &str, mut reader: R) -> Result<Self, DeserializeError<X>>
    where
        R: FnMut(&str) -> Result<E, X>,
    {
        let mut genes = Vec::new();
        for (index, piece) in text.split(GENE_SEPARATOR).enumerate() {
            let gene = reader(piece).map_err(|source| DeserializeError { index, source })?;
            genes.push(gene);
        }
        // `split` always yields at least one piece, so the length is valid.
        Ok(Self {
            genes: genes.into_boxed_slice(),
        })
    }
}

impl<E> Genotype<E>
where
    E: Clone,
{
    /// Returns a mutated copy of the same length.
    ///
    /// Each position independently becomes `change(old)` with the given
    /// probability and is copied unchanged otherwise. Probabilities outside
    /// `[0, 1]` behave as if clamped.
    #[must_use]
    pub fn mutate<R, C>(&self, rng: &mut R, probability: f32, mut change: C) -> Self
    where
        R: Rng + ?Sized,
        C: FnMut(&E) -> E,
    {
        let genes = self
            .genes
            .iter()
            .map(|gene| {
                if rng.random::<f32>() <= probability {
                    change(gene)
                } else {
                    gene.clone()
                }
            })
            .collect();
        Self { genes }
    }

    /// Returns a child combining genes from `self` and `other`.
    ///
    /// Each position independently takes the gene from `other` with the
    /// given probability and from `self` otherwise.
    pub fn crossover<R>(
        &self,
        rng: &mut R,
        probability: f32,
        other: &Self,
    ) -> Result<Self, LengthMismatchError>
    where
        R: Rng + ?Sized,
    {
        if self.len() != other.len() {
            return Err(LengthMismatchError {
                left: self.len(),
                right: other.len(),
            });
        }
        let genes = self
            .genes
            .iter()
            .zip(other.genes.iter())
            .map(|(own, foreign)| {
                if rng.random::<f32>() <= probability {
                    foreign.clone()
                } else {
                    own.clone()
                }
            })
            .collect();
        Ok(Self { genes })
    }
}

/// Gene lookup outside `[0, length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("gene index {index} is out of range for a genotype of length {length}")]
pub struct GeneOutOfRangeError {
    pub index: usize,
    pub length: usize,
}

/// Crossover between genotypes of different lengths. Never silently
/// truncates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("genotype lengths differ: {left} vs {right}")]
pub struct LengthMismatchError {
    pub left: usize,
    pub right: usize,
}

/// A gene reader failed while parsing serialized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeserializeError<X> {
    /// Position of the gene that failed to parse.
    pub index: usize,
    pub source: X,
}

impl<X> fmt::Display for DeserializeError<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid gene at position {}", self.index)
    }
}

impl<X> Error for DeserializeError<X>
where
    X: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_generate_calls_generator_in_index_order() {
        let mut counter = 0;
        let genotype = Genotype::generate(5, || {
            counter += 1;
            counter
        })
        .unwrap();
        assert_eq!(genotype.genes(), &[1, 2, 3, 4, 5]);
        assert_eq!(genotype.len(), 5);
    }

    #[test]
    fn test_generate_rejects_zero_length() {
        let result = Genotype::<i32>::generate(0, || 1);
        assert_eq!(result.unwrap_err(), ConfigError::EmptyGenotype);
    }

    #[test]
    fn test_new_rejects_empty_sequence() {
        let result = Genotype::<i32>::new(Vec::new());
        assert_eq!(result.unwrap_err(), ConfigError::EmptyGenotype);
    }

    #[test]
    fn test_gene_out_of_range() {
        let genotype = Genotype::new(vec![10, 20, 30]).unwrap();
        assert_eq!(*genotype.gene(2).unwrap(), 30);
        let error = genotype.gene(3).unwrap_err();
        assert_eq!(error, GeneOutOfRangeError { index: 3, length: 3 });
    }

    #[test]
    fn test_mutate_probability_zero_is_identity() {
        let genotype = Genotype::new(vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
        let mutated = genotype.mutate(&mut rng(), 0.0, |_| f32::NAN);
        assert_eq!(mutated.genes(), genotype.genes());
    }

    #[test]
    fn test_mutate_probability_one_changes_every_gene() {
        let genotype = Genotype::new(vec![1, 2, 3]).unwrap();
        let mutated = genotype.mutate(&mut rng(), 1.0, |gene| gene * 10);
        assert_eq!(mutated.genes(), &[10, 20, 30]);
    }

    #[test]
    fn test_mutate_preserves_length_and_original() {
        let genotype = Genotype::new(vec![1, 2, 3]).unwrap();
        let mutated = genotype.mutate(&mut rng(), 0.5, |gene| gene + 100);
        assert_eq!(mutated.len(), genotype.len());
        assert_eq!(genotype.genes(), &[1, 2, 3]);
    }

    #[test]
    fn test_crossover_probability_extremes() {
        let left = Genotype::new(vec![1, 2, 3]).unwrap();
        let right = Genotype::new(vec![4, 5, 6]).unwrap();

        let keep = left.crossover(&mut rng(), 0.0, &right).unwrap();
        assert_eq!(keep.genes(), left.genes());

        let take = left.crossover(&mut rng(), 1.0, &right).unwrap();
        assert_eq!(take.genes(), right.genes());
    }

    #[test]
    fn test_crossover_length_mismatch() {
        let left = Genotype::new(vec![1, 2, 3]).unwrap();
        let right = Genotype::new(vec![1, 2]).unwrap();
        let error = left.crossover(&mut rng(), 0.5, &right).unwrap_err();
        assert_eq!(error, LengthMismatchError { left: 3, right: 2 });
    }

    #[test]
    fn test_serialize_round_trip() {
        let genotype = Genotype::new(vec![0.5f32, -1.0, 0.125]).unwrap();
        let text = genotype.serialize(|gene| gene.to_string());
        assert_eq!(text, "0.5;-1;0.125");

        let decoded = Genotype::deserialize(&text, |piece| piece.parse::<f32>()).unwrap();
        assert_eq!(decoded, genotype);
    }

    #[test]
    fn test_deserialize_reports_failing_gene() {
        let error = Genotype::deserialize("1;x;3", |piece| piece.parse::<i32>()).unwrap_err();
        assert_eq!(error.index, 1);
    }
}
