//! Flat-text persistence for populations.
//!
//! One genotype per line, genes separated by `;` within a line. The format
//! has no escaping: gene writers must not emit `;` or newlines. Trailing
//! carriage returns and blank lines are tolerated on read, so files written
//! on other platforms load unchanged.

use std::{error::Error, fmt, fs, io, path::Path};

use crate::{
    ConfigError,
    genotype::{DeserializeError, Genotype},
    population::Population,
};

/// Serializes each genotype in population order, joined with newlines.
pub fn serialize<E, W>(population: &Population<E>, mut writer: W) -> String
where
    W: FnMut(&E) -> String,
{
    population
        .genotypes()
        .iter()
        .map(|genotype| genotype.serialize(&mut writer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a population from text produced by [`serialize`].
///
/// Any malformed line aborts the parse with its 1-based line number.
pub fn deserialize<E, R, X>(text: &str, mut reader: R) -> Result<Population<E>, DecodeError<X>>
where
    R: FnMut(&str) -> Result<E, X>,
{
    let mut genotypes = Vec::new();
    // `lines` drops the trailing carriage return of CRLF endings.
    for (number, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let genotype = Genotype::deserialize(line, &mut reader).map_err(|source| {
            DecodeError::Line {
                line: number + 1,
                source,
            }
        })?;
        genotypes.push(genotype);
    }
    Population::new(genotypes).map_err(DecodeError::Config)
}

/// Writes the serialized population to a file.
pub fn save<E, W, P>(path: P, population: &Population<E>, writer: W) -> io::Result<()>
where
    W: FnMut(&E) -> String,
    P: AsRef<Path>,
{
    fs::write(path, serialize(population, writer))
}

/// Reads a population back from a file written by [`save`].
pub fn load<E, R, X, P>(path: P, reader: R) -> Result<Population<E>, LoadError<X>>
where
    R: FnMut(&str) -> Result<E, X>,
    P: AsRef<Path>,
{
    let text = fs::read_to_string(path).map_err(LoadError::Io)?;
    deserialize(&text, reader).map_err(LoadError::Decode)
}

/// Persisted text failed to decode into a population.
#[derive(Debug)]
pub enum DecodeError<X> {
    /// A genotype line failed to parse.
    Line {
        /// 1-based line number in the persisted text.
        line: usize,
        source: DeserializeError<X>,
    },
    /// The decoded genotypes do not form a valid population.
    Config(ConfigError),
}

impl<X> fmt::Display for DecodeError<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Line { line, .. } => {
                write!(f, "invalid genotype on line {line}")
            }
            DecodeError::Config(_) => {
                write!(f, "persisted text does not form a valid population")
            }
        }
    }
}

impl<X> Error for DecodeError<X>
where
    X: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecodeError::Line { source, .. } => Some(source),
            DecodeError::Config(source) => Some(source),
        }
    }
}

/// Reading a persisted population from disk failed.
#[derive(Debug)]
pub enum LoadError<X> {
    Io(io::Error),
    Decode(DecodeError<X>),
}

impl<X> fmt::Display for LoadError<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(_) => write!(f, "failed to read the persisted population"),
            LoadError::Decode(_) => write!(f, "failed to decode the persisted population"),
        }
    }
}

impl<X> Error for LoadError<X>
where
    X: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io(source) => Some(source),
            LoadError::Decode(source) => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_population() -> Population<f32> {
        let members = vec![
            Genotype::new(vec![0.5f32, -1.0]).unwrap(),
            Genotype::new(vec![0.25, 2.0]).unwrap(),
        ];
        Population::new(members).unwrap()
    }

    #[test]
    fn test_population_round_trip() {
        let population = sample_population();
        let text = serialize(&population, |gene| gene.to_string());
        assert_eq!(text, "0.5;-1\n0.25;2");

        let decoded: Population<f32> =
            deserialize(&text, |piece| piece.parse::<f32>()).unwrap();
        assert_eq!(decoded.genotypes(), population.genotypes());
    }

    #[test]
    fn test_deserialize_tolerates_carriage_returns_and_blank_lines() {
        let text = "1;2\r\n3;4\r\n\r\n";
        let population: Population<i32> =
            deserialize(text, |piece| piece.parse::<i32>()).unwrap();
        assert_eq!(population.size(), 2);
        assert_eq!(population.genotypes()[1].genes(), &[3, 4]);
    }

    #[test]
    fn test_deserialize_reports_line_number() {
        let text = "1;2\n3;x\n5;6";
        let error = deserialize::<i32, _, _>(text, |piece| piece.parse::<i32>()).unwrap_err();
        match error {
            DecodeError::Line { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source.index, 1);
            }
            DecodeError::Config(_) => panic!("expected a line error"),
        }
    }

    #[test]
    fn test_empty_text_fails_to_decode() {
        let error = deserialize::<i32, _, _>("", |piece| piece.parse::<i32>()).unwrap_err();
        assert!(matches!(
            error,
            DecodeError::Config(ConfigError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir().join("dinorun-codec-round-trip.txt");
        let population = sample_population();
        save(&path, &population, |gene| gene.to_string()).unwrap();

        let loaded: Population<f32> = load(&path, |piece| piece.parse::<f32>()).unwrap();
        assert_eq!(loaded.genotypes(), population.genotypes());
        std::fs::remove_file(&path).ok();
    }
}
