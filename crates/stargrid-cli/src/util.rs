use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use stargrid_analysis::players::{BinningTable, Thresholds};

/// Destination of a command's JSON result.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Pretty-prints `value` to `output_path`, or to stdout when absent.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::create(path)?,
            None => Output::Stdout(io::stdout().lock()),
        };
        output.write_json(value)?;
        log::info!("result written to {}", output.describe());
        Ok(())
    }

    fn create(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn describe(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let writer: &mut dyn Write = match self {
            Output::Stdout(writer) => writer,
            Output::File { writer, .. } => writer,
        };
        serde_json::to_writer_pretty(&mut *writer, value)
            .and_then(|()| writeln!(writer).map_err(serde_json::Error::io))
            .and_then(|()| writer.flush().map_err(serde_json::Error::io))
            .with_context(|| format!("Failed to write JSON to {}", self.describe()))
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a binning table from a JSON object mapping cell values to buckets
pub fn read_binning_file<P>(path: P) -> anyhow::Result<BinningTable>
where
    P: AsRef<Path>,
{
    let buckets: BTreeMap<i64, i64> = read_json_file("binning", path)?;
    Ok(BinningTable::from_map(buckets))
}

/// Read classification thresholds from a text file
///
/// The file holds two whitespace-separated numbers: the defector/neutral
/// threshold, then the neutral/collaborator threshold.
pub fn read_thresholds_file<P>(path: P) -> anyhow::Result<Thresholds>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read thresholds file: {}", path.display()))?;
    parse_thresholds(&text)
        .with_context(|| format!("Failed to parse thresholds file: {}", path.display()))
}

fn parse_thresholds(text: &str) -> anyhow::Result<Thresholds> {
    let values = text
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("Invalid threshold: {token}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let [defector_neutral, neutral_collaborator] = values[..] else {
        anyhow::bail!("Expected 2 thresholds, found {}", values.len());
    };
    Ok(Thresholds {
        defector_neutral,
        neutral_collaborator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thresholds() {
        let thresholds = parse_thresholds("1.5e-01\n  8.0e-01\n").unwrap();
        assert_eq!(thresholds.defector_neutral, 0.15);
        assert_eq!(thresholds.neutral_collaborator, 0.8);
        assert!(parse_thresholds("0.1").is_err());
        assert!(parse_thresholds("0.1 x").is_err());
    }

    #[test]
    fn test_read_binning_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binning.json");
        fs::write(&path, r#"{ "98": 99, "99": 99, "1": 0 }"#).unwrap();
        let binning = read_binning_file(&path).unwrap();
        assert_eq!(binning.bucket(98), Some(99));
        assert_eq!(binning.bucket(2), None);
    }
}
