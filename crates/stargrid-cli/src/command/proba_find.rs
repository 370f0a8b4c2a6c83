use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use stargrid_analysis::{
    discovery::{self, DEFAULT_VALUE_SETS},
    summary::SeriesPoint,
};
use stargrid_stats::bootstrap::BootstrapError;

use super::args::{BootstrapArg, DataArg};
use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct ProbaFindArg {
    #[clap(flatten)]
    data: DataArg,
    #[clap(flatten)]
    bootstrap: BootstrapArg,
    /// Comma-separated cell values analyzed together; repeat for several sets
    /// (defaults to 99, then 86,85,84, then 72,71)
    #[arg(long = "values")]
    value_sets: Vec<String>,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ValueSetCurve {
    values: Vec<i64>,
    points: Vec<SeriesPoint>,
}

fn parse_value_set(text: &str) -> anyhow::Result<Vec<i64>> {
    text.split(',')
        .map(|token| {
            token
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid cell value in --values: {token}"))
        })
        .collect()
}

pub(crate) fn run(arg: &ProbaFindArg) -> anyhow::Result<()> {
    let value_sets = if arg.value_sets.is_empty() {
        DEFAULT_VALUE_SETS.iter().map(|set| set.to_vec()).collect()
    } else {
        arg.value_sets
            .iter()
            .map(|text| parse_value_set(text))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let bootstrap = arg.bootstrap.build()?;
    let groups = arg.data.load_games()?;

    let mut curves = vec![];
    for values in value_sets {
        match discovery::bootstrap_discovery(&groups, &values, &bootstrap) {
            Ok(points) => curves.push(ValueSetCurve { values, points }),
            Err(BootstrapError::EmptyUnits) => {
                log::warn!("no group has a cell valued {values:?}; skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Output::save_json(&curves, arg.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_set() {
        assert_eq!(parse_value_set("86, 85,84").unwrap(), vec![86, 85, 84]);
        assert!(parse_value_set("86,,84").is_err());
    }
}
