use std::path::PathBuf;

use clap::Args;
use stargrid_analysis::scores::{self, S_MAX, ScoreConfig};

use super::args::{BootstrapArg, DataArg};
use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct ScoresArg {
    #[clap(flatten)]
    data: DataArg,
    #[clap(flatten)]
    bootstrap: BootstrapArg,
    /// Maximum attainable raw score, used to normalize scores into [0, 1]
    #[arg(long, default_value_t = S_MAX)]
    s_max: f64,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ScoresArg) -> anyhow::Result<()> {
    if arg.s_max <= 0.0 {
        anyhow::bail!("--s-max must be positive, got {}", arg.s_max);
    }
    let bootstrap = arg.bootstrap.build()?;
    let groups = arg.data.load_games()?;
    let config = ScoreConfig {
        s_max: arg.s_max,
        ..ScoreConfig::default()
    };
    let distribution = scores::bootstrap_scores(&groups, &config, &bootstrap)?;
    Output::save_json(&distribution, arg.output.clone())
}
