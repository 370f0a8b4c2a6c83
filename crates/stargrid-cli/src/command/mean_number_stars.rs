use std::path::PathBuf;

use clap::Args;
use stargrid_analysis::stars;

use super::args::{BootstrapArg, ClassifyArg, DataArg};
use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct MeanNumberStarsArg {
    #[clap(flatten)]
    data: DataArg,
    #[clap(flatten)]
    classify: ClassifyArg,
    #[clap(flatten)]
    bootstrap: BootstrapArg,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &MeanNumberStarsArg) -> anyhow::Result<()> {
    let bootstrap = arg.bootstrap.build()?;
    let games = arg.data.load_games()?;
    let players = arg.classify.load_players(&games)?;
    let binning = arg.classify.binning()?;
    let result = stars::bootstrap_mean_stars(&players, &binning, &bootstrap)?;
    Output::save_json(&result, arg.output.clone())
}
