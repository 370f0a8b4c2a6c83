use std::path::PathBuf;

use clap::Args;
use stargrid_analysis::types;

use super::args::{ClassifyArg, DataArg};
use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct PlayersTypeArg {
    #[clap(flatten)]
    data: DataArg,
    #[clap(flatten)]
    classify: ClassifyArg,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayersTypeArg) -> anyhow::Result<()> {
    let games = arg.data.load_games()?;
    let players = arg.classify.load_players(&games)?;
    let summary = types::players_type(&players)
        .ok_or_else(|| anyhow::anyhow!("No group has every player's game classified"))?;
    Output::save_json(&summary, arg.output.clone())
}
