use std::path::PathBuf;

use clap::Args;
use stargrid_analysis::{players::RatingFit, types};

use super::args::{ClassifyArg, DataArg};
use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct PlayersU0U1Arg {
    #[clap(flatten)]
    data: DataArg,
    #[clap(flatten)]
    classify: ClassifyArg,
    /// Fit each player once over all their games of the session instead of game by game
    #[arg(long)]
    aggregate: bool,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayersU0U1Arg) -> anyhow::Result<()> {
    let games = arg.data.load_games()?;
    let players = arg.classify.load_players(&games)?;

    let fits = if arg.aggregate {
        let thresholds = arg.classify.thresholds()?;
        let binning = arg.classify.binning()?;
        let mut fits = players
            .session_players()
            .iter()
            .filter_map(|player| player.classify_aggregate(&binning, &thresholds))
            .filter_map(|result| match result {
                Ok(game) => game.fit,
                Err(err) => {
                    log::warn!("leaving unclassified: {err}");
                    None
                }
            })
            .collect::<Vec<RatingFit>>();
        fits.sort_by(|a, b| a.u1.total_cmp(&b.u1));
        fits
    } else {
        types::u0_u1_pairs(players.players())
    };

    log::info!("{} fitted parameter pairs", fits.len());
    Output::save_json(&fits, arg.output.clone())
}
