use clap::{Parser, Subcommand};

use self::{
    inspect_game::InspectGameArg, mean_number_stars::MeanNumberStarsArg,
    observables::ObservablesArg, players_type::PlayersTypeArg, players_u0_u1::PlayersU0U1Arg,
    proba_find::ProbaFindArg, scores::ScoresArg,
};

mod args;
mod inspect_game;
mod mean_number_stars;
mod observables;
mod players_type;
mod players_u0_u1;
mod proba_find;
mod scores;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Bootstrap the observable battery over session groups
    Observables(#[clap(flatten)] ObservablesArg),
    /// Bootstrap the player and team score distributions
    Scores(#[clap(flatten)] ScoresArg),
    /// Bootstrap the probability of having found high-value cells
    ProbaFind(#[clap(flatten)] ProbaFindArg),
    /// List the fitted (u0, u1) parameters of the classified player-games
    #[command(name = "players-u0-u1")]
    PlayersU0U1(#[clap(flatten)] PlayersU0U1Arg),
    /// Summarize the player types per group and game
    PlayersType(#[clap(flatten)] PlayersTypeArg),
    /// Bootstrap the mean number of stars per value bucket and player type
    MeanNumberStars(#[clap(flatten)] MeanNumberStarsArg),
    /// Parse one game and print its observables
    InspectGame(#[clap(flatten)] InspectGameArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Observables(arg) => observables::run(&arg)?,
        Mode::Scores(arg) => scores::run(&arg)?,
        Mode::ProbaFind(arg) => proba_find::run(&arg)?,
        Mode::PlayersU0U1(arg) => players_u0_u1::run(&arg)?,
        Mode::PlayersType(arg) => players_type::run(&arg)?,
        Mode::MeanNumberStars(arg) => mean_number_stars::run(&arg)?,
        Mode::InspectGame(arg) => inspect_game::run(&arg)?,
    }
    Ok(())
}
