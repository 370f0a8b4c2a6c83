use std::{collections::BTreeMap, path::PathBuf};

use clap::Args;
use serde::Serialize;
use stargrid_analysis::games::AnalyzedGame;
use stargrid_record::{GameFiles, GameRecord};

use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct InspectGameArg {
    /// Input log of the game (`<session>/in/<game>.json`)
    input: PathBuf,
    /// Output log of the game (`<session>/out/<game>.csv`)
    output_log: PathBuf,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GameReport<'a> {
    session: &'a str,
    game_id: &'a str,
    variant: &'a str,
    map_size: usize,
    number_rounds: usize,
    number_players: usize,
    players: Vec<PlayerReport<'a>>,
    observables: BTreeMap<&'static str, &'a [f64]>,
}

#[derive(Debug, Serialize)]
struct PlayerReport<'a> {
    id: &'a str,
    active: bool,
    score: i64,
    raw_score: i64,
}

pub(crate) fn run(arg: &InspectGameArg) -> anyhow::Result<()> {
    let files = GameFiles {
        output: arg.output_log.clone(),
        ..GameFiles::from_input_path(&arg.input)
    };
    let game = AnalyzedGame::new(GameRecord::open(&files)?);
    let record = game.record();

    let report = GameReport {
        session: record.session(),
        game_id: record.game_id(),
        variant: record.variant(),
        map_size: record.map_size(),
        number_rounds: record.number_rounds(),
        number_players: record.number_players(),
        players: record
            .players()
            .iter()
            .map(|player| PlayerReport {
                id: player.id(),
                active: player.is_active(),
                score: player.score(),
                raw_score: player.raw_score(),
            })
            .collect(),
        observables: game
            .observables()
            .iter()
            .map(|(observable, values)| (observable.name(), values))
            .collect(),
    };
    Output::save_json(&report, arg.output.clone())
}
