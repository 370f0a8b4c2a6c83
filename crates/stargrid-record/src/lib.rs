//! Game log parsing and reconstruction
//!
//! This crate turns the raw logs written by the game server into
//! [`GameRecord`]s: per-round cell counts, per-round star sums, and per-player
//! trajectories (opened cells, their values and ratings, scores).
//!
//! # Overview
//!
//! ```text
//! in/<game>.json  ──┐
//!                   ├─ GameRecord::open ─> GameRecord
//! out/<game>.csv  ──┘     │
//!                         └─ ShuffleTable (shuffling variant only)
//! ```
//!
//! Cell indices are always expressed in the original grid layout, also for
//! the variant that shuffles the grid between rounds.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use stargrid_record::{GameFiles, GameRecord};
//!
//! let files = GameFiles::from_input_path(Path::new("data/rule_1/session_0001/in/g1.json"));
//! let record = GameRecord::open(&files)?;
//! println!("{} rounds on a {}x{} grid", record.number_rounds(), record.map_size(), record.map_size());
//! # Ok::<(), stargrid_record::LoadGameError>(())
//! ```

use std::{io, path::PathBuf};

pub use self::{
    record::{GameRecord, PlayerTrajectory},
    schema::{GameEvent, GameFiles, GameInput, PlayerInfo},
    unscramble::ShuffleTable,
};

mod record;
pub mod schema;
mod unscramble;

/// Malformed game data.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RecordError {
    #[display("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("failed to parse {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[display("grid has no rows")]
    EmptyGrid,
    #[display("grid is not square: row {row} has {len} cells for {rows} rows")]
    NonSquareGrid { rows: usize, row: usize, len: usize },
    #[display("event references round {round} but the game has {number_rounds} rounds")]
    RoundOutOfRange { round: usize, number_rounds: usize },
    #[display("event references player {player} who is not listed in the game")]
    UnknownPlayer { player: String },
    #[display("shuffle table has no entry for ({x}, {y}) in round {round}")]
    MissingShuffleEntry { round: usize, x: usize, y: usize },
    #[display("coordinate ({x}, {y}) is outside the {map_size}x{map_size} grid")]
    CoordinateOutOfRange { x: i64, y: i64, map_size: usize },
}

/// A game that could not be loaded, with the identity of the offending game.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("game S{session} {game_id}: {source}")]
pub struct LoadGameError {
    pub session: String,
    pub game_id: String,
    pub source: RecordError,
}
