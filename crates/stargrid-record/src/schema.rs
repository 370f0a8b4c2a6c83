//! Raw log formats written by the game server.
//!
//! Every played game leaves two files behind:
//!
//! ```text
//! session_0007/
//! ├─ in/<game>.json   game set-up: players, grid, round count, shuffle tables
//! └─ out/<game>.csv   one row per opened cell, in play order
//! ```
//!
//! The input file is a JSON document:
//!
//! ```json
//! {
//!   "_id": "64b0...",
//!   "players": [{ "playerPseudo": "ada", "playerAge": 31, "playerGender": "f" }],
//!   "data": {
//!     "altGameName": "Group_R1",
//!     "map": { "map": [[1, 99], [50, 7]] },
//!     "numberRounds": 20,
//!     "numberPlayers": 1,
//!     "shuffledArrays": [[[{ "x": 1, "y": 0 }, { "x": 0, "y": 0 }], [...]]]
//!   }
//! }
//! ```
//!
//! The output file is a CSV table with a header row and the columns
//! `round, player, x, y, value, stars, score` (matched by position).

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Variant tag of the game mode that shuffles the grid between rounds.
pub const SHUFFLING_VARIANT: &str = "NOMEM";

/// Game set-up as stored in the input JSON file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameInput {
    /// Database identifier of the game, when present
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Players taking part in the game
    pub players: Vec<PlayerInfo>,
    /// Game parameters
    pub data: GameData,
}

/// A participant as listed in the input file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlayerInfo {
    #[serde(rename = "playerPseudo", alias = "id")]
    pub id: String,
    #[serde(rename = "playerAge", alias = "age", default)]
    pub age: Option<u32>,
    #[serde(rename = "playerGender", alias = "gender", default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    /// Game variant tag (e.g. `Indiv_R1`, `Group_R2`, `NOMEM`)
    pub alt_game_name: String,
    pub map: MapData,
    pub number_rounds: usize,
    pub number_players: usize,
    /// Per round transition, the grid of previous-round coordinates (`[y][x]`).
    /// Only present for the shuffling variant.
    #[serde(default)]
    pub shuffled_arrays: Option<Vec<Vec<Vec<Coord>>>>,
}

impl GameData {
    #[must_use]
    pub fn is_shuffling(&self) -> bool {
        self.alt_game_name == SHUFFLING_VARIANT
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapData {
    /// Cell values, row by row
    pub map: Vec<Vec<i64>>,
}

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

/// One cell opening, as a row of the output CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameEvent {
    /// Round number, starting at 1
    pub round: usize,
    pub player: String,
    /// Column as displayed in this round
    pub x: i64,
    /// Row as displayed in this round
    pub y: i64,
    /// Value hidden under the cell
    pub value: i64,
    /// Star rating given by the player
    pub stars: u32,
    /// Score credited for this opening
    pub score: i64,
}

/// Reads output events from CSV data with a header row.
pub fn read_events<R>(reader: R) -> Result<Vec<GameEvent>, csv::Error>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    reader
        .records()
        .map(|record| record?.deserialize(None))
        .collect()
}

/// A matched pair of input and output log files for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameFiles {
    /// Session identifier (last four characters of the session directory name)
    pub session: String,
    /// Game identifier (input file stem)
    pub game_id: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl GameFiles {
    /// Derives the matching output file and identifiers from an input file
    /// located at `<session dir>/in/<game>.json`.
    ///
    /// The output file is `<session dir>/out/<game>.csv`.
    #[must_use]
    pub fn from_input_path(input: &Path) -> Self {
        let game_id = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let session_dir = input.parent().and_then(Path::parent);
        let session = session_dir
            .and_then(Path::file_name)
            .map(|name| {
                let name = name.to_string_lossy();
                let skip = name.chars().count().saturating_sub(4);
                name.chars().skip(skip).collect()
            })
            .unwrap_or_default();
        let output = session_dir
            .unwrap_or_else(|| Path::new(""))
            .join("out")
            .join(format!("{game_id}.csv"));

        Self {
            session,
            game_id,
            input: input.to_path_buf(),
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_events_by_position() {
        let csv = "round,playerId,mapX,mapY,value,numberStars,score\n\
                   1, ada, 0, 1, 50, 4, 12\n\
                   2,bob,1,0,7,0,3\n";
        let events = read_events(csv.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            GameEvent {
                round: 1,
                player: "ada".to_owned(),
                x: 0,
                y: 1,
                value: 50,
                stars: 4,
                score: 12,
            }
        );
        assert_eq!(events[1].player, "bob");
    }

    #[test]
    fn test_read_events_header_only() {
        let events = read_events("round,player,x,y,value,stars,score\n".as_bytes()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_game_files_layout() {
        let files = GameFiles::from_input_path(Path::new("/data/rule_1/session_0042/in/g17.json"));
        assert_eq!(files.session, "0042");
        assert_eq!(files.game_id, "g17");
        assert_eq!(
            files.output,
            PathBuf::from("/data/rule_1/session_0042/out/g17.csv")
        );
    }

    #[test]
    fn test_input_player_aliases() {
        let json = r#"{
            "players": [{ "playerPseudo": "ada" }, { "id": "bob", "age": 40 }],
            "data": {
                "altGameName": "NOMEM",
                "map": { "map": [[1]] },
                "numberRounds": 1,
                "numberPlayers": 2
            }
        }"#;
        let input: GameInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.players[0].id, "ada");
        assert_eq!(input.players[1].age, Some(40));
        assert!(input.data.is_shuffling());
        assert!(input.data.shuffled_arrays.is_none());
    }
}
