use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use crate::{
    LoadGameError, RecordError,
    schema::{self, Coord, GameEvent, GameFiles, GameInput, PlayerInfo},
    unscramble::ShuffleTable,
};

/// Play history of one player in one game.
///
/// All per-round sequences are in play order and hold original (unshuffled)
/// flat cell indices.
#[derive(Debug, Clone)]
pub struct PlayerTrajectory {
    info: PlayerInfo,
    /// Position of the player's first event in the output log
    first_event: Option<usize>,
    indices: Vec<Vec<usize>>,
    values: Vec<Vec<i64>>,
    stars: Vec<Vec<u32>>,
    score: i64,
    raw_score: i64,
}

impl PlayerTrajectory {
    fn new(info: PlayerInfo, number_rounds: usize) -> Self {
        Self {
            info,
            first_event: None,
            indices: vec![vec![]; number_rounds],
            values: vec![vec![]; number_rounds],
            stars: vec![vec![]; number_rounds],
            score: 0,
            raw_score: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.info.id
    }

    #[must_use]
    pub fn info(&self) -> &PlayerInfo {
        &self.info
    }

    /// Whether the player opened at least one cell.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.first_event.is_some()
    }

    #[must_use]
    pub fn first_event(&self) -> Option<usize> {
        self.first_event
    }

    /// Opened cell indices, per round.
    #[must_use]
    pub fn indices(&self) -> &[Vec<usize>] {
        &self.indices
    }

    /// Values of the opened cells, per round.
    #[must_use]
    pub fn values(&self) -> &[Vec<i64>] {
        &self.values
    }

    /// Star ratings given to the opened cells, per round.
    #[must_use]
    pub fn stars(&self) -> &[Vec<u32>] {
        &self.stars
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Accumulated value of the opened cells.
    #[must_use]
    pub fn raw_score(&self) -> i64 {
        self.raw_score
    }
}

/// Reconstructed state of one played game.
///
/// Built once from a matched input/output log pair and immutable afterwards.
#[derive(Debug, Clone)]
pub struct GameRecord {
    session: String,
    game_id: String,
    variant: String,
    grid: Vec<i64>,
    map_size: usize,
    number_rounds: usize,
    number_players: usize,
    cells_played: Vec<Vec<u32>>,
    stars_played: Vec<Vec<u32>>,
    players: Vec<PlayerTrajectory>,
    /// Player id to position in `players`
    player_slots: HashMap<String, usize>,
}

impl GameRecord {
    /// Loads a game from its log files.
    pub fn open(files: &GameFiles) -> Result<Self, LoadGameError> {
        let wrap = |source| LoadGameError {
            session: files.session.clone(),
            game_id: files.game_id.clone(),
            source,
        };
        let input = read_input(&files.input).map_err(wrap)?;
        let events = read_output(&files.output).map_err(wrap)?;
        let record = Self::build(&files.session, &files.game_id, input, &events).map_err(wrap)?;
        log::debug!(
            "loaded game S{} {} ({}, {} events)",
            record.session,
            record.game_id,
            record.variant,
            events.len()
        );
        Ok(record)
    }

    /// Builds a game from already parsed logs.
    ///
    /// Events are accumulated in the order given, which must be play order.
    pub fn build(
        session: &str,
        game_id: &str,
        input: GameInput,
        events: &[GameEvent],
    ) -> Result<Self, RecordError> {
        let GameInput {
            players, mut data, ..
        } = input;

        let map_size = data.map.map.len();
        if map_size == 0 {
            return Err(RecordError::EmptyGrid);
        }
        if let Some((row, cells)) = data
            .map
            .map
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != map_size)
        {
            return Err(RecordError::NonSquareGrid {
                rows: map_size,
                row,
                len: cells.len(),
            });
        }
        let grid = data.map.map.iter().flatten().copied().collect::<Vec<_>>();

        let shuffle = if data.is_shuffling() {
            Some(ShuffleTable::new(
                data.shuffled_arrays.take().unwrap_or_default(),
            ))
        } else {
            None
        };

        let number_rounds = data.number_rounds;
        let players = players
            .into_iter()
            .map(|info| PlayerTrajectory::new(info, number_rounds))
            .collect::<Vec<_>>();
        let player_slots = players
            .iter()
            .enumerate()
            .map(|(slot, player)| (player.id().to_owned(), slot))
            .collect::<HashMap<_, _>>();
        let mut record = Self {
            session: session.to_owned(),
            game_id: game_id.to_owned(),
            variant: data.alt_game_name,
            grid,
            map_size,
            number_rounds,
            number_players: data.number_players,
            cells_played: vec![vec![0; map_size * map_size]; number_rounds],
            stars_played: vec![vec![0; map_size * map_size]; number_rounds],
            players,
            player_slots,
        };

        for (position, event) in events.iter().enumerate() {
            if event.round == 0 || event.round > number_rounds {
                return Err(RecordError::RoundOutOfRange {
                    round: event.round,
                    number_rounds,
                });
            }
            let slot = *record
                .player_slots
                .get(&event.player)
                .ok_or_else(|| RecordError::UnknownPlayer {
                    player: event.player.clone(),
                })?;

            let coord = record.displayed_coord(event)?;
            let coord = match &shuffle {
                Some(table) => table.original_coordinates(event.round, coord)?,
                None => coord,
            };
            if coord.x >= map_size || coord.y >= map_size {
                return Err(RecordError::CoordinateOutOfRange {
                    x: i64::try_from(coord.x).unwrap_or(i64::MAX),
                    y: i64::try_from(coord.y).unwrap_or(i64::MAX),
                    map_size,
                });
            }
            let index = coord.y * map_size + coord.x;
            let round = event.round - 1;

            record.cells_played[round][index] += 1;
            record.stars_played[round][index] += event.stars;

            let player = &mut record.players[slot];
            player.first_event.get_or_insert(position);
            player.indices[round].push(index);
            player.values[round].push(event.value);
            player.stars[round].push(event.stars);
            player.score += event.score;
            player.raw_score += event.value;
        }

        Ok(record)
    }

    fn displayed_coord(&self, event: &GameEvent) -> Result<Coord, RecordError> {
        let out_of_range = || RecordError::CoordinateOutOfRange {
            x: event.x,
            y: event.y,
            map_size: self.map_size,
        };
        let x = usize::try_from(event.x).map_err(|_| out_of_range())?;
        let y = usize::try_from(event.y).map_err(|_| out_of_range())?;
        if x >= self.map_size || y >= self.map_size {
            return Err(out_of_range());
        }
        Ok(Coord { x, y })
    }

    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    #[must_use]
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Game variant tag.
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Cell values, flattened row by row.
    #[must_use]
    pub fn grid(&self) -> &[i64] {
        &self.grid
    }

    /// Side length of the square grid.
    #[must_use]
    pub fn map_size(&self) -> usize {
        self.map_size
    }

    #[must_use]
    pub fn number_rounds(&self) -> usize {
        self.number_rounds
    }

    /// Number of players announced in the input file.
    #[must_use]
    pub fn number_players(&self) -> usize {
        self.number_players
    }

    /// `cells_played()[round][cell]`: times the cell was opened in the round.
    #[must_use]
    pub fn cells_played(&self) -> &[Vec<u32>] {
        &self.cells_played
    }

    /// `stars_played()[round][cell]`: stars given to the cell in the round.
    #[must_use]
    pub fn stars_played(&self) -> &[Vec<u32>] {
        &self.stars_played
    }

    /// Every listed player, in input file order.
    #[must_use]
    pub fn players(&self) -> &[PlayerTrajectory] {
        &self.players
    }

    /// Players that opened at least one cell.
    pub fn active_players(&self) -> impl Iterator<Item = &PlayerTrajectory> + '_ {
        self.players.iter().filter(|player| player.is_active())
    }

    #[must_use]
    pub fn player(&self, id: &str) -> Option<&PlayerTrajectory> {
        self.player_slots.get(id).map(|&slot| &self.players[slot])
    }

    /// Sorted identifiers of the listed players.
    #[must_use]
    pub fn player_ids(&self) -> Vec<&str> {
        let mut ids = self.players.iter().map(PlayerTrajectory::id).collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }
}

fn read_input(path: &Path) -> Result<GameInput, RecordError> {
    let file = File::open(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| RecordError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_output(path: &Path) -> Result<Vec<GameEvent>, RecordError> {
    let file = File::open(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    schema::read_events(BufReader::new(file)).map_err(|source| RecordError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::schema::{GameData, MapData};

    fn player(id: &str) -> PlayerInfo {
        PlayerInfo {
            id: id.to_owned(),
            age: None,
            gender: None,
        }
    }

    fn input(variant: &str, map: Vec<Vec<i64>>, rounds: usize) -> GameInput {
        GameInput {
            id: None,
            players: vec![player("ada"), player("bob")],
            data: GameData {
                alt_game_name: variant.to_owned(),
                map: MapData { map },
                number_rounds: rounds,
                number_players: 2,
                shuffled_arrays: None,
            },
        }
    }

    fn event(round: usize, player: &str, x: i64, y: i64, value: i64, stars: u32) -> GameEvent {
        GameEvent {
            round,
            player: player.to_owned(),
            x,
            y,
            value,
            stars,
            score: value / 10,
        }
    }

    #[test]
    fn test_accumulates_in_play_order() {
        let map = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];
        let events = [
            event(1, "bob", 2, 0, 3, 1),
            event(1, "ada", 1, 1, 5, 4),
            event(1, "ada", 2, 0, 3, 2),
            event(2, "ada", 0, 2, 7, 5),
        ];
        let record = GameRecord::build("0001", "g1", input("Group_R1", map, 2), &events).unwrap();

        assert_eq!(record.map_size(), 3);
        assert_eq!(record.grid(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(record.cells_played()[0][2], 2);
        assert_eq!(record.stars_played()[0][2], 3);
        assert_eq!(record.cells_played()[1][6], 1);
        assert_eq!(record.cells_played()[1].iter().sum::<u32>(), 1);

        let ada = record.player("ada").unwrap();
        assert_eq!(ada.indices(), &[vec![4, 2], vec![6]]);
        assert_eq!(ada.values(), &[vec![5, 3], vec![7]]);
        assert_eq!(ada.stars(), &[vec![4, 2], vec![5]]);
        assert_eq!(ada.raw_score(), 15);
        assert_eq!(ada.first_event(), Some(1));
        assert_eq!(record.player("bob").unwrap().first_event(), Some(0));
    }

    #[test]
    fn test_every_player_opens_same_cells_per_round() {
        const CELLS_PER_ROUND: usize = 2;
        let map = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];
        let mut events = vec![];
        for round in 1..=3 {
            for (player, x) in [("ada", 0), ("bob", 2)] {
                for y in 0..CELLS_PER_ROUND {
                    let y = i64::try_from(y).unwrap();
                    events.push(event(round, player, x, y, 3 * y + x + 1, 1));
                }
            }
        }
        let record = GameRecord::build("0001", "g1", input("Group_R1", map, 3), &events).unwrap();

        for cells in record.cells_played() {
            let total = usize::try_from(cells.iter().sum::<u32>()).unwrap();
            assert_eq!(total, record.number_players() * CELLS_PER_ROUND);
        }
        for player in record.players() {
            for (indices, values) in player.indices().iter().zip(player.values()) {
                assert_eq!(indices.len(), values.len());
                assert_eq!(indices.len(), CELLS_PER_ROUND);
                for (&index, &value) in indices.iter().zip(values) {
                    assert_eq!(record.grid()[index], value);
                }
            }
        }
        assert_eq!(record.player("bob").unwrap().indices()[2], vec![2, 5]);
        assert!(record.player("eve").is_none());
    }

    #[test]
    fn test_empty_log_gives_zero_arrays() {
        let record =
            GameRecord::build("0001", "g1", input("Group_R1", vec![vec![1, 2], vec![3, 4]], 3), &[])
                .unwrap();
        assert_eq!(record.cells_played().len(), 3);
        assert!(record.cells_played().iter().flatten().all(|&c| c == 0));
        assert_eq!(record.active_players().count(), 0);
        assert_eq!(record.players().len(), 2);
    }

    #[test]
    fn test_rejects_non_square_grid() {
        let err = GameRecord::build("0001", "g1", input("Group_R1", vec![vec![1, 2], vec![3]], 1), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            RecordError::NonSquareGrid { rows: 2, row: 1, len: 1 }
        ));
    }

    #[test]
    fn test_rejects_undefined_round_and_player() {
        let map = vec![vec![1, 2], vec![3, 4]];
        let err = GameRecord::build(
            "0001",
            "g1",
            input("Group_R1", map.clone(), 2),
            &[event(3, "ada", 0, 0, 1, 0)],
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::RoundOutOfRange { round: 3, .. }));

        let err = GameRecord::build(
            "0001",
            "g1",
            input("Group_R1", map, 2),
            &[event(1, "eve", 0, 0, 1, 0)],
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::UnknownPlayer { .. }));
    }

    #[test]
    fn test_shuffling_variant_unscrambles() {
        let map = vec![vec![10, 20], vec![30, 40]];
        let mut input = input("NOMEM", map, 2);
        // round 2 shows the grid transposed
        input.data.shuffled_arrays = Some(vec![vec![
            vec![Coord { x: 0, y: 0 }, Coord { x: 0, y: 1 }],
            vec![Coord { x: 1, y: 0 }, Coord { x: 1, y: 1 }],
        ]]);
        let events = [event(1, "ada", 1, 0, 20, 3), event(2, "ada", 1, 0, 30, 1)];
        let record = GameRecord::build("0001", "g1", input, &events).unwrap();
        let ada = record.player("ada").unwrap();
        assert_eq!(ada.indices(), &[vec![1], vec![2]]);
        assert_eq!(record.cells_played()[1][2], 1);
    }

    #[test]
    fn test_shuffling_variant_without_table_fails_after_round_one() {
        let events = [event(2, "ada", 0, 0, 10, 0)];
        let err = GameRecord::build(
            "0001",
            "g1",
            input("NOMEM", vec![vec![10, 20], vec![30, 40]], 2),
            &events,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::MissingShuffleEntry { round: 2, .. }));
    }

    #[test]
    fn test_open_reports_game_identity() {
        let dir = tempfile::tempdir().unwrap();
        let session_dir = dir.path().join("session_0042");
        fs::create_dir_all(session_dir.join("in")).unwrap();
        fs::create_dir_all(session_dir.join("out")).unwrap();
        let input_path = session_dir.join("in").join("g9.json");
        fs::write(
            &input_path,
            r#"{"players":[{"playerPseudo":"ada"}],
                "data":{"altGameName":"Indiv_R1","map":{"map":[[1,2],[3,4]]},
                        "numberRounds":1,"numberPlayers":1}}"#,
        )
        .unwrap();
        fs::write(
            session_dir.join("out").join("g9.csv"),
            "round,player,x,y,value,stars,score\n1,ada,1,1,4,2,4\n",
        )
        .unwrap();

        let files = GameFiles::from_input_path(&input_path);
        let record = GameRecord::open(&files).unwrap();
        assert_eq!(record.session(), "0042");
        assert_eq!(record.player("ada").unwrap().indices(), &[vec![3]]);

        fs::write(
            session_dir.join("out").join("g9.csv"),
            "round,player,x,y,value,stars,score\n2,ada,1,1,4,2,4\n",
        )
        .unwrap();
        let err = GameRecord::open(&files).unwrap_err();
        assert_eq!(err.session, "0042");
        assert_eq!(err.game_id, "g9");
        assert!(err.to_string().contains("g9"));
    }
}
