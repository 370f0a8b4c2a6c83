//! Per-player rating histories and behavioral classification
//!
//! A [`Player`] is one participant of one session. It collects, for every game
//! of the session, the star ratings given to each underlying cell value.
//!
//! # Classification
//!
//! The mean rating per value bucket is fitted by least squares to
//!
//! ```text
//! rating = u0 + 5 * u1 * value / 99
//! ```
//!
//! and the slope `u1` is compared with two thresholds:
//!
//! - `u1 < defector_neutral` → [`PlayerType::Defector`]
//! - `u1 > neutral_collaborator` → [`PlayerType::Collaborator`]
//! - otherwise → [`PlayerType::Neutral`]
//!
//! A player-game whose ratings cannot be fitted stays unclassified and is
//! reported as a [`ClassifyError`].

use std::collections::{BTreeMap, HashMap, hash_map::Entry};

use serde::Serialize;
use stargrid_record::{GameRecord, PlayerInfo};
use stargrid_stats::regression::{FitError, LinearFit};

use crate::games::GameGroups;

/// Highest cell value of the game; maps the value axis of the fit onto `[0, 5]`.
const MAX_VALUE: f64 = 99.0;
const MAX_STARS: f64 = 5.0;

/// Game id reported for failures on aggregated games.
pub const AGGREGATE_GAME_ID: &str = "aggregate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PlayerType {
    #[serde(rename = "def")]
    Defector,
    #[serde(rename = "neu")]
    Neutral,
    #[serde(rename = "col")]
    Collaborator,
}

impl PlayerType {
    pub const ALL: [Self; 3] = [Self::Defector, Self::Neutral, Self::Collaborator];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Defector => "def",
            Self::Neutral => "neu",
            Self::Collaborator => "col",
        }
    }

    /// Position in [`Self::ALL`], the column order of type counts.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Defector => 0,
            Self::Neutral => 1,
            Self::Collaborator => 2,
        }
    }
}

/// Slope thresholds separating the three player types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub defector_neutral: f64,
    pub neutral_collaborator: f64,
}

impl Thresholds {
    #[must_use]
    pub fn classify(&self, u1: f64) -> PlayerType {
        if u1 < self.defector_neutral {
            PlayerType::Defector
        } else if u1 > self.neutral_collaborator {
            PlayerType::Collaborator
        } else {
            PlayerType::Neutral
        }
    }
}

/// Value → bucket lookup applied to ratings before averaging.
///
/// The identity table keeps every value as its own bucket. A mapped table
/// drops values it does not list.
#[derive(Debug, Clone, Default)]
pub struct BinningTable {
    buckets: Option<BTreeMap<i64, i64>>,
}

impl BinningTable {
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_map(buckets: BTreeMap<i64, i64>) -> Self {
        Self {
            buckets: Some(buckets),
        }
    }

    #[must_use]
    pub fn bucket(&self, value: i64) -> Option<i64> {
        match &self.buckets {
            Some(buckets) => buckets.get(&value).copied(),
            None => Some(value),
        }
    }

    /// Pools ratings per bucket.
    ///
    /// With a mapped table every bucket of the table is present, possibly
    /// empty.
    #[must_use]
    pub fn bin(&self, ratings: &BTreeMap<i64, Vec<u32>>) -> BTreeMap<i64, Vec<u32>> {
        let Some(buckets) = &self.buckets else {
            return ratings.clone();
        };
        let mut binned = BTreeMap::<i64, Vec<u32>>::new();
        for (value, bucket) in buckets {
            let entry = binned.entry(*bucket).or_default();
            if let Some(stars) = ratings.get(value) {
                entry.extend(stars);
            }
        }
        binned
    }
}

/// Mean rating per bucket; empty buckets are left out.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean_ratings(binned: &BTreeMap<i64, Vec<u32>>) -> BTreeMap<i64, f64> {
    binned
        .iter()
        .filter(|(_, stars)| !stars.is_empty())
        .map(|(bucket, stars)| {
            let sum = stars.iter().map(|&s| f64::from(s)).sum::<f64>();
            (*bucket, sum / stars.len() as f64)
        })
        .collect()
}

/// Fitted parameters of the rating line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingFit {
    pub u0: f64,
    pub u1: f64,
}

impl RatingFit {
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(ratings: &BTreeMap<i64, Vec<u32>>, binning: &BinningTable) -> Result<Self, FitError> {
        let means = mean_ratings(&binning.bin(ratings));
        let line = LinearFit::least_squares(
            means
                .into_iter()
                .map(|(bucket, mean)| (MAX_STARS * bucket as f64 / MAX_VALUE, mean)),
        )?;
        Ok(Self {
            u0: line.intercept,
            u1: line.slope,
        })
    }
}

/// One player's data for one game (or the aggregate of several games).
#[derive(Debug, Clone)]
pub struct PlayerGame {
    /// Star ratings per underlying cell value, in play order
    pub ratings: BTreeMap<i64, Vec<u32>>,
    pub score: f64,
    /// Sum of the values of the opened cells
    pub raw_score: f64,
    /// 1 for the highest raw score of the game; absent on aggregates
    pub rank: Option<usize>,
    pub fit: Option<RatingFit>,
    pub player_type: Option<PlayerType>,
}

impl PlayerGame {
    /// Fits the ratings and records the resulting type.
    pub fn classify(
        &mut self,
        binning: &BinningTable,
        thresholds: &Thresholds,
    ) -> Result<PlayerType, FitError> {
        self.fit = None;
        self.player_type = None;
        let fit = RatingFit::fit(&self.ratings, binning)?;
        let player_type = thresholds.classify(fit.u1);
        self.fit = Some(fit);
        self.player_type = Some(player_type);
        Ok(player_type)
    }
}

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("player S{session} {player} in game {game_id}: {source}")]
pub struct ClassifyError {
    pub session: String,
    pub player: String,
    pub game_id: String,
    pub source: FitError,
}

#[derive(Debug, Clone)]
pub struct Player {
    session: String,
    info: PlayerInfo,
    games: BTreeMap<String, PlayerGame>,
}

impl Player {
    #[must_use]
    pub fn new(session: &str, info: PlayerInfo) -> Self {
        Self {
            session: session.to_owned(),
            info,
            games: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.info.id
    }

    #[must_use]
    pub fn info(&self) -> &PlayerInfo {
        &self.info
    }

    /// Games by game id, in ascending id order.
    #[must_use]
    pub fn games(&self) -> &BTreeMap<String, PlayerGame> {
        &self.games
    }

    /// Adds or replaces the data of one game.
    pub fn insert_game(&mut self, game_id: &str, game: PlayerGame) {
        self.games.insert(game_id.to_owned(), game);
    }

    /// Merges all games: ratings concatenated per value, scores averaged.
    ///
    /// Returns `None` for a player without games.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn aggregate(&self) -> Option<PlayerGame> {
        if self.games.is_empty() {
            return None;
        }
        let mut ratings = BTreeMap::<i64, Vec<u32>>::new();
        let mut score = 0.0;
        let mut raw_score = 0.0;
        for game in self.games.values() {
            for (value, stars) in &game.ratings {
                ratings.entry(*value).or_default().extend(stars);
            }
            score += game.score;
            raw_score += game.raw_score;
        }
        let count = self.games.len() as f64;
        Some(PlayerGame {
            ratings,
            score: score / count,
            raw_score: raw_score / count,
            rank: None,
            fit: None,
            player_type: None,
        })
    }

    /// Aggregates the games and classifies the aggregate.
    ///
    /// Returns `None` for a player without games.
    pub fn classify_aggregate(
        &self,
        binning: &BinningTable,
        thresholds: &Thresholds,
    ) -> Option<Result<PlayerGame, ClassifyError>> {
        let mut aggregate = self.aggregate()?;
        Some(match aggregate.classify(binning, thresholds) {
            Ok(_) => Ok(aggregate),
            Err(source) => Err(ClassifyError {
                session: self.session.clone(),
                player: self.info.id.clone(),
                game_id: AGGREGATE_GAME_ID.to_owned(),
                source,
            }),
        })
    }

    /// Classifies every game; failed games stay unclassified.
    pub fn classify_games(
        &mut self,
        binning: &BinningTable,
        thresholds: &Thresholds,
    ) -> Vec<ClassifyError> {
        let mut errors = vec![];
        for (game_id, game) in &mut self.games {
            if let Err(source) = game.classify(binning, thresholds) {
                let err = ClassifyError {
                    session: self.session.clone(),
                    player: self.info.id.clone(),
                    game_id: game_id.clone(),
                    source,
                };
                log::warn!("leaving unclassified: {err}");
                errors.push(err);
            }
        }
        errors
    }
}

/// Players of one session group, in order of first appearance.
///
/// Each player holds only the games of this group. A participant who played
/// with several player sets of a session appears in each of their groups; see
/// [`PlayerGroups::session_players`] for the merged view.
#[derive(Debug, Clone)]
pub struct PlayerGroup {
    pub session: String,
    pub players: Vec<Player>,
}

impl AsRef<[Player]> for PlayerGroup {
    fn as_ref(&self) -> &[Player] {
        &self.players
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerGroups {
    groups: Vec<PlayerGroup>,
}

impl PlayerGroups {
    /// Collects the players of every game group.
    #[must_use]
    pub fn from_games(games: &GameGroups) -> Self {
        let groups = games
            .groups()
            .iter()
            .map(|group| {
                let mut players = vec![];
                let mut slots = HashMap::<(String, String), usize>::new();
                for game in &group.games {
                    add_game(&mut players, &mut slots, game.record());
                }
                PlayerGroup {
                    session: group.session.clone(),
                    players,
                }
            })
            .collect();
        Self { groups }
    }

    #[must_use]
    pub fn new(groups: Vec<PlayerGroup>) -> Self {
        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[PlayerGroup] {
        &self.groups
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.groups.iter().flat_map(|group| &group.players)
    }

    /// Merges the group views into one player per `(session, id)` holding
    /// every game that player played in the session.
    ///
    /// Classifications already made on the groups are carried over.
    #[must_use]
    pub fn session_players(&self) -> Vec<Player> {
        let mut players = Vec::<Player>::new();
        let mut slots = HashMap::<(&str, &str), usize>::new();
        for player in self.players() {
            match slots.entry((player.session(), player.id())) {
                Entry::Occupied(slot) => {
                    let merged = &mut players[*slot.get()];
                    for (game_id, game) in player.games() {
                        merged.insert_game(game_id, game.clone());
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(players.len());
                    players.push(player.clone());
                }
            }
        }
        players
    }

    /// Classifies every game of every player.
    pub fn classify_all(
        &mut self,
        binning: &BinningTable,
        thresholds: &Thresholds,
    ) -> Vec<ClassifyError> {
        let errors = self
            .groups
            .iter_mut()
            .flat_map(|group| &mut group.players)
            .flat_map(|player| player.classify_games(binning, thresholds))
            .collect::<Vec<_>>();
        log::info!(
            "classified {} player-games ({} failed)",
            self.players().map(|p| p.games.len()).sum::<usize>() - errors.len(),
            errors.len()
        );
        errors
    }
}

fn add_game(
    players: &mut Vec<Player>,
    slots: &mut HashMap<(String, String), usize>,
    record: &GameRecord,
) {
    let ranks = ranks(record);
    for (trajectory, rank) in record.players().iter().zip(ranks) {
        let key = (record.session().to_owned(), trajectory.id().to_owned());
        let slot = *slots.entry(key).or_insert_with(|| {
            players.push(Player::new(record.session(), trajectory.info().clone()));
            players.len() - 1
        });

        let mut ratings = record
            .grid()
            .iter()
            .map(|&value| (value, vec![]))
            .collect::<BTreeMap<_, Vec<u32>>>();
        for (values, stars) in trajectory.values().iter().zip(trajectory.stars()) {
            for (value, star) in values.iter().zip(stars) {
                ratings.entry(*value).or_default().push(*star);
            }
        }

        #[expect(clippy::cast_precision_loss)]
        let game = PlayerGame {
            ratings,
            score: trajectory.score() as f64,
            raw_score: trajectory.raw_score() as f64,
            rank: Some(rank),
            fit: None,
            player_type: None,
        };
        players[slot].insert_game(record.game_id(), game);
    }
}

/// Rank of each listed player by decreasing raw score; ties go to the player
/// who played first, players without events last.
fn ranks(record: &GameRecord) -> Vec<usize> {
    let players = record.players();
    let mut order = (0..players.len()).collect::<Vec<_>>();
    order.sort_by_key(|&i| {
        let player = &players[i];
        (
            std::cmp::Reverse(player.raw_score()),
            player.first_event().is_none(),
            player.first_event(),
        )
    });
    let mut ranks = vec![0; players.len()];
    for (rank, i) in order.into_iter().enumerate() {
        ranks[i] = rank + 1;
    }
    ranks
}
