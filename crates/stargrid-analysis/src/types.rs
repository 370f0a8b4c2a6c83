//! Summaries of the classified players

use std::collections::BTreeMap;

use serde::Serialize;

use crate::players::{Player, PlayerGroups, PlayerType, RatingFit};

/// Counts of `[defector, neutral, collaborator]` in one group for one game.
pub type TypeCounts = [usize; 3];

/// Composition of the groups by player type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayersTypeSummary {
    /// Players counted in the first row
    pub number_of_players: usize,
    pub order: [PlayerType; 3],
    pub fractions: Vec<f64>,
    pub means: Vec<f64>,
    /// Every row, game after game
    pub numbers: Vec<TypeCounts>,
    /// Rows of each game position, numbered from 1
    pub numbers_game: BTreeMap<usize, Vec<TypeCounts>>,
}

/// Counts the player types of the `game`-th game (in game id order) of every
/// player of a group.
///
/// Returns `None` if some player of the group has fewer games. Unclassified
/// player-games are not counted.
#[must_use]
pub fn type_counts(players: &[Player], game: usize) -> Option<TypeCounts> {
    let mut counts = [0; 3];
    for player in players {
        let player_game = player.games().values().nth(game)?;
        if let Some(player_type) = player_game.player_type {
            counts[player_type.index()] += 1;
        }
    }
    Some(counts)
}

/// Summarizes the types of the classified players, game position by game
/// position.
///
/// Returns `None` when no group has a complete row.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn players_type(groups: &PlayerGroups) -> Option<PlayersTypeSummary> {
    let max_games = groups
        .players()
        .map(|player| player.games().len())
        .max()
        .unwrap_or(0);

    let mut numbers = vec![];
    let mut numbers_game = BTreeMap::new();
    for game in 0..max_games {
        let rows = groups
            .groups()
            .iter()
            .filter_map(|group| type_counts(&group.players, game))
            .collect::<Vec<_>>();
        numbers.extend_from_slice(&rows);
        numbers_game.insert(game + 1, rows);
    }

    let number_of_players = numbers.first()?.iter().sum::<usize>();
    let rows = numbers.len() as f64;
    let means = (0..3)
        .map(|k| numbers.iter().map(|row| row[k] as f64).sum::<f64>() / rows)
        .collect::<Vec<_>>();
    let fractions = means
        .iter()
        .map(|mean| {
            if number_of_players == 0 {
                0.0
            } else {
                mean / number_of_players as f64
            }
        })
        .collect();

    Some(PlayersTypeSummary {
        number_of_players,
        order: PlayerType::ALL,
        fractions,
        means,
        numbers,
        numbers_game,
    })
}

/// Fitted parameters of every classified player-game, by increasing `u1`.
pub fn u0_u1_pairs<'a, I>(players: I) -> Vec<RatingFit>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut fits = players
        .into_iter()
        .flat_map(|player| player.games().values())
        .filter_map(|game| game.fit)
        .collect::<Vec<_>>();
    fits.sort_by(|a, b| a.u1.total_cmp(&b.u1));
    fits
}

#[cfg(test)]
mod tests {
    use stargrid_record::PlayerInfo;

    use super::*;
    use crate::players::{PlayerGame, PlayerGroup};

    fn player(id: &str, games: &[(&str, Option<PlayerType>, f64)]) -> Player {
        let mut player = Player::new(
            "0001",
            PlayerInfo {
                id: id.to_owned(),
                age: None,
                gender: None,
            },
        );
        for &(game_id, player_type, u1) in games {
            player.insert_game(
                game_id,
                PlayerGame {
                    ratings: BTreeMap::new(),
                    score: 0.0,
                    raw_score: 0.0,
                    rank: None,
                    fit: player_type.map(|_| RatingFit { u0: 1.0, u1 }),
                    player_type,
                },
            );
        }
        player
    }

    fn groups() -> PlayerGroups {
        use PlayerType::{Collaborator as Col, Defector as Def, Neutral as Neu};
        PlayerGroups::new(vec![
            PlayerGroup {
                session: "0001".to_owned(),
                players: vec![
                    player("ada", &[("g1", Some(Col), 1.2), ("g2", Some(Col), 1.5)]),
                    player("bob", &[("g1", Some(Def), -0.3), ("g2", Some(Neu), 0.4)]),
                ],
            },
            PlayerGroup {
                session: "0002".to_owned(),
                players: vec![
                    player("cid", &[("g1", Some(Neu), 0.5)]),
                    player("dan", &[("g1", None, 0.0)]),
                ],
            },
        ])
    }

    #[test]
    fn test_players_type_rows() {
        let summary = players_type(&groups()).unwrap();
        assert_eq!(summary.numbers, vec![[1, 0, 1], [0, 1, 0], [0, 1, 1]]);
        assert_eq!(summary.numbers_game[&1], vec![[1, 0, 1], [0, 1, 0]]);
        assert_eq!(summary.numbers_game[&2], vec![[0, 1, 1]]);
        assert_eq!(summary.number_of_players, 2);
        assert_eq!(summary.means, vec![1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0]);
        assert_eq!(summary.fractions[1], 1.0 / 3.0);
        assert_eq!(summary.order, PlayerType::ALL);
    }

    #[test]
    fn test_players_type_without_players() {
        assert!(players_type(&PlayerGroups::default()).is_none());
    }

    #[test]
    fn test_u0_u1_sorted_by_slope() {
        let groups = groups();
        let u1 = u0_u1_pairs(groups.players())
            .into_iter()
            .map(|fit| fit.u1)
            .collect::<Vec<_>>();
        assert_eq!(u1, vec![-0.3, 0.4, 0.5, 1.2, 1.5]);
    }
}
