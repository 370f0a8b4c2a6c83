//! Mean number of stars given per cell value bucket, by player type

use std::collections::BTreeMap;

use serde::Serialize;
use stargrid_stats::bootstrap::{Bootstrap, BootstrapError, Estimate};

use crate::{
    players::{BinningTable, Player, PlayerGroups, PlayerType, mean_ratings},
    summary::EstimatePoint,
};

/// Selection of player-games pooled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    Only(PlayerType),
    All,
}

impl TypeFilter {
    pub const ALL: [Self; 4] = [
        Self::Only(PlayerType::Collaborator),
        Self::Only(PlayerType::Neutral),
        Self::Only(PlayerType::Defector),
        Self::All,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Only(player_type) => player_type.name(),
            Self::All => "all",
        }
    }

    #[must_use]
    pub fn accepts(self, player_type: Option<PlayerType>) -> bool {
        match self {
            Self::Only(expected) => player_type == Some(expected),
            Self::All => true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StarsByType {
    #[serde(rename = "type")]
    pub filter: &'static str,
    pub buckets: Vec<BucketPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketPoint {
    pub bucket: i64,
    #[serde(flatten)]
    pub estimate: EstimatePoint,
}

/// Mean star rating per bucket over the player-games selected by `filter`.
///
/// Buckets without any rating map to `None`.
#[must_use]
pub fn mean_stars<'a, I>(
    players: I,
    filter: TypeFilter,
    binning: &BinningTable,
) -> BTreeMap<i64, Option<f64>>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut pooled = BTreeMap::<i64, Vec<u32>>::new();
    for game in players
        .into_iter()
        .flat_map(|player| player.games().values())
        .filter(|game| filter.accepts(game.player_type))
    {
        for (value, stars) in &game.ratings {
            pooled.entry(*value).or_default().extend(stars);
        }
    }
    let binned = binning.bin(&pooled);
    let means = mean_ratings(&binned);
    binned
        .keys()
        .map(|bucket| (*bucket, means.get(bucket).copied()))
        .collect()
}

/// Bootstraps the mean number of stars per bucket for every type filter.
pub fn bootstrap_mean_stars(
    groups: &PlayerGroups,
    binning: &BinningTable,
    bootstrap: &Bootstrap,
) -> Result<Vec<StarsByType>, BootstrapError> {
    log::info!(
        "bootstrapping mean number of stars over {} groups",
        groups.groups().len()
    );
    let trials = bootstrap.resample(groups.groups(), |players: &[&Player]| {
        TypeFilter::ALL
            .map(|filter| mean_stars(players.iter().copied(), filter, binning))
    })?;

    let result = TypeFilter::ALL
        .iter()
        .enumerate()
        .map(|(k, filter)| {
            let keyed = trials.iter().map(|trial| trial[k].clone()).collect::<Vec<_>>();
            let buckets = Estimate::keyed(&keyed)
                .into_iter()
                .filter_map(|(bucket, estimate)| {
                    Some(BucketPoint {
                        bucket,
                        estimate: estimate?.into(),
                    })
                })
                .collect();
            StarsByType {
                filter: filter.name(),
                buckets,
            }
        })
        .collect();
    Ok(result)
}
