//! Loaded games grouped into resampling units
//!
//! [`GameGroups::load`] turns a [`FileIndex`] into game records with their
//! observable sets attached. Games that fail to load are reported and left out,
//! so one malformed log does not abort the batch.

use std::collections::BTreeMap;

use stargrid_record::{GameRecord, LoadGameError};
use stargrid_stats::bootstrap::{Bootstrap, BootstrapError, Estimate};

use crate::{
    files::FileIndex,
    observables::{Observable, ObservableSet},
    summary::{self, SeriesPoint},
};

/// A game record with its observables.
#[derive(Debug, Clone)]
pub struct AnalyzedGame {
    record: GameRecord,
    observables: ObservableSet,
}

impl AnalyzedGame {
    #[must_use]
    pub fn new(record: GameRecord) -> Self {
        let observables = ObservableSet::compute(&record);
        Self {
            record,
            observables,
        }
    }

    #[must_use]
    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    #[must_use]
    pub fn observables(&self) -> &ObservableSet {
        &self.observables
    }
}

/// Games of one session played by one set of players.
#[derive(Debug, Clone)]
pub struct GameGroup {
    pub session: String,
    pub games: Vec<AnalyzedGame>,
}

impl AsRef<[AnalyzedGame]> for GameGroup {
    fn as_ref(&self) -> &[AnalyzedGame] {
        &self.games
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameGroups {
    groups: Vec<GameGroup>,
}

impl GameGroups {
    /// Loads every game of the index.
    ///
    /// Returns the groups that kept at least one game, and the load failures.
    #[must_use]
    pub fn load(index: &FileIndex) -> (Self, Vec<LoadGameError>) {
        let mut errors = vec![];
        let mut groups = vec![];
        for group in index.groups() {
            let mut games = vec![];
            for files in &group.games {
                match GameRecord::open(files) {
                    Ok(record) => games.push(AnalyzedGame::new(record)),
                    Err(err) => {
                        log::warn!("skipping {err}");
                        errors.push(err);
                    }
                }
            }
            if games.is_empty() {
                log::debug!("group of session {} has no loadable game", group.session);
                continue;
            }
            groups.push(GameGroup {
                session: group.session.clone(),
                games,
            });
        }

        let groups = Self::new(groups);
        log::info!(
            "loaded {} games in {} groups ({} failed)",
            groups.game_count(),
            groups.groups.len(),
            errors.len()
        );
        (groups, errors)
    }

    #[must_use]
    pub fn new(groups: Vec<GameGroup>) -> Self {
        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[GameGroup] {
        &self.groups
    }

    #[must_use]
    pub fn game_count(&self) -> usize {
        self.groups.iter().map(|group| group.games.len()).sum()
    }

    pub fn games(&self) -> impl Iterator<Item = &AnalyzedGame> + '_ {
        self.groups.iter().flat_map(|group| &group.games)
    }
}

/// Bootstraps every observable over the game groups.
///
/// Each trial takes the element-wise mean of the observable over the
/// resampled games. The result holds one point per round (or rank), numbered
/// from 1.
pub fn bootstrap_observables(
    groups: &GameGroups,
    bootstrap: &Bootstrap,
) -> Result<BTreeMap<Observable, Vec<SeriesPoint>>, BootstrapError> {
    log::info!(
        "bootstrapping {} observables over {} groups",
        Observable::ALL.len(),
        groups.groups().len()
    );
    let trials = bootstrap.resample(groups.groups(), |games: &[&AnalyzedGame]| {
        Observable::ALL
            .iter()
            .map(|&obs| summary::elementwise_mean(games.iter().map(|g| g.observables().get(obs))))
            .collect::<Vec<_>>()
    })?;

    let result = Observable::ALL
        .iter()
        .enumerate()
        .map(|(k, &obs)| {
            let series = trials
                .iter()
                .map(|trial| trial[k].as_slice())
                .collect::<Vec<_>>();
            (obs, SeriesPoint::from_series(&Estimate::series(&series)))
        })
        .collect();
    Ok(result)
}
