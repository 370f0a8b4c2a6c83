//! Distribution of player and team scores
//!
//! Raw scores (sums of the opened cell values) are divided by the maximum
//! attainable raw score. Team scores are the mean of a game's player scores.
//! Only players who opened a cell contribute.

use serde::Serialize;
use stargrid_stats::{
    bootstrap::{Bootstrap, BootstrapError, Estimate},
    descriptive::DescriptiveStats,
    histogram::DensityHistogram,
};

use crate::{games::GameGroups, summary::EstimatePoint};

/// Maximum attainable raw score.
pub const S_MAX: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreConfig {
    /// Divisor turning raw scores into `[0, 1]` scores
    pub s_max: f64,
    /// Number of histogram centres spread over `[0, 1]`
    pub bins: usize,
    /// Width of the window counted around each centre
    pub window: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            s_max: S_MAX,
            bins: 25,
            window: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreDistribution {
    pub centers: Vec<f64>,
    pub players: PopulationSummary,
    pub teams: PopulationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopulationSummary {
    /// Density at each centre; `None` when no trial had any score
    pub density: Vec<Option<EstimatePoint>>,
    pub mean: Option<EstimatePoint>,
    pub median: Option<EstimatePoint>,
}

/// Per-trial statistics of one population.
struct TrialStats {
    density: Vec<Option<f64>>,
    mean: Option<f64>,
    median: Option<f64>,
}

impl TrialStats {
    fn new(scores: &[f64], config: &ScoreConfig) -> Self {
        let stats = DescriptiveStats::new(scores.iter().copied());
        let density = if scores.is_empty() {
            vec![None; config.bins]
        } else {
            DensityHistogram::new(scores, config.bins, 0.0, 1.0, config.window)
                .densities()
                .map(Some)
                .collect()
        };
        Self {
            density,
            mean: stats.as_ref().map(|s| s.mean),
            median: stats.as_ref().map(|s| s.median),
        }
    }
}

fn summarize(trials: &[TrialStats]) -> PopulationSummary {
    let densities = trials.iter().map(|t| t.density.as_slice()).collect::<Vec<_>>();
    PopulationSummary {
        density: Estimate::series(&densities)
            .into_iter()
            .map(|e| e.map(EstimatePoint::from))
            .collect(),
        mean: Estimate::from_trials(trials.iter().map(|t| t.mean)).map(EstimatePoint::from),
        median: Estimate::from_trials(trials.iter().map(|t| t.median)).map(EstimatePoint::from),
    }
}

/// Normalized scores of the active players of each game, per group.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn group_scores(groups: &GameGroups, s_max: f64) -> Vec<Vec<Vec<f64>>> {
    groups
        .groups()
        .iter()
        .map(|group| {
            group
                .games
                .iter()
                .map(|game| {
                    game.record()
                        .active_players()
                        .map(|player| player.raw_score() as f64 / s_max)
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// Bootstraps the score densities, means and medians over the game groups.
///
/// # Panics
///
/// Panics if `config` asks for fewer than two centres or a window narrower
/// than the spacing between centres.
#[expect(clippy::cast_precision_loss)]
pub fn bootstrap_scores(
    groups: &GameGroups,
    config: &ScoreConfig,
    bootstrap: &Bootstrap,
) -> Result<ScoreDistribution, BootstrapError> {
    let units = group_scores(groups, config.s_max);
    log::info!("bootstrapping score distribution over {} groups", units.len());

    let trials = bootstrap.resample(&units, |games: &[&Vec<f64>]| {
        let players = games.iter().flat_map(|scores| scores.iter().copied()).collect::<Vec<_>>();
        let teams = games
            .iter()
            .filter(|scores| !scores.is_empty())
            .map(|scores| scores.iter().sum::<f64>() / scores.len() as f64)
            .collect::<Vec<_>>();
        (
            TrialStats::new(&players, config),
            TrialStats::new(&teams, config),
        )
    })?;
    let (players, teams): (Vec<_>, Vec<_>) = trials.into_iter().unzip();

    let spacing = 1.0 / (config.bins.max(2) - 1) as f64;
    Ok(ScoreDistribution {
        centers: (0..config.bins).map(|i| spacing * i as f64).collect(),
        players: summarize(&players),
        teams: summarize(&teams),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{GameGroup, tests::game};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_identical_groups_give_exact_scores() {
        // ada scores 99 + 50, bob scores 10, cid never plays
        let events = [
            (1, "ada", 1, 0, 1),
            (2, "ada", 0, 1, 1),
            (1, "bob", 0, 0, 1),
        ];
        let group = |session: &str| GameGroup {
            session: session.to_owned(),
            games: vec![game(session, "g1", &["ada", "bob", "cid"], &events)],
        };
        let groups = GameGroups::new(vec![group("0001"), group("0002")]);
        let config = ScoreConfig {
            s_max: 149.0,
            ..ScoreConfig::default()
        };

        let units = group_scores(&groups, config.s_max);
        assert_eq!(units[0], vec![vec![1.0, 10.0 / 149.0]]);

        let bootstrap = Bootstrap::new(30, 11).unwrap();
        let result = bootstrap_scores(&groups, &config, &bootstrap).unwrap();
        assert_eq!(result.centers.len(), 25);
        assert!((result.centers[24] - 1.0).abs() < EPS);

        let mean = result.players.mean.unwrap();
        assert!((mean.mean - (1.0 + 10.0 / 149.0) / 2.0).abs() < EPS);
        assert!(mean.lower_err.abs() < EPS && mean.upper_err.abs() < EPS);
        let team = result.teams.median.unwrap();
        assert!((team.mean - (1.0 + 10.0 / 149.0) / 2.0).abs() < EPS);

        // one of the two player scores sits at the last centre
        let last = result.players.density[24].unwrap();
        assert!((last.mean - 0.5 / 0.15).abs() < EPS);
    }

    #[test]
    fn test_groups_without_players_leave_densities_undefined() {
        let groups = GameGroups::new(vec![GameGroup {
            session: "0001".to_owned(),
            games: vec![game("0001", "g1", &["ada"], &[])],
        }]);
        let bootstrap = Bootstrap::new(5, 0).unwrap();
        let result = bootstrap_scores(&groups, &ScoreConfig::default(), &bootstrap).unwrap();
        assert!(result.players.mean.is_none());
        assert!(result.teams.density.iter().all(Option::is_none));
    }
}
