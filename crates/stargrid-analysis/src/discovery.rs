//! Probability of having found cells of given values
//!
//! For a cell holding one of the target values, the discovery curve at round
//! `r` is the fraction of the game's players who opened the cell at least once
//! in rounds `1..=r`. Curves are averaged over all target cells of a group,
//! then bootstrapped over groups.

use std::collections::HashMap;

use stargrid_record::GameRecord;
use stargrid_stats::bootstrap::{Bootstrap, BootstrapError, Estimate};

use crate::{
    games::GameGroups,
    summary::{self, SeriesPoint},
};

/// Value sets analyzed by default: the best value, then the second and third
/// value tiers.
pub const DEFAULT_VALUE_SETS: [&[i64]; 3] = [&[99], &[86, 85, 84], &[72, 71]];

/// Discovery curves of every cell holding one of `values`, in cell order.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn discovery_curves(record: &GameRecord, values: &[i64]) -> Vec<Vec<f64>> {
    let number_rounds = record.number_rounds();
    let mut first_found = record
        .grid()
        .iter()
        .enumerate()
        .filter(|(_, value)| values.contains(*value))
        .map(|(index, _)| (index, vec![]))
        .collect::<HashMap<usize, Vec<usize>>>();

    for player in record.active_players() {
        let mut seen = HashMap::new();
        for (round, indices) in player.indices().iter().enumerate() {
            for index in indices {
                if first_found.contains_key(index) {
                    seen.entry(*index).or_insert(round);
                }
            }
        }
        for (index, round) in seen {
            if let Some(rounds) = first_found.get_mut(&index) {
                rounds.push(round);
            }
        }
    }

    let mut cells = first_found.into_iter().collect::<Vec<_>>();
    cells.sort_unstable_by_key(|(index, _)| *index);
    cells
        .into_iter()
        .map(|(_, rounds)| {
            let mut curve = vec![0.0; number_rounds];
            for round in rounds {
                for slot in &mut curve[round..] {
                    *slot += 1.0;
                }
            }
            if record.number_players() > 0 {
                let players = record.number_players() as f64;
                for slot in &mut curve {
                    *slot /= players;
                }
            }
            curve
        })
        .collect()
}

/// Mean discovery curve of each group; groups without any target cell are
/// left out.
#[must_use]
pub fn group_curves(groups: &GameGroups, values: &[i64]) -> Vec<Vec<f64>> {
    groups
        .groups()
        .iter()
        .filter_map(|group| {
            let curves = group
                .games
                .iter()
                .flat_map(|game| discovery_curves(game.record(), values))
                .collect::<Vec<_>>();
            if curves.is_empty() {
                log::debug!("session {} has no cell valued {values:?}", group.session);
                return None;
            }
            let mean = summary::elementwise_mean(curves.iter().map(Vec::as_slice));
            Some(mean.into_iter().map(|v| v.unwrap_or(0.0)).collect())
        })
        .collect()
}

/// Bootstraps the discovery curve of `values`, one resampling unit per group.
pub fn bootstrap_discovery(
    groups: &GameGroups,
    values: &[i64],
    bootstrap: &Bootstrap,
) -> Result<Vec<SeriesPoint>, BootstrapError> {
    let units = group_curves(groups, values)
        .into_iter()
        .map(|curve| [curve])
        .collect::<Vec<_>>();
    log::info!(
        "bootstrapping discovery of {values:?} over {} groups",
        units.len()
    );
    let trials = bootstrap.resample(&units, |curves: &[&Vec<f64>]| {
        summary::elementwise_mean(curves.iter().map(|c| c.as_slice()))
    })?;
    Ok(SeriesPoint::from_series(&Estimate::series(&trials)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{GameGroup, tests::game};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_curve_counts_from_first_finding() {
        // grid: (0,0)=10 (1,0)=99 (0,1)=50 (1,1)=0
        let g = game(
            "0001",
            "g1",
            &["ada", "bob", "cid", "dan"],
            &[
                (1, "ada", 1, 0, 1),
                (2, "ada", 1, 0, 1),
                (2, "bob", 1, 0, 1),
                (1, "cid", 0, 0, 1),
            ],
        );
        let curves = discovery_curves(g.record(), &[99]);
        assert_eq!(curves, vec![vec![0.25, 0.5]]);

        let curves = discovery_curves(g.record(), &[10, 50]);
        assert_eq!(curves, vec![vec![0.25, 0.25], vec![0.0, 0.0]]);
        assert!(discovery_curves(g.record(), &[42]).is_empty());
    }

    #[test]
    fn test_groups_without_target_are_skipped() {
        let g = game("0001", "g1", &["ada"], &[(2, "ada", 1, 0, 1)]);
        let groups = GameGroups::new(vec![GameGroup {
            session: "0001".to_owned(),
            games: vec![g],
        }]);
        assert_eq!(group_curves(&groups, &[99]), vec![vec![0.0, 1.0]]);
        assert!(group_curves(&groups, &[42]).is_empty());

        let bootstrap = Bootstrap::new(20, 3).unwrap();
        let points = bootstrap_discovery(&groups, &[99], &bootstrap).unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[1].mean - 1.0).abs() < EPS);
        assert!(matches!(
            bootstrap_discovery(&groups, &[42], &bootstrap),
            Err(BootstrapError::EmptyUnits)
        ));
    }
}
