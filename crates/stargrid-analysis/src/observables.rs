//! Observable battery computed from a game record
//!
//! Every observable is a per-round array derived from a [`GameRecord`]:
//!
//! | Name | Meaning |
//! |---|---|
//! | `q_`, `Q` | performance of the (cumulative) cell-opening distribution |
//! | `p_`, `P` | performance of the (cumulative) star distribution |
//! | `IPR_*` | inverse participation ratio of the matching distribution |
//! | `F_Q`, `F_P` | fidelity of the cumulative distributions to the grid values |
//! | `V3`, `V2`, `V1` | values of the 3rd best, 2nd best and best cell opened in the round |
//! | `B3`, `B2`, `B1` | cells re-opened among the previous round's 3rd best, 2nd best, best |
//! | `VB3`, `VB2`, `VB1` | running 3rd, 2nd and 1st highest values found so far |
//!
//! Per-player observables average over the players that opened at least one
//! cell. All functions are pure.
//!
//! # Examples
//!
//! ```
//! use stargrid_analysis::observables::{fractions, inverse_participation_ratio};
//!
//! let counts = vec![vec![1, 1, 2, 0], vec![0, 0, 0, 0]];
//! let fractions = fractions(&counts);
//! assert_eq!(fractions[0], vec![0.25, 0.25, 0.5, 0.0]);
//! assert_eq!(fractions[1], vec![0.0; 4]);
//!
//! let ipr = inverse_participation_ratio(&fractions);
//! assert!((ipr[0] - 1.0 / 0.375).abs() < 1e-12);
//! assert_eq!(ipr[1], 0.0);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use stargrid_record::{GameRecord, PlayerTrajectory};

/// Identifier of one observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Observable {
    CellPerformance,
    CumulativeCellPerformance,
    StarPerformance,
    CumulativeStarPerformance,
    CellIpr,
    CumulativeCellIpr,
    StarIpr,
    CumulativeStarIpr,
    CumulativeCellFidelity,
    CumulativeStarFidelity,
    ThirdBestValue,
    SecondBestValue,
    BestValue,
    ThirdBestRevisit,
    SecondBestRevisit,
    BestRevisit,
    ThirdHighestFound,
    SecondHighestFound,
    HighestFound,
}

impl Observable {
    pub const ALL: [Self; 19] = [
        Self::CellPerformance,
        Self::CumulativeCellPerformance,
        Self::StarPerformance,
        Self::CumulativeStarPerformance,
        Self::CellIpr,
        Self::CumulativeCellIpr,
        Self::StarIpr,
        Self::CumulativeStarIpr,
        Self::CumulativeCellFidelity,
        Self::CumulativeStarFidelity,
        Self::ThirdBestValue,
        Self::SecondBestValue,
        Self::BestValue,
        Self::ThirdBestRevisit,
        Self::SecondBestRevisit,
        Self::BestRevisit,
        Self::ThirdHighestFound,
        Self::SecondHighestFound,
        Self::HighestFound,
    ];

    /// Short name used in output files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CellPerformance => "q_",
            Self::CumulativeCellPerformance => "Q",
            Self::StarPerformance => "p_",
            Self::CumulativeStarPerformance => "P",
            Self::CellIpr => "IPR_q_",
            Self::CumulativeCellIpr => "IPR_Q",
            Self::StarIpr => "IPR_p_",
            Self::CumulativeStarIpr => "IPR_P",
            Self::CumulativeCellFidelity => "F_Q",
            Self::CumulativeStarFidelity => "F_P",
            Self::ThirdBestValue => "V3",
            Self::SecondBestValue => "V2",
            Self::BestValue => "V1",
            Self::ThirdBestRevisit => "B3",
            Self::SecondBestRevisit => "B2",
            Self::BestRevisit => "B1",
            Self::ThirdHighestFound => "VB3",
            Self::SecondHighestFound => "VB2",
            Self::HighestFound => "VB1",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|obs| obs.name() == name)
    }
}

impl Serialize for Observable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

/// Per-round values for the three top ranks, ordered (3rd, 2nd, best).
#[derive(Debug, Clone, PartialEq)]
pub struct RankSeries {
    pub third: Vec<f64>,
    pub second: Vec<f64>,
    pub best: Vec<f64>,
}

impl RankSeries {
    fn zeros(number_rounds: usize) -> Self {
        Self {
            third: vec![0.0; number_rounds],
            second: vec![0.0; number_rounds],
            best: vec![0.0; number_rounds],
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn divide(mut self, count: usize) -> Self {
        if count > 0 {
            let count = count as f64;
            for v in self
                .third
                .iter_mut()
                .chain(&mut self.second)
                .chain(&mut self.best)
            {
                *v /= count;
            }
        }
        self
    }
}

/// Borrowed per-round play sequences of one player.
#[derive(Debug, Clone, Copy)]
pub struct Trajectory<'a> {
    pub indices: &'a [Vec<usize>],
    pub values: &'a [Vec<i64>],
}

impl<'a> From<&'a PlayerTrajectory> for Trajectory<'a> {
    fn from(player: &'a PlayerTrajectory) -> Self {
        Self {
            indices: player.indices(),
            values: player.values(),
        }
    }
}

/// All observables of one game.
#[derive(Debug, Clone)]
pub struct ObservableSet {
    values: BTreeMap<Observable, Vec<f64>>,
}

impl ObservableSet {
    /// Computes the whole battery for a game.
    #[must_use]
    pub fn compute(record: &GameRecord) -> Self {
        let grid = record.grid();
        let number_rounds = record.number_rounds();

        let q = fractions(record.cells_played());
        let cumulative_q = cumulative_fractions(record.cells_played());
        let p = fractions(record.stars_played());
        let cumulative_p = cumulative_fractions(record.stars_played());

        let top3 = top_mean(grid, 3);
        let top1 = top_mean(grid, 1);

        let trajectories = record
            .active_players()
            .map(Trajectory::from)
            .collect::<Vec<_>>();
        let best = best_cell_values(&trajectories, number_rounds);
        let revisit = revisit_probability(&trajectories, number_rounds);
        let highest = highest_value_cells_found(&trajectories, number_rounds);

        let values = BTreeMap::from([
            (Observable::CellPerformance, performance(&q, grid, top3)),
            (
                Observable::CumulativeCellPerformance,
                performance(&cumulative_q, grid, top3),
            ),
            (Observable::StarPerformance, performance(&p, grid, top1)),
            (
                Observable::CumulativeStarPerformance,
                performance(&cumulative_p, grid, top1),
            ),
            (Observable::CellIpr, inverse_participation_ratio(&q)),
            (
                Observable::CumulativeCellIpr,
                inverse_participation_ratio(&cumulative_q),
            ),
            (Observable::StarIpr, inverse_participation_ratio(&p)),
            (
                Observable::CumulativeStarIpr,
                inverse_participation_ratio(&cumulative_p),
            ),
            (
                Observable::CumulativeCellFidelity,
                fidelity(&cumulative_q, grid),
            ),
            (
                Observable::CumulativeStarFidelity,
                fidelity(&cumulative_p, grid),
            ),
            (Observable::ThirdBestValue, best.third),
            (Observable::SecondBestValue, best.second),
            (Observable::BestValue, best.best),
            (Observable::ThirdBestRevisit, revisit.third),
            (Observable::SecondBestRevisit, revisit.second),
            (Observable::BestRevisit, revisit.best),
            (Observable::ThirdHighestFound, highest.third),
            (Observable::SecondHighestFound, highest.second),
            (Observable::HighestFound, highest.best),
        ]);

        Self { values }
    }

    #[must_use]
    pub fn get(&self, observable: Observable) -> &[f64] {
        self.values.get(&observable).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Observable, &[f64])> + '_ {
        self.values.iter().map(|(obs, values)| (*obs, values.as_slice()))
    }
}

/// Normalizes each round to a distribution over cells.
///
/// Rounds with a total of zero give an all-zero row.
#[must_use]
pub fn fractions(counts: &[Vec<u32>]) -> Vec<Vec<f64>> {
    counts
        .iter()
        .map(|row| {
            let total = row.iter().map(|&c| f64::from(c)).sum::<f64>();
            row.iter()
                .map(|&c| {
                    if total == 0.0 {
                        0.0
                    } else {
                        f64::from(c) / total
                    }
                })
                .collect()
        })
        .collect()
}

/// Running sums of the counts over rounds `1..=r`.
#[must_use]
pub fn cumulative_counts(counts: &[Vec<u32>]) -> Vec<Vec<u32>> {
    let mut running: Vec<u32> = vec![];
    counts
        .iter()
        .map(|row| {
            running.resize(row.len(), 0);
            for (acc, &c) in running.iter_mut().zip(row) {
                *acc += c;
            }
            running.clone()
        })
        .collect()
}

/// Fractions of the cumulative counts.
#[must_use]
pub fn cumulative_fractions(counts: &[Vec<u32>]) -> Vec<Vec<f64>> {
    fractions(&cumulative_counts(counts))
}

/// Value collected by each round's distribution, relative to `normalizer`.
///
/// A zero normalizer (all-zero grid) gives zeros.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn performance(fractions: &[Vec<f64>], grid: &[i64], normalizer: f64) -> Vec<f64> {
    fractions
        .iter()
        .map(|row| {
            if normalizer == 0.0 {
                return 0.0;
            }
            row.iter()
                .zip(grid)
                .map(|(f, &v)| f * v as f64)
                .sum::<f64>()
                / normalizer
        })
        .collect()
}

/// `1 / Σ f²` per round; zero for an all-zero round.
#[must_use]
pub fn inverse_participation_ratio(fractions: &[Vec<f64>]) -> Vec<f64> {
    fractions
        .iter()
        .map(|row| {
            let sum = row.iter().map(|f| f * f).sum::<f64>();
            if sum == 0.0 { 0.0 } else { 1.0 / sum }
        })
        .collect()
}

/// `Σ sqrt(f · v / ΣV)` per round.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn fidelity(fractions: &[Vec<f64>], grid: &[i64]) -> Vec<f64> {
    let total = grid.iter().map(|&v| v as f64).sum::<f64>();
    fractions
        .iter()
        .map(|row| {
            if total == 0.0 {
                return 0.0;
            }
            row.iter()
                .zip(grid)
                .map(|(f, &v)| (f * v as f64 / total).sqrt())
                .sum()
        })
        .collect()
}

/// Mean of the `n` highest grid values (fewer when the grid is smaller).
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn top_mean(grid: &[i64], n: usize) -> f64 {
    let mut sorted = grid.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let top = &sorted[..n.min(sorted.len())];
    if top.is_empty() {
        return 0.0;
    }
    top.iter().map(|&v| v as f64).sum::<f64>() / top.len() as f64
}

/// Values of the three best cells opened in each round, averaged over players.
///
/// Ranks missing from a round with fewer than three openings count as zero.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn best_cell_values(trajectories: &[Trajectory<'_>], number_rounds: usize) -> RankSeries {
    let mut series = RankSeries::zeros(number_rounds);
    for trajectory in trajectories {
        for (round, values) in trajectory.values.iter().enumerate().take(number_rounds) {
            let mut sorted = values.clone();
            sorted.sort_unstable();
            let rank = |k: usize| {
                sorted
                    .len()
                    .checked_sub(k)
                    .map_or(0.0, |i| sorted[i] as f64)
            };
            series.best[round] += rank(1);
            series.second[round] += rank(2);
            series.third[round] += rank(3);
        }
    }
    series.divide(trajectories.len())
}

/// Indices of a round's opened cells ordered by ascending value, ties broken
/// by ascending index.
fn indices_by_value(indices: &[usize], values: &[i64]) -> Vec<usize> {
    let mut cells = indices.iter().copied().zip(values.iter().copied()).collect::<Vec<_>>();
    cells.sort_unstable_by_key(|&(index, value)| (value, index));
    cells.into_iter().map(|(index, _)| index).collect()
}

/// Number of cells re-opened among the previous round's best, 2nd best and
/// 3rd best cells, averaged over players.
///
/// Cells are matched by index. Each opened cell is credited to at most one
/// rank, checked from best to 3rd best. Round 1 has no previous round and is
/// always zero.
#[must_use]
pub fn revisit_probability(trajectories: &[Trajectory<'_>], number_rounds: usize) -> RankSeries {
    let mut series = RankSeries::zeros(number_rounds);
    for trajectory in trajectories {
        let ranked = trajectory
            .indices
            .iter()
            .zip(trajectory.values)
            .map(|(indices, values)| indices_by_value(indices, values))
            .collect::<Vec<_>>();
        for round in 1..number_rounds.min(ranked.len()) {
            let previous = &ranked[round - 1];
            let rank = |k: usize| previous.len().checked_sub(k).map(|i| previous[i]);
            let (best, second, third) = (rank(1), rank(2), rank(3));
            for &index in &ranked[round] {
                if Some(index) == best {
                    series.best[round] += 1.0;
                } else if Some(index) == second {
                    series.second[round] += 1.0;
                } else if Some(index) == third {
                    series.third[round] += 1.0;
                }
            }
        }
    }
    series.divide(trajectories.len())
}

/// Running record of the three highest values found, taken after each round
/// and averaged over players.
///
/// The record holds distinct cells: a value only enters the 2nd slot from a
/// cell other than the best one, and the 3rd slot from a cell other than the
/// best and 2nd ones. Slots never filled count as zero.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn highest_value_cells_found(
    trajectories: &[Trajectory<'_>],
    number_rounds: usize,
) -> RankSeries {
    let mut series = RankSeries::zeros(number_rounds);
    for trajectory in trajectories {
        let mut best: Option<(i64, usize)> = None;
        let mut second: Option<(i64, usize)> = None;
        let mut third: Option<i64> = None;
        for round in 0..number_rounds {
            let indices = trajectory.indices.get(round).map_or(&[][..], Vec::as_slice);
            let values = trajectory.values.get(round).map_or(&[][..], Vec::as_slice);
            for (&index, &value) in indices.iter().zip(values) {
                let best_index = best.map(|(_, i)| i);
                let second_index = second.map(|(_, i)| i);
                if best.is_none_or(|(v, _)| value > v) {
                    third = second.map(|(v, _)| v);
                    second = best;
                    best = Some((value, index));
                } else if second.is_none_or(|(v, _)| value > v) && Some(index) != best_index {
                    third = second.map(|(v, _)| v);
                    second = Some((value, index));
                } else if third.is_none_or(|v| value > v)
                    && Some(index) != best_index
                    && Some(index) != second_index
                {
                    third = Some(value);
                }
            }
            series.best[round] += best.map_or(0.0, |(v, _)| v as f64);
            series.second[round] += second.map_or(0.0, |(v, _)| v as f64);
            series.third[round] += third.map_or(0.0, |v| v as f64);
        }
    }
    series.divide(trajectories.len())
}
