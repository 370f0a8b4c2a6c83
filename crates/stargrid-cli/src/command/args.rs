//! Argument groups shared by several subcommands

use std::{num::NonZeroUsize, path::PathBuf, thread};

use anyhow::Context;
use clap::Args;
use stargrid_analysis::{
    files::FileIndex,
    games::GameGroups,
    players::{BinningTable, PlayerGroups, Thresholds},
};
use stargrid_stats::bootstrap::Bootstrap;

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct DataArg {
    /// Root directory holding one sub-directory per rule
    #[arg(long)]
    pub data: PathBuf,
    /// Rule sub-directory (e.g. rule_1)
    #[arg(long)]
    pub rule: String,
    /// Game type to analyze (e.g. Group_R1)
    #[arg(long)]
    pub game_type: String,
}

impl DataArg {
    /// Loads every game of the selected type, grouped by session and player set.
    pub fn load_games(&self) -> anyhow::Result<GameGroups> {
        let root = self.data.join(&self.rule);
        let index = FileIndex::discover(&root, &self.game_type)
            .with_context(|| format!("Failed to index games in {}", root.display()))?;
        let (groups, _errors) = GameGroups::load(&index);
        if groups.groups().is_empty() {
            anyhow::bail!(
                "No loadable game of type {} in {}",
                self.game_type,
                root.display()
            );
        }
        Ok(groups)
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct BootstrapArg {
    /// Number of bootstrap trials
    #[arg(long, default_value_t = 10000)]
    pub reps: usize,
    /// Seed of the trial streams (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of worker threads (defaults to the available parallelism)
    #[arg(long)]
    pub threads: Option<NonZeroUsize>,
}

impl BootstrapArg {
    pub fn build(&self) -> anyhow::Result<Bootstrap> {
        let seed = self.seed.unwrap_or_else(rand::random);
        let threads = self
            .threads
            .or_else(|| thread::available_parallelism().ok())
            .unwrap_or(NonZeroUsize::MIN);
        log::info!(
            "bootstrap: {} trials, seed {seed}, {threads} threads",
            self.reps
        );
        Ok(Bootstrap::new(self.reps, seed)?.with_threads(threads))
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct ClassifyArg {
    /// File holding the two u1 thresholds (defector/neutral, neutral/collaborator)
    #[arg(long, conflicts_with_all = ["threshold_low", "threshold_high"])]
    pub thresholds: Option<PathBuf>,
    /// u1 threshold between defectors and neutrals
    #[arg(long, requires = "threshold_high", allow_negative_numbers = true)]
    pub threshold_low: Option<f64>,
    /// u1 threshold between neutrals and collaborators
    #[arg(long, requires = "threshold_low", allow_negative_numbers = true)]
    pub threshold_high: Option<f64>,
    /// JSON object mapping cell values to rating buckets (identity when omitted)
    #[arg(long)]
    pub binning: Option<PathBuf>,
}

impl ClassifyArg {
    pub fn thresholds(&self) -> anyhow::Result<Thresholds> {
        match (&self.thresholds, self.threshold_low, self.threshold_high) {
            (Some(path), _, _) => util::read_thresholds_file(path),
            (None, Some(low), Some(high)) => Ok(Thresholds {
                defector_neutral: low,
                neutral_collaborator: high,
            }),
            _ => anyhow::bail!(
                "Classification needs --thresholds or both --threshold-low and --threshold-high"
            ),
        }
    }

    pub fn binning(&self) -> anyhow::Result<BinningTable> {
        match &self.binning {
            Some(path) => util::read_binning_file(path),
            None => Ok(BinningTable::identity()),
        }
    }

    /// Collects the players of the games and classifies every player-game.
    pub fn load_players(&self, games: &GameGroups) -> anyhow::Result<PlayerGroups> {
        let thresholds = self.thresholds()?;
        let binning = self.binning()?;
        let mut players = PlayerGroups::from_games(games);
        let _errors = players.classify_all(&binning, &thresholds);
        Ok(players)
    }
}
