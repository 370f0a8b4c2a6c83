//! Offline analysis of recorded star-grid games
//!
//! This crate turns the game logs of one rule and game type into bootstrapped
//! observables and player classifications.
//!
//! # Overview
//!
//! ## Game Workflow
//!
//! 1. **Discover Files** ([`files::FileIndex`]): Find the log pairs of every
//!    session and group them by player set
//! 2. **Load Games** ([`games::GameGroups`]): Build game records and attach
//!    their observables ([`observables::ObservableSet`])
//! 3. **Bootstrap**: Resample whole groups to estimate
//!    - the observable battery ([`games::bootstrap_observables`])
//!    - the score distribution ([`scores::bootstrap_scores`])
//!    - the probability of finding high values ([`discovery::bootstrap_discovery`])
//!
//! ## Player Workflow
//!
//! 1. **Collect Players** ([`players::PlayerGroups`]): Gather each player's
//!    ratings across the games of the session
//! 2. **Classify** ([`players::PlayerGroups::classify_all`]): Fit the rating
//!    line of every player-game and assign a [`players::PlayerType`]
//! 3. **Summarize**: type composition ([`types::players_type`]), fitted
//!    parameters ([`types::u0_u1_pairs`]) and bootstrapped mean ratings
//!    ([`stars::bootstrap_mean_stars`])
//!
//! # Resampling Units
//!
//! Games of one session played by the same players are correlated. All
//! bootstrap analyses therefore draw whole groups, never single games or
//! players.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use stargrid_analysis::{files::FileIndex, games::{self, GameGroups}};
//! use stargrid_stats::bootstrap::Bootstrap;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let index = FileIndex::discover(Path::new("data/rule_1"), "Group_R1")?;
//! let (groups, errors) = GameGroups::load(&index);
//! println!("{} games skipped", errors.len());
//!
//! let bootstrap = Bootstrap::new(10_000, 42)?;
//! for (observable, points) in games::bootstrap_observables(&groups, &bootstrap)? {
//!     println!("{}: {} rounds", observable.name(), points.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod files;
pub mod games;
pub mod observables;
pub mod players;
pub mod scores;
pub mod stars;
pub mod summary;
pub mod types;
