//! Discovery of game log pairs and their grouping by player set
//!
//! A data directory for one rule holds one sub-directory per session:
//!
//! ```text
//! rule_1/
//! ├─ session_0001/
//! │  ├─ in/<game>.json
//! │  └─ out/<game>.csv
//! └─ session_0002/
//!    └─ ...
//! ```
//!
//! Within a session, games of the requested type are grouped by the set of
//! participating players. Each [`SessionGroup`] is one resampling unit.

use std::{
    collections::BTreeSet,
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use stargrid_record::{GameFiles, PlayerInfo};

const SESSION_PREFIX: &str = "session_";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum FileIndexError {
    #[display("failed to list directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Games of one session played by one set of players, in file name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGroup {
    pub session: String,
    pub players: BTreeSet<String>,
    pub games: Vec<GameFiles>,
}

#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    groups: Vec<SessionGroup>,
}

/// The part of an input file needed to filter and group it.
#[derive(Debug, Deserialize)]
struct GameHeader {
    players: Vec<PlayerInfo>,
    data: HeaderData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderData {
    alt_game_name: String,
}

impl FileIndex {
    /// Scans `root` for `session_*/in/*.json` files whose game type is
    /// `game_type`.
    ///
    /// Sessions and files are visited in name order. Groups keep the order in
    /// which their player set first appears within a session. Input files that
    /// cannot be read or parsed are skipped with a warning.
    pub fn discover(root: &Path, game_type: &str) -> Result<Self, FileIndexError> {
        let mut groups = vec![];

        for session_dir in sorted_entries(root, |path| {
            path.is_dir()
                && path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(SESSION_PREFIX))
        })? {
            let in_dir = session_dir.join("in");
            if !in_dir.is_dir() {
                log::debug!("{} has no input directory", session_dir.display());
                continue;
            }
            let inputs = sorted_entries(&in_dir, |path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == "json")
            })?;

            let mut session_groups: Vec<SessionGroup> = vec![];
            for input in inputs {
                let header = match read_header(&input) {
                    Ok(header) => header,
                    Err(err) => {
                        log::warn!("skipping {}: {err}", input.display());
                        continue;
                    }
                };
                if header.data.alt_game_name != game_type {
                    continue;
                }

                let files = GameFiles::from_input_path(&input);
                let players = header
                    .players
                    .into_iter()
                    .map(|player| player.id)
                    .collect::<BTreeSet<_>>();
                match session_groups.iter_mut().find(|g| g.players == players) {
                    Some(group) => group.games.push(files),
                    None => session_groups.push(SessionGroup {
                        session: files.session.clone(),
                        players,
                        games: vec![files],
                    }),
                }
            }
            groups.extend(session_groups);
        }

        let index = Self { groups };
        log::info!(
            "found {} games of type {game_type} in {} groups under {}",
            index.game_count(),
            index.groups.len(),
            root.display()
        );
        Ok(index)
    }

    #[must_use]
    pub fn groups(&self) -> &[SessionGroup] {
        &self.groups
    }

    #[must_use]
    pub fn game_count(&self) -> usize {
        self.groups.iter().map(|group| group.games.len()).sum()
    }

    /// All game file pairs, group after group.
    pub fn games(&self) -> impl Iterator<Item = &GameFiles> + '_ {
        self.groups.iter().flat_map(|group| &group.games)
    }
}

fn sorted_entries<F>(dir: &Path, keep: F) -> Result<Vec<PathBuf>, FileIndexError>
where
    F: Fn(&Path) -> bool,
{
    let read_dir_error = |source| FileIndexError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = vec![];
    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn read_header(path: &Path) -> Result<GameHeader, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_game(root: &Path, session: &str, game: &str, game_type: &str, players: &[&str]) {
        let in_dir = root.join(session).join("in");
        fs::create_dir_all(&in_dir).unwrap();
        let players = players
            .iter()
            .map(|id| format!(r#"{{ "playerPseudo": "{id}" }}"#))
            .collect::<Vec<_>>()
            .join(",");
        let json = format!(
            r#"{{ "players": [{players}], "data": {{ "altGameName": "{game_type}",
                "map": {{ "map": [[1]] }}, "numberRounds": 1, "numberPlayers": 1 }} }}"#
        );
        fs::write(in_dir.join(format!("{game}.json")), json).unwrap();
    }

    #[test]
    fn test_groups_by_session_and_player_set() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_game(root, "session_0002", "b", "Group_R1", &["ada", "bob"]);
        write_game(root, "session_0002", "a", "Group_R1", &["bob", "ada"]);
        write_game(root, "session_0002", "c", "Group_R1", &["cid"]);
        write_game(root, "session_0001", "z", "Group_R1", &["dan"]);
        write_game(root, "session_0001", "y", "Indiv_R1", &["dan"]);
        fs::create_dir_all(root.join("notes")).unwrap();

        let index = FileIndex::discover(root, "Group_R1").unwrap();
        let groups = index.groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].session, "0001");
        assert_eq!(groups[0].games.len(), 1);
        assert_eq!(groups[1].session, "0002");
        assert_eq!(
            groups[1].games.iter().map(|g| g.game_id.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );
        assert_eq!(groups[2].players, BTreeSet::from(["cid".to_owned()]));
        assert_eq!(index.game_count(), 4);
    }

    #[test]
    fn test_unreadable_input_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_game(root, "session_0001", "ok", "Group_R1", &["ada"]);
        fs::write(root.join("session_0001/in/broken.json"), "{ not json").unwrap();

        let index = FileIndex::discover(root, "Group_R1").unwrap();
        assert_eq!(index.game_count(), 1);
        assert_eq!(
            index.games().next().unwrap().output,
            root.join("session_0001/out/ok.csv")
        );
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileIndex::discover(&dir.path().join("missing"), "Group_R1").unwrap_err();
        assert!(matches!(err, FileIndexError::ReadDir { .. }));
    }
}
