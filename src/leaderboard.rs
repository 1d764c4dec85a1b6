use std::cmp::Reverse;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// How many entries `top` is asked for when the caller has no preference.
pub const DEFAULT_TOP: usize = 10;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("failed to access leaderboard file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("leaderboard file {path:?} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: u64,
    pub name: String,
    pub points: u32,
}

/// On-disk layout. Entries stay in insertion order.
#[derive(Debug, Serialize, Deserialize)]
struct Table {
    next_id: u64,
    entries: Vec<ScoreEntry>,
}

impl Default for Table {
    fn default() -> Self {
        Table { next_id: 1, entries: Vec::new() }
    }
}

/// A ranked list of past scores kept in a single JSON file. The file is
/// opened and released within each call; nothing is held in between.
pub struct Leaderboard {
    path: PathBuf,
}

impl Leaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Leaderboard { path: path.into() }
    }

    pub fn initialize(&self) -> Result<()> {
        let exists = self.path.try_exists().map_err(|e| self.io_error(e))?;
        if exists {
            debug!(path = ?self.path, "leaderboard already present");
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        self.save(&Table::default())?;
        info!(path = ?self.path, "created leaderboard");
        Ok(())
    }

    /// Appends a new entry. Entries are never merged, even when name and
    /// points repeat.
    pub fn record(&self, name: &str, points: u32) -> Result<ScoreEntry> {
        let mut table = self.load()?;
        let entry = ScoreEntry { id: table.next_id, name: name.to_string(), points };

        table.next_id += 1;
        table.entries.push(entry.clone());
        self.save(&table)?;

        info!(id = entry.id, name, points, "score recorded");
        Ok(entry)
    }

    /// Up to `limit` entries, best first. Equal scores keep the order they
    /// were recorded in.
    pub fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>> {
        let mut entries = self.load()?.entries;
        entries.sort_by_key(|entry| Reverse(entry.points));
        entries.truncate(limit);
        Ok(entries)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn load(&self) -> Result<Table> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Table::default()),
            Err(err) => return Err(self.io_error(err)),
        };

        serde_json::from_str(&content)
            .map_err(|source| LeaderboardError::Corrupt { path: self.path.clone(), source })
    }

    fn save(&self, table: &Table) -> Result<()> {
        let json = serde_json::to_string_pretty(table)
            .map_err(|source| LeaderboardError::Corrupt { path: self.path.clone(), source })?;

        // Written beside the real file, flushed to disk, then renamed over it.
        let tmp = self.tmp_path();
        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        });

        if let Err(err) = written.and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(err));
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> LeaderboardError {
        LeaderboardError::Io { path: self.path.clone(), source }
    }
}
