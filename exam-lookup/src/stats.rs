//! Usage statistics: distinct requesters and total handled queries
//!
//! Persisted as JSON after every change. A missing or unreadable file starts
//! the counters from zero.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::update::write_atomic;

/// Persisted counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default)]
    pub users: BTreeSet<String>,
    #[serde(default)]
    pub total_queries: u64,
}

/// Counts reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub users: usize,
    pub total_queries: u64,
}

/// Mutex-guarded statistics bound to a file
#[derive(Debug)]
pub struct StatsStore {
    path: PathBuf,
    stats: Mutex<UsageStats>,
}

impl StatsStore {
    /// Read existing counters from `path`
    pub fn load(path: PathBuf) -> Self {
        let stats = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                error!("Failed to parse stats file {}: {}", path.display(), e);
                UsageStats::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => UsageStats::default(),
            Err(e) => {
                error!("Failed to read stats file {}: {}", path.display(), e);
                UsageStats::default()
            }
        };
        Self {
            path,
            stats: Mutex::new(stats),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count one query from `requester_id` and persist
    ///
    /// Persistence failures are logged; the in-memory counters still advance.
    pub fn record_query(&self, requester_id: &str) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.users.insert(requester_id.to_string());
        stats.total_queries += 1;

        if let Err(e) = persist(&self.path, &stats) {
            warn!("Failed to save stats to {}: {}", self.path.display(), e);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        StatsSnapshot {
            users: stats.users.len(),
            total_queries: stats.total_queries,
        }
    }
}

fn persist(path: &Path, stats: &UsageStats) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(std::io::Error::other)?;
    write_atomic(path, json.as_bytes())
}
