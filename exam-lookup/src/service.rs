//! Lookup service: shared state behind every query and update
//!
//! The registry sits behind an async RwLock: lookups and scans share it,
//! reloads after an update take it exclusively. Pagination state is per
//! requester (see [`crate::session`]).

use std::collections::BTreeMap;
use std::path::PathBuf;

use exam_common::auth::verify_update_secret;
use exam_common::config::TomlConfig;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{LookupError, Result};
use crate::render::RenderSettings;
use crate::resolver::RoutingTable;
use crate::search::{SearchEngine, SearchResult};
use crate::session::{SessionState, SessionStore};
use crate::stats::{StatsSnapshot, StatsStore};
use crate::store::{CohortRegistry, ColumnInferencer, RawTable};
use crate::update::{merge_tables, write_table_atomic, UpdateReport};
use crate::vocab;

/// One page of name-search results
#[derive(Debug, Clone)]
pub struct Batch {
    pub results: Vec<SearchResult>,
    /// All matches of the query
    pub total: usize,
    /// True when this batch started a new search
    pub is_first: bool,
}

/// Registry size as reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CohortSummary {
    pub configured: usize,
    pub loaded: usize,
    pub records: usize,
}

pub struct LookupService {
    registry: RwLock<CohortRegistry>,
    routing: RoutingTable,
    sessions: SessionStore,
    stats: StatsStore,
    render: RenderSettings,
    update_secret: Option<String>,
    batch_size: usize,
}

impl LookupService {
    /// Load every configured cohort
    ///
    /// Fails with [`LookupError::NoCohorts`] when none could be loaded.
    pub fn load(config: &TomlConfig) -> Result<Self> {
        let sources: BTreeMap<String, PathBuf> = config
            .cohorts
            .keys()
            .filter_map(|key| config.cohort_path(key).map(|path| (key.clone(), path)))
            .collect();

        let registry =
            CohortRegistry::load_all(sources, ColumnInferencer::from_aliases(&config.columns))?;

        if config.update_secret.as_deref().map_or(true, str::is_empty) {
            warn!("No update secret configured, dataset updates are disabled");
        }

        Ok(Self {
            registry: RwLock::new(registry),
            routing: RoutingTable::from_config(&config.routing),
            sessions: SessionStore::new(),
            stats: StatsStore::load(config.stats_path()),
            render: RenderSettings {
                pass_threshold: config.pass_threshold,
            },
            update_secret: config.update_secret.clone(),
            batch_size: config.batch_size.max(1),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.render
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub async fn search_by_identifier(&self, raw_query: &str) -> Result<SearchResult> {
        let registry = self.registry.read().await;
        SearchEngine::new(&registry, &self.routing).search_by_identifier(raw_query)
    }

    pub async fn search_by_name(&self, raw_query: &str) -> Result<Vec<SearchResult>> {
        let registry = self.registry.read().await;
        SearchEngine::new(&registry, &self.routing).search_by_name(raw_query)
    }

    /// Next batch of the requester's name search
    ///
    /// The same query as last time continues the stored session (empty once
    /// exhausted); a different query runs a fresh search and replaces it.
    /// A fresh search with no matches clears the session and fails with
    /// `NotFound`.
    pub async fn get_next_batch(
        &self,
        requester_id: &str,
        raw_query: &str,
        batch_size: usize,
    ) -> Result<Batch> {
        let query = raw_query.trim();
        let slot = self.sessions.slot(requester_id);
        let mut session = slot.lock().await;

        if let Some(state) = session.as_mut().filter(|s| s.last_query() == query) {
            return Ok(Batch {
                results: state.next_batch(batch_size),
                total: state.total(),
                is_first: false,
            });
        }

        match self.search_by_name(query).await {
            Ok(results) => {
                let total = results.len();
                let (state, first) = SessionState::start(query, results, batch_size);
                *session = Some(state);
                Ok(Batch {
                    results: first,
                    total,
                    is_first: true,
                })
            }
            Err(e) => {
                *session = None;
                Err(e)
            }
        }
    }

    /// Continue the requester's last name search, `None` when there is none
    pub async fn more_results(&self, requester_id: &str) -> Option<Batch> {
        let slot = self.sessions.slot(requester_id);
        let mut session = slot.lock().await;
        let state = session.as_mut()?;
        Some(Batch {
            results: state.next_batch(self.batch_size),
            total: state.total(),
            is_first: false,
        })
    }

    /// Merge an uploaded table (workbook or CSV) into a cohort's source and
    /// reload it
    ///
    /// Checks run in order: secret, cohort key, upload parse. The previous
    /// source is only replaced once the merged table is ready.
    pub async fn apply_update(
        &self,
        cohort_key: &str,
        secret_attempt: &str,
        bytes: &[u8],
    ) -> Result<UpdateReport> {
        if !verify_update_secret(self.update_secret.as_deref(), secret_attempt) {
            warn!("Rejected update for cohort {}: bad secret", cohort_key);
            return Err(LookupError::Unauthorized);
        }

        if !self.registry.read().await.is_configured(cohort_key) {
            return Err(LookupError::UnknownCohort(cohort_key.to_string()));
        }

        let incoming = RawTable::from_bytes(bytes, &format!("upload for {}", cohort_key))?;
        let rows_received = incoming.rows.len();

        let mut registry = self.registry.write().await;
        let path = registry.source_path(cohort_key)?.to_path_buf();
        let prior = if path.exists() {
            Some(RawTable::from_path(&path)?)
        } else {
            None
        };

        let merged = merge_tables(prior, incoming, registry.inferencer());
        write_table_atomic(&path, &merged.table)?;
        let total_rows = registry.reload(cohort_key)?;

        info!(
            "Updated cohort {}: {} rows received, {} rows total",
            cohort_key, rows_received, total_rows
        );
        Ok(UpdateReport {
            cohort: cohort_key.to_string(),
            rows_received,
            total_rows,
            collapsed: merged.collapsed,
            message: vocab::update_done(cohort_key, rows_received),
        })
    }

    /// Configured and loaded cohort counts for health reporting
    pub async fn cohort_summary(&self) -> CohortSummary {
        let registry = self.registry.read().await;
        CohortSummary {
            configured: registry.configured_len(),
            loaded: registry.len(),
            records: registry.total_records(),
        }
    }

    /// Loaded cohorts, totals, routing, and usage instructions
    pub async fn welcome_text(&self) -> String {
        let registry = self.registry.read().await;

        let mut lines = vec![vocab::WELCOME_HEADER.to_string(), String::new()];
        lines.push(vocab::WELCOME_COHORTS.to_string());
        for cohort in registry.iter() {
            lines.push(vocab::welcome_cohort_line(cohort.key(), cohort.len()));
        }
        lines.push(vocab::welcome_total_line(registry.total_records()));
        lines.push(String::new());
        lines.push(vocab::WELCOME_ROUTES.to_string());
        for (digit, cohort) in self.routing.entries() {
            lines.push(vocab::welcome_route_line(digit, cohort));
        }
        lines.push(String::new());
        lines.push(vocab::WELCOME_USAGE.to_string());
        lines.join("\n")
    }

    pub fn record_query(&self, requester_id: &str) {
        self.stats.record_query(requester_id);
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
