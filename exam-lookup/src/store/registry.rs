//! Cohort registry: every loaded cohort keyed by cohort key

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::cohort::Cohort;
use super::columns::ColumnInferencer;
use super::table::RawTable;
use crate::error::{LookupError, Result};

/// Loaded cohorts plus the configured backing file of every cohort key
///
/// A configured cohort whose file is missing or malformed is simply absent
/// from the loaded set. Iteration follows cohort key order.
#[derive(Debug, Clone)]
pub struct CohortRegistry {
    sources: BTreeMap<String, PathBuf>,
    cohorts: BTreeMap<String, Cohort>,
    inferencer: ColumnInferencer,
}

impl CohortRegistry {
    /// Registry with nothing loaded yet
    pub fn new(sources: BTreeMap<String, PathBuf>, inferencer: ColumnInferencer) -> Self {
        Self {
            sources,
            cohorts: BTreeMap::new(),
            inferencer,
        }
    }

    /// Load every configured source
    ///
    /// Fails only when not a single cohort could be loaded.
    pub fn load_all(sources: BTreeMap<String, PathBuf>, inferencer: ColumnInferencer) -> Result<Self> {
        let mut registry = Self::new(sources, inferencer);

        let keys: Vec<String> = registry.sources.keys().cloned().collect();
        for key in keys {
            if let Err(e) = registry.reload(&key) {
                warn!("Skipping cohort {}: {}", key, e);
            }
        }

        if registry.cohorts.is_empty() {
            return Err(LookupError::NoCohorts);
        }

        info!(
            "Loaded {} of {} cohorts ({} records)",
            registry.cohorts.len(),
            registry.sources.len(),
            registry.total_records()
        );
        Ok(registry)
    }

    /// Parse a cohort source without touching the registry
    pub fn load(&self, cohort_key: &str) -> Result<Cohort> {
        let path = self.source_path(cohort_key)?;
        if !path.exists() {
            return Err(LookupError::MalformedSource {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }
        let table = RawTable::from_path(path)?;
        Ok(Cohort::from_table(cohort_key, &table, &self.inferencer))
    }

    /// Re-read a cohort's backing source and replace the loaded copy
    ///
    /// On failure the cohort is removed from the loaded set.
    pub fn reload(&mut self, cohort_key: &str) -> Result<usize> {
        match self.load(cohort_key) {
            Ok(cohort) => {
                let rows = cohort.len();
                info!(
                    "Loaded cohort {} ({} rows, identifier column '{}', name column '{}')",
                    cohort_key,
                    rows,
                    cohort.schema().identifier_column(),
                    cohort.schema().display_name_column()
                );
                self.cohorts.insert(cohort_key.to_string(), cohort);
                Ok(rows)
            }
            Err(e) => {
                self.cohorts.remove(cohort_key);
                Err(e)
            }
        }
    }

    /// Configured backing file for a cohort key
    pub fn source_path(&self, cohort_key: &str) -> Result<&Path> {
        self.sources
            .get(cohort_key)
            .map(PathBuf::as_path)
            .ok_or_else(|| LookupError::UnknownCohort(cohort_key.to_string()))
    }

    /// Number of configured cohort keys, loaded or not
    pub fn configured_len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_configured(&self, cohort_key: &str) -> bool {
        self.sources.contains_key(cohort_key)
    }

    pub fn get(&self, cohort_key: &str) -> Option<&Cohort> {
        self.cohorts.get(cohort_key)
    }

    /// Loaded cohorts in key order
    pub fn iter(&self) -> impl Iterator<Item = &Cohort> {
        self.cohorts.values()
    }

    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.cohorts.values().map(Cohort::len).sum()
    }

    pub fn inferencer(&self) -> &ColumnInferencer {
        &self.inferencer
    }
}
