//! Search engine: identifier lookup within one routed cohort, name lookup
//! across every cohort

use std::sync::Arc;

use exam_common::normalize_digits;
use tracing::debug;

use crate::error::{LookupError, Result};
use crate::resolver::RoutingTable;
use crate::store::{CohortRegistry, Record};

/// One matched record and the cohort it came from
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub cohort: String,
    /// Row position within the cohort
    pub row: usize,
    pub record: Arc<Record>,
}

/// Borrowed view over the registry and routing table
pub struct SearchEngine<'a> {
    registry: &'a CohortRegistry,
    routing: &'a RoutingTable,
}

impl<'a> SearchEngine<'a> {
    pub fn new(registry: &'a CohortRegistry, routing: &'a RoutingTable) -> Self {
        Self { registry, routing }
    }

    /// Normalize, route by leading digit, and look up in that cohort only
    ///
    /// Identifiers carry their cohort in the leading digit, so no other
    /// cohort is consulted.
    pub fn search_by_identifier(&self, raw_query: &str) -> Result<SearchResult> {
        let normalized = normalize_digits(raw_query);
        let cohort_key = self
            .routing
            .resolve_cohort(&normalized)
            .ok_or_else(|| LookupError::UnroutableIdentifier(raw_query.trim().to_string()))?;

        let cohort = self.registry.get(cohort_key).ok_or_else(|| {
            LookupError::NotFound(format!("cohort {} is not loaded", cohort_key))
        })?;

        let (row, record) = cohort.lookup_by_identifier(&normalized).ok_or_else(|| {
            LookupError::NotFound(format!("identifier {} in cohort {}", normalized, cohort_key))
        })?;

        debug!("Identifier {} matched row {} of cohort {}", normalized, row, cohort_key);
        Ok(SearchResult {
            cohort: cohort_key.to_string(),
            row,
            record,
        })
    }

    /// Case-insensitive partial name match across every cohort
    ///
    /// Results are ordered by cohort, then by source row.
    pub fn search_by_name(&self, raw_query: &str) -> Result<Vec<SearchResult>> {
        let results: Vec<SearchResult> = self
            .registry
            .iter()
            .flat_map(|cohort| {
                cohort
                    .scan_by_name(raw_query)
                    .into_iter()
                    .map(move |(row, record)| SearchResult {
                        cohort: cohort.key().to_string(),
                        row,
                        record,
                    })
            })
            .collect();

        if results.is_empty() {
            return Err(LookupError::NotFound(format!("name '{}'", raw_query.trim())));
        }
        debug!("Name '{}' matched {} records", raw_query.trim(), results.len());
        Ok(results)
    }
}
