//! Per-requester pagination of multi-match name searches
//!
//! Each requester owns at most one outstanding name search. The store hands
//! out one mutex per requester, so requests from different requesters never
//! wait on each other. Sessions are never expired.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::search::SearchResult;

/// Continuation state for one requester's name search
#[derive(Debug, Clone)]
pub struct SessionState {
    last_query: String,
    /// Results in delivery order (the first batch is the prefix)
    all_results: Vec<SearchResult>,
    delivered_count: usize,
}

impl SessionState {
    /// Start a session from fresh search results and return the first batch
    ///
    /// The first batch favours cohort diversity; the stored results are
    /// reordered so that batch is their prefix and later batches continue
    /// from `delivered_count` without repeats.
    pub fn start(
        query: &str,
        results: Vec<SearchResult>,
        batch_size: usize,
    ) -> (Self, Vec<SearchResult>) {
        let ordered = diversity_first_order(results, batch_size);
        let first_len = batch_size.min(ordered.len());
        let first_batch = ordered[..first_len].to_vec();

        let state = Self {
            last_query: query.to_string(),
            all_results: ordered,
            delivered_count: first_len,
        };
        (state, first_batch)
    }

    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    pub fn total(&self) -> usize {
        self.all_results.len()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered_count
    }

    pub fn is_exhausted(&self) -> bool {
        self.delivered_count >= self.all_results.len()
    }

    /// Next `batch_size` (or fewer) results; empty once exhausted
    pub fn next_batch(&mut self, batch_size: usize) -> Vec<SearchResult> {
        let start = self.delivered_count.min(self.all_results.len());
        let end = (start + batch_size).min(self.all_results.len());
        self.delivered_count = end;
        self.all_results[start..end].to_vec()
    }
}

/// Reorder so the first `batch_size` entries take one match per distinct
/// cohort first, then fill from the remaining matches in original order.
/// The first batch and the remainder each keep original relative order.
pub fn diversity_first_order(results: Vec<SearchResult>, batch_size: usize) -> Vec<SearchResult> {
    let mut picked = vec![false; results.len()];
    let mut seen_cohorts: Vec<&str> = Vec::new();
    let mut count = 0;

    for (i, result) in results.iter().enumerate() {
        if count == batch_size {
            break;
        }
        if !seen_cohorts.contains(&result.cohort.as_str()) {
            seen_cohorts.push(result.cohort.as_str());
            picked[i] = true;
            count += 1;
        }
    }

    for slot in picked.iter_mut() {
        if count == batch_size {
            break;
        }
        if !*slot {
            *slot = true;
            count += 1;
        }
    }

    let (first, rest): (Vec<_>, Vec<_>) = results
        .into_iter()
        .zip(picked)
        .partition(|(_, is_picked)| *is_picked);

    first
        .into_iter()
        .chain(rest)
        .map(|(result, _)| result)
        .collect()
}

/// Slot holding one requester's session (empty until the first name query)
pub type SessionSlot = Arc<tokio::sync::Mutex<Option<SessionState>>>;

/// Session slots keyed by requester id
#[derive(Debug, Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<String, SessionSlot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The requester's slot, created lazily
    ///
    /// The map lock is held only long enough to clone the slot handle.
    pub fn slot(&self, requester_id: &str) -> SessionSlot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .entry(requester_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(None)))
            .clone()
    }

    /// Number of requesters that have had a session
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
