//! Identifier resolver: leading digit to cohort key

use std::collections::BTreeMap;

/// Leading-digit routing table
///
/// Deployment configuration; source variants disagree on which digit maps to
/// which year, so nothing here is hardcoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    routes: BTreeMap<char, String>,
}

impl RoutingTable {
    /// Build from configuration entries; keys other than a single ASCII
    /// digit are ignored (configuration validation rejects them earlier).
    pub fn from_config(entries: &BTreeMap<String, String>) -> Self {
        let routes = entries
            .iter()
            .filter_map(|(digit, cohort)| {
                let mut chars = digit.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_digit() => Some((c, cohort.clone())),
                    _ => None,
                }
            })
            .collect();
        Self { routes }
    }

    /// Cohort key for a normalized identifier, `None` when empty or unmapped
    pub fn resolve_cohort(&self, normalized_id: &str) -> Option<&str> {
        let first = normalized_id.chars().next()?;
        self.routes.get(&first).map(String::as_str)
    }

    /// `(digit, cohort)` pairs in digit order
    pub fn entries(&self) -> impl Iterator<Item = (char, &str)> {
        self.routes.iter().map(|(d, c)| (*d, c.as_str()))
    }
}
