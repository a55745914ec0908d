//! Column role inference
//!
//! Source files name their columns inconsistently (English and Arabic
//! variants, stray spaces). One inferencer, parameterized by alias priority
//! lists, decides which column keys a record and which holds the display name.

use exam_common::config::ColumnAliases;

/// Indices of the identifier and display-name columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    pub identifier: usize,
    pub display_name: usize,
}

/// Alias-driven column role inference
#[derive(Debug, Clone)]
pub struct ColumnInferencer {
    identifier_aliases: Vec<String>,
    name_aliases: Vec<String>,
}

impl ColumnInferencer {
    pub fn new(identifier_aliases: Vec<String>, name_aliases: Vec<String>) -> Self {
        Self {
            identifier_aliases: lowercase_all(identifier_aliases),
            name_aliases: lowercase_all(name_aliases),
        }
    }

    pub fn from_aliases(aliases: &ColumnAliases) -> Self {
        Self::new(
            aliases.identifier_aliases.clone(),
            aliases.name_aliases.clone(),
        )
    }

    /// Decide column roles
    ///
    /// `is_textual(i)` reports whether column `i` holds text rather than
    /// numbers; it is only consulted when no name alias matches.
    ///
    /// Identifier: first column whose lowercase name contains any identifier
    /// alias, else column 0.
    /// Display name: first column containing any name alias, else the first
    /// textual column other than the identifier, else column 1 (column 0 for
    /// single-column data).
    ///
    /// `columns` must not be empty.
    pub fn infer<F>(&self, columns: &[String], is_textual: F) -> ColumnRoles
    where
        F: Fn(usize) -> bool,
    {
        let identifier = find_by_alias(columns, &self.identifier_aliases).unwrap_or(0);

        let display_name = find_by_alias(columns, &self.name_aliases)
            .or_else(|| {
                (0..columns.len()).find(|&i| i != identifier && is_textual(i))
            })
            .unwrap_or(if columns.len() > 1 { 1 } else { 0 });

        ColumnRoles {
            identifier,
            display_name,
        }
    }
}

fn lowercase_all(aliases: Vec<String>) -> Vec<String> {
    aliases
        .into_iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect()
}

/// Columns are scanned in order; the first column containing any alias wins.
fn find_by_alias(columns: &[String], aliases: &[String]) -> Option<usize> {
    columns.iter().position(|column| {
        let column = column.trim().to_lowercase();
        aliases.iter().any(|alias| column.contains(alias.as_str()))
    })
}
