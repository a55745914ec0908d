//! A single cohort: one yearly dataset with inferred column roles

use std::sync::Arc;

use exam_common::normalize_digits;

use super::columns::ColumnInferencer;
use super::table::RawTable;
use super::value::{Record, Schema, Value};

/// One loaded cohort
///
/// Records keep source row order so "first match" is stable. Identifier
/// values are stored in normalized digit form; duplicates are tolerated and
/// the first listed record wins.
#[derive(Debug, Clone)]
pub struct Cohort {
    key: String,
    schema: Arc<Schema>,
    records: Vec<Arc<Record>>,
}

impl Cohort {
    /// Build a cohort from a cleaned table
    pub fn from_table(key: &str, table: &RawTable, inferencer: &ColumnInferencer) -> Self {
        let parsed: Vec<Vec<Value>> = table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| Value::parse_cell(cell)).collect())
            .collect();

        let roles = inferencer.infer(&table.headers, |column| {
            parsed
                .iter()
                .any(|row| matches!(row.get(column), Some(Value::Text(_))))
        });

        let schema = Arc::new(Schema {
            columns: table.headers.clone(),
            identifier: roles.identifier,
            display_name: roles.display_name,
        });

        let records = table
            .rows
            .iter()
            .zip(parsed)
            .map(|(raw, mut values)| {
                // Identifier assigned last so it wins when both roles share a column
                let name = raw[roles.display_name].trim();
                values[roles.display_name] = if name.is_empty() {
                    Value::Missing
                } else {
                    Value::Text(name.to_string())
                };

                let id = normalize_digits(&raw[roles.identifier]);
                values[roles.identifier] = if id.is_empty() {
                    Value::Missing
                } else {
                    Value::Text(id)
                };

                Arc::new(Record::new(schema.clone(), values))
            })
            .collect();

        Self {
            key: key.to_string(),
            schema,
            records,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    /// First record matching a normalized identifier
    ///
    /// Tried in order, stopping at the first hit:
    /// 1. exact equality
    /// 2. stored identifier contains the query
    /// 3. equal integer values (ignores leading zeros)
    pub fn lookup_by_identifier(&self, normalized_id: &str) -> Option<(usize, Arc<Record>)> {
        if normalized_id.is_empty() {
            return None;
        }

        let ids: Vec<(usize, &str)> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(row, record)| match record.identifier() {
                Value::Text(id) => Some((row, id.as_str())),
                _ => None,
            })
            .collect();

        let wanted = normalized_id.parse::<u128>().ok();

        let hit = ids
            .iter()
            .find(|(_, id)| *id == normalized_id)
            .or_else(|| ids.iter().find(|(_, id)| id.contains(normalized_id)))
            .or_else(|| {
                let wanted = wanted?;
                ids.iter()
                    .find(|(_, id)| id.parse::<u128>().ok() == Some(wanted))
            });

        hit.map(|&(row, _)| (row, self.records[row].clone()))
    }

    /// All records whose display name contains `needle`, case-insensitively
    pub fn scan_by_name(&self, needle: &str) -> Vec<(usize, Arc<Record>)> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                record
                    .display_name()
                    .display()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .map(|(row, record)| (row, record.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_common::config::ColumnAliases;

    fn cohort(csv: &str) -> Cohort {
        let table = RawTable::from_bytes(csv.as_bytes(), "test").unwrap();
        Cohort::from_table("2025", &table, &ColumnInferencer::from_aliases(&ColumnAliases::default()))
    }

    #[test]
    fn test_identifier_normalized_at_load() {
        let c = cohort("Number,الاسم,Math\n٠٥١٢٣٤,Ahmad,80\n 52000.0 ,Sara,45\n");
        assert_eq!(c.records()[0].identifier(), &Value::Text("051234".into()));
        assert_eq!(c.records()[1].identifier(), &Value::Text("52".into()));
        assert_eq!(c.schema().display_name_column(), "الاسم");
    }

    #[test]
    fn test_exact_match() {
        let c = cohort("Number,Name\n51234,Ahmad\n51235,Sara\n");
        let (row, record) = c.lookup_by_identifier("51235").unwrap();
        assert_eq!(row, 1);
        assert_eq!(record.display_name(), &Value::Text("Sara".into()));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let c = cohort("Number,Name\n51234,Ahmad\n51234,Other\n");
        let (row, _) = c.lookup_by_identifier("51234").unwrap();
        assert_eq!(row, 0);
    }

    #[test]
    fn test_exact_preferred_over_substring() {
        let c = cohort("Number,Name\n951234,Long\n51234,Exact\n");
        let (row, _) = c.lookup_by_identifier("51234").unwrap();
        assert_eq!(row, 1);
    }

    #[test]
    fn test_substring_fallback() {
        // Non-Latin stored identifier keeps a leading zero
        let c = cohort("Number,Name\n٠٥١٢٣٤,Ahmad\n");
        let (_, record) = c.lookup_by_identifier(&normalize_digits("512340")).unwrap();
        assert_eq!(record.display_name(), &Value::Text("Ahmad".into()));
    }

    #[test]
    fn test_numeric_fallback() {
        let c = cohort("Number,Name\n051,Ahmad\n");
        let (_, record) = c.lookup_by_identifier("00051").unwrap();
        assert_eq!(record.display_name(), &Value::Text("Ahmad".into()));
    }

    #[test]
    fn test_lookup_miss_and_empty() {
        let c = cohort("Number,Name\n51234,Ahmad\n");
        assert!(c.lookup_by_identifier("59999").is_none());
        assert!(c.lookup_by_identifier("").is_none());
    }

    #[test]
    fn test_scan_by_name_case_insensitive_substring() {
        let c = cohort("Number,Name\n51,Ahmad Ali\n52,FAHMI\n53,Sara\n");

        let hits: Vec<usize> = c.scan_by_name("ahm").into_iter().map(|(row, _)| row).collect();
        assert_eq!(hits, vec![0, 1]);

        assert_eq!(c.scan_by_name("AD AL").len(), 1);
        assert!(c.scan_by_name("zzz").is_empty());
        assert!(c.scan_by_name("  ").is_empty());
    }

    #[test]
    fn test_scan_every_substring_matches() {
        let c = cohort("Number,Name\n51,Ahmad\n");
        let name = "Ahmad";
        for start in 0..name.len() {
            for end in start + 1..=name.len() {
                let needle = &name[start..end];
                assert_eq!(c.scan_by_name(&needle.to_lowercase()).len(), 1, "{}", needle);
                assert_eq!(c.scan_by_name(&needle.to_uppercase()).len(), 1, "{}", needle);
            }
        }
    }

    #[test]
    fn test_single_column_source_loads() {
        let c = cohort("Number\n51234\n");
        assert_eq!(c.len(), 1);
        assert_eq!(c.schema().identifier, c.schema().display_name);
        assert!(c.lookup_by_identifier("51234").is_some());
    }

    #[test]
    fn test_missing_identifier_never_matches() {
        let c = cohort("Number,Name\n,Ghost\n51,Ahmad\n");
        assert_eq!(c.records()[0].identifier(), &Value::Missing);
        assert_eq!(c.lookup_by_identifier("51").unwrap().0, 1);
    }
}
