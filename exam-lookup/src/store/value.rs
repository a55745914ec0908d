//! Cell values and records

use std::fmt;
use std::sync::Arc;

/// A single scalar cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Missing,
}

impl Value {
    /// Classify a raw cell: empty is Missing, finite decimals are Number,
    /// anything else is Text (trimmed).
    pub fn parse_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display form, `None` when Missing
    pub fn display(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Missing => Ok(()),
        }
    }
}

/// Integral numbers print without a fractional part
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Column layout shared by every record of a cohort
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub columns: Vec<String>,
    /// Index of the identifier column
    pub identifier: usize,
    /// Index of the display-name column
    pub display_name: usize,
}

impl Schema {
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn identifier_column(&self) -> &str {
        &self.columns[self.identifier]
    }

    pub fn display_name_column(&self) -> &str {
        &self.columns[self.display_name]
    }
}

/// One row of a cohort, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Record {
    /// Build a record; `values` is padded or truncated to the schema width
    pub fn new(schema: Arc<Schema>, mut values: Vec<Value>) -> Self {
        values.resize(schema.columns.len(), Value::Missing);
        Self { schema, values }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Value of a named column; unknown columns read as Missing
    pub fn get(&self, column: &str) -> &Value {
        self.schema
            .position(column)
            .map(|i| &self.values[i])
            .unwrap_or(&Value::Missing)
    }

    pub fn identifier(&self) -> &Value {
        &self.values[self.schema.identifier]
    }

    pub fn display_name(&self) -> &Value {
        &self.values[self.schema.display_name]
    }

    /// `(column, value)` pairs in column order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
