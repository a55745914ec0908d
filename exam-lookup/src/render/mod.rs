//! Report rendering
//!
//! Both renderers share one reserved column list and one subject dictionary:
//! a column counts as a subject when its name is in the dictionary, is not
//! reserved, and its value is present.

mod document;
mod text;

pub use document::{format_birth_date, render_document, Document};
pub use text::render_text;

use crate::store::Value;

/// Identity and aggregate columns, compared case-insensitively
pub const RESERVED_COLUMNS: &[&str] = &[
    "number",
    "المديرية",
    "المدرسة",
    "الاسم",
    "محل الميلاد",
    "تاريخ الميلاد",
    "المجموع",
    "المعدل",
    "النتيجة",
    "ملاحظات",
    "العام الدراسي",
];

/// Subject column name -> English label
pub const SUBJECT_TRANSLATIONS: &[(&str, &str)] = &[
    ("القران", "Holy Quran"),
    ("الاسلامية", "Islamic Education"),
    ("العربي", "Arabic Language"),
    ("الانجليزي", "English Language"),
    ("الرياضيات", "Mathematics"),
    ("العلوم", "Science"),
    ("الاحتماعيات", "Social Studies"),
];

// Dedicated columns read by the transcript
pub const COL_INSTITUTION: &str = "المدرسة";
pub const COL_SUB_UNIT: &str = "المديرية";
pub const COL_BIRTH_PLACE: &str = "محل الميلاد";
pub const COL_BIRTH_DATE: &str = "تاريخ الميلاد";
pub const COL_TOTAL: &str = "المجموع";
pub const COL_AVERAGE: &str = "المعدل";
pub const COL_FINAL_RESULT: &str = "النتيجة";
pub const COL_REMARKS: &str = "ملاحظات";

/// Renderer knobs from configuration
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// Numeric values at or above this pass
    pub pass_threshold: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            pass_threshold: 50.0,
        }
    }
}

pub fn is_reserved(column: &str) -> bool {
    let column = column.trim().to_lowercase();
    RESERVED_COLUMNS.iter().any(|r| *r == column)
}

/// English label for a subject column
pub fn subject_label(column: &str) -> Option<&'static str> {
    let column = column.trim();
    SUBJECT_TRANSLATIONS
        .iter()
        .find(|(local, _)| *local == column)
        .map(|(_, label)| *label)
}

pub fn is_subject(column: &str, value: &Value) -> bool {
    subject_label(column).is_some() && !is_reserved(column) && !value.is_missing()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_is_case_insensitive() {
        assert!(is_reserved("Number"));
        assert!(is_reserved(" المجموع "));
        assert!(!is_reserved("العلوم"));
    }

    #[test]
    fn test_subject_detection() {
        assert!(is_subject("العلوم", &Value::Number(70.0)));
        assert!(is_subject("العربي", &Value::Text("غائب".into())));
        assert!(!is_subject("العلوم", &Value::Missing));
        assert!(!is_subject("Physics", &Value::Number(70.0)));
        assert!(!is_subject("المجموع", &Value::Number(500.0)));
    }

    #[test]
    fn test_subject_label() {
        assert_eq!(subject_label("الرياضيات"), Some("Mathematics"));
        assert_eq!(subject_label("Math"), None);
    }
}
