//! Printable HTML transcript
//!
//! The page is self-contained: inline CSS, no scripts or stylesheets fetched
//! from elsewhere, right-to-left layout, A4 print rules.

use std::fmt::Write;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use exam_common::digits::translate_digits;

use super::{
    is_subject, subject_label, COL_AVERAGE, COL_BIRTH_DATE, COL_BIRTH_PLACE, COL_FINAL_RESULT,
    COL_INSTITUTION, COL_REMARKS, COL_SUB_UNIT, COL_TOTAL,
};
use crate::store::{format_number, Record, Value};
use crate::vocab;

/// A rendered file ready to hand to the message channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub content_type: String,
    pub body: String,
}

const MAX_SCORE: u32 = 100;
const MIN_SCORE: u32 = 50;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const STYLE: &str = r#"
body { direction: rtl; text-align: right; background-color: #f4f4f4; font-family: Tahoma, Arial, sans-serif; }
.container { max-width: 1001px; margin: auto; background-color: #fff; padding: 20px; border: 1px solid #ddd; box-shadow: 0 0 10px rgba(0,0,0,0.1); }
#ra { padding: 20px; border: 1px solid #ccc; border-radius: 10px; }
.grades { width: 100%; border-collapse: collapse; margin-top: 20px; }
.grades th, .grades td { border: 1px solid #ddd; padding: 4px; text-align: center; }
.grades thead th { background-color: #f2f2f2; }
.grades .total { font-weight: bold; }
.summary { font-size: 20.5px; text-align: center; margin-top: 20px; }
.title-line { font-size: 20px; font-weight: bold; margin-bottom: 10px; text-align: center; }
.box-info { display: flex; justify-content: space-between; align-items: center; border: 1px solid #000; padding: 10px; border-radius: 10px; margin-bottom: 10px; }
.row-line { display: flex; justify-content: space-between; font-size: 14px; margin-bottom: 5px; }
.row-line > div, .box-info > div { flex: 1; }
.name-line { font-size: 18px; font-weight: bold; margin-top: 10px; margin-bottom: 5px; }
.notice { text-align: center; margin-top: 30px; }
.notice b { color: red; }
.print { text-align: center; margin-top: 20px; }
@media print {
  @page { size: A4; margin: 0; }
  body { margin: 0; padding: 0; background: #fff; }
  .container { max-width: 100%; width: 100%; margin: 0; padding: 10px; border: none; box-shadow: none; font-size: 11pt; }
  .grades th, .grades td { font-size: 10pt; }
  .print { display: none; }
}
"#;

/// Render one record's transcript
///
/// Identity fields fall back to a placeholder, subjects are translated via
/// the subject dictionary, the maximum score is `subjects * 100`, and the
/// aggregate fields are read from their dedicated columns.
pub fn render_document(record: &Record, cohort_key: &str) -> Document {
    let identifier = record
        .identifier()
        .display()
        .unwrap_or_else(|| vocab::NOT_AVAILABLE.to_string());
    let name = or_placeholder(record.display_name());
    let school = or_placeholder(record.get(COL_INSTITUTION));
    let directorate = or_placeholder(record.get(COL_SUB_UNIT));
    let birth_place = or_placeholder(record.get(COL_BIRTH_PLACE));
    let birth_date = format_birth_date(record.get(COL_BIRTH_DATE));

    let total = or_placeholder(record.get(COL_TOTAL));
    let average = match record.get(COL_AVERAGE) {
        Value::Number(n) => format!("{:.2}", n),
        other => or_placeholder(other),
    };
    let final_result = or_placeholder(record.get(COL_FINAL_RESULT));
    let remarks = record.get(COL_REMARKS).display().unwrap_or_default();

    let mut grade_rows = String::new();
    let mut subjects = 0u32;
    for (column, value) in record.fields() {
        if !is_subject(column, value) {
            continue;
        }
        subjects += 1;
        let grade = match value {
            Value::Number(n) => format_number(n.trunc()),
            other => other.to_string(),
        };
        let _ = write!(
            grade_rows,
            r#"
      <tr>
        <td><b>{subject}</b></td><td>{max}</td><td>{min}</td><td><b>{grade}</b></td><td><b>{label}</b></td>
      </tr>"#,
            subject = escape(column.trim()),
            max = MAX_SCORE,
            min = MIN_SCORE,
            grade = escape(&grade),
            label = escape(subject_label(column).unwrap_or_default()),
        );
    }

    let max_total = subjects * MAX_SCORE;
    let (max_cell, min_cell) = if max_total > 0 {
        (
            max_total.to_string(),
            format_number(f64::from(max_total) / 2.0),
        )
    } else {
        (vocab::NOT_AVAILABLE.to_string(), vocab::NOT_AVAILABLE.to_string())
    };

    let body = format!(
        r#"<!DOCTYPE html>
<html lang="ar" dir="rtl">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
  <title>{title} {cohort} - {name}</title>
  <style>{style}</style>
</head>
<body dir="rtl" lang="ar">
  <div class="container">
    <div id="ra">
      <div class="title-line">{title} {cohort}</div>
      <div class="box-info">
        <div style="text-align: right;">{l_seat} : {identifier}</div>
        <div style="text-align: left;">{l_year}: {cohort}</div>
      </div>
      <div class="row-line">
        <div style="text-align: right;">{l_school} : {school}</div>
        <div style="text-align: left;">{l_directorate} : {directorate}</div>
      </div>
      <div class="name-line">{l_student} : {name}</div>
      <div class="row-line">
        <div style="text-align: right;">{l_birth_place} : {birth_place}</div>
        <div style="text-align: left;">{l_birth_date} : {birth_date}</div>
      </div>
      <table class="grades">
        <thead>
          <tr><td colspan="5" style="border: none;"><h2 style="font-size: 18px;">{l_transcript}</h2></td></tr>
          <tr><th>{l_subjects}</th><th>{l_max}</th><th>{l_min}</th><th>{l_grade}</th><th>SUBJECTS</th></tr>
        </thead>
        <tbody>{grade_rows}
          <tr class="total">
            <td>{l_total}</td><td>{max_cell}</td><td>{min_cell}</td><td>{total}</td><td>Total</td>
          </tr>
        </tbody>
      </table>
      <div class="summary">
        <span>{l_average} : {average} %</span><br/>
        <span>{l_final} : <b>{final_result}</b></span><br/>
        <span>{l_remarks} : <b>{remarks}</b></span>
      </div>
      <div class="notice"><b>{notice_prefix}</b>{notice}</div>
    </div>
    <div class="print"><button onclick="window.print()">{print}</button></div>
  </div>
</body>
</html>
"#,
        title = vocab::TITLE,
        cohort = escape(cohort_key),
        name = escape(&name),
        style = STYLE,
        l_seat = vocab::LABEL_SEAT,
        identifier = escape(&identifier),
        l_year = vocab::LABEL_YEAR,
        l_school = vocab::LABEL_SCHOOL,
        school = escape(&school),
        l_directorate = vocab::LABEL_DIRECTORATE,
        directorate = escape(&directorate),
        l_student = vocab::LABEL_STUDENT,
        l_birth_place = vocab::LABEL_BIRTH_PLACE,
        birth_place = escape(&birth_place),
        l_birth_date = vocab::LABEL_BIRTH_DATE,
        birth_date = escape(&birth_date),
        l_transcript = vocab::LABEL_TRANSCRIPT,
        l_subjects = vocab::LABEL_SUBJECTS,
        l_max = vocab::LABEL_MAX,
        l_min = vocab::LABEL_MIN,
        l_grade = vocab::LABEL_GRADE,
        grade_rows = grade_rows,
        l_total = vocab::LABEL_TOTAL,
        max_cell = max_cell,
        min_cell = min_cell,
        total = escape(&total),
        l_average = vocab::LABEL_AVERAGE,
        average = escape(&average),
        l_final = vocab::LABEL_FINAL_RESULT,
        final_result = escape(&final_result),
        l_remarks = vocab::LABEL_REMARKS,
        remarks = escape(&remarks),
        notice_prefix = vocab::NOTICE_PREFIX,
        notice = vocab::UNOFFICIAL_NOTICE,
        print = vocab::PRINT_BUTTON,
    );

    Document {
        file_name: format!("result_{}.html", file_stem(&identifier)),
        content_type: "text/html; charset=utf-8".to_string(),
        body,
    }
}

/// Reformat a birth date as `YYYY/MM/DD`
///
/// Text in a known date layout is reformatted, numbers are read as
/// spreadsheet serial days, anything else passes through unchanged.
pub fn format_birth_date(value: &Value) -> String {
    match value {
        Value::Missing => vocab::NOT_AVAILABLE.to_string(),
        Value::Number(n) => serial_date(*n)
            .map(|d| d.format("%Y/%m/%d").to_string())
            .unwrap_or_else(|| value.to_string()),
        Value::Text(text) => parse_date_text(text)
            .map(|d| d.format("%Y/%m/%d").to_string())
            .unwrap_or_else(|| text.clone()),
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = translate_digits(text.trim());
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&text, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(&text, f).ok())
                .map(|dt| dt.date())
        })
}

/// Spreadsheet serial day number (epoch 1899-12-30)
fn serial_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn or_placeholder(value: &Value) -> String {
    value
        .display()
        .unwrap_or_else(|| vocab::NOT_AVAILABLE.to_string())
}

/// Keep file names to ASCII alphanumerics
fn file_stem(identifier: &str) -> String {
    let stem: String = identifier
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if stem.is_empty() {
        "unknown".to_string()
    } else {
        stem
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
