//! Field coercion. Turns loader cells into typed, non-negative values.
//!
//! A cell that cannot be coerced becomes missing on that field only; the row
//! itself always survives. The only fatal condition is a column that is
//! absent from every row of a non-empty input.

use campaign_core::types::{CampaignRecord, CellValue, Field, RawCampaignRow};
use campaign_core::{CampaignError, CampaignResult, EngineConfig};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A non-blank cell that could not be coerced and was recorded as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Zero-based input row index.
    pub row: usize,
    pub field: Field,
    pub raw: CellValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    pub records: Vec<CampaignRecord>,
    pub issues: Vec<FieldIssue>,
}

/// Coerce every row. Output has the same length and order as the input.
pub fn clean(rows: &[RawCampaignRow], config: &EngineConfig) -> CampaignResult<Vec<CampaignRecord>> {
    clean_with_report(rows, config).map(|report| report.records)
}

pub fn clean_with_report(rows: &[RawCampaignRow], config: &EngineConfig) -> CampaignResult<CleanReport> {
    check_schema(rows)?;

    let mut issues = Vec::new();
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut cleaner = RowCleaner {
                row,
                index,
                issues: &mut issues,
            };
            CampaignRecord {
                channel: cleaner.field(Field::Channel, coerce_label),
                impressions: cleaner.field(Field::Impressions, coerce_count),
                clicks: cleaner.field(Field::Clicks, coerce_count),
                conversions: cleaner.field(Field::Conversions, coerce_count),
                total_spend: cleaner.field(Field::TotalSpend, coerce_amount),
                revenue_generated: cleaner.field(Field::RevenueGenerated, coerce_amount),
                end_date: cleaner.field(Field::EndDate, |cell| coerce_date(cell, &config.date_formats)),
            }
        })
        .collect::<Vec<_>>();

    debug!(rows = records.len(), issues = issues.len(), "Cleaned campaign rows");
    if !issues.is_empty() {
        warn!(
            issues = issues.len(),
            rows = records.len(),
            "Some campaign fields could not be coerced and were set to missing"
        );
    }

    Ok(CleanReport { records, issues })
}

/// A column is a schema violation only when no row carries it at all.
fn check_schema(rows: &[RawCampaignRow]) -> CampaignResult<()> {
    if rows.is_empty() {
        return Ok(());
    }
    for field in Field::ALL {
        if rows.iter().all(|row| row.cell(field).is_absent()) {
            return Err(CampaignError::SchemaViolation { field });
        }
    }
    Ok(())
}

struct RowCleaner<'a> {
    row: &'a RawCampaignRow,
    index: usize,
    issues: &'a mut Vec<FieldIssue>,
}

impl RowCleaner<'_> {
    fn field<T>(&mut self, field: Field, coerce: impl Fn(&CellValue) -> Option<T>) -> Option<T> {
        let cell = self.row.cell(field);
        if cell.is_blank() {
            return None;
        }
        let value = coerce(cell);
        if value.is_none() {
            self.issues.push(FieldIssue {
                row: self.index,
                field,
                raw: cell.clone(),
            });
        }
        value
    }
}

fn coerce_label(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => Some(s.trim().to_string()),
        CellValue::Number(n) if n.is_finite() => Some(n.to_string()),
        _ => None,
    }
}

fn parse_number(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Non-negative decimal amount.
fn coerce_amount(cell: &CellValue) -> Option<f64> {
    // -0.0 passes the sign check; normalise it
    parse_number(cell).map(|v| v + 0.0)
}

/// Non-negative whole count. Fractional counts are rejected.
fn coerce_count(cell: &CellValue) -> Option<u64> {
    let value = parse_number(cell)?;
    (value.fract() == 0.0 && value < u64::MAX as f64).then_some(value as u64)
}

fn coerce_date(cell: &CellValue, formats: &[String]) -> Option<NaiveDate> {
    let CellValue::Text(s) = cell else {
        return None;
    };
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(s, format)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(s, format).ok().map(|dt| dt.date()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(channel: &str, clicks: CellValue, spend: CellValue, date: &str) -> RawCampaignRow {
        RawCampaignRow {
            channel: channel.into(),
            impressions: 1000u64.into(),
            clicks,
            conversions: 5u64.into(),
            total_spend: spend,
            revenue_generated: 100.0.into(),
            end_date: date.into(),
        }
    }

    #[test]
    fn test_coerces_text_and_numbers() {
        let rows = vec![row("Email", " 120 ".into(), "45.5".into(), "2024-03-15")];
        let records = clean(&rows, &EngineConfig::default()).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.channel.as_deref(), Some("Email"));
        assert_eq!(r.clicks, Some(120));
        assert_eq!(r.total_spend, Some(45.5));
        assert_eq!(r.end_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_bad_cells_become_missing_without_dropping_row() {
        let rows = vec![
            row("Email", "n/a".into(), (-3.0).into(), "not a date"),
            row("Social", 12.5.into(), CellValue::Bool(true), "2024-13-01"),
        ];
        let report = clean_with_report(&rows, &EngineConfig::default()).unwrap();

        assert_eq!(report.records.len(), 2);
        for r in &report.records {
            assert_eq!(r.clicks, None);
            assert_eq!(r.total_spend, None);
            assert_eq!(r.end_date, None);
            assert_eq!(r.impressions, Some(1000));
        }
        assert_eq!(report.issues.len(), 6);
        assert_eq!(report.issues[0].row, 0);
        assert_eq!(report.issues[0].field, Field::Clicks);
        assert_eq!(report.issues[0].raw, CellValue::Text("n/a".into()));
    }

    #[test]
    fn test_blank_cells_are_missing_but_not_issues() {
        let rows = vec![row("  ", CellValue::Blank, "".into(), "")];
        let report = clean_with_report(&rows, &EngineConfig::default()).unwrap();

        let r = &report.records[0];
        assert_eq!(r.channel, None);
        assert_eq!(r.clicks, None);
        assert_eq!(r.total_spend, None);
        assert_eq!(r.end_date, None);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_count_beyond_u64_is_an_issue() {
        let mut overflowing = row("Email", "18446744073709551616".into(), 1.0.into(), "2024-01-01");
        overflowing.impressions = 1e19.into();
        let report = clean_with_report(&[overflowing], &EngineConfig::default()).unwrap();

        let r = &report.records[0];
        assert_eq!(r.clicks, None);
        assert_eq!(r.impressions, Some(10_000_000_000_000_000_000));
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].field, Field::Clicks);
    }

    #[test]
    fn test_date_formats() {
        let config = EngineConfig::default();
        let expected = NaiveDate::from_ymd_opt(2023, 11, 30);
        for text in [
            "2023-11-30",
            "2023/11/30",
            "11/30/2023",
            "30.11.2023",
            "2023-11-30 08:15:00",
            "2023-11-30T08:15:00",
            "2023-11-30T08:15:00+02:00",
        ] {
            assert_eq!(coerce_date(&text.into(), &config.date_formats), expected, "{text}");
        }
        assert_eq!(coerce_date(&CellValue::Number(45260.0), &config.date_formats), None);
    }

    #[test]
    fn test_schema_violation_names_absent_column() {
        let mut first = row("Email", 1u64.into(), 1.0.into(), "2024-01-01");
        let mut second = first.clone();
        first.conversions = CellValue::Absent;
        second.conversions = CellValue::Absent;

        let err = clean(&[first, second], &EngineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CampaignError::SchemaViolation {
                field: Field::Conversions
            }
        ));
        assert!(err.to_string().contains("Conversions"));
    }

    #[test]
    fn test_column_absent_in_some_rows_only_is_not_fatal() {
        let first = row("Email", 1u64.into(), 1.0.into(), "2024-01-01");
        let mut second = first.clone();
        second.total_spend = CellValue::Absent;

        let records = clean(&[first, second], &EngineConfig::default()).unwrap();
        assert_eq!(records[1].total_spend, None);
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let records = clean(&[], &EngineConfig::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let rows = vec![
            row(" Search ", "77".into(), 3.25.into(), "03/01/2024"),
            row("", "bogus".into(), CellValue::Blank, "2024-02-29 10:00:00"),
            row("Display", 0u64.into(), "0".into(), "garbage"),
        ];
        let config = EngineConfig::default();

        let once = clean(&rows, &config).unwrap();
        let as_raw: Vec<RawCampaignRow> = once.iter().cloned().map(RawCampaignRow::from).collect();
        let twice = clean(&as_raw, &config).unwrap();

        assert_eq!(once, twice);
    }
}
