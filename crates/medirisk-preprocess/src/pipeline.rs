//! Raw-to-cleaned record conversion.
//!
//! Cleaning runs in four steps over a whole batch:
//! 1. fields equal to the sentinel are missing
//! 2. every other field is parsed as a number; failures are missing too
//! 3. missing values take their column's median over the batch
//! 4. the target column is binarized (`> 0` → 1)

use std::path::Path;

use medirisk_common::schema::record_columns;
use medirisk_common::{CleanedRecord, FeatureVector, MediriskError, Result, FEATURE_COUNT, RECORD_WIDTH};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::impute::{binarize_target, median};
use crate::io::{read_raw_records, write_cleaned_records};

/// Marker for a missing value in raw files.
pub const DEFAULT_SENTINEL: &str = "?";

/// One unparsed row of a raw record file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessOptions {
    /// Field value treated as missing.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    /// Imputation value for a column with no parseable values at all.
    #[serde(default)]
    pub empty_column_fill: f64,
}

fn default_sentinel() -> String { DEFAULT_SENTINEL.to_string() }

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            empty_column_fill: 0.0,
        }
    }
}

impl PreprocessOptions {
    pub fn validate(&self) -> Result<()> {
        if self.sentinel.trim().is_empty() {
            return Err(MediriskError::Config("sentinel must not be empty".into()));
        }
        if !self.empty_column_fill.is_finite() {
            return Err(MediriskError::Config(format!(
                "empty_column_fill must be finite, got {}",
                self.empty_column_fill
            )));
        }
        Ok(())
    }
}

/// Per-column outcome of a cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub missing: usize,
    pub fill_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessReport {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    /// Columns with no usable value, filled with the configured fallback.
    pub empty_columns: Vec<String>,
    pub positive_targets: usize,
}

impl PreprocessReport {
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

#[derive(Debug, Clone)]
pub struct CleanedBatch {
    pub records: Vec<CleanedRecord>,
    pub report: PreprocessReport,
}

#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    options: PreprocessOptions,
}

impl Preprocessor {
    pub fn new(options: PreprocessOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Parse a single raw field. The sentinel, unparseable text and
    /// non-finite numbers are all missing.
    pub fn parse_field(&self, raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed == self.options.sentinel {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn parse_record(&self, row: usize, record: &RawRecord) -> Result<[Option<f64>; RECORD_WIDTH]> {
        if record.fields.len() > RECORD_WIDTH {
            return Err(MediriskError::MalformedRecord {
                row,
                reason: format!("expected {} fields, found {}", RECORD_WIDTH, record.fields.len()),
            });
        }
        let mut parsed = [None; RECORD_WIDTH];
        for (slot, field) in parsed.iter_mut().zip(&record.fields) {
            *slot = self.parse_field(field);
        }
        Ok(parsed)
    }

    /// Clean a batch in memory.
    pub fn clean(&self, raw: &[RawRecord]) -> Result<CleanedBatch> {
        let parsed = raw
            .iter()
            .enumerate()
            .map(|(i, record)| self.parse_record(i + 1, record))
            .collect::<Result<Vec<_>>>()?;

        let names = record_columns();
        let mut fills = [0.0; RECORD_WIDTH];
        let mut columns = Vec::with_capacity(RECORD_WIDTH);
        let mut empty_columns = Vec::new();

        for col in 0..RECORD_WIDTH {
            let present: Vec<f64> = parsed.iter().filter_map(|row| row[col]).collect();
            let missing = parsed.len() - present.len();

            fills[col] = match median(&present) {
                Some(m) => m,
                None => {
                    if !parsed.is_empty() {
                        warn!(
                            "Column '{}' has no usable values; filling with {}",
                            names[col], self.options.empty_column_fill
                        );
                        empty_columns.push(names[col].to_string());
                    }
                    self.options.empty_column_fill
                }
            };

            if missing > 0 {
                debug!("Imputing {} missing '{}' values with {}", missing, names[col], fills[col]);
            }

            columns.push(ColumnSummary {
                column: names[col].to_string(),
                missing,
                fill_value: fills[col],
            });
        }

        let records: Vec<CleanedRecord> = parsed
            .iter()
            .map(|row| {
                let mut values = [0.0; FEATURE_COUNT];
                for (col, value) in values.iter_mut().enumerate() {
                    *value = row[col].unwrap_or(fills[col]);
                }
                let target = row[RECORD_WIDTH - 1].unwrap_or(fills[RECORD_WIDTH - 1]);
                CleanedRecord {
                    features: FeatureVector::new(values),
                    target: binarize_target(target),
                }
            })
            .collect();

        let report = PreprocessReport {
            rows: records.len(),
            positive_targets: records.iter().filter(|r| r.target == 1).count(),
            columns,
            empty_columns,
        };

        Ok(CleanedBatch { records, report })
    }

    /// Read a raw file, clean it and persist the result.
    pub fn run(&self, input: &Path, output: &Path) -> Result<PreprocessReport> {
        info!("Preprocessing {:?}", input);
        let raw = read_raw_records(input)?;
        let batch = self.clean(&raw)?;
        write_cleaned_records(output, &batch.records)?;

        info!(
            "Cleaned dataset saved at {:?}: {} rows, {} values imputed, {} positive",
            output,
            batch.report.rows,
            batch.report.total_missing(),
            batch.report.positive_targets
        );
        Ok(batch.report)
    }
}

/// Clean a batch with default options.
///
/// Nothing is written to disk; [`Preprocessor::run`] is the entry point that
/// also persists the cleaned file.
pub fn preprocess(raw: &[RawRecord]) -> Result<Vec<CleanedRecord>> {
    Ok(Preprocessor::default().clean(raw)?.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medirisk_common::Feature;

    fn row(fields: &str) -> RawRecord {
        RawRecord::new(fields.split(','))
    }

    #[test]
    fn test_parse_field() {
        let p = Preprocessor::default();
        assert_eq!(p.parse_field("63.0"), Some(63.0));
        assert_eq!(p.parse_field(" 2 "), Some(2.0));
        assert_eq!(p.parse_field("?"), None);
        assert_eq!(p.parse_field("abc"), None);
        assert_eq!(p.parse_field(""), None);
        assert_eq!(p.parse_field("NaN"), None);
        assert_eq!(p.parse_field("inf"), None);
    }

    #[test]
    fn test_sentinel_is_imputed_with_median() {
        let raw = vec![
            row("63,1,1,145,233,1,2,150,0,2.3,3,0,6,0"),
            row("67,1,4,160,286,0,2,108,1,1.5,2,3,3,2"),
            row("67,1,4,120,229,0,2,129,1,2.6,2,2,7,1"),
            row("37,1,3,130,250,0,0,187,0,3.5,3,?,3,0"),
        ];
        let batch = Preprocessor::default().clean(&raw).unwrap();
        // ca values present: 0, 3, 2 → median 2
        assert_eq!(batch.records[3].features[Feature::Ca], 2.0);
        assert_eq!(batch.report.columns[Feature::Ca.index()].missing, 1);
        assert_eq!(batch.report.total_missing(), 1);
    }

    #[test]
    fn test_even_count_median() {
        let raw = vec![
            row("40,1,1,120,200,0,0,150,0,1.0,1,0,3,0"),
            row("50,1,1,120,200,0,0,150,0,1.0,1,1,3,0"),
            row("60,1,1,120,200,0,0,150,0,1.0,1,2,3,0"),
            row("70,1,1,120,200,0,0,150,0,1.0,1,3,3,0"),
            row("?,1,1,120,200,0,0,150,0,1.0,1,x,3,0"),
        ];
        let records = preprocess(&raw).unwrap();
        assert_eq!(records[4].features[Feature::Age], 55.0);
        assert_eq!(records[4].features[Feature::Ca], 1.5);
    }

    #[test]
    fn test_target_binarized() {
        let raw: Vec<RawRecord> = (0..5)
            .map(|t| row(&format!("50,1,1,120,200,0,0,150,0,1.0,1,0,3,{t}")))
            .collect();
        let targets: Vec<u8> = preprocess(&raw).unwrap().iter().map(|r| r.target).collect();
        assert_eq!(targets, vec![0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_missing_target_imputed_before_binarizing() {
        let raw = vec![
            row("50,1,1,120,200,0,0,150,0,1.0,1,0,3,0"),
            row("50,1,1,120,200,0,0,150,0,1.0,1,0,3,2"),
            row("50,1,1,120,200,0,0,150,0,1.0,1,0,3,3"),
            row("50,1,1,120,200,0,0,150,0,1.0,1,0,3,?"),
        ];
        // median of {0, 2, 3} is 2 → binarized to 1
        assert_eq!(preprocess(&raw).unwrap()[3].target, 1);
    }

    #[test]
    fn test_empty_column_uses_fallback() {
        let raw = vec![
            row("50,1,1,120,200,0,0,150,0,1.0,1,?,3,0"),
            row("60,0,2,130,210,1,1,140,1,2.0,2,?,7,1"),
        ];
        let options = PreprocessOptions { empty_column_fill: -1.0, ..Default::default() };
        let batch = Preprocessor::new(options).unwrap().clean(&raw).unwrap();
        assert_eq!(batch.report.empty_columns, vec!["ca".to_string()]);
        assert!(batch.records.iter().all(|r| r.features[Feature::Ca] == -1.0));
    }

    #[test]
    fn test_default_empty_column_fill_is_zero() {
        let raw = vec![row("50,1,1,120,200,0,0,150,0,1.0,1,?,?,0")];
        let records = preprocess(&raw).unwrap();
        assert_eq!(records[0].features[Feature::Ca], 0.0);
        assert_eq!(records[0].features[Feature::Thal], 0.0);
        assert!(records[0].features.is_finite());
    }

    #[test]
    fn test_short_row_pads_missing() {
        let raw = vec![
            row("50,1,1,120,200,0,0,150,0,1.0,1,0,3,1"),
            row("52,1,1,120,200,0,0,150,0,1.0,1,0"),
        ];
        let records = preprocess(&raw).unwrap();
        assert_eq!(records[1].features[Feature::Thal], 3.0);
        assert_eq!(records[1].target, 1);
    }

    #[test]
    fn test_wide_row_rejected() {
        let raw = vec![
            row("50,1,1,120,200,0,0,150,0,1.0,1,0,3,1"),
            row("50,1,1,120,200,0,0,150,0,1.0,1,0,3,1,99"),
        ];
        let err = preprocess(&raw).unwrap_err();
        assert!(matches!(err, MediriskError::MalformedRecord { row: 2, .. }));
    }

    #[test]
    fn test_empty_batch() {
        let batch = Preprocessor::default().clean(&[]).unwrap();
        assert!(batch.records.is_empty());
        assert!(batch.report.empty_columns.is_empty());
    }

    #[test]
    fn test_options_validation() {
        let bad = PreprocessOptions { sentinel: " ".into(), ..Default::default() };
        assert!(Preprocessor::new(bad).is_err());
        let bad = PreprocessOptions { empty_column_fill: f64::NAN, ..Default::default() };
        assert!(Preprocessor::new(bad).is_err());
    }

    #[test]
    fn test_custom_sentinel() {
        let options = PreprocessOptions { sentinel: "NA".into(), ..Default::default() };
        let p = Preprocessor::new(options).unwrap();
        assert_eq!(p.parse_field("NA"), None);
        // "?" still fails to parse, so it is missing either way
        assert_eq!(p.parse_field("?"), None);
    }
}
