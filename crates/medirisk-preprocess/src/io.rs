//! Record file reading and writing.
//!
//! Raw files are headerless; cleaned files carry a header row naming every
//! column in schema order.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use medirisk_common::schema::record_columns;
use medirisk_common::{CleanedRecord, FeatureVector, MediriskError, Result, FEATURE_COUNT, RECORD_WIDTH};
use tracing::debug;

use crate::pipeline::RawRecord;

/// Read a headerless raw record file.
pub fn read_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    debug!("Loading raw records from {:?}", path);
    let file = File::open(path)?;
    read_raw_from(file)
}

pub fn read_raw_from<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(RawRecord::new(record.iter()));
    }
    Ok(records)
}

/// Write cleaned records with a header row, creating parent directories.
pub fn write_cleaned_records(path: &Path, records: &[CleanedRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_cleaned_to(file, records)
}

pub fn write_cleaned_to<W: Write>(writer: W, records: &[CleanedRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(record_columns())?;

    for record in records {
        let mut fields: Vec<String> = record
            .features
            .as_slice()
            .iter()
            .map(|v| v.to_string())
            .collect();
        fields.push(record.target.to_string());
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read a cleaned record file back, validating header and values.
pub fn read_cleaned_records(path: &Path) -> Result<Vec<CleanedRecord>> {
    debug!("Loading cleaned records from {:?}", path);
    let file = File::open(path)?;
    read_cleaned_from(file)
}

pub fn read_cleaned_from<R: Read>(reader: R) -> Result<Vec<CleanedRecord>> {
    let mut reader = csv::Reader::from_reader(reader);

    let expected = record_columns();
    let headers = reader.headers()?;
    if headers.len() != RECORD_WIDTH || headers.iter().zip(expected).any(|(h, e)| h.trim() != e) {
        return Err(MediriskError::MalformedRecord {
            row: 0,
            reason: format!("unexpected header: {}", headers.iter().collect::<Vec<_>>().join(",")),
        });
    }

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result?;

        let mut values = [0.0; RECORD_WIDTH];
        for (col, field) in record.iter().enumerate() {
            values[col] = field
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| MediriskError::MalformedRecord {
                    row,
                    reason: format!("column '{}' is not numeric: {:?}", expected[col], field),
                })?;
        }

        let target = match values[RECORD_WIDTH - 1] {
            t if t == 0.0 => 0,
            t if t == 1.0 => 1,
            t => {
                return Err(MediriskError::MalformedRecord {
                    row,
                    reason: format!("target must be 0 or 1, got {t}"),
                })
            }
        };

        let mut features = [0.0; FEATURE_COUNT];
        features.copy_from_slice(&values[..FEATURE_COUNT]);
        records.push(CleanedRecord {
            features: FeatureVector::new(features),
            target,
        });
    }
    Ok(records)
}
