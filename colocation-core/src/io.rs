//! CSV ingestion and serialization of instance tables.
//!
//! `csv`'s header matching is exact and case-sensitive, so this module
//! reads the raw header row first, builds a case-insensitive alias map
//! to the canonical `feature,idx,x,y` columns, rewrites the reader's
//! header accordingly, and deserializes each row into [`Row`] from
//! there on.

use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;

use crate::dataset::SpatialDataset;
use crate::error::{CoLocationError, Result};
use crate::instance::Instance;

const FEATURE_ALIASES: &[&str] = &["feature"];
const IDX_ALIASES: &[&str] = &["idx", "instanceid"];
const X_ALIASES: &[&str] = &["x"];
const Y_ALIASES: &[&str] = &["y"];

#[derive(Debug, Deserialize)]
struct Row {
    feature: String,
    idx: u64,
    x: f64,
    y: f64,
}

fn canonical_header(header: &csv::StringRecord, row: usize) -> Result<csv::StringRecord> {
    let lower: Vec<String> = header.iter().map(|h| h.trim().to_ascii_lowercase()).collect();

    let find = |aliases: &[&str], column: &str| -> Result<usize> {
        lower
            .iter()
            .position(|h| aliases.contains(&h.as_str()))
            .ok_or_else(|| CoLocationError::InputError {
                row,
                message: format!("missing required column {column:?} (header: {lower:?})"),
            })
    };

    let feature_pos = find(FEATURE_ALIASES, "feature")?;
    let idx_pos = find(IDX_ALIASES, "idx")?;
    let x_pos = find(X_ALIASES, "x")?;
    let y_pos = find(Y_ALIASES, "y")?;

    let mut renamed: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    renamed[feature_pos] = "feature".to_string();
    renamed[idx_pos] = "idx".to_string();
    renamed[x_pos] = "x".to_string();
    renamed[y_pos] = "y".to_string();

    Ok(csv::StringRecord::from(renamed))
}

/// Reads an instance table from a CSV file at `path` and builds a
/// [`SpatialDataset`] from it.
///
/// The header row is row 0; the first data row is row 1. Column names
/// are matched case-insensitively against `feature`, `idx`/`InstanceID`,
/// `x`, and `y`; extra columns are ignored.
pub fn read_instances_csv(path: impl AsRef<Path>) -> Result<SpatialDataset> {
    let file = std::fs::File::open(path)?;
    read_instances(file)
}

/// As [`read_instances_csv`], but reads from any `Read` source.
pub fn read_instances(source: impl Read) -> Result<SpatialDataset> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(source);

    let original_header = reader.headers()?.clone();
    let aliased = canonical_header(&original_header, 0)?;
    reader.set_headers(aliased);

    let mut instances = Vec::new();
    for (row_offset, row) in reader.deserialize::<Row>().enumerate() {
        let row_num = row_offset + 1;
        let row: Row = row.map_err(|e| CoLocationError::InputError {
            row: row_num,
            message: e.to_string(),
        })?;

        if row.feature.trim().is_empty() {
            return Err(CoLocationError::InputError {
                row: row_num,
                message: "feature label is empty".to_string(),
            });
        }

        instances.push(Instance::new(row.feature, row.idx, row.x, row.y));
    }

    SpatialDataset::new(instances)
}

/// Writes `dataset`'s instances to `path` as CSV, in the dataset's
/// total order, with header `feature,idx,x,y`.
pub fn write_instances_csv(dataset: &SpatialDataset, path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_instances(dataset, file)
}

/// As [`write_instances_csv`], but writes to any `Write` sink.
pub fn write_instances(dataset: &SpatialDataset, sink: impl Write) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(sink);
    writer.write_record(["feature", "idx", "x", "y"])?;
    for instance in dataset.instances() {
        writer.write_record([
            instance.feature().to_string(),
            instance.idx().to_string(),
            instance.x().to_string(),
            instance.y().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_canonical_header() {
        let csv = "feature,idx,x,y\nA,1,0.0,0.0\nB,1,0.1,0.0\n";
        let dataset = read_instances(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn reads_case_insensitive_alias_header() {
        let csv = "Feature,InstanceID,X,Y\nA,1,0.0,0.0\n";
        let dataset = read_instances(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.instance(0).feature(), "A");
    }

    #[test]
    fn ignores_extra_columns() {
        let csv = "feature,idx,x,y,notes\nA,1,0.0,0.0,hello\n";
        let dataset = read_instances(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn missing_column_is_input_error() {
        let csv = "feature,idx,x\nA,1,0.0\n";
        let err = read_instances(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CoLocationError::InputError { row: 0, .. }));
    }

    #[test]
    fn non_numeric_coordinate_reports_row_number() {
        let csv = "feature,idx,x,y\nA,1,0.0,0.0\nB,1,oops,0.0\n";
        let err = read_instances(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CoLocationError::InputError { row: 2, .. }));
    }

    #[test]
    fn round_trips_through_write_and_read() {
        let csv = "feature,idx,x,y\nA,1,0.0,0.0\nB,2,1.5,2.5\n";
        let dataset = read_instances(csv.as_bytes()).unwrap();

        let mut buf = Vec::new();
        write_instances(&dataset, &mut buf).unwrap();
        let roundtripped = read_instances(buf.as_slice()).unwrap();

        assert_eq!(dataset.len(), roundtripped.len());
        for (a, b) in dataset.instances().iter().zip(roundtripped.instances()) {
            assert_eq!(a, b);
        }
    }
}
