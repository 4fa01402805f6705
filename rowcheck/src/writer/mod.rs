//! Output side of a run: cleaned CSV, error reports, console lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use uuid::Uuid;

use crate::error::{SinkError, SinkResult};
use crate::models::{Record, RowError};
use crate::transform::pipeline::PipelineResult;

/// Everything a caller needs to audit a run after the fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub errors: Vec<RowError>,
}

impl ValidationReport {
    pub fn from_result(result: &PipelineResult, source: Option<&Path>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            source: source.map(|p| p.display().to_string()),
            total: result.total,
            accepted: result.accepted_count(),
            rejected: result.rejected_count(),
            errors: result.errors.clone(),
        }
    }
}

fn ensure_parent(path: &Path) -> SinkResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| SinkError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write records as CSV to any writer, columns in `headers` order.
pub fn write_csv_to<W, H>(writer: W, headers: &[H], records: &[Record]) -> SinkResult<()>
where
    W: io::Write,
    H: AsRef<str>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let header_row: Vec<&str> = headers.iter().map(|h| h.as_ref()).collect();
    csv_writer.write_record(&header_row)?;

    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| cell_text(record.get(h.as_ref())))
            .collect();
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write records to a CSV file, creating parent directories.
///
/// Integers are written as numbers, nulls and absent cells as empty.
pub fn write_csv<H: AsRef<str>>(path: &Path, headers: &[H], records: &[Record]) -> SinkResult<()> {
    ensure_parent(path)?;
    let file = fs::File::create(path).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv_to(file, headers, records)?;

    tracing::debug!(path = %path.display(), rows = records.len(), "wrote CSV output");
    Ok(())
}

/// Write a pretty JSON array of row errors.
pub fn write_error_report(path: &Path, errors: &[RowError]) -> SinkResult<()> {
    write_json(path, &errors)
}

/// Write a full [`ValidationReport`] as pretty JSON.
pub fn write_report(path: &Path, report: &ValidationReport) -> SinkResult<()> {
    write_json(path, report)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> SinkResult<()> {
    ensure_parent(path)?;
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `Row N: reason`, one line per error.
pub fn render_error_lines(errors: &[RowError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::models::record_from_pairs;
    use crate::transform::pipeline::run;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_result() -> PipelineResult {
        let records = vec![
            record_from_pairs([("id", "1"), ("price", "9.9")]),
            record_from_pairs([("id", ""), ("price", "5")]),
        ];
        let config = ValidationConfig::new().require_non_empty(["id"]).coerce(["price"]);
        run(&records, &config).unwrap()
    }

    #[test]
    fn test_csv_cells() {
        let mut record = Record::new();
        record.insert("id".into(), json!("a,b"));
        record.insert("price".into(), json!(9));
        record.insert("qty".into(), Value::Null);

        let mut out = Vec::new();
        write_csv_to(&mut out, &["id", "price", "qty", "absent"], &[record]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,price,qty,absent\n\"a,b\",9,,\n"
        );
    }

    #[test]
    fn test_write_csv_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/clean.csv");
        let result = sample_result();

        write_csv(&path, &["id", "price"], &result.accepted).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "id,price\n1,9\n");
    }

    #[test]
    fn test_error_report_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("errors.json");
        let result = sample_result();

        write_error_report(&path, &result.errors).unwrap();
        let read: Vec<RowError> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, result.errors);
        assert_eq!(read[0].reason, "id empty");
    }

    #[test]
    fn test_report_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = ValidationReport::from_result(&sample_result(), Some(Path::new("in.csv")));
        write_report(&path, &report).unwrap();

        let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["accepted"], 1);
        assert_eq!(json["rejected"], 1);
        assert_eq!(json["source"], "in.csv");
        assert!(Uuid::parse_str(json["runId"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_render_error_lines() {
        let lines = render_error_lines(&sample_result().errors);
        assert_eq!(lines, vec!["Row 2: id empty"]);
    }
}
