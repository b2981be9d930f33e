use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data::record::Record;

/// A column as the exporter sees it: record field and output header
#[derive(Debug, Clone)]
pub struct ExportColumn {
    pub field: String,
    pub header: String,
}

impl ExportColumn {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
        }
    }
}

/// Writes record views out as CSV
pub struct DataExporter;

impl DataExporter {
    /// Write rows as CSV with a header line
    pub fn write_csv<W: Write>(writer: W, columns: &[ExportColumn], rows: &[&Record]) -> Result<usize> {
        let mut wtr = csv::Writer::from_writer(writer);

        wtr.write_record(columns.iter().map(|c| c.header.as_str()))?;

        for row in rows {
            wtr.write_record(columns.iter().map(|c| row.value(&c.field).to_string()))?;
        }

        wtr.flush()?;
        Ok(rows.len())
    }

    /// Export rows to a CSV file and return a status line
    pub fn export_csv<P: AsRef<Path>>(path: P, columns: &[ExportColumn], rows: &[&Record]) -> Result<String> {
        if rows.is_empty() {
            return Err(anyhow!("No rows to export"));
        }

        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {:?}", path.as_ref()))?;
        let count = Self::write_csv(file, columns, rows)?;

        info!(target: "export", "Exported {} rows to {:?}", count, path.as_ref());
        Ok(format!(
            "Exported {} rows to CSV file: {}",
            count,
            path.as_ref().display()
        ))
    }

    /// Timestamped default file name in the working directory
    pub fn default_file_name(prefix: &str, extension: &str) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(format!("{}_{}.{}", prefix, timestamp, extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::value::CellValue;

    fn rows() -> Vec<Record> {
        vec![
            Record::new("1").with("name", "Bob, Jr.").with("age", 30),
            Record::new("2").with("name", "Ann").with("age", CellValue::Null),
        ]
    }

    #[test]
    fn test_write_csv_quotes_fields() {
        let rows = rows();
        let refs: Vec<&Record> = rows.iter().collect();
        let columns = vec![ExportColumn::new("name", "Name"), ExportColumn::new("age", "Age")];

        let mut out = Vec::new();
        let count = DataExporter::write_csv(&mut out, &columns, &refs).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Name,Age\n\"Bob, Jr.\",30\nAnn,\n"
        );
    }

    #[test]
    fn test_export_nothing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DataExporter::export_csv(dir.path().join("out.csv"), &[], &[]);
        assert!(result.is_err());
    }
}
