use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::data::record::{Record, RecordSet};
use crate::data::value::CellValue;

/// Load records from a JSON or CSV file, chosen by extension
pub fn load_records<P: AsRef<Path>>(path: P, key_field: &str) -> Result<RecordSet> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json_records(path, key_field),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => load_csv_records(path, key_field),
        _ => bail!("Unsupported data file (expected .json or .csv): {:?}", path),
    }
}

/// Load a JSON file holding an array of objects
pub fn load_json_records<P: AsRef<Path>>(path: P, key_field: &str) -> Result<RecordSet> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
    let reader = BufReader::new(file);

    let data: Vec<JsonValue> =
        serde_json::from_reader(reader).with_context(|| "Failed to parse JSON file")?;

    let set = records_from_json(&data, key_field)?;
    info!(target: "store", "Loaded {} records from {:?}", set.len(), path.as_ref());
    Ok(set)
}

/// Parse an in-memory JSON array of objects
pub fn parse_json_records(text: &str, key_field: &str) -> Result<RecordSet> {
    let data: Vec<JsonValue> =
        serde_json::from_str(text).with_context(|| "JSON data must be an array of objects")?;
    records_from_json(&data, key_field)
}

/// Convert already-parsed JSON objects. Field order is the union of keys
/// in first-seen order.
pub fn records_from_json(data: &[JsonValue], key_field: &str) -> Result<RecordSet> {
    let mut fields: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(data.len());

    for (position, item) in data.iter().enumerate() {
        let record = Record::from_json(item, key_field, position)?;
        if let Some(obj) = item.as_object() {
            for name in obj.keys() {
                if !fields.iter().any(|f| f == name) {
                    fields.push(name.clone());
                }
            }
        }
        records.push(record);
    }

    debug!(target: "store", "Parsed {} JSON records with {} fields", records.len(), fields.len());
    Ok(RecordSet::new(fields, records))
}

/// Load a CSV file with a header row. Cell types are inferred per value.
pub fn load_csv_records<P: AsRef<Path>>(path: P, key_field: &str) -> Result<RecordSet> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    let set = read_csv_records(file, key_field)?;
    info!(target: "store", "Loaded {} records from {:?}", set.len(), path.as_ref());
    Ok(set)
}

pub fn read_csv_records<R: Read>(reader: R, key_field: &str) -> Result<RecordSet> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let fields: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut records = Vec::new();
    for (position, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read CSV row {}", position + 1))?;

        let key = fields
            .iter()
            .position(|f| f == key_field)
            .and_then(|idx| row.get(idx))
            .filter(|k| !k.is_empty())
            .map(|k| k.to_string())
            .unwrap_or_else(|| format!("#{}", position));

        let mut record = Record::new(key);
        for (field, raw) in fields.iter().zip(row.iter()) {
            record.set(field.clone(), CellValue::infer_from_str(raw));
        }
        records.push(record);
    }

    Ok(RecordSet::new(fields, records))
}

/// Write records back as a pretty JSON array
pub fn save_json_records<P: AsRef<Path>>(path: P, records: &[Record]) -> Result<()> {
    let array: Vec<JsonValue> = records.iter().map(Record::to_json).collect();
    let contents = serde_json::to_string_pretty(&array)?;
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write JSON file: {:?}", path.as_ref()))?;
    info!(target: "store", "Saved {} records to {:?}", records.len(), path.as_ref());
    Ok(())
}
