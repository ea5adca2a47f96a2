//! Record formats shared by every child of a tap.
//!
//! Records are untyped [`serde_json::Value`]s so a scheme can be passed
//! through a tap unchanged without threading a type parameter through the
//! resolver. Deserialize into your own type with `serde_json::from_value`.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Read, Write};

/// One record read from or written to a tap.
pub type Record = Value;

/// How records are encoded inside each matched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum Scheme {
    /// Newline-delimited JSON; blank lines are skipped on read.
    Jsonl,
    /// CSV. With headers each row is an object keyed by column name,
    /// otherwise an array of strings.
    Csv { has_headers: bool },
}

impl Scheme {
    /// Decode every record in `reader`. `label` names the source in errors.
    ///
    /// # Errors
    /// Returns an error if the stream can't be read or a record fails to parse.
    pub fn read_from(&self, reader: impl Read, label: &str) -> Result<Vec<Record>> {
        match *self {
            Self::Jsonl => read_jsonl(reader, label),
            Self::Csv { has_headers } => read_csv(reader, has_headers, label),
        }
    }

    /// Encode `records` into `writer`, returning how many were written.
    ///
    /// # Errors
    /// Returns an error if a record can't be encoded in this format or the
    /// write fails.
    pub fn write_to(&self, writer: impl Write, records: &[Record], label: &str) -> Result<usize> {
        match *self {
            Self::Jsonl => write_jsonl(writer, records, label),
            Self::Csv { has_headers } => write_csv(writer, has_headers, records, label),
        }
    }
}

fn read_jsonl(reader: impl Read, label: &str) -> Result<Vec<Record>> {
    let mut out = Vec::new();
    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.with_context(|| format!("read line {} in {label}", i + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let v: Value = serde_json::from_str(&line)
            .with_context(|| format!("parse JSONL line {} in {label}: {line}", i + 1))?;
        out.push(v);
    }
    Ok(out)
}

fn write_jsonl(mut writer: impl Write, records: &[Record], label: &str) -> Result<usize> {
    for (i, record) in records.iter().enumerate() {
        serde_json::to_writer(&mut writer, record)
            .with_context(|| format!("serialize record #{i} to {label}"))?;
        writer.write_all(b"\n")?;
    }
    Ok(records.len())
}

fn read_csv(reader: impl Read, has_headers: bool, label: &str) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(!has_headers)
        .from_reader(reader);
    let headers = if has_headers {
        Some(
            rdr.headers()
                .with_context(|| format!("read CSV header in {label}"))?
                .clone(),
        )
    } else {
        None
    };

    let mut out = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("parse CSV record #{} in {label}", i + 1))?;
        let record = match &headers {
            Some(headers) => Value::Object(
                headers
                    .iter()
                    .zip(row.iter())
                    .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                    .collect::<Map<_, _>>(),
            ),
            None => Value::Array(row.iter().map(|v| Value::String(v.to_string())).collect()),
        };
        out.push(record);
    }
    Ok(out)
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Union of keys over every object record, in first-seen order. `None` when
/// no record is an object.
fn object_columns(records: &[Record]) -> Option<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut columns = Vec::new();
    let mut any_object = false;
    for obj in records.iter().filter_map(Value::as_object) {
        any_object = true;
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    any_object.then_some(columns)
}

fn write_csv(
    writer: impl Write,
    has_headers: bool,
    records: &[Record],
    label: &str,
) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    let columns = object_columns(records);
    if has_headers && let Some(columns) = &columns {
        wtr.write_record(columns)
            .with_context(|| format!("write CSV header to {label}"))?;
    }

    for (i, record) in records.iter().enumerate() {
        let fields: Vec<String> = match (record, &columns) {
            (Value::Object(obj), Some(columns)) => columns
                .iter()
                .map(|c| obj.get(c).map(csv_field).unwrap_or_default())
                .collect(),
            (Value::Array(items), _) => items.iter().map(csv_field).collect(),
            _ => bail!("CSV record #{i} in {label} must be an object or an array"),
        };
        wtr.write_record(&fields)
            .with_context(|| format!("serialize CSV row #{} to {label}", i + 1))?;
    }
    wtr.flush()?;
    Ok(records.len())
}
