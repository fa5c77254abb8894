//! Loads restaurant records from JSON, JSONL or the TSV export of the page parser.

use anyhow::{anyhow, Context, Result};
use resto_core::DocumentRecord;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const LIST_COLUMNS: &[&str] = &["facilitiesServices", "creditCards", "facilities"];

/// Reads every supported file under `input` (a file or a directory). Document ids
/// are assigned in load order; directories are walked in sorted path order.
pub fn load_records(input: &Path) -> Result<Vec<DocumentRecord>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_supported(p) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        return Err(anyhow!("input not found: {}", input.display()));
    }

    let mut records = Vec::new();
    for file in files {
        let before = records.len();
        match extension(&file) {
            Some("jsonl") => load_jsonl(&file, &mut records)?,
            Some("tsv") => load_tsv(&file, &mut records)?,
            _ => load_json(&file, &mut records)?,
        }
        tracing::debug!(file = %file.display(), records = records.len() - before, "loaded corpus file");
    }
    Ok(records)
}

fn extension(p: &Path) -> Option<&str> { p.extension().and_then(|s| s.to_str()) }

fn is_supported(p: &Path) -> bool { matches!(extension(p), Some("json" | "jsonl" | "tsv")) }

fn load_jsonl(file: &Path, out: &mut Vec<DocumentRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let rec: DocumentRecord = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        out.push(rec);
    }
    Ok(())
}

fn load_json(file: &Path, out: &mut Vec<DocumentRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: Value = serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    match json {
        Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v)?);
            }
        }
        Value::Object(_) => out.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "skipping JSON file without records"),
    }
    Ok(())
}

fn load_tsv(file: &Path, out: &mut Vec<DocumentRecord>) -> Result<()> {
    let text = fs::read_to_string(file)?;
    out.extend(parse_tsv(&text).with_context(|| format!("parsing {}", file.display()))?);
    Ok(())
}

/// Parses a header-led TSV table into records. Quoted cells may hold tabs,
/// newlines and doubled quotes. Empty cells become absent values.
pub fn parse_tsv(text: &str) -> Result<Vec<DocumentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(text.as_bytes());
    let header: Vec<String> = reader.headers()?.iter().map(|c| c.trim().to_string()).collect();
    if header.iter().all(String::is_empty) {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for (row, cells) in reader.records().enumerate() {
        let cells = cells.with_context(|| format!("row {}", row + 1))?;
        let mut obj = Map::new();
        for (column, cell) in header.iter().zip(cells.iter()) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let value = if LIST_COLUMNS.contains(&column.as_str()) {
                Value::Array(vec![Value::String(cell.to_string())])
            } else {
                Value::String(cell.to_string())
            };
            obj.insert(column.clone(), value);
        }
        let rec: DocumentRecord =
            serde_json::from_value(Value::Object(obj)).with_context(|| format!("row {}", row + 1))?;
        push_record(&mut records, rec);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<DocumentRecord>, rec: DocumentRecord) {
    if rec.description.is_empty() {
        tracing::debug!(name = %rec.name, "record without description");
    }
    records.push(rec);
}
