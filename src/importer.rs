use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::aggregator::{DatasetKind, ALL_DATASETS};
use crate::error::{Result, ScorecardError};
use crate::models::{Branch, Datasets, Row};

pub const BRANCHES_STEM: &str = "branches";
pub const DATASETS_DIR: &str = "datasets";

// ---------------------------------------------------------------------------
// File formats: enum dispatch on extension
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Csv,
    #[cfg(feature = "xlsx")]
    Xlsx,
}

/// Lookup order when several files share a stem.
const ALL_FORMATS: &[FileFormat] = &[
    FileFormat::Json,
    FileFormat::Csv,
    #[cfg(feature = "xlsx")]
    FileFormat::Xlsx,
];

impl FileFormat {
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::Json => &["json"],
            Self::Csv => &["csv"],
            #[cfg(feature = "xlsx")]
            Self::Xlsx => &["xlsx", "xls"],
        }
    }

    pub fn for_path(path: &Path) -> Option<FileFormat> {
        let ext = path.extension()?.to_str()?;
        ALL_FORMATS
            .iter()
            .find(|f| f.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .copied()
    }

    pub fn read(&self, path: &Path) -> Result<Vec<Row>> {
        match self {
            Self::Json => read_json(path),
            Self::Csv => read_csv(path),
            #[cfg(feature = "xlsx")]
            Self::Xlsx => read_xlsx(path),
        }
    }
}

fn import_error(path: &Path, message: impl ToString) -> ScorecardError {
    ScorecardError::Import {
        file: path.display().to_string(),
        message: message.to_string(),
    }
}

pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let format = FileFormat::for_path(path)
        .ok_or_else(|| import_error(path, "unsupported file extension"))?;
    format.read(path)
}

/// The cached portal exports are either a bare array of objects or an
/// object wrapping one under `data` or `rows`.
fn read_json(path: &Path) -> Result<Vec<Row>> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|e| import_error(path, e))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data").or_else(|| obj.remove("rows")) {
            Some(Value::Array(items)) => items,
            _ => return Err(import_error(path, "expected an array of rows")),
        },
        _ => return Err(import_error(path, "expected an array of rows")),
    };
    let total = items.len();
    let rows: Vec<Row> = items
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect();
    if rows.len() < total {
        log::warn!("{}: skipped {} non-object entries", path.display(), total - rows.len());
    }
    Ok(rows)
}

fn read_csv(path: &Path) -> Result<Vec<Row>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(std::io::BufReader::new(file));
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .filter(|(h, _)| !h.is_empty())
            .map(|(h, v)| (h.to_string(), Value::String(v.trim().to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(feature = "xlsx")]
fn read_xlsx(path: &Path) -> Result<Vec<Row>> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(path).map_err(|e| import_error(path, e))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| import_error(path, e))?;

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string().trim().to_string()).collect();

    let mut rows = Vec::new();
    for cells in iter {
        let mut row = Row::new();
        for (header, cell) in headers.iter().zip(cells) {
            if header.is_empty() {
                continue;
            }
            let value = match cell {
                Data::Empty => continue,
                Data::Int(i) => Value::from(*i),
                // Codes like 174 come back as 174.0; keep them integral.
                Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Value::from(*f as i64),
                Data::Float(f) => serde_json::Number::from_f64(*f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                Data::Bool(b) => Value::Bool(*b),
                other => Value::String(other.to_string().trim().to_string()),
            };
            row.insert(header.clone(), value);
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Data directory
// ---------------------------------------------------------------------------

/// First existing `<dir>/<stem>.<ext>` in format order.
pub fn find_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    ALL_FORMATS
        .iter()
        .flat_map(|f| f.extensions().iter())
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
}

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

pub struct LoadedFile {
    pub kind: DatasetKind,
    pub path: Option<PathBuf>,
    pub rows: usize,
    pub checksum: Option<String>,
}

pub fn load_branches(data_dir: &Path) -> Result<Vec<Branch>> {
    let Some(path) = find_file(data_dir, BRANCHES_STEM) else {
        log::warn!("No branch directory in {}", data_dir.display());
        return Ok(Vec::new());
    };
    let rows = read_rows(&path)?;
    let branches: Vec<Branch> = rows.iter().filter_map(Branch::from_row).collect();
    log::info!("Loaded {} branches from {}", branches.len(), path.display());
    Ok(branches)
}

/// Load every dataset present under `<data_dir>/datasets`. Missing files
/// are empty datasets.
pub fn load_datasets(data_dir: &Path) -> Result<(Datasets, Vec<LoadedFile>)> {
    let dir = data_dir.join(DATASETS_DIR);
    let mut datasets = Datasets::default();
    let mut files = Vec::new();
    for kind in ALL_DATASETS {
        let Some(path) = find_file(&dir, kind.key()) else {
            log::warn!("{}: no file found, treating as empty", kind.name());
            files.push(LoadedFile { kind: *kind, path: None, rows: 0, checksum: None });
            continue;
        };
        let rows = read_rows(&path)?;
        log::info!("{}: {} rows from {}", kind.name(), rows.len(), path.display());
        files.push(LoadedFile {
            kind: *kind,
            rows: rows.len(),
            checksum: Some(compute_checksum(&path)?),
            path: Some(path),
        });
        *kind.rows_mut(&mut datasets) = rows;
    }
    Ok((datasets, files))
}
