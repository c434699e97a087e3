//! Reading problem records from disk. Ranking never touches the filesystem;
//! callers load a corpus here and hand the documents to [`crate::CorpusIndex`].

use crate::index::Document;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Load a `.json` file (array or single object), a `.jsonl` file, or every such
/// file under a directory in file-name order.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        bail!("corpus path {} does not exist", path.display());
    }

    let mut documents = Vec::new();
    for file in files {
        let before = documents.len();
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut documents)?;
        } else {
            read_json(&file, &mut documents)?;
        }
        tracing::debug!(file = %file.display(), count = documents.len() - before, "read corpus file");
    }
    tracing::info!(num_docs = documents.len(), path = %path.display(), "corpus loaded");
    Ok(documents)
}

/// Parse an in-memory JSON corpus: an array of records or a single record.
pub fn parse_corpus(json: &str) -> Result<Vec<Document>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let mut documents = Vec::new();
    push_value(value, &mut documents)?;
    Ok(documents)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path, documents: &mut Vec<Document>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: Document = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed record", file.display(), lineno + 1))?;
        documents.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, documents: &mut Vec<Document>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let value: serde_json::Value =
        serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    push_value(value, documents).with_context(|| format!("reading records from {}", file.display()))
}

fn push_value(value: serde_json::Value, documents: &mut Vec<Document>) -> Result<()> {
    match value {
        serde_json::Value::Array(arr) => {
            for v in arr {
                documents.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => documents.push(serde_json::from_value(value)?),
        other => tracing::warn!(kind = ?other, "skipping non-record JSON value"),
    }
    Ok(())
}
