use crate::SearchEngine;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: usize,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn snapshot(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Writes records and the frozen index as one bincode file.
pub fn save_snapshot(paths: &IndexPaths, engine: &SearchEngine) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = File::create(paths.snapshot())?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, engine)?;
    w.flush()?;
    Ok(())
}

pub fn load_snapshot(paths: &IndexPaths) -> Result<SearchEngine> {
    let path = paths.snapshot();
    let f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let engine = bincode::deserialize_from(BufReader::new(f))?;
    Ok(engine)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Loads the snapshot and its metadata, rejecting unknown snapshot versions.
pub fn load_index(paths: &IndexPaths) -> Result<(SearchEngine, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        anyhow::bail!("unsupported index version {} (expected {})", meta.version, SNAPSHOT_VERSION);
    }
    let engine = load_snapshot(paths)?;
    tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, "loaded index snapshot");
    Ok((engine, meta))
}
