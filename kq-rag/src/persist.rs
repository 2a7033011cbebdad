//! On-disk index layout: save and validating load.
//!
//! A persisted index is a directory of three files:
//!
//! - `manifest.json` — format version, metric tag, dimensionality, entry
//!   count, and the embedding model id used at build time
//! - `chunks.json` — chunk metadata in index order
//! - `vectors.bin` — little-endian `f32` rows, one per chunk, same order
//!
//! Saving writes to a sibling temp directory, renames the previous index
//! aside, and renames the new one into place, so a concurrent process sees
//! either the previous complete index or the new one and never a
//! half-written or missing one.
//! Loading validates the manifest against the caller's expectations before
//! any entry is used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::{Chunk, IndexEntry};
use crate::error::{RagError, Result};
use crate::flat::FlatIndex;
use crate::index::{Metric, VectorIndex};

const MANIFEST_FILE: &str = "manifest.json";
const CHUNKS_FILE: &str = "chunks.json";
const VECTORS_FILE: &str = "vectors.bin";
const FORMAT_VERSION: u32 = 1;

/// What a caller expects of a persisted index; checked on load.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    /// Expected vector width.
    pub dimensions: usize,
    /// Expected similarity metric.
    pub metric: Metric,
    /// Expected embedding model id.
    pub embed_model: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    format_version: u32,
    metric: Metric,
    dimensions: usize,
    entry_count: usize,
    embed_model: String,
}

/// Write the index to `dir`, replacing any previous index there.
///
/// # Errors
///
/// Returns [`RagError::Persist`] on any filesystem or encoding failure.
/// The previous index at `dir` is only replaced once the new one is
/// completely written.
pub async fn save(index: &FlatIndex, embed_model: &str, dir: &Path) -> Result<()> {
    let entries = index.snapshot().await;

    let manifest = Manifest {
        format_version: FORMAT_VERSION,
        metric: index.metric(),
        dimensions: index.dimensions(),
        entry_count: entries.len(),
        embed_model: embed_model.to_string(),
    };

    let staging = sibling_dir(dir, ".staging");
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(persist_err)?;
    }
    fs::create_dir_all(&staging).map_err(persist_err)?;

    let manifest_json = serde_json::to_vec_pretty(&manifest).map_err(persist_err)?;
    fs::write(staging.join(MANIFEST_FILE), manifest_json).map_err(persist_err)?;

    let chunks: Vec<&Chunk> = entries.iter().map(|e| &e.chunk).collect();
    let chunks_json = serde_json::to_vec(&chunks).map_err(persist_err)?;
    fs::write(staging.join(CHUNKS_FILE), chunks_json).map_err(persist_err)?;

    let mut vectors = Vec::with_capacity(entries.len() * index.dimensions() * 4);
    for entry in &entries {
        for value in &entry.embedding {
            vectors.extend_from_slice(&value.to_le_bytes());
        }
    }
    fs::write(staging.join(VECTORS_FILE), vectors).map_err(persist_err)?;

    // Swap the finished index into place. The old index is renamed aside
    // rather than deleted first, so a concurrent load always finds either
    // the previous index or the new one at `dir`.
    let retired = sibling_dir(dir, ".old");
    if retired.exists() {
        fs::remove_dir_all(&retired).map_err(persist_err)?;
    }
    if dir.exists() {
        fs::rename(dir, &retired).map_err(persist_err)?;
    }
    fs::rename(&staging, dir).map_err(persist_err)?;
    if retired.exists() {
        fs::remove_dir_all(&retired).map_err(persist_err)?;
    }

    info!(dir = %dir.display(), entries = entries.len(), "persisted index");
    Ok(())
}

/// Load a persisted index from `dir`, validating it against `expected`.
///
/// # Errors
///
/// Returns [`RagError::IndexLoad`] if any file is missing or corrupt, the
/// format version is unknown, the metric/dimensionality/model tags differ
/// from `expected`, or the vector file length disagrees with the manifest.
/// Never silently falls back to an empty index.
pub fn load(dir: &Path, expected: &IndexSpec) -> Result<FlatIndex> {
    let manifest_bytes = fs::read(dir.join(MANIFEST_FILE)).map_err(|e| load_err(dir, e))?;
    let manifest: Manifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| RagError::IndexLoad(format!("invalid manifest: {e}")))?;

    if manifest.format_version != FORMAT_VERSION {
        return Err(RagError::IndexLoad(format!(
            "unsupported format version {}, expected {FORMAT_VERSION}",
            manifest.format_version
        )));
    }
    if manifest.metric != expected.metric {
        return Err(RagError::IndexLoad(format!(
            "metric mismatch: index built with {}, expected {}",
            manifest.metric, expected.metric
        )));
    }
    if manifest.dimensions != expected.dimensions {
        return Err(RagError::IndexLoad(format!(
            "dimension mismatch: index built with {}, expected {}",
            manifest.dimensions, expected.dimensions
        )));
    }
    if manifest.embed_model != expected.embed_model {
        return Err(RagError::IndexLoad(format!(
            "embedding model mismatch: index built with '{}', expected '{}'",
            manifest.embed_model, expected.embed_model
        )));
    }

    let chunks_bytes = fs::read(dir.join(CHUNKS_FILE)).map_err(|e| load_err(dir, e))?;
    let chunks: Vec<Chunk> = serde_json::from_slice(&chunks_bytes)
        .map_err(|e| RagError::IndexLoad(format!("invalid chunk metadata: {e}")))?;
    if chunks.len() != manifest.entry_count {
        return Err(RagError::IndexLoad(format!(
            "chunk count {} disagrees with manifest entry count {}",
            chunks.len(),
            manifest.entry_count
        )));
    }

    let vector_bytes = fs::read(dir.join(VECTORS_FILE)).map_err(|e| load_err(dir, e))?;
    let expected_len = manifest.entry_count * manifest.dimensions * 4;
    if vector_bytes.len() != expected_len {
        return Err(RagError::IndexLoad(format!(
            "vector file is {} bytes, expected {expected_len}",
            vector_bytes.len()
        )));
    }

    let row_bytes = manifest.dimensions * 4;
    let entries: Vec<IndexEntry> = chunks
        .into_iter()
        .zip(vector_bytes.chunks_exact(row_bytes))
        .map(|(chunk, row)| IndexEntry {
            chunk,
            embedding: row
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        })
        .collect();

    let index = FlatIndex::with_entries(manifest.dimensions, manifest.metric, entries)?;
    info!(dir = %dir.display(), entries = manifest.entry_count, "loaded index");
    Ok(index)
}

fn sibling_dir(dir: &Path, suffix: &str) -> PathBuf {
    let mut name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    dir.with_file_name(name)
}

fn persist_err(e: impl std::fmt::Display) -> RagError {
    RagError::Persist(e.to_string())
}

fn load_err(dir: &Path, e: std::io::Error) -> RagError {
    RagError::IndexLoad(format!("{}: {e}", dir.display()))
}
