
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::flat::FlatIndex;
use crate::{RagError, Result};

const INDEX_FILE: &str = "index.bin";
const METADATA_FILE: &str = "meta.json";

/// Chunk texts and build details stored beside the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Shared with the index file of the same build
    pub build_id: String,
    /// Name of the document the chunks came from
    pub filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub dimension: usize,
    /// Chunk texts, position `i` matching index vector `i`
    pub chunks: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    build_id: String,
    index: FlatIndex,
}

/// Result of a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    pub build_id: String,
    pub chunks: usize,
    pub dimension: usize,
}

/// An index and its metadata read together from disk
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub index: FlatIndex,
    pub metadata: IndexMetadata,
}

impl LoadedIndex {
    #[inline]
    pub fn chunk(&self, position: usize) -> Option<&str> {
        self.metadata.chunks.get(position).map(String::as_str)
    }
}

/// Owns the on-disk index/metadata pair.
///
/// `build` replaces both files under the write lock and `load` reads both
/// under the read lock, so one process never observes half of a build. Each
/// file is replaced by atomic rename, and a shared build id exposes a torn
/// pair left behind by a crash.
#[derive(Debug)]
pub struct IndexStore {
    dir: PathBuf,
    lock: RwLock<()>,
}

impl IndexStore {
    #[inline]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: RwLock::new(()),
        }
    }

    /// Ensure the storage directory exists
    #[inline]
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        debug!("Index store ready at {}", self.dir.display());
        Ok(())
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[inline]
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    #[inline]
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Whether any index has been persisted
    #[inline]
    pub fn exists(&self) -> bool {
        self.index_path().exists()
    }

    /// Replace the persisted pair with an index over `vectors` and their
    /// parallel `chunks`
    #[inline]
    pub fn build(
        &self,
        filename: Option<&str>,
        chunks: Vec<String>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<IndexSummary> {
        if chunks.is_empty() {
            return Err(RagError::Index("Cannot build an index with no chunks".to_string()));
        }

        if chunks.len() != vectors.len() {
            return Err(RagError::Index(format!(
                "Chunk and vector counts differ: {} vs {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let index = FlatIndex::from_vectors(vectors)?;
        let build_id = Uuid::new_v4().to_string();
        let summary = IndexSummary {
            build_id: build_id.clone(),
            chunks: chunks.len(),
            dimension: index.dimension(),
        };

        let metadata = IndexMetadata {
            build_id: build_id.clone(),
            filename: filename.map(str::to_string),
            created_at: Utc::now(),
            dimension: index.dimension(),
            chunks,
        };
        let persisted = PersistedIndex { build_id, index };

        let metadata_bytes = serde_json::to_vec(&metadata)
            .map_err(|e| RagError::Index(format!("Failed to serialize metadata: {}", e)))?;
        let index_bytes = bincode::serde::encode_to_vec(&persisted, bincode::config::standard())
            .map_err(|e| RagError::Index(format!("Failed to serialize index: {}", e)))?;

        self.init()?;
        let _guard = self
            .lock
            .write()
            .map_err(|_| RagError::Index("Index store lock poisoned".to_string()))?;

        // Metadata first: exists() keys off the index file
        self.write_atomically(&self.metadata_path(), &metadata_bytes)?;
        self.write_atomically(&self.index_path(), &index_bytes)?;

        info!(
            "Built index {} with {} chunks of dimension {}",
            summary.build_id, summary.chunks, summary.dimension
        );
        Ok(summary)
    }

    /// Read the persisted pair, verifying that both halves belong to the
    /// same build
    #[inline]
    pub fn load(&self) -> Result<LoadedIndex> {
        let _guard = self
            .lock
            .read()
            .map_err(|_| RagError::Index("Index store lock poisoned".to_string()))?;

        let index_path = self.index_path();
        if !index_path.exists() {
            return Err(RagError::NoDocumentsIndexed);
        }

        let metadata_path = self.metadata_path();
        if !metadata_path.exists() {
            return Err(RagError::IndexOutOfSync(format!(
                "{} is missing",
                metadata_path.display()
            )));
        }

        let index_bytes = fs::read(&index_path)?;
        let (persisted, _): (PersistedIndex, usize) =
            bincode::serde::decode_from_slice(&index_bytes, bincode::config::standard())
                .map_err(|e| RagError::Index(format!("Failed to decode index: {}", e)))?;
        persisted.index.validate()?;

        let metadata_bytes = fs::read(&metadata_path)?;
        let metadata: IndexMetadata = serde_json::from_slice(&metadata_bytes)
            .map_err(|e| RagError::Index(format!("Failed to decode metadata: {}", e)))?;

        if persisted.build_id != metadata.build_id {
            warn!(
                "Index build {} does not match metadata build {}",
                persisted.build_id, metadata.build_id
            );
            return Err(RagError::IndexOutOfSync(format!(
                "index build {} does not match metadata build {}",
                persisted.build_id, metadata.build_id
            )));
        }

        if persisted.index.len() != metadata.chunks.len() {
            return Err(RagError::IndexOutOfSync(format!(
                "index holds {} vectors but metadata holds {} chunks",
                persisted.index.len(),
                metadata.chunks.len()
            )));
        }

        debug!(
            "Loaded index {} with {} chunks",
            metadata.build_id,
            metadata.chunks.len()
        );

        Ok(LoadedIndex {
            index: persisted.index,
            metadata,
        })
    }

    fn write_atomically(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| RagError::Io(e.error))?;
        Ok(())
    }
}
