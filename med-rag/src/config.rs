//! Runtime and collection configuration.

use std::path::PathBuf;

use crate::errors::MedRagError;

pub const DEFAULT_INDEX_NAME: &str = "oxford_med_embed";

/// Configuration for indexing, retrieval and diagnosis.
#[derive(Clone, Debug)]
pub struct MedRagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Size of the vectors produced by the embedding profile.
    pub embedding_dim: u64,
    /// Chunks retrieved per diagnosis.
    pub top_k: u64,
    /// Attempts for each JSON-producing LLM call.
    pub max_attempts: u32,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Upsert batch size.
    pub upsert_batch: usize,
    /// Directory with `patient_info_prompt.txt` and `diagnosis_prompt.txt`.
    pub prompts_dir: PathBuf,
    /// Only documents under this directory can be indexed.
    pub documents_dir: PathBuf,
}

impl Default for MedRagConfig {
    fn default() -> Self {
        Self {
            qdrant_url: "http://localhost:6334".into(),
            qdrant_api_key: None,
            collection: DEFAULT_INDEX_NAME.into(),
            embedding_dim: 768,
            top_k: 5,
            max_attempts: 4,
            chunk_size: 1000,
            chunk_overlap: 200,
            upsert_batch: 64,
            prompts_dir: PathBuf::from("./prompts"),
            documents_dir: PathBuf::from("./docs"),
        }
    }
}

impl MedRagConfig {
    /// Reads `QDRANT_URL`, `QDRANT_API_KEY`, `MED_INDEX_NAME`, `EMBEDDING_DIM`,
    /// `MED_TOP_K`, `MED_MAX_ATTEMPTS`, `CHUNK_SIZE`, `CHUNK_OVERLAP`,
    /// `QDRANT_BATCH_SIZE`, `PROMPTS_DIR` and `MED_DOCS_DIR`; unset values keep
    /// their defaults.
    pub fn from_env() -> Result<Self, MedRagError> {
        let d = Self::default();
        let cfg = Self {
            qdrant_url: env_string("QDRANT_URL").unwrap_or(d.qdrant_url),
            qdrant_api_key: env_string("QDRANT_API_KEY"),
            collection: env_string("MED_INDEX_NAME").unwrap_or(d.collection),
            embedding_dim: env_num("EMBEDDING_DIM")?.unwrap_or(d.embedding_dim),
            top_k: env_num("MED_TOP_K")?.unwrap_or(d.top_k),
            max_attempts: env_num("MED_MAX_ATTEMPTS")?.unwrap_or(d.max_attempts),
            chunk_size: env_num("CHUNK_SIZE")?.unwrap_or(d.chunk_size),
            chunk_overlap: env_num("CHUNK_OVERLAP")?.unwrap_or(d.chunk_overlap),
            upsert_batch: env_num("QDRANT_BATCH_SIZE")?.unwrap_or(d.upsert_batch),
            prompts_dir: env_string("PROMPTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(d.prompts_dir),
            documents_dir: env_string("MED_DOCS_DIR")
                .map(PathBuf::from)
                .unwrap_or(d.documents_dir),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), MedRagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(MedRagError::InvalidConfig("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(MedRagError::InvalidConfig("collection is empty".into()));
        }
        if self.embedding_dim == 0 {
            return Err(MedRagError::InvalidConfig("embedding_dim must be > 0".into()));
        }
        if self.top_k == 0 {
            return Err(MedRagError::InvalidConfig("top_k must be > 0".into()));
        }
        if self.max_attempts == 0 {
            return Err(MedRagError::InvalidConfig("max_attempts must be > 0".into()));
        }
        if self.upsert_batch == 0 {
            return Err(MedRagError::InvalidConfig("upsert_batch must be > 0".into()));
        }
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(MedRagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

fn env_string(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_num<T>(var: &'static str) -> Result<Option<T>, MedRagError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(var) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| MedRagError::EnvParse {
            var,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}
