//! Document indexing and nearest-neighbour retrieval over Qdrant.

use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};

use ai_llm_service::LlmServiceProfiles;
use qdrant_client::Payload;
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::MedRagConfig, errors::MedRagError, splitter::RecursiveSplitter,
    vector_db::QdrantStore,
};

const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

/// Summary of a finished index build.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexStats {
    pub collection: String,
    pub documents: usize,
    pub chunks: usize,
    pub dimension: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RetrievedChunk {
    pub score: f32,
    pub text: String,
    pub source: Option<String>,
}

/// Anything that can return the `k` chunks closest to a query.
pub trait Retriever: Send + Sync {
    fn retrieve(
        &self,
        query: &str,
        k: u64,
    ) -> impl Future<Output = Result<Vec<RetrievedChunk>, MedRagError>> + Send;
}

/// A named Qdrant collection of embedded document chunks.
pub struct MedIndex {
    cfg: MedRagConfig,
    llm: Arc<LlmServiceProfiles>,
    store: QdrantStore,
}

struct Chunk {
    source: String,
    ordinal: usize,
    text: String,
}

impl MedIndex {
    pub fn new(cfg: MedRagConfig, llm: Arc<LlmServiceProfiles>) -> Result<Self, MedRagError> {
        cfg.validate()?;
        let store = QdrantStore::new(&cfg)?;
        Ok(Self { cfg, llm, store })
    }

    pub fn config(&self) -> &MedRagConfig {
        &self.cfg
    }

    /// Splits, embeds and stores every document, replacing the collection.
    ///
    /// All embeddings are computed before the old collection is dropped, so a
    /// failed build leaves the previous index untouched.
    ///
    /// Relative paths are resolved against `documents_dir`; anything that
    /// resolves outside it is rejected before it is read.
    ///
    /// # Errors
    /// Unsupported, unreadable or out-of-root inputs, embedding failures,
    /// dimension mismatches, Qdrant failures.
    #[instrument(skip_all, fields(collection = %self.cfg.collection, documents = paths.len()))]
    pub async fn build(&self, paths: &[PathBuf]) -> Result<IndexStats, MedRagError> {
        if paths.is_empty() {
            return Err(MedRagError::InvalidConfig("no documents to index".into()));
        }

        let splitter = RecursiveSplitter::new(self.cfg.chunk_size, self.cfg.chunk_overlap)?;
        let mut chunks = Vec::new();
        for path in paths {
            let resolved = resolve_document(&self.cfg.documents_dir, path).await?;
            let text = read_document(&resolved).await?;
            let source = path.display().to_string();
            let before = chunks.len();
            chunks.extend(
                splitter
                    .split(&text)
                    .into_iter()
                    .enumerate()
                    .map(|(ordinal, text)| Chunk {
                        source: source.clone(),
                        ordinal,
                        text,
                    }),
            );
            info!(source = %source, chunks = chunks.len() - before, "document split");
        }

        if chunks.is_empty() {
            return Err(MedRagError::InvalidConfig(
                "documents contain no text to index".into(),
            ));
        }

        let mut points = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let vector = self.embed(&chunk.text).await?;
            let mut payload = Payload::default();
            payload.insert("text".to_string(), json!(chunk.text));
            payload.insert("source".to_string(), json!(chunk.source));
            payload.insert("chunk".to_string(), json!(chunk.ordinal));
            points.push((point_id(&chunk.source, chunk.ordinal), vector, payload));
        }

        self.store.recreate_collection(self.cfg.embedding_dim).await?;

        let mut stored = 0;
        let mut points = points.into_iter().peekable();
        while points.peek().is_some() {
            let batch: Vec<_> = points.by_ref().take(self.cfg.upsert_batch).collect();
            stored += self.store.upsert(batch).await?;
        }

        let stats = IndexStats {
            collection: self.cfg.collection.clone(),
            documents: paths.len(),
            chunks: stored,
            dimension: self.cfg.embedding_dim,
        };
        info!(chunks = stats.chunks, "index built");
        Ok(stats)
    }

    /// Embeds `query` and returns the `k` nearest chunks, best first.
    pub async fn search(&self, query: &str, k: u64) -> Result<Vec<RetrievedChunk>, MedRagError> {
        let vector = self.embed(query).await?;
        let hits = self.store.search(vector, k).await?;

        Ok(hits
            .into_iter()
            .map(|h| RetrievedChunk {
                score: h.score,
                text: h
                    .payload
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                source: h
                    .payload
                    .get("source")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
            })
            .collect())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MedRagError> {
        let vector = self
            .llm
            .embed(text)
            .await
            .map_err(|e| MedRagError::Embedding(e.to_string()))?;
        check_dimension(&vector, self.cfg.embedding_dim)?;
        Ok(vector)
    }
}

impl Retriever for MedIndex {
    async fn retrieve(&self, query: &str, k: u64) -> Result<Vec<RetrievedChunk>, MedRagError> {
        self.search(query, k).await
    }
}

/// Canonicalizes `path` under `root` and refuses anything that escapes it,
/// including `..` segments and symlinks pointing elsewhere.
async fn resolve_document(root: &Path, path: &Path) -> Result<PathBuf, MedRagError> {
    check_extension(path)?;

    let root = canonicalize(root.to_path_buf()).await?;
    let resolved = canonicalize(root.join(path)).await?;

    if !resolved.starts_with(&root) {
        warn!(path = %path.display(), "document outside the documents directory");
        return Err(MedRagError::OutsideDocumentsRoot(path.to_path_buf()));
    }
    Ok(resolved)
}

async fn canonicalize(path: PathBuf) -> Result<PathBuf, MedRagError> {
    match tokio::fs::canonicalize(&path).await {
        Ok(p) => Ok(p),
        Err(source) => Err(MedRagError::Io { path, source }),
    }
}

fn check_extension(path: &Path) -> Result<(), MedRagError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
        warn!(path = %path.display(), "skipping non-text document");
        return Err(MedRagError::UnsupportedDocument(path.to_path_buf()));
    }
    Ok(())
}

async fn read_document(path: &Path) -> Result<String, MedRagError> {
    check_extension(path)?;

    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MedRagError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn check_dimension(vector: &[f32], want: u64) -> Result<(), MedRagError> {
    if vector.len() as u64 != want {
        return Err(MedRagError::Embedding(format!(
            "vector size mismatch: got {}, want {want}",
            vector.len()
        )));
    }
    Ok(())
}

/// Deterministic id so rebuilding the same documents yields the same points.
fn point_id(source: &str, ordinal: usize) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{source}#{ordinal}").as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_and_distinct() {
        assert_eq!(point_id("a.txt", 0), point_id("a.txt", 0));
        assert_ne!(point_id("a.txt", 0), point_id("a.txt", 1));
        assert_ne!(point_id("a.txt", 0), point_id("b.txt", 0));
    }

    #[test]
    fn dimension_mismatch_is_an_embedding_error() {
        assert!(check_dimension(&[0.0; 3], 3).is_ok());
        assert!(matches!(
            check_dimension(&[0.0; 2], 3),
            Err(MedRagError::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn pdf_inputs_are_rejected() {
        let err = read_document(Path::new("handbook.pdf")).await.unwrap_err();
        assert!(matches!(err, MedRagError::UnsupportedDocument(_)));
    }

    #[tokio::test]
    async fn reads_text_documents() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("notes.MD");
        std::fs::write(&p, "# Anemia\nLow hemoglobin.").unwrap();
        assert_eq!(read_document(&p).await.unwrap(), "# Anemia\nLow hemoglobin.");
    }

    #[tokio::test]
    async fn documents_resolve_inside_the_root_only() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("docs");
        std::fs::create_dir_all(root.join("cardio")).unwrap();
        std::fs::write(root.join("cardio/angina.txt"), "Chest pain on exertion.").unwrap();
        std::fs::write(outer.path().join("secret.txt"), "not for indexing").unwrap();

        let ok = resolve_document(&root, Path::new("cardio/angina.txt"))
            .await
            .unwrap();
        assert!(ok.ends_with("cardio/angina.txt"));

        let escaped = resolve_document(&root, Path::new("../secret.txt"))
            .await
            .unwrap_err();
        assert!(matches!(escaped, MedRagError::OutsideDocumentsRoot(_)));

        let absolute = outer.path().join("secret.txt");
        let err = resolve_document(&root, &absolute).await.unwrap_err();
        assert!(matches!(err, MedRagError::OutsideDocumentsRoot(_)));

        let missing = resolve_document(&root, Path::new("nope.txt")).await.unwrap_err();
        assert!(matches!(missing, MedRagError::Io { .. }));
    }
}
