//! Thin adapter around `qdrant-client`.

use qdrant_client::{
    Payload, Qdrant,
    qdrant::{
        CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
        VectorParamsBuilder,
    },
};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{debug, info};

use crate::{config::MedRagConfig, errors::MedRagError};

pub(crate) struct QdrantStore {
    client: Qdrant,
    collection: String,
}

/// One search hit with its payload converted to JSON.
pub(crate) struct Hit {
    pub score: f32,
    pub payload: JsonMap<String, JsonValue>,
}

impl QdrantStore {
    /// Builds the gRPC client. The connection itself is established on first use.
    pub fn new(cfg: &MedRagConfig) -> Result<Self, MedRagError> {
        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(qdrant_err)?;
        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Drops the collection if present and creates it empty with cosine distance.
    pub async fn recreate_collection(&self, dim: u64) -> Result<(), MedRagError> {
        if self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(qdrant_err)?
        {
            self.client
                .delete_collection(&self.collection)
                .await
                .map_err(qdrant_err)?;
            debug!(collection = %self.collection, "old collection dropped");
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dim, Distance::Cosine)),
            )
            .await
            .map_err(qdrant_err)?;

        info!(collection = %self.collection, dim, "collection created");
        Ok(())
    }

    /// Upserts one batch and waits for persistence.
    pub async fn upsert(&self, points: Vec<(String, Vec<f32>, Payload)>) -> Result<usize, MedRagError> {
        if points.is_empty() {
            return Ok(0);
        }
        let n = points.len();
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|(id, vector, payload)| PointStruct::new(id, vector, payload))
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(qdrant_err)?;

        debug!(collection = %self.collection, points = n, "batch upserted");
        Ok(n)
    }

    pub async fn search(&self, vector: Vec<f32>, top_k: u64) -> Result<Vec<Hit>, MedRagError> {
        let builder = SearchPointsBuilder::new(&self.collection, vector, top_k)
            .with_payload(true)
            .with_vectors(false);

        let resp = self.client.search_points(builder).await.map_err(qdrant_err)?;

        Ok(resp
            .result
            .into_iter()
            .map(|p| Hit {
                score: p.score,
                payload: p
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            })
            .collect())
    }
}

fn qdrant_err(e: impl std::fmt::Display) -> MedRagError {
    MedRagError::Qdrant(e.to_string())
}
