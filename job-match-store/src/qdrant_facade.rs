//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! Concentrates every Qdrant interaction behind a minimal API so the rest of
//! the crate stays decoupled from the verbose builder pattern.

use crate::config::StoreConfig;
use crate::errors::StoreError;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, Filter, GetPointsBuilder, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
    point_id::PointIdOptions, vectors_output,
};
use tracing::{debug, info, warn};

/// One similarity hit: point id, score, payload as JSON.
pub type SearchHit = (String, f32, serde_json::Value);

/// Facade over the Qdrant client.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    dim: usize,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// # Errors
    /// Config validation failures and client construction errors.
    pub fn new(cfg: &StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            dim: cfg.dim,
        })
    }

    /// Ensures the collection exists with a cosine vector space of the
    /// configured dimension. Existing collection is a no-op.
    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        info!(
            "Ensuring collection '{}' with size={} distance=Cosine",
            self.collection, self.dim
        );

        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!("Collection '{}' already exists", self.collection);
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "Collection '{}' not found, will be created (error={})",
                    self.collection, err
                );
            }
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(self.dim as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;

        info!("Collection '{}' created successfully", self.collection);
        Ok(())
    }

    /// Upserts a batch of points. Returns the count acknowledged.
    pub async fn upsert_points(&self, points: Vec<PointStruct>) -> Result<u64, StoreError> {
        if points.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        let n = points.len() as u64;
        info!(
            "Upserting {} points into collection '{}'",
            n, self.collection
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;

        Ok(n)
    }

    /// Fetches the stored vector for one point id, `None` when the point does
    /// not exist or carries no vector.
    pub async fn fetch_vector(&self, id: impl Into<PointId>) -> Result<Option<Vec<f32>>, StoreError> {
        let res = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, vec![id.into()])
                    .with_vectors(true)
                    .with_payload(false),
            )
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;

        let vector = res
            .result
            .into_iter()
            .next()
            .and_then(|p| p.vectors)
            .and_then(|v| v.vectors_options)
            .and_then(|opts| match opts {
                vectors_output::VectorsOptions::Vector(v) => Some(v.data),
                _ => None,
            });

        debug!(found = vector.is_some(), "fetch_vector completed");
        Ok(vector)
    }

    /// Performs a similarity search, returning `(id, score, payload)` triples
    /// sorted by descending score.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        limit: u64,
        filter: Option<Filter>,
    ) -> Result<Vec<SearchHit>, StoreError> {
        info!(
            "Searching in '{}' with limit={} filtered={}",
            self.collection,
            limit,
            filter.is_some()
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, limit).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result {
            let id = r.id.map(point_id_string).unwrap_or_default();
            let payload = qpayload_to_json(r.payload);
            out.push((id, r.score, payload));
        }

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }
}

/// Renders a Qdrant point id as a plain string.
fn point_id_string(id: PointId) -> String {
    match id.point_id_options {
        Some(PointIdOptions::Uuid(s)) => s,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
///
/// Unsupported nested objects/arrays are mapped to `Null`; string lists are
/// preserved because skills live in payloads.
fn qpayload_to_json(mut p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            Some(K::ListValue(list)) => serde_json::Value::Array(
                list.values
                    .into_iter()
                    .map(|x| match x.kind {
                        Some(K::StringValue(s)) => serde_json::Value::String(s),
                        _ => serde_json::Value::Null,
                    })
                    .collect(),
            ),
            None => serde_json::Value::Null,
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
