//! High-level store: upsert resume/job documents, retrieve similar jobs.

use std::collections::HashMap;

use futures::{StreamExt, TryStreamExt, stream};
use qdrant_client::qdrant::{
    PointId, PointStruct, Value as QValue, Vector, Vectors, value, vectors,
};
use tracing::{debug, info, warn};

use crate::{
    config::StoreConfig,
    errors::StoreError,
    filters::job_filter,
    ids::{content_hash, stable_uuid},
    pipeline::EmbeddingPipeline,
    qdrant_facade::QdrantFacade,
    records::{JobMatch, JobPosting, dedup_matches, match_from_payload},
};

/// Floor for candidate counts so dedup has room to work on small `top_k`.
const MIN_CANDIDATES: u64 = 10;

/// Job documents embedded concurrently during a batch upsert.
const EMBED_CONCURRENCY: usize = 4;

/// Maximum characters of resume summary kept in the payload.
const SUMMARY_MAX_CHARS: usize = 500;

/// One collection of resume and job points plus the queries over it.
pub struct JobMatchStore {
    facade: QdrantFacade,
}

impl JobMatchStore {
    /// Creates a store over the configured collection.
    pub fn new(cfg: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self {
            facade: QdrantFacade::new(cfg)?,
        })
    }

    /// Creates the collection when missing. Call once at startup.
    pub async fn init(&self) -> Result<(), StoreError> {
        self.facade.ensure_collection().await
    }

    /// Embeds and upserts one resume document. Returns the document id used
    /// for later [`Self::find_similar`] calls.
    ///
    /// The id is deterministic over user and content, so re-uploading the
    /// same resume overwrites its point while an edited resume gets a new one.
    ///
    /// # Errors
    /// Embedding and Qdrant failures; blank resume text is rejected.
    pub async fn upsert_resume(
        &self,
        pipeline: &EmbeddingPipeline<'_>,
        user_id: &str,
        text: &str,
        skills: &[String],
        email: &str,
        summary: &str,
    ) -> Result<String, StoreError> {
        let vector = pipeline.embed_document(text).await?;
        if vector.is_empty() {
            return Err(StoreError::Embed("resume text is blank".into()));
        }

        let doc_id = format!("resume_{user_id}_{}", content_hash(text));

        let mut payload: HashMap<String, QValue> = HashMap::new();
        payload.insert("doc_type".into(), qstring("resume"));
        payload.insert("user_id".into(), qstring(user_id));
        payload.insert("email".into(), qstring(email));
        payload.insert("skills".into(), qstring_list(skills));
        payload.insert("summary".into(), qstring(&clamp_chars(summary, SUMMARY_MAX_CHARS)));
        payload.insert("text".into(), qstring(text));

        let point = build_point(&doc_id, vector, payload);
        self.facade.upsert_points(vec![point]).await?;

        info!(user_id, doc_id = %doc_id, "resume upserted");
        Ok(doc_id)
    }

    /// Embeds and upserts a batch of job postings under `batch_id`. Returns
    /// the document ids in input order; postings with blank content are
    /// skipped.
    ///
    /// Embeddings run concurrently with a bounded pool of 4.
    pub async fn upsert_jobs(
        &self,
        pipeline: &EmbeddingPipeline<'_>,
        jobs: &[JobPosting],
        batch_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        if jobs.is_empty() {
            debug!("no jobs to upsert");
            return Ok(Vec::new());
        }

        let embedded = embed_job_batch(pipeline, jobs).await?;

        let mut points = Vec::with_capacity(jobs.len());
        let mut ids = Vec::with_capacity(jobs.len());
        for (pos, (job, (text, vector))) in jobs.iter().zip(embedded).enumerate() {
            if vector.is_empty() {
                warn!(title = %job.title, "skipping job with blank content");
                continue;
            }

            let doc_id = format!("job_{batch_id}_{pos}_{}", content_hash(&text));

            let mut payload: HashMap<String, QValue> = HashMap::new();
            payload.insert("doc_type".into(), qstring("job"));
            payload.insert("batch_id".into(), qstring(batch_id));
            payload.insert("title".into(), qstring(&job.title));
            // Both spellings are stored because downstream consumers read
            // either one.
            payload.insert("company".into(), qstring(&job.company_name));
            payload.insert("company_name".into(), qstring(&job.company_name));
            payload.insert("location".into(), qstring(&job.location));
            payload.insert("apply_link".into(), qstring(&job.apply_link));
            payload.insert("description".into(), qstring(&job.description));

            points.push(build_point(&doc_id, vector, payload));
            ids.push(doc_id);
        }

        let count = self.facade.upsert_points(points).await?;
        info!(batch_id, jobs = count, "job batch upserted");
        Ok(ids)
    }

    /// Finds the `top_k` stored jobs most similar to the document behind
    /// `source_id`, optionally restricted to one batch.
    ///
    /// Oversamples candidates so dedup still fills `top_k`, then keeps the
    /// first occurrence per job id in descending-score order.
    ///
    /// # Errors
    /// [`StoreError::MissingVector`] when `source_id` has no stored vector;
    /// this means the upsert never happened and is never papered over here.
    pub async fn find_similar(
        &self,
        source_id: &str,
        top_k: usize,
        batch_id: Option<&str>,
    ) -> Result<Vec<JobMatch>, StoreError> {
        let pid: PointId = stable_uuid(source_id).to_string().into();
        let vector = self
            .facade
            .fetch_vector(pid)
            .await?
            .ok_or_else(|| StoreError::MissingVector {
                id: source_id.to_string(),
            })?;

        let limit = MIN_CANDIDATES.max(2 * top_k as u64);
        let hits = self
            .facade
            .search(vector, limit, Some(job_filter(batch_id)))
            .await?;

        let matches: Vec<JobMatch> = hits
            .into_iter()
            .map(|(id, score, payload)| match_from_payload(id, score, &payload))
            .collect();
        let out = dedup_matches(matches, top_k);

        info!(source_id, requested = top_k, returned = out.len(), "similar jobs retrieved");
        Ok(out)
    }
}

/// Embeds every job's text, at most [`EMBED_CONCURRENCY`] in flight, yielding
/// `(text, vector)` pairs in input order.
async fn embed_job_batch(
    pipeline: &EmbeddingPipeline<'_>,
    jobs: &[JobPosting],
) -> Result<Vec<(String, Vec<f32>)>, StoreError> {
    stream::iter(jobs.iter())
        .map(|job| async move {
            let text = job.embedding_text();
            let vector = pipeline.embed_document(&text).await?;
            Ok::<_, StoreError>((text, vector))
        })
        .buffered(EMBED_CONCURRENCY)
        .try_collect()
        .await
}

/* ===========================================================================
Point construction helpers
======================================================================== */

fn build_point(doc_id: &str, data: Vec<f32>, payload: HashMap<String, QValue>) -> PointStruct {
    let pid: PointId = stable_uuid(doc_id).to_string().into();
    let vectors = Vectors {
        vectors_options: Some(vectors::VectorsOptions::Vector(Vector {
            data,
            indices: None,
            vectors_count: None,
            vector: None,
        })),
    };
    PointStruct {
        id: Some(pid),
        payload,
        vectors: Some(vectors),
        ..Default::default()
    }
}

fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.to_string())),
    }
}

fn qstring_list(items: &[String]) -> QValue {
    QValue {
        kind: Some(value::Kind::ListValue(qdrant_client::qdrant::ListValue {
            values: items.iter().map(|s| qstring(s)).collect(),
        })),
    }
}

/// Truncates on a char boundary.
fn clamp_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
