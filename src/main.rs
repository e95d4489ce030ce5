use std::error::Error;
use std::sync::Arc;

use job_match_store::{
    EmbeddingPipeline, JobMatchStore, JobPosting, StoreConfig,
    embed::hf_endpoint::{HfEndpointConfig, HfEndpointEmbedder},
};
use llm_failover::FailoverService;
use skill_gap::{ResumeProfile, SkillGapEngine, generate_report, suggest_job_keywords};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file, if one exists.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = std::env::args().skip(1);
    let (Some(resume_path), Some(jobs_path)) = (args.next(), args.next()) else {
        eprintln!("usage: skillmatch-backend <resume.json> <jobs.json> [top_k]");
        std::process::exit(2);
    };
    let top_k: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

    let resume: ResumeProfile = serde_json::from_str(&std::fs::read_to_string(&resume_path)?)?;
    let jobs: Vec<JobPosting> = serde_json::from_str(&std::fs::read_to_string(&jobs_path)?)?;
    info!(jobs = jobs.len(), top_k, "inputs loaded");

    let llm = Arc::new(FailoverService::from_env()?);

    let embedder = HfEndpointEmbedder::new(HfEndpointConfig::from_env()?)?;
    let store_cfg = StoreConfig::from_env();
    let pipeline = EmbeddingPipeline::new(&embedder, store_cfg.dim, store_cfg.chunk_max_chars);

    let store = JobMatchStore::new(&store_cfg)?;
    store.init().await?;

    let batch_id = format!("batch_{}", std::process::id());
    let resume_id = store
        .upsert_resume(
            &pipeline,
            "cli",
            &resume.embedding_text(),
            &resume.skills,
            &resume.email,
            &resume.summary,
        )
        .await?;
    let job_ids = store.upsert_jobs(&pipeline, &jobs, &batch_id).await?;
    info!(resume_id = %resume_id, jobs_stored = job_ids.len(), "documents indexed");

    let matches = store
        .find_similar(&resume_id, top_k, Some(batch_id.as_str()))
        .await?;
    info!(matches = matches.len(), "similar jobs retrieved");

    let engine = SkillGapEngine::new(Arc::clone(&llm));
    let analyses = engine.analyze(&resume, &matches).await;
    let report = generate_report(&analyses)?;

    let keywords = suggest_job_keywords(&llm, &resume).await;
    info!(keywords = ?keywords, "suggested search keywords");

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
