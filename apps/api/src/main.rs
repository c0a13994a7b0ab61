mod catalog;
mod config;
mod db;
mod errors;
mod intake;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::qualifications::LlmQualificationDrafter;
use crate::catalog::PgJobCatalog;
use crate::config::Config;
use crate::db::create_pool;
use crate::intake::attachments::AttachmentUploader;
use crate::intake::classifier::LlmClassifier;
use crate::intake::engine::IntakeEngine;
use crate::intake::repository::{PgApplicantRepository, PgAttachmentRepository};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3ObjectStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize S3-compatible object storage
    let s3 = build_s3_client(&config).await;
    info!(bucket = %config.s3_bucket, "S3 client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_model.clone())?;
    info!(model = llm.model(), "LLM client initialized");

    let catalog = Arc::new(PgJobCatalog::new(db.clone()));
    let applicants = Arc::new(PgApplicantRepository::new(db.clone()));
    let attachments = Arc::new(PgAttachmentRepository::new(db));
    let objects = Arc::new(S3ObjectStore::new(
        s3,
        config.s3_bucket.clone(),
        config.s3_public_url.clone(),
    ));

    let intake = IntakeEngine::new(
        catalog.clone(),
        Arc::new(LlmClassifier::new(llm.clone())),
        applicants.clone(),
        AttachmentUploader::new(objects.clone(), attachments.clone()),
    );

    let state = AppState {
        catalog,
        applicants,
        attachments,
        objects,
        drafter: Arc::new(LlmQualificationDrafter::new(llm)),
        intake,
        max_inbound_body_bytes: config.max_inbound_body_bytes,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!(
        max_inbound_body_bytes = config.max_inbound_body_bytes,
        "Listening on {addr}"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client for any S3-compatible endpoint (R2, MinIO, AWS).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "intake-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
