mod config;
mod db;
mod errors;
mod papers;
mod review;
mod routes;
mod state;
mod storage;
mod templates;

use std::sync::Arc;
use std::time::Duration;

use crate::db::PgReviewStore;
use crate::papers::SemanticScholarClient;
use crate::review::{FormRegistry, ReviewService};
use crate::storage::LocalImageStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_review=info,tower_http=info".into()),
        )
        .init();

    let config = Arc::new(config::Config::from_env()?);

    tokio::fs::create_dir_all(&config.image_folder).await?;
    templates::init(std::path::Path::new("templates"))?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    let papers = SemanticScholarClient::new(
        config.semantic_scholar_url.clone(),
        config.semantic_scholar_api_key.clone(),
        config.http_timeout,
    )?;
    let images = LocalImageStore::new(config.image_folder.clone(), &config.public_base_url)?;
    let reviews = ReviewService::new(
        Arc::new(papers),
        Arc::new(images),
        Arc::new(PgReviewStore::new(pool)),
        config.lookup_debounce,
    );

    let state = Arc::new(state::AppState {
        config: config.clone(),
        forms: FormRegistry::new(config.max_open_forms),
        reviews,
    });

    let sweeper = state.clone();
    tokio::spawn(async move {
        sweeper
            .forms
            .sweep(sweeper.config.form_idle_timeout, Duration::from_secs(60))
            .await
    });

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Paper review listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
