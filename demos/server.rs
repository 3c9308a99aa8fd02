//! Example server: loads resource descriptors from RESOURCES_PATH, picks Postgres when
//! DATABASE_URL is set (in-memory otherwise), and serves the generic CRUD routes.

use resource_sdk::{app, load_from_path, resolve, AppState, MemoryStore, PgStore, Settings, Store};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("resource_sdk=info".parse()?))
        .init();

    let config = load_from_path(&settings.resources_path).await?;
    let registry = resolve(&config)?;
    tracing::info!(
        resources = registry.schemas().len(),
        path = %settings.resources_path,
        "registry loaded"
    );

    let store: Arc<dyn Store> = match &settings.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await?),
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(registry, store);
    let router = app(state, &settings.api_prefix, settings.max_body_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
