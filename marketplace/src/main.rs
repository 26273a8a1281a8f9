// farmconnect/src/main.rs

use anyhow::Context;
use actix_web::{web as actix_data, App, HttpServer};
use farmconnect::config::{AppConfig, StoreBackend};
use farmconnect::services::catalog_seed;
use farmconnect::state::AppState;
use farmconnect::stores::{postgres, MemoryCatalogStore, MemoryOrderStore, PgCatalogStore, PgOrderStore};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting FarmConnect server...");

  let app_config = AppConfig::from_env().context("loading configuration")?;

  let app_state = match app_config.store_backend {
    StoreBackend::Memory => {
      tracing::info!("Using in-memory stores.");
      AppState::new(
        app_config.clone(),
        Arc::new(MemoryCatalogStore::new()),
        Arc::new(MemoryOrderStore::new()),
      )?
    }
    StoreBackend::Postgres => {
      let database_url = app_config
        .database_url
        .clone()
        .context("DATABASE_URL must be set for the postgres backend")?;
      let db_pool = PgPool::connect(&database_url)
        .await
        .context("connecting to the database")?;
      tracing::info!("Successfully connected to the database.");
      postgres::run_migrations(&db_pool).await.context("running migrations")?;
      AppState::new(
        app_config.clone(),
        Arc::new(PgCatalogStore::new(db_pool.clone())),
        Arc::new(PgOrderStore::new(db_pool)),
      )?
    }
  };

  if app_config.seed_catalog {
    let inserted = catalog_seed::seed_catalog(app_state.catalog.as_ref())
      .await
      .context("seeding the catalog")?;
    tracing::info!(inserted, "Sample catalog loaded.");
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(farmconnect::web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;
  Ok(())
}
