use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studysprint::generator::GenerationPolicy;
use studysprint::state::AppState;
use studysprint::store::SqliteStore;
use studysprint::{app, config, db};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "studysprint=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path).expect("Failed to initialize database");
  let store = Arc::new(SqliteStore::new(pool));

  let generator = GenerationPolicy::from_settings(&config::load_generator_settings());
  let state = AppState::with_sqlite(store, generator);

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://{}", bind_addr);

  axum::serve(listener, app(state))
    .await
    .expect("Server failed to start");
}
