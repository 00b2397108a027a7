use std::path::Path;

use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use treiglo::content::{load, seed_rows};
use treiglo::db::SqliteStore;
use treiglo::state::{AppState, Trainer};
use treiglo::{config, content, handlers};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "treiglo=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_path = config::load_database_path();
  let store = SqliteStore::open(&db_path)?;

  let data_dir = config::load_data_dir();
  let mut rows = content::discovery::scan_dir(Path::new(&data_dir));
  if rows.is_empty() {
    tracing::info!("no card files in {}, using built-in deck", data_dir);
    rows = seed_rows();
  }
  let cards = load(&rows);
  tracing::info!("practising over {} cards", cards.len());

  let trainer = Trainer::new(cards, Box::new(store));
  let app = handlers::router(AppState::new(trainer))
    .layer(TraceLayer::new_for_http());

  let addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&addr).await?;
  tracing::info!("listening on {}", addr);
  axum::serve(listener, app).await?;

  Ok(())
}
