use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exam_coach::{auth, config::AppConfig, db, llm::GroqClient, router, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "exam_coach=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load();

  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  {
    let conn = pool.lock().expect("Database lock failed during startup");
    match auth::db::cleanup_expired_sessions(&conn) {
      Ok(0) => {}
      Ok(n) => tracing::info!("Removed {} expired sessions", n),
      Err(e) => tracing::warn!("Failed to clean up expired sessions: {}", e),
    }
  }

  let completion = GroqClient::new(&config.llm).expect("Failed to build completion client");
  tracing::info!(
    "Completion model: {} ({}), LLM grading {}",
    config.llm.model,
    config.llm.base_url,
    if config.grade_with_llm { "on" } else { "off" }
  );

  let bind_addr = config.bind_addr();
  let state = AppState::new(pool, Arc::new(completion), config);
  let app = router(state);

  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://{}", bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
