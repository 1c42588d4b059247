mod config;
mod db;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = config::Config::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");
    let state = state::AppState::new(pool);

    // Relay database change notifications to websocket subscribers.
    let _listener = services::feed::spawn_listener(state.clone());

    let app = routes::app(state, &config.static_dir);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, static_dir = %config.static_dir.display(), "bulletin listening");
    axum::serve(listener, app).await.expect("server failed");
}
