use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::Router;

/* Doubles as a liveness probe: as long as this answers, the process is up. */
async fn url_uptime(State(start_time): State<Instant>) -> String {
    let uptime = start_time.elapsed().as_secs();

    format!(
        "Uptime: {}h {}m {}s",
        uptime / 3600,
        (uptime % 3600) / 60,
        uptime % 60
    )
}

pub fn create_app() -> Router {
    Router::new()
        .route("/", get(url_uptime))
        .with_state(Instant::now())
}
