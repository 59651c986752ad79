pub mod config;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use futures_util::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use meteora_db::Database;
use meteora_gateway::{FetchQuery, run_fetch_session, run_submit_session};

pub use config::Config;

/// HTTP surface of the relay: two WebSocket endpoints sharing one store.
pub fn router(db: Arc<Database>) -> Router {
    Router::new()
        .route("/ws/send", get(send_upgrade))
        .route("/ws/fetch", get(fetch_upgrade))
        .route("/ws/fetch/", get(fetch_upgrade))
        .with_state(db)
        .layer(TraceLayer::new_for_http())
}

async fn send_upgrade(State(db): State<Arc<Database>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let (sender, receiver) = socket.split();
        run_submit_session(sender, receiver, db)
            .instrument(tracing::info_span!("submit"))
            .await;
    })
}

async fn fetch_upgrade(
    State(db): State<Arc<Database>>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let query = FetchQuery::from_pairs(&params);
    ws.on_upgrade(move |socket| async move {
        run_fetch_session(socket, query, db)
            .instrument(tracing::info_span!("fetch"))
            .await;
    })
}
