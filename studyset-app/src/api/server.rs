use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::routes::{
    create_set, delete_set, get_set, import_set, list_sets, save_set, AppState,
};
use studyset_core::Repository;

pub async fn run(repo: Arc<dyn Repository>, addr: SocketAddr) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let state = Arc::new(AppState { repo });

    let app = Router::new()
        .route("/sets", get(list_sets).post(create_set))
        .route(
            "/sets/:id",
            get(get_set).put(save_set).delete(delete_set),
        )
        .route("/sets/:id/import", post(import_set))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    info!("listening on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
