use crate::config;
use crate::push as push_service;
use crate::state;

use axum::Router;
use axum::routing::get;
use axum::routing::post;

use std::net::SocketAddr;

mod push;

pub fn app(config: config::AppConfig) -> Router {
    let store = match config.store_path.as_ref() {
        Some(path) => match push_service::SubscriptionStore::open(path.clone()) {
            Ok(store) => store,
            Err(err) => {
                eprintln!("failed to load subscription store: {err}");
                push_service::SubscriptionStore::in_memory()
            }
        },
        None => push_service::SubscriptionStore::in_memory(),
    };
    app_with_store(config, store)
}

pub fn app_with_store(config: config::AppConfig, store: push_service::SubscriptionStore) -> Router {
    let state = state::AppState { config, store };
    Router::new()
        .route("/check-subscription", get(push::check_subscription))
        .route("/vapid-public-key", get(push::vapid_public_key))
        .route("/subscribe", post(push::subscribe))
        .route("/send-notification", post(push::send_notification))
        .route("/api/debug/subscriptions", get(push::subscriptions_debug))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: config::AppConfig) {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app(config)).await.expect("server error");
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
