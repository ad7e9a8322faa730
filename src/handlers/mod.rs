//! 핸들러 모듈

pub mod meta;
pub mod rooms;
pub mod webhook;

pub use meta::*;
pub use rooms::*;
pub use webhook::*;

use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// 전체 라우터 구성
pub fn router(state: Arc<AppState>) -> Router {
    // CORS 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let room_routes = Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/:id", patch(update_room).delete(delete_room))
        .route("/rooms/:id/join", get(join_room))
        .route("/rooms/:id/presence", get(room_presence))
        .route("/admin/rooms", get(admin_rooms))
        .route("/webhook", post(handle_webhook))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_enabled));

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/settings", get(settings_handler))
        .merge(room_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
