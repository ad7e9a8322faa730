//! 상태 확인 및 클라이언트 설정

use crate::error::AppError;
use crate::protocol::SettingsResponse;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, Response},
    Json,
};
use std::sync::Arc;

pub async fn index_handler() -> Html<&'static str> {
    Html("<h1>PlugNmeet Meeting Rooms</h1><p>API endpoint: /rooms</p>")
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server": "plugnmeet-rooms-rs",
        "timestamp": chrono::Utc::now().timestamp(),
        "last_webhook": state.reconciler.last_webhook_at().map(|at| at.to_rfc3339()),
    }))
}

/// 사이드바 제목과 팝업 크기
pub async fn settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    let config = &state.config;
    Json(SettingsResponse {
        enabled: config.plugnmeet.enabled,
        sidebar_title: config.display.sidebar_title.clone(),
        popup_width: config.display.popup_width,
        popup_height: config.display.popup_height,
    })
}

/// 기능이 꺼져 있으면 모든 회의실 경로를 404로 처리
pub async fn require_enabled(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.plugnmeet.enabled {
        return Err(AppError::Disabled);
    }
    Ok(next.run(request).await)
}
