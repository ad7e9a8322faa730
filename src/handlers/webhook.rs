//! PlugNmeet 웹훅 핸들러

use crate::error::AppError;
use crate::plugnmeet::{client::SIGNATURE_HEADER, signing};
use crate::protocol::{SuccessResponse, WebhookPayload};
use crate::state::AppState;
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use std::sync::Arc;

/// 접속/퇴장 이벤트 수신.
/// `WEBHOOK_SECRET`이 설정되어 있으면 본문 HMAC 서명이 일치해야 한다.
pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    if let Some(secret) = state.config.webhook_secret.as_deref() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !signing::verify(secret, &body, signature) {
            tracing::warn!("Webhook rejected: invalid signature");
            return Err(AppError::Unauthorized);
        }
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid webhook body: {}", e)))?;

    state
        .reconciler
        .ingest_webhook(&payload.event, &payload.room_id, &payload.user_id);

    Ok(Json(SuccessResponse::ok()))
}
