//! PlugNmeet HTTP 클라이언트

use super::payloads::{
    ActiveRoomInfoRequest, ApiResponse, CreateRoomRequest, EndRoomRequest, JoinTokenRequest,
    UserInfo, ACTIVE_ROOM_INFO_PATH, CREATE_ROOM_PATH, END_ROOM_PATH, JOIN_TOKEN_PATH,
};
use super::{signing, BackendError, ConferenceBackend, JoinCredential};
use crate::config::PlugNmeetConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Instant;

pub const API_KEY_HEADER: &str = "API-KEY";
pub const SIGNATURE_HEADER: &str = "HASH-SIGNATURE";

/// 모든 요청 본문을 서명해서 보내는 무상태 클라이언트
#[derive(Clone)]
pub struct PlugNmeetClient {
    http: reqwest::Client,
    config: PlugNmeetConfig,
}

impl PlugNmeetClient {
    pub fn new(config: PlugNmeetConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PlugNmeetConfig {
        &self.config
    }

    fn server_url(&self) -> &str {
        self.config.server_url.trim_end_matches('/')
    }

    /// 서명된 POST 요청. 모든 전송/파싱 실패는 BackendError로 변환
    async fn post<T: Serialize>(&self, path: &str, payload: &T) -> Result<ApiResponse, BackendError> {
        if !self.config.is_configured() {
            tracing::warn!(path = %path, "PlugNmeet request skipped: server not configured");
            return Err(BackendError::NotConfigured);
        }

        let body = serde_json::to_vec(payload).map_err(|e| BackendError::Malformed(e.to_string()))?;
        let signature = signing::sign(&self.config.api_secret, &body);
        let url = format!("{}{}", self.server_url(), path);
        let started = Instant::now();

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(path = %path, error = %e, "PlugNmeet API error");
                BackendError::Transport(e.to_string())
            })?;

        let http_status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(path = %path, error = %e, "PlugNmeet API error while reading body");
            BackendError::Transport(e.to_string())
        })?;

        let parsed: ApiResponse = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(path = %path, http_status = %http_status, error = %e, "PlugNmeet returned malformed body");
            BackendError::Malformed(format!("HTTP {}: {}", http_status, e))
        })?;

        tracing::debug!(
            path = %path,
            http_status = %http_status,
            status = parsed.status,
            msg = ?parsed.msg,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "PlugNmeet request completed"
        );

        Ok(parsed)
    }

    async fn query_active(&self, room_id: &str) -> Result<bool, BackendError> {
        let payload = ActiveRoomInfoRequest {
            room_ids: vec![room_id],
        };
        let response = self.post(ACTIVE_ROOM_INFO_PATH, &payload).await?;
        Ok(response.status && response.lists_room(room_id))
    }
}

/// 조회 실패는 "비활성"으로 간주.
/// 중복 생성 시도 위험을 감수하고 "입장 불가" 오류를 피한다.
pub fn assume_inactive_on_failure(room_id: &str, outcome: Result<bool, BackendError>) -> bool {
    outcome.unwrap_or_else(|e| {
        tracing::warn!(room_id = %room_id, error = %e, "Active room check failed, assuming inactive");
        false
    })
}

#[async_trait]
impl ConferenceBackend for PlugNmeetClient {
    async fn create_session(&self, room_id: &str, room_name: &str) -> Result<(), BackendError> {
        let payload = CreateRoomRequest::new(room_id, room_name);
        match self.post(CREATE_ROOM_PATH, &payload).await?.into_result() {
            Ok(_) => {
                tracing::info!(room_id = %room_id, "PlugNmeet room created");
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                tracing::info!(room_id = %room_id, "PlugNmeet room already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn is_session_active(&self, room_id: &str) -> bool {
        assume_inactive_on_failure(room_id, self.query_active(room_id).await)
    }

    async fn issue_join_credential(
        &self,
        room_id: &str,
        user_name: &str,
        user_id: &str,
        is_privileged: bool,
    ) -> Result<JoinCredential, BackendError> {
        let payload = JoinTokenRequest {
            room_id,
            user_info: UserInfo {
                name: user_name,
                user_id,
                is_admin: is_privileged,
                is_hidden: false,
            },
        };

        let response = self.post(JOIN_TOKEN_PATH, &payload).await?.into_result()?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BackendError::Malformed("join token missing from response".to_string()))?;

        let join_url = format!("{}/?access_token={}", self.server_url(), token);
        tracing::info!(room_id = %room_id, user_id = %user_id, "Join token issued");

        Ok(JoinCredential { token, join_url })
    }

    async fn end_session(&self, room_id: &str) -> bool {
        let payload = EndRoomRequest { room_id };
        match self.post(END_ROOM_PATH, &payload).await {
            Ok(response) if response.status => {
                tracing::info!(room_id = %room_id, "PlugNmeet room ended");
                true
            }
            Ok(response) => {
                tracing::warn!(room_id = %room_id, msg = ?response.msg, "PlugNmeet refused to end room");
                false
            }
            Err(e) => {
                tracing::warn!(room_id = %room_id, error = %e, "Failed to end PlugNmeet room");
                false
            }
        }
    }
}
