//! PlugNmeet 서버 연동 (서명된 API 클라이언트)

pub mod client;
pub mod payloads;
pub mod signing;

pub use client::PlugNmeetClient;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// 전송 계층 실패까지 포함한 API 호출 결과 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("PlugNmeet server is not configured")]
    NotConfigured,

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// 일시적인 네트워크 문제만 재시도 대상
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }

    /// 이미 존재하는 방에 대한 생성 거절인지 확인
    pub fn is_already_exists(&self) -> bool {
        match self {
            BackendError::Rejected(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("already exist") || msg.contains("already active")
            }
            _ => false,
        }
    }
}

/// 사용자 한 명, 세션 하나에 대한 입장 자격증명
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinCredential {
    pub token: String,
    pub join_url: String,
}

/// 외부 화상회의 서버 기능
#[async_trait]
pub trait ConferenceBackend: Send + Sync {
    /// 세션 생성. 이미 존재하는 경우도 성공으로 취급
    async fn create_session(&self, room_id: &str, room_name: &str) -> Result<(), BackendError>;

    /// 활성 세션 여부. 조회 실패 시 false (비활성으로 간주)
    async fn is_session_active(&self, room_id: &str) -> bool;

    async fn issue_join_credential(
        &self,
        room_id: &str,
        user_name: &str,
        user_id: &str,
        is_privileged: bool,
    ) -> Result<JoinCredential, BackendError>;

    /// 세션 종료 (best-effort)
    async fn end_session(&self, room_id: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_exists_detection() {
        assert!(BackendError::Rejected("Room already exists".into()).is_already_exists());
        assert!(BackendError::Rejected("room is already active".into()).is_already_exists());
        assert!(!BackendError::Rejected("invalid api key".into()).is_already_exists());
        assert!(!BackendError::Transport("room already exists".into()).is_already_exists());
    }

    #[test]
    fn only_transport_failures_retry() {
        assert!(BackendError::Transport("timeout".into()).is_retryable());
        assert!(!BackendError::NotConfigured.is_retryable());
        assert!(!BackendError::Rejected("no".into()).is_retryable());
        assert!(!BackendError::Malformed("html".into()).is_retryable());
    }
}
