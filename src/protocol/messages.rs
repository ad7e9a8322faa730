//! HTTP 요청/응답 메시지 정의

use crate::identity::{GroupId, UserId};
use crate::store::Room;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// 사이드바 목록에 표시할 접속자 수
pub const SUMMARY_PARTICIPANT_LIMIT: usize = 5;

/// 방 생성 요청
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub allowed_group_ids: Vec<GroupId>,
}

/// 방 수정 요청
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub allowed_group_ids: Option<Vec<GroupId>>,
}

/// 웹훅 이벤트 본문
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    #[serde(default, deserialize_with = "id_string")]
    pub room_id: String,
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: String,
}

/// 사이드바용 방 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub participant_count: usize,
    pub participants: Vec<UserId>,
}

#[derive(Debug, Serialize)]
pub struct RoomsResponse<T> {
    pub rooms: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinResult {
    pub join_url: String,
    pub token: String,
    pub room_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceSnapshot {
    pub room_id: String,
    pub participant_count: usize,
    pub participants: BTreeSet<UserId>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// 클라이언트 표시 설정
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub enabled: bool,
    pub sidebar_title: String,
    pub popup_width: u32,
    pub popup_height: u32,
}

/// 방 레코드와 접속자 (관리 화면, 생성/수정 응답)
#[derive(Debug, Serialize)]
pub struct AdminRoom {
    #[serde(flatten)]
    pub room: Room,
    pub participant_count: usize,
    pub participants: Vec<UserId>,
}

/// PlugNmeet는 ID를 문자열 또는 숫자로 보낸다
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s.trim().to_string(),
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_accepts_numeric_user_ids() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"event":"user_joined","room_id":"r1","user_id":42}"#).unwrap();
        assert_eq!(payload.user_id, "42");

        let payload: WebhookPayload =
            serde_json::from_str(r#"{"event":"user_left","room_id":"r1","user_id":" 7 "}"#).unwrap();
        assert_eq!(payload.user_id, "7");
    }

    #[test]
    fn webhook_ids_default_to_empty() {
        let payload: WebhookPayload = serde_json::from_str(r#"{"event":"room_finished"}"#).unwrap();
        assert!(payload.room_id.is_empty());
        assert!(payload.user_id.is_empty());
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let request: CreateRoomRequest = serde_json::from_str("{}").unwrap();
        assert!(request.name.is_empty());
        assert!(request.allowed_group_ids.is_empty());
    }
}
