//! PlugNmeet API 요청/응답 페이로드

use super::BackendError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CREATE_ROOM_PATH: &str = "/auth/room/create";
pub const JOIN_TOKEN_PATH: &str = "/auth/room/getJoinToken";
pub const END_ROOM_PATH: &str = "/auth/room/end";
pub const ACTIVE_ROOM_INFO_PATH: &str = "/auth/room/getActiveRoomInfo";

#[derive(Debug, Serialize)]
pub struct CreateRoomRequest<'a> {
    pub room_id: &'a str,
    pub metadata: RoomMetadata,
}

#[derive(Debug, Serialize)]
pub struct RoomMetadata {
    pub room_title: String,
    pub welcome_message: String,
    /// 0 = 무제한
    pub max_participants: u32,
    pub enable_analytics: bool,
    pub room_features: RoomFeatures,
}

#[derive(Debug, Serialize)]
pub struct RoomFeatures {
    pub allow_webcams: bool,
    pub mute_on_start: bool,
    pub allow_screen_share: bool,
    pub allow_recording: bool,
    pub allow_rtmp: bool,
    pub admin_only_webcams: bool,
    pub allow_view_other_webcams: bool,
    pub allow_view_other_users_list: bool,
    pub enable_chat: bool,
    pub enable_shared_note_pad: bool,
    pub enable_whiteboard: bool,
    pub enable_breakout_room: bool,
}

impl Default for RoomFeatures {
    fn default() -> Self {
        Self {
            allow_webcams: true,
            mute_on_start: false,
            allow_screen_share: true,
            allow_recording: false,
            allow_rtmp: false,
            admin_only_webcams: false,
            allow_view_other_webcams: true,
            allow_view_other_users_list: true,
            enable_chat: true,
            enable_shared_note_pad: true,
            enable_whiteboard: true,
            enable_breakout_room: false,
        }
    }
}

impl<'a> CreateRoomRequest<'a> {
    pub fn new(room_id: &'a str, room_name: &str) -> Self {
        Self {
            room_id,
            metadata: RoomMetadata {
                room_title: room_name.to_string(),
                welcome_message: format!("Welcome to {}", room_name),
                max_participants: 0,
                enable_analytics: false,
                room_features: RoomFeatures::default(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JoinTokenRequest<'a> {
    pub room_id: &'a str,
    pub user_info: UserInfo<'a>,
}

#[derive(Debug, Serialize)]
pub struct UserInfo<'a> {
    pub name: &'a str,
    pub user_id: &'a str,
    pub is_admin: bool,
    pub is_hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct EndRoomRequest<'a> {
    pub room_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ActiveRoomInfoRequest<'a> {
    pub room_ids: Vec<&'a str>,
}

/// 모든 API 공통 응답. `status`가 false면 `msg`에 사유
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub result: Option<Vec<Value>>,
}

impl ApiResponse {
    pub fn into_result(self) -> Result<Self, BackendError> {
        if self.status {
            Ok(self)
        } else {
            Err(BackendError::Rejected(
                self.msg.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }

    /// 활성 방 목록에 해당 ID가 있는지 확인
    pub fn lists_room(&self, room_id: &str) -> bool {
        self.result
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|entry| entry_room_id(entry) == Some(room_id))
    }
}

fn entry_room_id(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(id) => Some(id.as_str()),
        Value::Object(_) => entry
            .pointer("/room_info/room_id")
            .or_else(|| entry.get("room_id"))
            .and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_payload_shape() {
        let payload = serde_json::to_value(CreateRoomRequest::new("r1", "Lobby")).unwrap();
        assert_eq!(payload["room_id"], "r1");
        assert_eq!(payload["metadata"]["room_title"], "Lobby");
        assert_eq!(payload["metadata"]["welcome_message"], "Welcome to Lobby");
        assert_eq!(payload["metadata"]["max_participants"], 0);
        assert_eq!(payload["metadata"]["room_features"]["allow_webcams"], true);
        assert_eq!(payload["metadata"]["room_features"]["allow_recording"], false);
    }

    #[test]
    fn rejected_response_carries_message() {
        let response: ApiResponse =
            serde_json::from_value(json!({"status": false, "msg": "invalid api key"})).unwrap();
        assert_eq!(
            response.into_result().unwrap_err(),
            BackendError::Rejected("invalid api key".into())
        );

        let response: ApiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            response.into_result().unwrap_err(),
            BackendError::Rejected("Unknown error".into())
        );
    }

    #[test]
    fn lists_room_understands_result_shapes() {
        let response: ApiResponse = serde_json::from_value(json!({
            "status": true,
            "result": [
                {"room_info": {"room_id": "a"}},
                {"room_id": "b"},
                "c"
            ]
        }))
        .unwrap();
        assert!(response.lists_room("a"));
        assert!(response.lists_room("b"));
        assert!(response.lists_room("c"));
        assert!(!response.lists_room("d"));

        let empty: ApiResponse = serde_json::from_value(json!({"status": true})).unwrap();
        assert!(!empty.lists_room("a"));
    }
}
