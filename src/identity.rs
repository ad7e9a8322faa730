//! 호스트 플랫폼이 전달하는 사용자 신원

use crate::error::AppError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

pub type UserId = String;
pub type GroupId = i64;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USERNAME_HEADER: &str = "x-username";
pub const USER_GROUPS_HEADER: &str = "x-user-groups";
pub const USER_STAFF_HEADER: &str = "x-user-staff";

/// 요청한 사용자 (그룹 및 운영진 여부 포함)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestingUser {
    pub id: UserId,
    pub username: String,
    pub group_ids: Vec<GroupId>,
    pub is_staff: bool,
}

impl RequestingUser {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            group_ids: Vec::new(),
            is_staff: false,
        }
    }

    pub fn with_groups(mut self, group_ids: impl IntoIterator<Item = GroupId>) -> Self {
        self.group_ids = group_ids.into_iter().collect();
        self
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// 리버스 프록시가 설정한 헤더에서 신원 추출. 사용자 ID가 없으면 비로그인
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let id = header(USER_ID_HEADER)?.to_string();
        let username = header(USERNAME_HEADER).unwrap_or(&id).to_string();
        let group_ids = header(USER_GROUPS_HEADER)
            .map(|raw| {
                raw.split(',')
                    .filter_map(|g| g.trim().parse::<GroupId>().ok())
                    .collect()
            })
            .unwrap_or_default();
        let is_staff = header(USER_STAFF_HEADER)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Some(Self {
            id,
            username,
            group_ids,
            is_staff,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_full_identity() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("42"));
        headers.insert(USERNAME_HEADER, HeaderValue::from_static("alice"));
        headers.insert(USER_GROUPS_HEADER, HeaderValue::from_static("5, 7,x"));
        headers.insert(USER_STAFF_HEADER, HeaderValue::from_static("true"));

        let user = RequestingUser::from_headers(&headers).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.username, "alice");
        assert_eq!(user.group_ids, vec![5, 7]);
        assert!(user.is_staff);
    }

    #[test]
    fn missing_user_id_means_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(USERNAME_HEADER, HeaderValue::from_static("alice"));
        assert!(RequestingUser::from_headers(&headers).is_none());
    }

    #[test]
    fn username_defaults_to_id() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("7"));
        let user = RequestingUser::from_headers(&headers).unwrap();
        assert_eq!(user.username, "7");
        assert!(user.group_ids.is_empty());
        assert!(!user.is_staff);
    }
}
