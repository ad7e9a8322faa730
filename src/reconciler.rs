//! 방 레지스트리 / 접속자 / 외부 세션 조율

use crate::config::RetryConfig;
use crate::error::AppError;
use crate::identity::RequestingUser;
use crate::plugnmeet::ConferenceBackend;
use crate::presence::PresenceTracker;
use crate::protocol::{
    AdminRoom, CreateRoomRequest, JoinResult, PresenceSnapshot, RoomSummary, UpdateRoomRequest,
    SUMMARY_PARTICIPANT_LIMIT,
};
use crate::store::{can_access, NewRoom, Room, RoomChanges, RoomStore};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// 외부 서버가 보내는 접속 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    UserJoined,
    UserLeft,
}

impl PresenceEvent {
    pub fn parse(event_type: &str) -> Option<Self> {
        match event_type {
            "user_joined" => Some(Self::UserJoined),
            "user_left" => Some(Self::UserLeft),
            _ => None,
        }
    }
}

/// 상태를 소유하지 않고 저장소, 접속자 추적기, 외부 서버를 조율한다
pub struct SessionReconciler {
    rooms: RoomStore,
    presence: Arc<PresenceTracker>,
    backend: Arc<dyn ConferenceBackend>,
    retry: RetryConfig,
    /// 마지막 웹훅 수신 시각 (epoch ms, 0 = 없음)
    last_webhook_ms: AtomicI64,
}

impl SessionReconciler {
    pub fn new(
        rooms: RoomStore,
        presence: Arc<PresenceTracker>,
        backend: Arc<dyn ConferenceBackend>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            rooms,
            presence,
            backend,
            retry,
            last_webhook_ms: AtomicI64::new(0),
        }
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn presence(&self) -> &Arc<PresenceTracker> {
        &self.presence
    }

    /// 웹훅이 들어오고 있는지 확인용
    pub fn last_webhook_at(&self) -> Option<DateTime<Utc>> {
        match self.last_webhook_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    async fn find_room(&self, room_id: &str) -> Result<Room, AppError> {
        self.rooms
            .get(room_id)
            .await?
            .ok_or_else(|| AppError::NotFound(room_id.to_string()))
    }

    async fn find_accessible_room(&self, room_id: &str, user: &RequestingUser) -> Result<Room, AppError> {
        let room = self.find_room(room_id).await?;
        if !can_access(&room, &user.group_ids) {
            tracing::warn!(room_id = %room_id, user_id = %user.id, "Room access denied");
            return Err(AppError::Forbidden(room_id.to_string()));
        }
        Ok(room)
    }

    fn require_staff(user: &RequestingUser, action: &str) -> Result<(), AppError> {
        if user.is_staff {
            Ok(())
        } else {
            tracing::warn!(user_id = %user.id, action = %action, "Staff-only action rejected");
            Err(AppError::Forbidden(format!("Only staff can {} rooms", action)))
        }
    }

    /// 방 레코드 + 현재 접속자
    pub fn room_detail(&self, room: Room) -> AdminRoom {
        let participants = self.presence.members(&room.id);
        AdminRoom {
            participant_count: participants.len(),
            participants: participants.into_iter().collect(),
            room,
        }
    }

    fn summarize(&self, room: Room) -> RoomSummary {
        let members = self.presence.members(&room.id);
        RoomSummary {
            participant_count: members.len(),
            participants: members.into_iter().take(SUMMARY_PARTICIPANT_LIMIT).collect(),
            id: room.id,
            name: room.name,
            icon: room.icon,
        }
    }

    /// 사용자에게 보이는 방 목록과 접속자 요약
    pub async fn list_rooms(&self, user: &RequestingUser) -> Result<Vec<RoomSummary>, AppError> {
        let rooms = self.rooms.visible_to(&user.group_ids).await?;
        Ok(rooms.into_iter().map(|room| self.summarize(room)).collect())
    }

    /// 관리 화면용 전체 목록 (운영진 전용)
    pub async fn admin_rooms(&self, user: &RequestingUser) -> Result<Vec<AdminRoom>, AppError> {
        Self::require_staff(user, "manage")?;
        let rooms = self.rooms.list().await?;
        Ok(rooms.into_iter().map(|room| self.room_detail(room)).collect())
    }

    /// 방 입장: 접근 확인 → 외부 세션 확보 → 입장 토큰 발급 → 접속자 기록
    pub async fn join_room(&self, room_id: &str, user: &RequestingUser) -> Result<JoinResult, AppError> {
        tracing::info!(room_id = %room_id, user_id = %user.id, "join_room started");

        let room = self.find_accessible_room(room_id, user).await?;
        self.ensure_session(&room).await?;

        let credential = self
            .backend
            .issue_join_credential(&room.id, &user.username, &user.id, user.is_staff)
            .await
            .map_err(|e| {
                tracing::error!(room_id = %room.id, user_id = %user.id, error = %e, "Join token request failed");
                AppError::Upstream(format!("Failed to generate token: {}", e))
            })?;

        self.presence.add(&room.id, &user.id);

        tracing::info!(room_id = %room.id, user_id = %user.id, "User joined room");
        Ok(JoinResult {
            join_url: credential.join_url,
            token: credential.token,
            room_name: room.name,
        })
    }

    /// 활성 세션이 없으면 생성. 전송 실패만 제한된 횟수로 재시도
    async fn ensure_session(&self, room: &Room) -> Result<(), AppError> {
        if self.backend.is_session_active(&room.id).await {
            return Ok(());
        }

        let mut attempt = 1;
        loop {
            match self.backend.create_session(&room.id, &room.name).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.retry.attempts => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        room_id = %room.id,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Room creation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(room_id = %room.id, attempt = attempt, error = %e, "Room creation failed");
                    return Err(AppError::Upstream(format!("Failed to create room: {}", e)));
                }
            }
        }
    }

    pub async fn create_room(&self, request: CreateRoomRequest, user: &RequestingUser) -> Result<Room, AppError> {
        Self::require_staff(user, "create")?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }

        let room = self
            .rooms
            .create(NewRoom {
                name: name.to_string(),
                icon: request.icon.map(|i| i.trim().to_string()),
                allowed_group_ids: request.allowed_group_ids.into_iter().collect(),
                created_by_id: user.id.clone(),
            })
            .await?;
        Ok(room)
    }

    pub async fn update_room(
        &self,
        room_id: &str,
        request: UpdateRoomRequest,
        user: &RequestingUser,
    ) -> Result<Room, AppError> {
        Self::require_staff(user, "update")?;

        let name = match request.name {
            Some(name) if name.trim().is_empty() => {
                return Err(AppError::Validation("name cannot be blank".to_string()))
            }
            other => other.map(|n| n.trim().to_string()),
        };

        let changes = RoomChanges {
            name,
            icon: request.icon.map(|i| i.trim().to_string()),
            allowed_group_ids: request.allowed_group_ids.map(|ids| ids.into_iter().collect()),
        };

        self.rooms
            .update(room_id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(room_id.to_string()))
    }

    /// 외부 세션 종료 → 레코드 삭제 → 접속자 정리.
    /// 세션 종료 실패는 삭제를 막지 않는다.
    pub async fn delete_room(&self, room_id: &str, user: &RequestingUser) -> Result<(), AppError> {
        Self::require_staff(user, "delete")?;
        let room = self.find_room(room_id).await?;

        if !self.backend.end_session(&room.id).await {
            tracing::warn!(room_id = %room.id, "External session not ended, deleting room anyway");
        }

        let deleted = self.rooms.delete(&room.id).await?;
        self.presence.purge(&room.id);

        if !deleted {
            // 조회와 삭제 사이에 다른 요청이 먼저 지운 경우
            return Err(AppError::NotFound(room_id.to_string()));
        }
        Ok(())
    }

    /// 웹훅 이벤트 반영. 알 수 없는 이벤트는 무시
    pub fn ingest_webhook(&self, event_type: &str, room_id: &str, user_id: &str) {
        self.last_webhook_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);

        let Some(event) = PresenceEvent::parse(event_type) else {
            tracing::debug!(event = %event_type, "Ignoring webhook event");
            return;
        };

        if room_id.is_empty() || user_id.is_empty() {
            tracing::warn!(event = %event_type, "Webhook event without room_id or user_id ignored");
            return;
        }

        match event {
            PresenceEvent::UserJoined => self.presence.add(room_id, user_id),
            PresenceEvent::UserLeft => self.presence.remove(room_id, user_id),
        }
        tracing::info!(event = %event_type, room_id = %room_id, user_id = %user_id, "Webhook processed");
    }

    pub async fn room_presence(&self, room_id: &str, user: &RequestingUser) -> Result<PresenceSnapshot, AppError> {
        let room = self.find_accessible_room(room_id, user).await?;
        let participants = self.presence.members(&room.id);
        Ok(PresenceSnapshot {
            room_id: room.id,
            participant_count: participants.len(),
            participants,
        })
    }
}
