//! 회의실 레코드 CRUD

use super::{KvStore, StoreError};
use crate::identity::{GroupId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// 전체 방 목록이 저장되는 키
pub const ROOMS_KEY: &str = "meeting_rooms";

/// 그룹 제한이 있는 회의실 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// 비어 있으면 모든 사용자에게 공개
    #[serde(default)]
    pub allowed_group_ids: BTreeSet<GroupId>,
    pub created_at: DateTime<Utc>,
    pub created_by_id: UserId,
}

#[derive(Debug, Clone)]
pub struct NewRoom {
    pub name: String,
    pub icon: Option<String>,
    pub allowed_group_ids: BTreeSet<GroupId>,
    pub created_by_id: UserId,
}

/// 변경할 필드만 Some. `icon`이 빈 문자열이면 아이콘 제거
#[derive(Debug, Clone, Default)]
pub struct RoomChanges {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub allowed_group_ids: Option<BTreeSet<GroupId>>,
}

impl RoomChanges {
    fn apply(self, room: &mut Room) {
        if let Some(name) = self.name {
            room.name = name;
        }
        if let Some(icon) = self.icon {
            room.icon = if icon.is_empty() { None } else { Some(icon) };
        }
        if let Some(groups) = self.allowed_group_ids {
            room.allowed_group_ids = groups;
        }
    }
}

/// 그룹 제한이 없거나 사용자 그룹과 겹치면 접근 가능
pub fn can_access(room: &Room, user_group_ids: &[GroupId]) -> bool {
    room.allowed_group_ids.is_empty()
        || user_group_ids
            .iter()
            .any(|g| room.allowed_group_ids.contains(g))
}

/// 키-값 저장소 위의 방 컬렉션.
/// 변경 작업은 전체 목록을 읽고 수정한 뒤 다시 쓰며, 프로세스 내에서는
/// 단일 writer 락으로 직렬화된다. 같은 저장소를 여러 프로세스가 쓰면
/// 마지막 쓰기가 이긴다.
pub struct RoomStore {
    kv: Arc<dyn KvStore>,
    write_lock: Mutex<()>,
}

impl RoomStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Room>, StoreError> {
        match self.kv.get(ROOMS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    async fn persist(&self, rooms: &[Room]) -> Result<(), StoreError> {
        self.kv.set(ROOMS_KEY, serde_json::to_value(rooms)?).await
    }

    pub async fn list(&self) -> Result<Vec<Room>, StoreError> {
        self.load().await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Room>, StoreError> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    pub async fn visible_to(&self, user_group_ids: &[GroupId]) -> Result<Vec<Room>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|room| can_access(room, user_group_ids))
            .collect())
    }

    pub async fn create(&self, new_room: NewRoom) -> Result<Room, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut rooms = self.load().await?;

        let mut id = Uuid::new_v4().to_string();
        while rooms.iter().any(|r| r.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let room = Room {
            id,
            name: new_room.name,
            icon: new_room.icon.filter(|i| !i.is_empty()),
            allowed_group_ids: new_room.allowed_group_ids,
            created_at: Utc::now(),
            created_by_id: new_room.created_by_id,
        };

        rooms.push(room.clone());
        self.persist(&rooms).await?;

        tracing::info!(room_id = %room.id, name = %room.name, "Room created");
        Ok(room)
    }

    pub async fn update(&self, id: &str, changes: RoomChanges) -> Result<Option<Room>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut rooms = self.load().await?;

        let Some(room) = rooms.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        changes.apply(room);
        let updated = room.clone();

        self.persist(&rooms).await?;
        tracing::info!(room_id = %id, "Room updated");
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut rooms = self.load().await?;

        let before = rooms.len();
        rooms.retain(|r| r.id != id);
        if rooms.len() == before {
            return Ok(false);
        }

        self.persist(&rooms).await?;
        tracing::info!(room_id = %id, "Room deleted");
        Ok(true)
    }
}
