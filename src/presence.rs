//! 방별 접속자 추적 (TTL 기반)

use crate::identity::UserId;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;

/// 방 하나의 접속자 집합
struct PresenceEntry {
    members: BTreeSet<UserId>,
    expires_at: Instant,
}

impl PresenceEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// 방 ID -> 접속자 집합.
/// 만료된 집합은 물리적으로 지워지기 전이라도 빈 집합으로 읽힌다.
pub struct PresenceTracker {
    entries: DashMap<String, PresenceEntry>,
    ttl: Duration,
}

impl PresenceTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 접속자 추가 및 만료 시간 갱신
    pub fn add(&self, room_id: &str, user_id: &str) {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(room_id.to_string())
            .or_insert_with(|| PresenceEntry {
                members: BTreeSet::new(),
                expires_at: now + self.ttl,
            });

        if entry.is_expired(now) {
            entry.members.clear();
        }
        entry.members.insert(user_id.to_string());
        entry.expires_at = now + self.ttl;

        tracing::debug!(room_id = %room_id, user_id = %user_id, members = entry.members.len(), "Presence added");
    }

    /// 접속자 제거. 만료 시간은 건드리지 않음
    pub fn remove(&self, room_id: &str, user_id: &str) {
        if let Some(mut entry) = self.entries.get_mut(room_id) {
            entry.members.remove(user_id);
            tracing::debug!(room_id = %room_id, user_id = %user_id, members = entry.members.len(), "Presence removed");
        }
    }

    pub fn members(&self, room_id: &str) -> BTreeSet<UserId> {
        let now = Instant::now();
        self.entries
            .get(room_id)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.members.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, room_id: &str) -> usize {
        let now = Instant::now();
        self.entries
            .get(room_id)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.members.len())
            .unwrap_or(0)
    }

    /// 방 삭제 시 호출
    pub fn purge(&self, room_id: &str) {
        if self.entries.remove(room_id).is_some() {
            tracing::info!(room_id = %room_id, "Presence purged");
        }
    }

    /// 만료된 항목 정리
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.entries.retain(|room_id, entry| {
            if entry.is_expired(now) {
                tracing::debug!(room_id = %room_id, "Expired presence dropped");
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            tracing::info!(expired_rooms = removed, "Presence sweep completed");
        }
        removed
    }
}
