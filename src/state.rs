//! 애플리케이션 상태 관리

use crate::config::Config;
use crate::plugnmeet::{ConferenceBackend, PlugNmeetClient};
use crate::presence::PresenceTracker;
use crate::reconciler::SessionReconciler;
use crate::store::{FileKv, KvStore, MemoryKv, RoomStore};
use std::sync::Arc;

/// 전역 애플리케이션 상태
pub struct AppState {
    /// 설정
    pub config: Arc<Config>,
    /// 방 / 접속자 / 외부 세션 조율
    pub reconciler: SessionReconciler,
}

impl AppState {
    pub fn new(config: Config, kv: Arc<dyn KvStore>, backend: Arc<dyn ConferenceBackend>) -> Self {
        let presence = Arc::new(PresenceTracker::new(config.presence.ttl()));
        let reconciler = SessionReconciler::new(
            RoomStore::new(kv),
            presence,
            backend,
            config.retry.clone(),
        );

        Self {
            config: Arc::new(config),
            reconciler,
        }
    }

    /// 설정에 따라 저장소와 PlugNmeet 클라이언트 구성
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let kv: Arc<dyn KvStore> = match &config.data_dir {
            Some(dir) => {
                tracing::info!(data_dir = %dir.display(), "Using JSON file room store");
                Arc::new(FileKv::new(dir)?)
            }
            None => {
                tracing::warn!("DATA_DIR not set, rooms are kept in memory only");
                Arc::new(MemoryKv::new())
            }
        };
        let backend = Arc::new(PlugNmeetClient::new(config.plugnmeet.clone())?);

        Ok(Self::new(config, kv, backend))
    }
}
