//! 회의실 정의 저장소

pub mod kv;
pub mod rooms;

pub use kv::{FileKv, KvStore, MemoryKv};
pub use rooms::{can_access, NewRoom, Room, RoomChanges, RoomStore, ROOMS_KEY};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
