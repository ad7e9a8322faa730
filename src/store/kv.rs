//! 키-값 저장소 백엔드

use super::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs as tokio_fs;

/// 키 하나에 JSON 값 하나를 저장하는 단순 저장소
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// 프로세스 메모리 저장소 (재시작 시 사라짐)
#[derive(Default)]
pub struct MemoryKv {
    values: DashMap<String, Value>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// 디렉터리 아래 키마다 `<key>.json` 파일 하나
#[derive(Clone)]
pub struct FileKv {
    root: PathBuf,
}

impl FileKv {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl KvStore for FileKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        match tokio_fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 임시 파일에 쓴 뒤 rename으로 교체
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(&value)?;

        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn memory_round_trip() {
        let kv = MemoryKv::new();
        assert!(kv.get("meeting_rooms").await.unwrap().is_none());
        kv.set("meeting_rooms", json!([1, 2])).await.unwrap();
        assert_eq!(kv.get("meeting_rooms").await.unwrap(), Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let kv = FileKv::new(temp_dir.path()).unwrap();
            kv.set("meeting_rooms", json!([{"id": "r1"}])).await.unwrap();
        }

        let reopened = FileKv::new(temp_dir.path()).unwrap();
        assert_eq!(
            reopened.get("meeting_rooms").await.unwrap(),
            Some(json!([{"id": "r1"}]))
        );
        assert!(temp_dir.path().join("meeting_rooms.json").exists());
        assert!(!temp_dir.path().join("meeting_rooms.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_json_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("meeting_rooms.json"), b"{not json").unwrap();

        let kv = FileKv::new(temp_dir.path()).unwrap();
        assert!(matches!(
            kv.get("meeting_rooms").await,
            Err(StoreError::Json(_))
        ));
    }
}
