// 통합 테스트 공용 도우미
#![allow(dead_code)]

use async_trait::async_trait;
use plugnmeet_rooms::config::{Config, RetryConfig};
use plugnmeet_rooms::identity::RequestingUser;
use plugnmeet_rooms::plugnmeet::{BackendError, ConferenceBackend, JoinCredential};
use plugnmeet_rooms::state::AppState;
use plugnmeet_rooms::store::MemoryKv;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    IsActive(String),
    Create(String, String),
    IssueToken {
        room_id: String,
        user_name: String,
        user_id: String,
        is_privileged: bool,
    },
    End(String),
}

/// 호출을 기록하고 미리 정한 결과를 돌려주는 가짜 화상회의 서버
pub struct FakeBackend {
    pub calls: Mutex<Vec<Call>>,
    pub active: Mutex<bool>,
    pub create_results: Mutex<Vec<Result<(), BackendError>>>,
    pub token_result: Mutex<Result<String, BackendError>>,
    pub end_result: Mutex<bool>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            active: Mutex::new(false),
            create_results: Mutex::new(Vec::new()),
            token_result: Mutex::new(Ok("abc".to_string())),
            end_result: Mutex::new(true),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matcher(c)).count()
    }

    pub fn set_active(&self, active: bool) {
        *self.active.lock().unwrap() = active;
    }

    /// 이후 create 호출들이 순서대로 돌려줄 결과 (소진되면 성공)
    pub fn queue_create_results(&self, results: Vec<Result<(), BackendError>>) {
        *self.create_results.lock().unwrap() = results;
    }

    pub fn fail_tokens(&self, error: BackendError) {
        *self.token_result.lock().unwrap() = Err(error);
    }

    pub fn fail_end(&self) {
        *self.end_result.lock().unwrap() = false;
    }
}

#[async_trait]
impl ConferenceBackend for FakeBackend {
    async fn create_session(&self, room_id: &str, room_name: &str) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(room_id.to_string(), room_name.to_string()));
        let mut queued = self.create_results.lock().unwrap();
        if queued.is_empty() {
            Ok(())
        } else {
            queued.remove(0)
        }
    }

    async fn is_session_active(&self, room_id: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push(Call::IsActive(room_id.to_string()));
        *self.active.lock().unwrap()
    }

    async fn issue_join_credential(
        &self,
        room_id: &str,
        user_name: &str,
        user_id: &str,
        is_privileged: bool,
    ) -> Result<JoinCredential, BackendError> {
        self.calls.lock().unwrap().push(Call::IssueToken {
            room_id: room_id.to_string(),
            user_name: user_name.to_string(),
            user_id: user_id.to_string(),
            is_privileged,
        });
        self.token_result
            .lock()
            .unwrap()
            .clone()
            .map(|token| JoinCredential {
                join_url: format!("https://host/?access_token={}", token),
                token,
            })
    }

    async fn end_session(&self, room_id: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push(Call::End(room_id.to_string()));
        *self.end_result.lock().unwrap()
    }
}

pub fn test_config() -> Config {
    Config {
        retry: RetryConfig {
            attempts: 3,
            base_delay_ms: 1,
        },
        ..Config::default()
    }
}

pub fn test_state(config: Config) -> (Arc<AppState>, Arc<FakeBackend>) {
    let backend = Arc::new(FakeBackend::new());
    let state = Arc::new(AppState::new(
        config,
        Arc::new(MemoryKv::new()),
        backend.clone(),
    ));
    (state, backend)
}

pub fn staff() -> RequestingUser {
    RequestingUser::new("1", "admin").staff()
}

pub fn member(id: &str, groups: &[i64]) -> RequestingUser {
    RequestingUser::new(id, format!("user{}", id)).with_groups(groups.iter().copied())
}
