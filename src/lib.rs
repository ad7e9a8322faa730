//! PlugNmeet 회의실 레지스트리 및 접속자 추적 서비스

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod plugnmeet;
pub mod presence;
pub mod protocol;
pub mod reconciler;
pub mod state;
pub mod store;

pub use handlers::router;
