//! PlugNmeet 회의실 서버

use plugnmeet_rooms::{config::Config, router, state::AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if !config.plugnmeet.is_configured() {
        tracing::warn!("PlugNmeet server URL / API key / secret missing, joins will fail");
    }
    if config.webhook_secret.is_none() {
        tracing::warn!("WEBHOOK_SECRET not set, /webhook accepts unsigned events");
    }

    let state = Arc::new(AppState::from_config(config.clone())?);

    // 만료된 접속자 정리 스케줄러
    let presence = state.reconciler.presence().clone();
    let sweep_interval = config.presence.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            presence.sweep_expired();
        }
    });

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("PlugNmeet Meeting Rooms server started");
    tracing::info!("Address: {}", addr);
    tracing::info!("Enabled: {}", config.plugnmeet.enabled);

    axum::serve(listener, app).await?;
    Ok(())
}
