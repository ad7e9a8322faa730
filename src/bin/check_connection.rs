//! PlugNmeet 연결 점검 도구
//!
//! 설정 확인 → 테스트 방 생성 → 토큰 발급 → 활성 상태 확인 → 방 종료

use plugnmeet_rooms::config::Config;
use plugnmeet_rooms::plugnmeet::{ConferenceBackend, PlugNmeetClient};
use std::process::ExitCode;

fn masked(value: &str) -> String {
    let prefix: String = value.chars().take(6).collect();
    format!("{}...", prefix)
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();
    let settings = &config.plugnmeet;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .init();

    println!("PlugNmeet Connection Test");
    println!("{}", "=".repeat(50));

    println!("\n1. Checking settings...");
    if !settings.enabled {
        println!("[FAIL] PLUGNMEET_ENABLED is false");
        return ExitCode::FAILURE;
    }
    if settings.server_url.is_empty() {
        println!("[FAIL] PLUGNMEET_SERVER_URL not configured");
        return ExitCode::FAILURE;
    }
    if settings.api_key.is_empty() || settings.api_secret.is_empty() {
        println!("[FAIL] PLUGNMEET_API_KEY / PLUGNMEET_API_SECRET not configured");
        return ExitCode::FAILURE;
    }
    println!("[ OK ] Server URL: {}", settings.server_url);
    println!("[ OK ] API Key: {}", masked(&settings.api_key));
    println!("[ OK ] API Secret: {}", masked(&settings.api_secret));

    let client = match PlugNmeetClient::new(settings.clone()) {
        Ok(client) => client,
        Err(e) => {
            println!("[FAIL] Could not build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("\n2. Testing room creation...");
    let room_id = format!("test-{:08x}", rand::random::<u32>());
    if let Err(e) = client.create_session(&room_id, "Connection Test Room").await {
        println!("[FAIL] Room creation failed: {}", e);
        return ExitCode::FAILURE;
    }
    println!("[ OK ] Room created: {}", room_id);

    println!("\n3. Testing token generation...");
    match client
        .issue_join_credential(&room_id, "connection-test", "0", false)
        .await
    {
        Ok(credential) => {
            let preview: String = credential.join_url.chars().take(60).collect();
            println!("[ OK ] Join URL: {}...", preview);
        }
        Err(e) => {
            println!("[FAIL] Token generation failed: {}", e);
            client.end_session(&room_id).await;
            return ExitCode::FAILURE;
        }
    }

    println!("\n4. Testing room status check...");
    let active = client.is_session_active(&room_id).await;
    println!("[ OK ] Room active: {}", active);

    println!("\n5. Cleaning up...");
    if client.end_session(&room_id).await {
        println!("[ OK ] Test room ended");
    } else {
        println!("[WARN] Could not end test room");
    }

    println!("\n{}", "=".repeat(50));
    println!("All checks passed. PlugNmeet integration is working.");
    ExitCode::SUCCESS
}
