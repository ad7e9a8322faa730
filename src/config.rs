//! 환경 변수 기반 설정 관리

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// 서버 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub log_level: String,
    pub plugnmeet: PlugNmeetConfig,
    pub display: DisplayConfig,
    pub presence: PresenceConfig,
    pub retry: RetryConfig,
    /// JSON 파일 저장소 디렉터리 (없으면 메모리 저장소)
    pub data_dir: Option<PathBuf>,
    /// 웹훅 서명 검증용 공유 비밀키
    pub webhook_secret: Option<String>,
}

/// PlugNmeet 서버 연결 설정
#[derive(Debug, Clone)]
pub struct PlugNmeetConfig {
    pub enabled: bool,
    pub server_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub request_timeout_ms: u64,
}

/// 사이드바 / 팝업 표시 설정
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub sidebar_title: String,
    pub popup_width: u32,
    pub popup_height: u32,
}

/// 접속자 추적 설정
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

/// 세션 생성 재시도 설정
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub attempts: u32,
    pub base_delay_ms: u64,
}

impl PlugNmeetConfig {
    /// 서버 URL, API 키, 비밀키가 모두 있어야 요청 가능
    pub fn is_configured(&self) -> bool {
        !self.server_url.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl PresenceConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// 재시도 한 번의 최대 대기 시간
pub const MAX_BACKOFF_MS: u64 = 5_000;

impl RetryConfig {
    /// 지수 백오프 + 지터. `attempt`는 1부터 시작, `MAX_BACKOFF_MS`를 넘지 않는다
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms.min(MAX_BACKOFF_MS);
        let exp = base.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
        let jitter = rand::random::<u64>() % (base / 2 + 1);
        Duration::from_millis(exp.saturating_add(jitter).min(MAX_BACKOFF_MS))
    }
}

impl Default for PlugNmeetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sidebar_title: "Meeting Rooms".to_string(),
            popup_width: 1200,
            popup_height: 800,
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sweep_interval_secs: 300,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 200,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5510,
            host: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
            plugnmeet: PlugNmeetConfig::default(),
            display: DisplayConfig::default(),
            presence: PresenceConfig::default(),
            retry: RetryConfig::default(),
            data_dir: None,
            webhook_secret: None,
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정 구성 (테스트에서 환경 변수 대신 사용)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            port: parse_or(lookup("PORT"), defaults.port),
            host: lookup("HOST").unwrap_or(defaults.host),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            plugnmeet: PlugNmeetConfig {
                enabled: lookup("PLUGNMEET_ENABLED")
                    .map(|v| parse_flag(&v))
                    .unwrap_or(defaults.plugnmeet.enabled),
                server_url: lookup("PLUGNMEET_SERVER_URL")
                    .unwrap_or_default()
                    .trim()
                    .trim_end_matches('/')
                    .to_string(),
                api_key: lookup("PLUGNMEET_API_KEY").unwrap_or_default(),
                api_secret: lookup("PLUGNMEET_API_SECRET").unwrap_or_default(),
                request_timeout_ms: parse_or(
                    lookup("PLUGNMEET_REQUEST_TIMEOUT_MS"),
                    defaults.plugnmeet.request_timeout_ms,
                ),
            },
            display: DisplayConfig {
                sidebar_title: lookup("PLUGNMEET_SIDEBAR_TITLE")
                    .unwrap_or(defaults.display.sidebar_title),
                popup_width: parse_or(lookup("PLUGNMEET_POPUP_WIDTH"), defaults.display.popup_width),
                popup_height: parse_or(
                    lookup("PLUGNMEET_POPUP_HEIGHT"),
                    defaults.display.popup_height,
                ),
            },
            presence: PresenceConfig {
                ttl_secs: parse_or(lookup("PRESENCE_TTL_SECS"), defaults.presence.ttl_secs),
                sweep_interval_secs: parse_or(
                    lookup("PRESENCE_SWEEP_SECS"),
                    defaults.presence.sweep_interval_secs,
                ),
            },
            retry: RetryConfig {
                attempts: parse_or(lookup("CREATE_RETRY_ATTEMPTS"), defaults.retry.attempts).max(1),
                base_delay_ms: parse_or(lookup("CREATE_RETRY_BASE_MS"), defaults.retry.base_delay_ms),
            },
            data_dir: non_empty("DATA_DIR").map(PathBuf::from),
            webhook_secret: non_empty("WEBHOOK_SECRET"),
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// 명시적으로 끈 경우만 false
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.port, 5510);
        assert!(config.plugnmeet.enabled);
        assert!(!config.plugnmeet.is_configured());
        assert_eq!(config.presence.ttl_secs, 3600);
        assert_eq!(config.display.sidebar_title, "Meeting Rooms");
        assert!(config.data_dir.is_none());
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn reads_plugnmeet_credentials() {
        let config = config_from(&[
            ("PLUGNMEET_SERVER_URL", "https://meet.example.com/"),
            ("PLUGNMEET_API_KEY", "key"),
            ("PLUGNMEET_API_SECRET", "secret"),
            ("PLUGNMEET_ENABLED", "false"),
        ]);
        assert_eq!(config.plugnmeet.server_url, "https://meet.example.com");
        assert!(config.plugnmeet.is_configured());
        assert!(!config.plugnmeet.enabled);
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("PLUGNMEET_POPUP_WIDTH", "wide"),
            ("CREATE_RETRY_ATTEMPTS", "0"),
        ]);
        assert_eq!(config.port, 5510);
        assert_eq!(config.display.popup_width, 1200);
        assert_eq!(config.retry.attempts, 1);
    }

    #[test]
    fn blank_webhook_secret_is_ignored() {
        let config = config_from(&[("WEBHOOK_SECRET", "   "), ("DATA_DIR", "/var/lib/rooms")]);
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/rooms")));
    }

    #[test]
    fn backoff_grows_and_stays_bounded() {
        let retry = RetryConfig {
            attempts: 3,
            base_delay_ms: 100,
        };
        let first = retry.backoff(1);
        let second = retry.backoff(2);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(150));
        assert!(second >= Duration::from_millis(200) && second <= Duration::from_millis(250));
    }

    #[test]
    fn huge_base_delay_is_capped() {
        let retry = RetryConfig {
            attempts: 3,
            base_delay_ms: u64::MAX / 2,
        };
        let cap = Duration::from_millis(MAX_BACKOFF_MS);
        assert_eq!(retry.backoff(1), cap);
        assert_eq!(retry.backoff(2), cap);
        assert_eq!(retry.backoff(40), cap);
    }

    #[test]
    fn enabled_flag_accepts_common_false_spellings() {
        for value in ["false", "FALSE", "0", "no", "Off", " off "] {
            let config = config_from(&[("PLUGNMEET_ENABLED", value)]);
            assert!(!config.plugnmeet.enabled, "{value:?} should disable");
        }
        for value in ["true", "1", "yes", "on"] {
            let config = config_from(&[("PLUGNMEET_ENABLED", value)]);
            assert!(config.plugnmeet.enabled, "{value:?} should enable");
        }
    }
}
