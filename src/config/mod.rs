// region:    --- Imports
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("환경 변수 {key} 값이 올바르지 않습니다: {value}")]
    Invalid { key: &'static str, value: String },
}

// region:    --- Client Config
/// 입찰 클라이언트 설정
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// 경매 상태 폴링 주기
    pub poll_interval: Duration,
    /// 이 시간 안의 조회 결과는 재조회 없이 사용
    pub stale_after: Duration,
    /// None 이면 알림 중계를 끈다
    pub notification_interval: Option<Duration>,
    pub request_timeout: Duration,
    pub auth_token: Option<String>,
    pub user_id: Option<i64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            poll_interval: Duration::from_secs(5),
            stale_after: Duration::from_secs(2),
            notification_interval: Some(Duration::from_secs(10)),
            request_timeout: Duration::from_secs(10),
            auth_token: None,
            user_id: None,
        }
    }
}

impl ClientConfig {
    /// 환경 변수에서 설정 로드 (없으면 기본값)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url =
            env::var("BIDDING_API_URL").unwrap_or_else(|_| defaults.api_base_url.clone());
        let poll_interval = load_millis("BIDDING_POLL_INTERVAL_MS", defaults.poll_interval)?;
        let stale_after = load_millis("BIDDING_STALE_AFTER_MS", defaults.stale_after)?;
        let notification_interval = match load_millis(
            "BIDDING_NOTIFICATION_INTERVAL_MS",
            defaults.notification_interval.unwrap_or_default(),
        )? {
            d if d.is_zero() => None,
            d => Some(d),
        };
        let request_timeout =
            load_millis("BIDDING_REQUEST_TIMEOUT_MS", defaults.request_timeout)?;
        let auth_token = env::var("BIDDING_AUTH_TOKEN").ok().filter(|t| !t.is_empty());
        let user_id = load_optional::<i64>("BIDDING_USER_ID")?;

        info!(
            "{:<12} --> 설정 로드: api={}, poll={:?}, stale={:?}",
            "Config", api_base_url, poll_interval, stale_after
        );

        Ok(Self {
            api_base_url,
            poll_interval,
            stale_after,
            notification_interval,
            request_timeout,
            auth_token,
            user_id,
        })
    }
}
// endregion: --- Client Config

fn load_millis(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    Ok(load_optional::<u64>(key)?
        .map(Duration::from_millis)
        .unwrap_or_else(|| {
            info!("{:<12} --> {} 미설정, 기본값 사용: {:?}", "Config", key, default);
            default
        }))
}

fn load_optional<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}
