// region:    --- Imports
use serde::Deserialize;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Api Error
/// 원격 API 호출 오류
/// 상태 코드별로 분류해 상위 계층이 다음 행동을 결정할 수 있게 한다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("로그인이 필요합니다.")]
    Unauthorized,

    #[error("권한이 없습니다: {message}")]
    Forbidden { message: String },

    #[error("요청한 리소스를 찾을 수 없습니다.")]
    NotFound,

    #[error("요청이 충돌했습니다: {message}")]
    Conflict { message: String },

    #[error("잘못된 요청입니다: {message}")]
    BadRequest {
        code: Option<String>,
        message: String,
    },

    #[error("서버 오류({status}): {message}")]
    Server { status: u16, message: String },

    #[error("네트워크 오류: {0}")]
    Network(String),

    #[error("응답 해석 실패: {0}")]
    Decode(String),
}

/// 백엔드 오류 바디 ({"error": ..., "code": ...})
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ApiError {
    /// 실패 응답을 오류로 변환
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            400 | 422 => ApiError::BadRequest {
                code: parsed.code,
                message,
            },
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden { message },
            404 => ApiError::NotFound,
            409 => ApiError::Conflict { message },
            _ => ApiError::Server { status, message },
        }
    }

    /// 다음 주기에 재시도할 수 있는 오류인지 여부
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Server { .. } | ApiError::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
// endregion: --- Api Error

// region:    --- Cache Error
/// 경매 상태 캐시 오류
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("경매 상태 갱신 실패: {0}")]
    Api(#[from] ApiError),

    #[error("경매 화면이 이미 닫혔습니다.")]
    Detached,
}
// endregion: --- Cache Error
