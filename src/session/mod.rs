/// 인증 세션
/// 토큰을 전역 저장소에서 직접 읽지 않고, 세션 객체를 주입받아 사용한다.
// region:    --- Session Trait
pub trait Session: Send + Sync {
    /// 요청에 실을 인증 토큰
    fn auth_token(&self) -> Option<String>;

    /// 로그인한 사용자 id
    fn user_id(&self) -> Option<i64>;
}
// endregion: --- Session Trait

// region:    --- Sessions
/// 고정 토큰 세션
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: String,
    user_id: Option<i64>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>, user_id: Option<i64>) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }
}

impl Session for StaticSession {
    fn auth_token(&self) -> Option<String> {
        Some(self.token.clone())
    }

    fn user_id(&self) -> Option<i64> {
        self.user_id
    }
}

/// 비로그인 세션
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSession;

impl Session for AnonymousSession {
    fn auth_token(&self) -> Option<String> {
        None
    }

    fn user_id(&self) -> Option<i64> {
        None
    }
}
// endregion: --- Sessions
