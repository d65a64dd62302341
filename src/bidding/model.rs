use crate::auction::model::Bid;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// 입찰 진행 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Submitting,
    Accepted,
    Rejected,
}

impl SubmissionPhase {
    /// 입찰 버튼을 비활성화해야 하는 단계인지 여부
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionPhase::Validating | SubmissionPhase::Submitting)
    }
}

/// 입찰 거절 사유
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BidRejection {
    #[error("입찰 금액은 0보다 큰 숫자여야 합니다: {input}")]
    InvalidAmount { input: String },

    #[error("입찰 금액은 현재 가격보다 입찰 단위 이상 높아야 합니다. 최소 입찰가: {minimum}")]
    BelowMinimum { minimum: i64 },

    #[error("진행 중인 경매가 아닙니다.")]
    AuctionInactive,

    #[error("경매 정보를 아직 불러오지 못했습니다.")]
    NotLoaded,

    #[error("로그인이 필요합니다.")]
    Unauthenticated,

    #[error("자신의 경매에는 입찰할 수 없습니다.")]
    OwnAuction,

    #[error("다른 사용자가 먼저 입찰했습니다. 다시 시도해 주세요.")]
    Outbid,

    #[error("이전 입찰을 처리하고 있습니다.")]
    SubmissionInProgress,

    #[error("입찰을 처리하지 못했습니다: {message}")]
    Unavailable { message: String, retryable: bool },
}

/// 거절 이후 화면이 취할 행동
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Login,
    CorrectAmount,
    Refresh,
    Retry,
    Wait,
    None,
}

impl BidRejection {
    pub fn next_action(&self) -> NextAction {
        match self {
            BidRejection::Unauthenticated => NextAction::Login,
            BidRejection::InvalidAmount { .. } | BidRejection::BelowMinimum { .. } => {
                NextAction::CorrectAmount
            }
            BidRejection::Outbid | BidRejection::NotLoaded => NextAction::Refresh,
            BidRejection::SubmissionInProgress => NextAction::Wait,
            BidRejection::Unavailable {
                retryable: true, ..
            } => NextAction::Retry,
            BidRejection::AuctionInactive
            | BidRejection::OwnAuction
            | BidRejection::Unavailable { .. } => NextAction::None,
        }
    }
}

/// 입찰 결과
#[derive(Debug, Clone, PartialEq)]
pub enum BidOutcome {
    Pending,
    Accepted(Bid),
    Rejected(BidRejection),
}

impl BidOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BidOutcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<&BidRejection> {
        match self {
            BidOutcome::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    pub fn is_rejected_too_low(&self) -> bool {
        matches!(self.rejection(), Some(BidRejection::BelowMinimum { .. }))
    }

    pub fn is_rejected_inactive(&self) -> bool {
        matches!(self.rejection(), Some(BidRejection::AuctionInactive))
    }

    pub fn is_rejected_conflict(&self) -> bool {
        matches!(self.rejection(), Some(BidRejection::Outbid))
    }

    pub fn is_rejected_unauthorized(&self) -> bool {
        matches!(self.rejection(), Some(BidRejection::Unauthenticated))
    }
}

/// 입찰 시도 기록
/// 화면에 결과를 보여준 뒤 버려지며 저장하지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct BidAttempt {
    pub auction_id: i64,
    /// 숫자로 해석되지 않은 입력이면 None
    pub candidate_amount: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub outcome: BidOutcome,
}
