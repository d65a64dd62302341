/// 입찰 관련 커맨드 처리
/// 1. 입찰 금액 검증
/// 2. 입찰 요청
/// 3. 서버 결과 반영
// region:    --- Imports
use super::model::{BidAttempt, BidOutcome, BidRejection, SubmissionPhase};
use crate::api::AuctionApi;
use crate::auction::model::PlaceBidRequest;
use crate::cache::AuctionStateCache;
use crate::error::ApiError;
use crate::session::Session;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
// endregion: --- Imports

// 서버가 경매 비활성 상태를 알리는 오류 코드
const INACTIVE_CODES: [&str; 4] = ["NOT_STARTED", "ALREADY_ENDED", "INACTIVE", "INVALID_STATUS"];

// region:    --- In Flight Guard
/// 요청 중 표시
/// future 가 중간에 취소되어도 drop 시 해제된다.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
// endregion: --- In Flight Guard

// region:    --- Bid Submission Controller
/// 입찰 제출 컨트롤러
pub struct BidSubmissionController {
    cache: Arc<AuctionStateCache>,
    api: Arc<dyn AuctionApi>,
    session: Arc<dyn Session>,
    in_flight: AtomicBool,
    phase_tx: watch::Sender<SubmissionPhase>,
    attempt_tx: watch::Sender<Option<BidAttempt>>,
}

impl BidSubmissionController {
    pub fn new(
        cache: Arc<AuctionStateCache>,
        api: Arc<dyn AuctionApi>,
        session: Arc<dyn Session>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SubmissionPhase::Idle);
        let (attempt_tx, _) = watch::channel(None);
        Self {
            cache,
            api,
            session,
            in_flight: AtomicBool::new(false),
            phase_tx,
            attempt_tx,
        }
    }

    /// 진행 단계 구독
    pub fn subscribe_phase(&self) -> watch::Receiver<SubmissionPhase> {
        self.phase_tx.subscribe()
    }

    pub fn phase(&self) -> SubmissionPhase {
        *self.phase_tx.borrow()
    }

    /// 마지막 입찰 시도 구독
    /// 서버 응답을 기다리는 동안 결과는 Pending 이다.
    pub fn subscribe_attempt(&self) -> watch::Receiver<Option<BidAttempt>> {
        self.attempt_tx.subscribe()
    }

    pub fn last_attempt(&self) -> Option<BidAttempt> {
        self.attempt_tx.borrow().clone()
    }

    /// 입찰 처리 중 여부 (중복 제출 방지)
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 결과 표시 후 대기 상태로 복귀
    pub fn acknowledge(&self) {
        if !self.is_submitting() {
            self.set_phase(SubmissionPhase::Idle);
        }
    }

    /// 1. 입찰 (숫자 금액)
    pub async fn submit_bid(&self, amount: i64) -> BidAttempt {
        self.submit(Ok(amount)).await
    }

    /// 1. 입찰 (사용자 입력 문자열)
    pub async fn submit_bid_input(&self, input: &str) -> BidAttempt {
        self.submit(parse_amount(input)).await
    }

    async fn submit(&self, amount: Result<i64, BidRejection>) -> BidAttempt {
        let auction_id = self.cache.auction_id();
        let submitted_at = Utc::now();
        let candidate_amount = amount.as_ref().ok().copied();

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!(
                "{:<12} --> 이전 입찰 처리 중, 중복 제출 무시 auction: {}",
                "Bid", auction_id
            );
            return BidAttempt {
                auction_id,
                candidate_amount,
                submitted_at,
                outcome: BidOutcome::Rejected(BidRejection::SubmissionInProgress),
            };
        };

        self.set_phase(SubmissionPhase::Validating);
        let validated =
            amount.and_then(|amount| self.validate(amount).map(|minimum| (amount, minimum)));
        let outcome = match validated {
            Err(rejection) => {
                info!(
                    "{:<12} --> 입찰 사전 검증 실패 auction: {}, {}",
                    "Bid", auction_id, rejection
                );
                BidOutcome::Rejected(rejection)
            }
            Ok((amount, minimum)) => {
                self.set_phase(SubmissionPhase::Submitting);
                self.publish_attempt(BidAttempt {
                    auction_id,
                    candidate_amount,
                    submitted_at,
                    outcome: BidOutcome::Pending,
                });
                self.send(amount, minimum).await
            }
        };

        self.set_phase(match outcome {
            BidOutcome::Accepted(_) => SubmissionPhase::Accepted,
            _ => SubmissionPhase::Rejected,
        });

        let attempt = BidAttempt {
            auction_id,
            candidate_amount,
            submitted_at,
            outcome,
        };
        self.publish_attempt(attempt.clone());
        attempt
    }

    /// 캐시의 최신 상태로 입찰 금액 검증
    /// 통과하면 검증에 사용한 최소 입찰가를 반환한다.
    fn validate(&self, amount: i64) -> Result<i64, BidRejection> {
        if amount <= 0 {
            return Err(BidRejection::InvalidAmount {
                input: amount.to_string(),
            });
        }

        let state = self.cache.current();
        let snapshot = state.snapshot.ok_or(BidRejection::NotLoaded)?;

        if !snapshot.is_active {
            return Err(BidRejection::AuctionInactive);
        }

        if let (Some(user_id), Some(seller_id)) = (self.session.user_id(), snapshot.seller_id) {
            if user_id == seller_id {
                return Err(BidRejection::OwnAuction);
            }
        }

        let minimum = snapshot.minimum_bid();
        if amount < minimum {
            return Err(BidRejection::BelowMinimum { minimum });
        }

        Ok(minimum)
    }

    /// 2. 입찰 요청
    async fn send(&self, amount: i64, minimum: i64) -> BidOutcome {
        let request = PlaceBidRequest {
            auction_id: self.cache.auction_id(),
            bid_amount: amount,
        };

        match self.api.place_bid(request).await {
            Ok(bid) => {
                info!(
                    "{:<12} --> 입찰 성공 auction: {}, 금액: {}",
                    "Bid", bid.auction_id, bid.bid_amount
                );
                // 현재가는 서버 재조회 결과로만 반영
                self.reconcile().await;
                BidOutcome::Accepted(bid)
            }
            Err(error) => {
                info!("{:<12} --> 입찰 거절: {}", "Bid", error);
                BidOutcome::Rejected(self.reject(error, minimum).await)
            }
        }
    }

    /// 3. 서버 오류를 거절 사유로 변환
    async fn reject(&self, error: ApiError, minimum: i64) -> BidRejection {
        match error {
            ApiError::BadRequest { code, .. }
                if code
                    .as_deref()
                    .is_some_and(|code| INACTIVE_CODES.contains(&code)) =>
            {
                self.reconcile().await;
                BidRejection::AuctionInactive
            }
            ApiError::BadRequest { .. } => {
                self.reconcile().await;
                let minimum = self.cache.current().minimum_bid().unwrap_or(minimum);
                BidRejection::BelowMinimum { minimum }
            }
            ApiError::Unauthorized => BidRejection::Unauthenticated,
            ApiError::Forbidden { .. } => BidRejection::OwnAuction,
            ApiError::Conflict { .. } => {
                self.reconcile().await;
                BidRejection::Outbid
            }
            other => BidRejection::Unavailable {
                retryable: other.is_retryable(),
                message: other.to_string(),
            },
        }
    }

    /// 서버 상태로 캐시 재조회
    async fn reconcile(&self) {
        if self.cache.is_detached() {
            debug!("{:<12} --> 화면 해제됨, 재조회 생략", "Bid");
            return;
        }
        if let Err(e) = self.cache.refresh().await {
            warn!("{:<12} --> 입찰 후 재조회 실패: {}", "Bid", e);
        }
    }

    fn set_phase(&self, phase: SubmissionPhase) {
        // 화면 해제 이후에는 상태를 갱신하지 않는다
        if self.cache.is_detached() {
            return;
        }
        self.phase_tx.send_replace(phase);
    }

    fn publish_attempt(&self, attempt: BidAttempt) {
        if self.cache.is_detached() {
            return;
        }
        self.attempt_tx.send_replace(Some(attempt));
    }
}
// endregion: --- Bid Submission Controller

// region:    --- Amount Parsing
/// 사용자 입력을 입찰 금액으로 변환 ("12,000" 허용)
pub fn parse_amount(input: &str) -> Result<i64, BidRejection> {
    let normalized: String = input.trim().chars().filter(|c| *c != ',').collect();
    match normalized.parse::<i64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(BidRejection::InvalidAmount {
            input: input.to_string(),
        }),
    }
}
// endregion: --- Amount Parsing

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grouped_amounts() {
        assert_eq!(parse_amount(" 12,000 "), Ok(12000));
        assert_eq!(parse_amount("110"), Ok(110));
    }

    #[test]
    fn rejects_non_numeric_and_non_positive_input() {
        for input in ["", "abc", "0", "-5", "10.5"] {
            assert!(
                matches!(parse_amount(input), Err(BidRejection::InvalidAmount { .. })),
                "입력: {input}"
            );
        }
    }

    #[test]
    fn guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _guard = InFlightGuard::acquire(&flag).expect("first acquire");
            assert!(InFlightGuard::acquire(&flag).is_none());
        }
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
