/// 경매 상태 캐시
/// 하나의 경매에 대한 가격/활성 상태와 입찰 이력을 보관한다.
/// 서버 응답으로 통째로 교체될 뿐, 클라이언트가 가격을 계산해 넣지 않는다.
// region:    --- Imports
use crate::api::AuctionApi;
use crate::auction::model::{sort_bid_history, AuctionSnapshot, Bid};
use crate::error::{ApiError, CacheError};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod poller;

// endregion: --- Imports

// region:    --- Cache State
/// 마지막 갱신 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    // 최초 조회 전
    Loading,
    Ready,
    // 이전 스냅샷은 그대로 유지된다
    Failed { error: ApiError, retryable: bool },
}

/// 화면 조각들이 공유하는 캐시 상태
#[derive(Debug, Clone, PartialEq)]
pub struct CacheState {
    pub snapshot: Option<AuctionSnapshot>,
    pub bids: Vec<Bid>,
    pub status: RefreshStatus,
    /// 성공한 갱신 횟수
    pub revision: u64,
}

impl CacheState {
    fn loading() -> Self {
        Self {
            snapshot: None,
            bids: Vec::new(),
            status: RefreshStatus::Loading,
            revision: 0,
        }
    }

    pub fn minimum_bid(&self) -> Option<i64> {
        self.snapshot.as_ref().map(AuctionSnapshot::minimum_bid)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }
}
// endregion: --- Cache State

// region:    --- Auction State Cache
struct CacheControl {
    detached: bool,
    last_success: Option<Instant>,
}

/// 경매 상태 캐시
pub struct AuctionStateCache {
    auction_id: i64,
    api: Arc<dyn AuctionApi>,
    stale_after: Duration,
    state_tx: watch::Sender<CacheState>,
    control: Mutex<CacheControl>,
}

impl AuctionStateCache {
    pub fn new(auction_id: i64, api: Arc<dyn AuctionApi>, stale_after: Duration) -> Self {
        let (state_tx, _) = watch::channel(CacheState::loading());
        Self {
            auction_id,
            api,
            stale_after,
            state_tx,
            control: Mutex::new(CacheControl {
                detached: false,
                last_success: None,
            }),
        }
    }

    pub fn auction_id(&self) -> i64 {
        self.auction_id
    }

    /// 상태 구독
    pub fn subscribe(&self) -> watch::Receiver<CacheState> {
        self.state_tx.subscribe()
    }

    /// 현재 상태 복사본
    pub fn current(&self) -> CacheState {
        self.state_tx.borrow().clone()
    }

    pub fn is_detached(&self) -> bool {
        self.lock_control().detached
    }

    /// 캐시 해제
    /// 이후 도착하는 응답은 모두 버려진다.
    pub fn close(&self) {
        let mut control = self.lock_control();
        if !control.detached {
            control.detached = true;
            info!("{:<12} --> 경매 캐시 해제 id: {}", "Cache", self.auction_id);
        }
    }

    /// 경매 상태와 입찰 이력을 다시 조회해 통째로 교체
    pub async fn refresh(&self) -> Result<CacheState, CacheError> {
        if self.is_detached() {
            return Err(CacheError::Detached);
        }
        debug!("{:<12} --> 경매 상태 갱신 id: {}", "Cache", self.auction_id);

        let result = tokio::try_join!(
            self.api.get_auction(self.auction_id),
            self.api.get_auction_bids(self.auction_id)
        );

        // 응답 반영은 해제 여부 확인과 같은 잠금 안에서 수행
        let mut control = self.lock_control();
        if control.detached {
            debug!(
                "{:<12} --> 해제된 캐시의 응답 폐기 id: {}",
                "Cache", self.auction_id
            );
            return Err(CacheError::Detached);
        }

        match result {
            Ok((auction, mut bids)) => {
                sort_bid_history(&mut bids);
                let snapshot = AuctionSnapshot::from_auction(auction, Utc::now());
                control.last_success = Some(Instant::now());
                self.state_tx.send_modify(|state| {
                    state.snapshot = Some(snapshot);
                    state.bids = bids;
                    state.status = RefreshStatus::Ready;
                    state.revision += 1;
                });
                Ok(self.state_tx.borrow().clone())
            }
            Err(error) => {
                warn!(
                    "{:<12} --> 경매 상태 갱신 실패 id: {}, {}",
                    "Cache", self.auction_id, error
                );
                let retryable = error.is_retryable();
                self.state_tx.send_modify(|state| {
                    state.status = RefreshStatus::Failed {
                        error: error.clone(),
                        retryable,
                    };
                });
                Err(CacheError::Api(error))
            }
        }
    }

    /// 최근 갱신 결과가 충분히 새로우면 네트워크 조회 없이 반환
    pub async fn refresh_if_stale(&self) -> Result<CacheState, CacheError> {
        let fresh = {
            let control = self.lock_control();
            if control.detached {
                return Err(CacheError::Detached);
            }
            control
                .last_success
                .map(|at| at.elapsed() < self.stale_after)
                .unwrap_or(false)
        };

        if fresh {
            return Ok(self.current());
        }
        self.refresh().await
    }

    fn lock_control(&self) -> MutexGuard<'_, CacheControl> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
// endregion: --- Auction State Cache
