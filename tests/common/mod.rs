#![allow(dead_code)]

use async_trait::async_trait;
use bidding_client::api::AuctionApi;
use bidding_client::auction::events::Notification;
use bidding_client::auction::model::{
    Auction, AuctionSnapshot, AutoBidCeiling, Bid, CreateAutoBidRequest, PlaceBidRequest,
    UpdateAutoBidRequest,
};
use bidding_client::config::ClientConfig;
use bidding_client::detail::AuctionDetail;
use bidding_client::error::ApiError;
use bidding_client::session::{Session, StaticSession};
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const AUCTION_ID: i64 = 7;
pub const SELLER_ID: i64 = 900;
pub const BIDDER_ID: i64 = 1;

/// 트레이싱 초기화
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

pub fn auction(current_price: i64, bid_increment: i64) -> Auction {
    Auction {
        id: AUCTION_ID,
        title: Some("테스트 경매".to_string()),
        current_price,
        bid_increment,
        is_active: true,
        seller_id: Some(SELLER_ID),
        end_time: None,
    }
}

/// 갱신 시각을 제외한 스냅샷 비교
pub fn same_state(a: &AuctionSnapshot, b: &AuctionSnapshot) -> bool {
    AuctionSnapshot {
        last_refreshed_at: b.last_refreshed_at,
        ..a.clone()
    } == *b
}

pub fn session(user_id: i64) -> Arc<dyn Session> {
    Arc::new(StaticSession::new(format!("token-{user_id}"), Some(user_id)))
}

/// 응답을 붙잡아 두는 관문
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// 테스트용 경매 API
/// 서버처럼 입찰 금액을 검증하고 현재가를 올린다.
pub struct FakeApi {
    pub auction: Mutex<Auction>,
    pub bids: Mutex<Vec<Bid>>,
    pub ceiling: Mutex<Option<AutoBidCeiling>>,
    pub notifications: Mutex<Vec<Notification>>,
    /// 다음 입찰 요청에 돌려줄 오류
    pub bid_error: Mutex<Option<ApiError>>,
    /// 조회 요청이 모두 이 오류로 실패
    pub read_error: Mutex<Option<ApiError>>,
    /// 입찰 수락 후 서버가 확정하는 현재가 (동시 입찰 등)
    pub effective_price: Mutex<Option<i64>>,
    pub read_gate: Mutex<Option<Arc<Gate>>>,
    pub bid_gate: Mutex<Option<Arc<Gate>>>,
    pub auto_bid_gate: Mutex<Option<Arc<Gate>>>,
    pub auction_reads: AtomicUsize,
    pub bid_calls: AtomicUsize,
    pub auto_bid_calls: AtomicUsize,
    next_id: AtomicI64,
}

impl FakeApi {
    pub fn new(auction: Auction) -> Arc<Self> {
        Arc::new(Self {
            auction: Mutex::new(auction),
            bids: Mutex::new(Vec::new()),
            ceiling: Mutex::new(None),
            notifications: Mutex::new(Vec::new()),
            bid_error: Mutex::new(None),
            read_error: Mutex::new(None),
            effective_price: Mutex::new(None),
            read_gate: Mutex::new(None),
            bid_gate: Mutex::new(None),
            auto_bid_gate: Mutex::new(None),
            auction_reads: AtomicUsize::new(0),
            bid_calls: AtomicUsize::new(0),
            auto_bid_calls: AtomicUsize::new(0),
            next_id: AtomicI64::new(1),
        })
    }

    pub fn as_api(self: &Arc<Self>) -> Arc<dyn AuctionApi> {
        Arc::clone(self) as Arc<dyn AuctionApi>
    }

    pub fn set_price(&self, current_price: i64) {
        self.auction.lock().unwrap().current_price = current_price;
    }

    pub fn fail_next_bid(&self, error: ApiError) {
        *self.bid_error.lock().unwrap() = Some(error);
    }

    pub fn fail_reads(&self, error: Option<ApiError>) {
        *self.read_error.lock().unwrap() = error;
    }

    pub fn hold_reads(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.read_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn hold_bids(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.bid_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn hold_auto_bids(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.auto_bid_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn reads(&self) -> usize {
        self.auction_reads.load(Ordering::SeqCst)
    }

    pub fn bid_calls(&self) -> usize {
        self.bid_calls.load(Ordering::SeqCst)
    }

    pub fn auto_bid_calls(&self) -> usize {
        self.auto_bid_calls.load(Ordering::SeqCst)
    }

    pub fn push_bid(&self, user_id: i64, amount: i64, minutes_ago: i64) -> Bid {
        let bid = Bid {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            auction_id: AUCTION_ID,
            user_id,
            user_name: format!("user-{user_id}"),
            bid_amount: amount,
            created_at: Utc::now() - ChronoDuration::minutes(minutes_ago),
        };
        self.bids.lock().unwrap().push(bid.clone());
        bid
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn pass(gate: &Mutex<Option<Arc<Gate>>>) {
        let gate = gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

#[async_trait]
impl AuctionApi for FakeApi {
    async fn get_auction(&self, _auction_id: i64) -> Result<Auction, ApiError> {
        self.auction_reads.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.read_gate).await;
        if let Some(error) = self.read_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.auction.lock().unwrap().clone())
    }

    async fn get_auction_bids(&self, _auction_id: i64) -> Result<Vec<Bid>, ApiError> {
        if let Some(error) = self.read_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.bids.lock().unwrap().clone())
    }

    async fn place_bid(&self, request: PlaceBidRequest) -> Result<Bid, ApiError> {
        self.bid_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.bid_gate).await;
        if let Some(error) = self.bid_error.lock().unwrap().take() {
            return Err(error);
        }

        let mut auction = self.auction.lock().unwrap();
        if !auction.is_active {
            return Err(ApiError::BadRequest {
                code: Some("ALREADY_ENDED".to_string()),
                message: "경매가 이미 종료되었습니다.".to_string(),
            });
        }
        // 먼저 들어온 입찰이 이미 같은 금액 이상이면 충돌
        if request.bid_amount <= auction.current_price {
            return Err(ApiError::Conflict {
                message: "다른 입찰이 먼저 처리되었습니다.".to_string(),
            });
        }
        if request.bid_amount < auction.current_price + auction.bid_increment {
            return Err(ApiError::BadRequest {
                code: Some("LOW_BID".to_string()),
                message: "입찰 금액이 현재 가격보다 낮습니다.".to_string(),
            });
        }

        auction.current_price = self
            .effective_price
            .lock()
            .unwrap()
            .unwrap_or(request.bid_amount);
        let bid = Bid {
            id: self.next_id(),
            auction_id: request.auction_id,
            user_id: BIDDER_ID,
            user_name: "bidder".to_string(),
            bid_amount: request.bid_amount,
            created_at: Utc::now(),
        };
        self.bids.lock().unwrap().push(bid.clone());
        Ok(bid)
    }

    async fn get_auto_bid(&self, _auction_id: i64) -> Result<Option<AutoBidCeiling>, ApiError> {
        Ok(self.ceiling.lock().unwrap().clone())
    }

    async fn create_auto_bid(
        &self,
        request: CreateAutoBidRequest,
    ) -> Result<AutoBidCeiling, ApiError> {
        self.auto_bid_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.auto_bid_gate).await;
        let mut ceiling = self.ceiling.lock().unwrap();
        if ceiling.is_some() {
            return Err(ApiError::Conflict {
                message: "이미 자동 입찰이 있습니다.".to_string(),
            });
        }
        let now = Utc::now();
        let created = AutoBidCeiling {
            id: self.next_id(),
            auction_id: request.auction_id,
            user_id: BIDDER_ID,
            max_bid: request.max_bid,
            created_at: now,
            updated_at: now,
        };
        *ceiling = Some(created.clone());
        Ok(created)
    }

    async fn update_auto_bid(
        &self,
        ceiling_id: i64,
        request: UpdateAutoBidRequest,
    ) -> Result<AutoBidCeiling, ApiError> {
        self.auto_bid_calls.fetch_add(1, Ordering::SeqCst);
        let mut ceiling = self.ceiling.lock().unwrap();
        match ceiling.as_mut() {
            Some(existing) if existing.id == ceiling_id => {
                existing.max_bid = request.max_bid;
                existing.updated_at = Utc::now();
                Ok(existing.clone())
            }
            _ => Err(ApiError::NotFound),
        }
    }

    async fn delete_auto_bid(&self, ceiling_id: i64) -> Result<(), ApiError> {
        self.auto_bid_calls.fetch_add(1, Ordering::SeqCst);
        let mut ceiling = self.ceiling.lock().unwrap();
        match ceiling.as_ref() {
            Some(existing) if existing.id == ceiling_id => {
                *ceiling = None;
                Ok(())
            }
            _ => Err(ApiError::NotFound),
        }
    }

    async fn get_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        Ok(self.notifications.lock().unwrap().clone())
    }
}

/// 폴링 주기를 길게 잡아 테스트가 갱신 시점을 직접 제어한다
pub fn quiet_config() -> ClientConfig {
    ClientConfig {
        poll_interval: Duration::from_secs(3600),
        stale_after: Duration::from_secs(2),
        notification_interval: None,
        ..ClientConfig::default()
    }
}

/// 화면 진입 후 최초 조회 완료까지 대기
pub async fn mount(api: &Arc<FakeApi>, user_id: i64) -> AuctionDetail {
    let detail = AuctionDetail::mount(api.as_api(), session(user_id), &quiet_config(), AUCTION_ID);
    detail.loaded().await.expect("최초 조회");
    detail
}
