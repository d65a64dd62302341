/// 경매 상세 화면 수명 관리
/// 진입 시 캐시와 폴링을 시작하고, 이탈 시 모든 작업을 멈추고 이후 응답을 버린다.
// region:    --- Imports
use crate::api::AuctionApi;
use crate::autobid::AutoBidController;
use crate::bidding::commands::BidSubmissionController;
use crate::cache::poller::{refresh_channel, spawn_poller, RefreshHandle, RefreshReason};
use crate::cache::{AuctionStateCache, CacheState, RefreshStatus};
use crate::config::ClientConfig;
use crate::error::CacheError;
use crate::notification::NotificationRelay;
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

// endregion: --- Imports

// region:    --- Auction Detail
pub struct AuctionDetail {
    cache: Arc<AuctionStateCache>,
    bids: Arc<BidSubmissionController>,
    autobid: Arc<AutoBidController>,
    refresh: RefreshHandle,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl AuctionDetail {
    /// 화면 진입
    /// tokio 런타임 안에서 호출해야 한다.
    pub fn mount(
        api: Arc<dyn AuctionApi>,
        session: Arc<dyn Session>,
        config: &ClientConfig,
        auction_id: i64,
    ) -> Self {
        info!("{:<12} --> 경매 상세 진입 id: {}", "Detail", auction_id);
        let cache = Arc::new(AuctionStateCache::new(
            auction_id,
            Arc::clone(&api),
            config.stale_after,
        ));
        let bids = Arc::new(BidSubmissionController::new(
            Arc::clone(&cache),
            Arc::clone(&api),
            session,
        ));
        let autobid = Arc::new(AutoBidController::new(Arc::clone(&cache), Arc::clone(&api)));

        let cancel = CancellationToken::new();
        let (refresh, triggers) = refresh_channel();
        let mut tasks = vec![spawn_poller(
            Arc::clone(&cache),
            config.poll_interval,
            triggers,
            cancel.clone(),
        )];

        if let Some(period) = config.notification_interval {
            let relay = Arc::new(NotificationRelay::new(auction_id, api, refresh.clone()));
            tasks.push(relay.spawn(period, cancel.clone()));
        }

        Self {
            cache,
            bids,
            autobid,
            refresh,
            cancel,
            tasks,
        }
    }

    pub fn auction_id(&self) -> i64 {
        self.cache.auction_id()
    }

    /// 가격 표시, 입찰 폼, 입찰 이력이 같은 상태를 구독한다
    pub fn subscribe(&self) -> watch::Receiver<CacheState> {
        self.cache.subscribe()
    }

    pub fn current(&self) -> CacheState {
        self.cache.current()
    }

    pub fn cache(&self) -> &Arc<AuctionStateCache> {
        &self.cache
    }

    pub fn bids(&self) -> &Arc<BidSubmissionController> {
        &self.bids
    }

    pub fn autobid(&self) -> &Arc<AutoBidController> {
        &self.autobid
    }

    /// 폴링 주기와 별개로 갱신 요청
    /// 마지막 조회가 stale_after 이내면 네트워크 조회 없이 넘어간다.
    pub fn request_refresh(&self) -> bool {
        self.refresh.request(RefreshReason::Manual)
    }

    /// 최초 조회가 끝날 때까지 대기 (성공 또는 실패)
    pub async fn loaded(&self) -> Result<CacheState, CacheError> {
        let mut rx = self.cache.subscribe();
        let state = rx
            .wait_for(|state| state.status != RefreshStatus::Loading)
            .await
            .map_err(|_| CacheError::Detached)?;
        Ok(state.clone())
    }

    /// 화면 이탈
    pub async fn unmount(mut self) {
        self.shutdown();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        info!("{:<12} --> 경매 상세 이탈 id: {}", "Detail", self.cache.auction_id());
    }

    fn shutdown(&self) {
        self.cancel.cancel();
        self.cache.close();
    }
}

impl Drop for AuctionDetail {
    fn drop(&mut self) {
        self.shutdown();
    }
}
// endregion: --- Auction Detail
