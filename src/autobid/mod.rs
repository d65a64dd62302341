/// 자동 입찰 상한 관리
/// 상한 레코드의 생성/수정/삭제만 담당하며, 실제 자동 입찰은 서버가 수행한다.
// region:    --- Imports
use crate::api::AuctionApi;
use crate::auction::model::{AutoBidCeiling, CreateAutoBidRequest, UpdateAutoBidRequest};
use crate::cache::AuctionStateCache;
use crate::error::ApiError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Auto Bid Error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutoBidError {
    #[error("최대 입찰가는 현재 가격보다 입찰 단위 이상 높아야 합니다. 최소: {minimum}")]
    BelowMinimum { minimum: i64 },

    #[error("진행 중인 경매가 아닙니다.")]
    AuctionInactive,

    #[error("경매 정보를 아직 불러오지 못했습니다.")]
    NotLoaded,

    // 이미 상한이 있으면 수정으로 처리해야 한다
    #[error("이미 자동 입찰이 설정되어 있습니다.")]
    AlreadyExists,

    #[error("자동 입찰 설정을 찾을 수 없습니다.")]
    NotFound,

    #[error("로그인이 필요합니다.")]
    Unauthenticated,

    #[error("자동 입찰 요청 실패: {0}")]
    Api(ApiError),
}

impl From<ApiError> for AutoBidError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Conflict { .. } => AutoBidError::AlreadyExists,
            ApiError::NotFound => AutoBidError::NotFound,
            ApiError::Unauthorized => AutoBidError::Unauthenticated,
            other => AutoBidError::Api(other),
        }
    }
}
// endregion: --- Auto Bid Error

// region:    --- Auto Bid Controller
pub struct AutoBidController {
    cache: Arc<AuctionStateCache>,
    api: Arc<dyn AuctionApi>,
    ceiling_tx: watch::Sender<Option<AutoBidCeiling>>,
}

impl AutoBidController {
    pub fn new(cache: Arc<AuctionStateCache>, api: Arc<dyn AuctionApi>) -> Self {
        let (ceiling_tx, _) = watch::channel(None);
        Self {
            cache,
            api,
            ceiling_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AutoBidCeiling>> {
        self.ceiling_tx.subscribe()
    }

    pub fn current(&self) -> Option<AutoBidCeiling> {
        self.ceiling_tx.borrow().clone()
    }

    /// 기존 상한 조회
    pub async fn load(&self) -> Result<Option<AutoBidCeiling>, AutoBidError> {
        let ceiling = self.api.get_auto_bid(self.cache.auction_id()).await?;
        self.publish(ceiling.clone());
        Ok(ceiling)
    }

    /// 상한 생성
    pub async fn create(&self, max_bid: i64) -> Result<AutoBidCeiling, AutoBidError> {
        self.validate(max_bid)?;
        let request = CreateAutoBidRequest {
            auction_id: self.cache.auction_id(),
            max_bid,
        };
        let ceiling = self.api.create_auto_bid(request).await.map_err(|e| {
            warn!("{:<12} --> 자동 입찰 생성 실패: {}", "AutoBid", e);
            AutoBidError::from(e)
        })?;
        info!(
            "{:<12} --> 자동 입찰 생성 id: {}, 상한: {}",
            "AutoBid", ceiling.id, ceiling.max_bid
        );
        self.publish(Some(ceiling.clone()));
        Ok(ceiling)
    }

    /// 상한 수정 (통째로 교체)
    pub async fn update(
        &self,
        ceiling_id: i64,
        max_bid: i64,
    ) -> Result<AutoBidCeiling, AutoBidError> {
        self.validate(max_bid)?;
        let ceiling = self
            .api
            .update_auto_bid(ceiling_id, UpdateAutoBidRequest { max_bid })
            .await?;
        info!(
            "{:<12} --> 자동 입찰 수정 id: {}, 상한: {}",
            "AutoBid", ceiling.id, ceiling.max_bid
        );
        self.publish(Some(ceiling.clone()));
        Ok(ceiling)
    }

    /// 상한 삭제
    pub async fn delete(&self, ceiling_id: i64) -> Result<(), AutoBidError> {
        self.api.delete_auto_bid(ceiling_id).await?;
        info!("{:<12} --> 자동 입찰 삭제 id: {}", "AutoBid", ceiling_id);
        self.publish(None);
        Ok(())
    }

    fn validate(&self, max_bid: i64) -> Result<(), AutoBidError> {
        let snapshot = self
            .cache
            .current()
            .snapshot
            .ok_or(AutoBidError::NotLoaded)?;
        if !snapshot.is_active {
            return Err(AutoBidError::AuctionInactive);
        }
        let minimum = snapshot.minimum_bid();
        if max_bid < minimum {
            return Err(AutoBidError::BelowMinimum { minimum });
        }
        Ok(())
    }

    fn publish(&self, ceiling: Option<AutoBidCeiling>) {
        if self.cache.is_detached() {
            return;
        }
        self.ceiling_tx.send_replace(ceiling);
    }
}
// endregion: --- Auto Bid Controller
