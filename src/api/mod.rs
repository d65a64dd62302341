/// 원격 경매 API
/// 1. 경매 상태/입찰 이력 조회
/// 2. 입찰
/// 3. 자동 입찰 CRUD
/// 4. 알림 조회
// region:    --- Imports
use crate::auction::events::Notification;
use crate::auction::model::{
    Auction, AutoBidCeiling, Bid, CreateAutoBidRequest, PlaceBidRequest, UpdateAutoBidRequest,
};
use crate::error::ApiError;
use crate::session::Session;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub mod routes;

// endregion: --- Imports

// region:    --- Auction Api Trait
/// 경매 API 트레이트
#[async_trait]
pub trait AuctionApi: Send + Sync {
    async fn get_auction(&self, auction_id: i64) -> Result<Auction, ApiError>;

    async fn get_auction_bids(&self, auction_id: i64) -> Result<Vec<Bid>, ApiError>;

    async fn place_bid(&self, request: PlaceBidRequest) -> Result<Bid, ApiError>;

    /// 상한이 없으면 None
    async fn get_auto_bid(&self, auction_id: i64) -> Result<Option<AutoBidCeiling>, ApiError>;

    async fn create_auto_bid(
        &self,
        request: CreateAutoBidRequest,
    ) -> Result<AutoBidCeiling, ApiError>;

    async fn update_auto_bid(
        &self,
        ceiling_id: i64,
        request: UpdateAutoBidRequest,
    ) -> Result<AutoBidCeiling, ApiError>;

    async fn delete_auto_bid(&self, ceiling_id: i64) -> Result<(), ApiError>;

    async fn get_notifications(&self) -> Result<Vec<Notification>, ApiError>;
}
// endregion: --- Auction Api Trait

// region:    --- Http Auction Api
/// reqwest 기반 경매 API 구현체
#[derive(Clone)]
pub struct HttpAuctionApi {
    client: Client,
    base_url: String,
    session: Arc<dyn Session>,
}

impl HttpAuctionApi {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<dyn Session>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("{:<12} --> API 클라이언트 생성: {}", "Api", base_url);
        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 세션 토큰을 요청마다 읽어 인증 헤더로 추가
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.auth_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }
        let body = response.text().await.unwrap_or_default();
        debug!("{:<12} --> 실패 응답: {} {}", "Api", status, body);
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }
}

#[async_trait]
impl AuctionApi for HttpAuctionApi {
    async fn get_auction(&self, auction_id: i64) -> Result<Auction, ApiError> {
        debug!("{:<12} --> 경매 상태 조회 id: {}", "Api", auction_id);
        self.send_json(self.client.get(self.url(&routes::auction(auction_id))))
            .await
    }

    async fn get_auction_bids(&self, auction_id: i64) -> Result<Vec<Bid>, ApiError> {
        debug!("{:<12} --> 입찰 이력 조회 id: {}", "Api", auction_id);
        self.send_json(self.client.get(self.url(&routes::auction_bids(auction_id))))
            .await
    }

    async fn place_bid(&self, request: PlaceBidRequest) -> Result<Bid, ApiError> {
        info!("{:<12} --> 입찰 요청: {:?}", "Api", request);
        self.send_json(self.client.post(self.url(routes::BID)).json(&request))
            .await
    }

    async fn get_auto_bid(&self, auction_id: i64) -> Result<Option<AutoBidCeiling>, ApiError> {
        debug!("{:<12} --> 자동 입찰 조회 auction: {}", "Api", auction_id);
        match self
            .send_json::<Option<AutoBidCeiling>>(
                self.client
                    .get(self.url(&routes::auction_auto_bid(auction_id))),
            )
            .await
        {
            Err(ApiError::NotFound) => Ok(None),
            other => other,
        }
    }

    async fn create_auto_bid(
        &self,
        request: CreateAutoBidRequest,
    ) -> Result<AutoBidCeiling, ApiError> {
        info!("{:<12} --> 자동 입찰 생성: {:?}", "Api", request);
        self.send_json(self.client.post(self.url(routes::AUTO_BID)).json(&request))
            .await
    }

    async fn update_auto_bid(
        &self,
        ceiling_id: i64,
        request: UpdateAutoBidRequest,
    ) -> Result<AutoBidCeiling, ApiError> {
        info!(
            "{:<12} --> 자동 입찰 수정 id: {}, {:?}",
            "Api", ceiling_id, request
        );
        self.send_json(
            self.client
                .put(self.url(&routes::auto_bid(ceiling_id)))
                .json(&request),
        )
        .await
    }

    async fn delete_auto_bid(&self, ceiling_id: i64) -> Result<(), ApiError> {
        info!("{:<12} --> 자동 입찰 삭제 id: {}", "Api", ceiling_id);
        self.send_empty(self.client.delete(self.url(&routes::auto_bid(ceiling_id))))
            .await
    }

    async fn get_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        debug!("{:<12} --> 알림 조회", "Api");
        self.send_json(self.client.get(self.url(routes::NOTIFICATIONS)))
            .await
    }
}
// endregion: --- Http Auction Api
