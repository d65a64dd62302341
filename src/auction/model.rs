use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 경매 모델 (GET auction/{id})
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub current_price: i64,
    pub bid_increment: i64,
    pub is_active: bool,
    #[serde(default)]
    pub seller_id: Option<i64>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

/// 캐시에 보관되는 경매 스냅샷
/// current_price 는 서버 응답으로만 갱신된다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    pub auction_id: i64,
    pub current_price: i64,
    pub bid_increment: i64,
    pub is_active: bool,
    pub seller_id: Option<i64>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_refreshed_at: DateTime<Utc>,
}

impl AuctionSnapshot {
    pub fn from_auction(auction: Auction, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            auction_id: auction.id,
            current_price: auction.current_price,
            bid_increment: auction.bid_increment,
            is_active: auction.is_active,
            seller_id: auction.seller_id,
            end_time: auction.end_time,
            last_refreshed_at: refreshed_at,
        }
    }

    /// 다음 입찰의 최소 금액 (현재가 + 입찰 단위)
    /// 입찰 단위가 0 이하여도 현재가와 같은 금액은 허용하지 않는다.
    pub fn minimum_bid(&self) -> i64 {
        self.current_price.saturating_add(self.bid_increment.max(1))
    }
}

// 입찰 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    pub bid_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// 입찰 이력 정렬 (최신순)
/// 서버 정렬 순서는 신뢰하지 않는다.
pub fn sort_bid_history(bids: &mut [Bid]) {
    bids.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

// 입찰 요청 바디 (POST bid)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidRequest {
    pub auction_id: i64,
    pub bid_amount: i64,
}

// 자동 입찰 상한 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoBidCeiling {
    pub id: i64,
    pub auction_id: i64,
    pub user_id: i64,
    pub max_bid: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 자동 입찰 생성 요청 (POST autobid)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAutoBidRequest {
    pub auction_id: i64,
    pub max_bid: i64,
}

// 자동 입찰 수정 요청 (PUT autobid/{id})
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAutoBidRequest {
    pub max_bid: i64,
}
