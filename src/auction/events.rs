use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    // 상위 입찰 발생
    BidOutbid,
    // 경매 종료
    AuctionEnded,
    // 낙찰
    AuctionWon,
    #[serde(other)]
    Other,
}

impl NotificationKind {
    /// 경매 상태 갱신이 필요한 알림인지 여부
    pub fn affects_auction_state(&self) -> bool {
        !matches!(self, NotificationKind::Other)
    }
}

// 알림 모델 (GET notification)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub kind: NotificationKind,
    #[serde(default)]
    pub auction_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
