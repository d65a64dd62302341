/// 경매 상태 조회
pub fn auction(auction_id: i64) -> String {
    format!("/auction/{auction_id}")
}

/// 입찰 이력 조회
pub fn auction_bids(auction_id: i64) -> String {
    format!("/auction/{auction_id}/bids")
}

/// 입찰
pub const BID: &str = "/bid";

/// 자동 입찰 생성
pub const AUTO_BID: &str = "/autobid";

/// 자동 입찰 수정/삭제
pub fn auto_bid(ceiling_id: i64) -> String {
    format!("/autobid/{ceiling_id}")
}

/// 경매별 자동 입찰 조회
pub fn auction_auto_bid(auction_id: i64) -> String {
    format!("/autobid/auction/{auction_id}")
}

/// 알림 목록 조회
pub const NOTIFICATIONS: &str = "/notification";
