/// 알림 중계
/// 알림 목록을 주기적으로 조회해, 보고 있는 경매에 관한 알림이 오면 캐시 갱신을 요청한다.
// region:    --- Imports
use crate::api::AuctionApi;
use crate::auction::events::{Notification, NotificationKind};
use crate::cache::poller::{RefreshHandle, RefreshReason};
use crate::error::ApiError;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Notification Relay
pub struct NotificationRelay {
    auction_id: i64,
    api: Arc<dyn AuctionApi>,
    refresh: RefreshHandle,
    // 마지막으로 확인한 알림 id, 최초 조회 전이면 None
    last_seen: Mutex<Option<i64>>,
}

impl NotificationRelay {
    pub fn new(auction_id: i64, api: Arc<dyn AuctionApi>, refresh: RefreshHandle) -> Self {
        Self {
            auction_id,
            api,
            refresh,
            last_seen: Mutex::new(None),
        }
    }

    /// 새 알림 조회 후 처리
    /// 최초 조회는 기준 id 만 기록하고 지난 알림을 다시 처리하지 않는다.
    pub async fn poll_once(&self) -> Result<Vec<Notification>, ApiError> {
        let notifications = self.api.get_notifications().await?;
        let newest = notifications.iter().map(|n| n.id).max();

        let previous = {
            let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = *last_seen;
            *last_seen = match (previous, newest) {
                (Some(prev), Some(newest)) => Some(prev.max(newest)),
                (prev, newest) => prev.or(newest).or(Some(0)),
            };
            previous
        };

        let Some(previous) = previous else {
            debug!(
                "{:<12} --> 알림 기준 id 기록: {:?}",
                "Notification", newest
            );
            return Ok(Vec::new());
        };

        let relevant: Vec<Notification> = notifications
            .into_iter()
            .filter(|n| n.id > previous)
            .filter(|n| n.auction_id == Some(self.auction_id))
            .filter(|n| n.kind.affects_auction_state())
            .collect();

        for notification in &relevant {
            self.process(notification);
        }
        Ok(relevant)
    }

    fn process(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::BidOutbid => {
                info!("{:<12} --> 상위 입찰 알림 id: {}", "Notification", notification.id)
            }
            NotificationKind::AuctionEnded => {
                info!("{:<12} --> 경매 종료 알림 id: {}", "Notification", notification.id)
            }
            NotificationKind::AuctionWon => {
                info!("{:<12} --> 낙찰 알림 id: {}", "Notification", notification.id)
            }
            NotificationKind::Other => return,
        }
        if !self
            .refresh
            .request(RefreshReason::Notification(notification.kind))
        {
            debug!("{:<12} --> 폴러 종료됨, 갱신 요청 생략", "Notification");
        }
    }

    /// 알림 중계 시작
    pub fn spawn(self: Arc<Self>, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    result = self.poll_once() => result,
                };
                if let Err(e) = result {
                    warn!("{:<12} --> 알림 조회 실패: {}", "Notification", e);
                }
            }
            info!("{:<12} --> 알림 중계 종료 id: {}", "Notification", self.auction_id);
        })
    }
}
// endregion: --- Notification Relay
