/// 경매 상태 폴링
/// 고정 주기 또는 외부 요청(알림 등)에 따라 캐시를 갱신한다.
// region:    --- Imports
use super::AuctionStateCache;
use crate::auction::events::NotificationKind;
use crate::error::CacheError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// endregion: --- Imports

// 대기 중인 갱신 요청은 합쳐지므로 작게 유지
const TRIGGER_CAPACITY: usize = 4;

// region:    --- Refresh Trigger
/// 갱신 요청 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Manual,
    Notification(NotificationKind),
}

/// 폴러에 갱신을 요청하는 핸들
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<RefreshReason>,
}

impl RefreshHandle {
    /// 갱신 요청
    /// 이미 대기 중인 요청이 있으면 합쳐지고, 폴러가 종료되었으면 false
    pub fn request(&self, reason: RefreshReason) -> bool {
        match self.tx.try_send(reason) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("{:<12} --> 갱신 요청 병합: {:?}", "Poller", reason);
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

pub fn refresh_channel() -> (RefreshHandle, mpsc::Receiver<RefreshReason>) {
    let (tx, rx) = mpsc::channel(TRIGGER_CAPACITY);
    (RefreshHandle { tx }, rx)
}
// endregion: --- Refresh Trigger

// region:    --- Poller
/// 폴링 시작
/// 첫 틱은 즉시 실행되므로 화면 진입 시 한 번 조회한다.
pub fn spawn_poller(
    cache: Arc<AuctionStateCache>,
    period: Duration,
    mut triggers: mpsc::Receiver<RefreshReason>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "{:<12} --> 폴링 시작 id: {}, 주기: {:?}",
            "Poller",
            cache.auction_id(),
            period
        );
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // 수동 요청은 최근 조회 결과가 있으면 재사용
            let reuse_fresh = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => false,
                Some(reason) = triggers.recv() => {
                    debug!("{:<12} --> 갱신 요청 수신: {:?}", "Poller", reason);
                    reason == RefreshReason::Manual
                }
            };

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = async {
                    if reuse_fresh {
                        cache.refresh_if_stale().await
                    } else {
                        cache.refresh().await
                    }
                } => result,
            };

            match result {
                Ok(_) => {}
                Err(CacheError::Detached) => break,
                // 다음 주기에 다시 시도
                Err(e) => warn!("{:<12} --> 폴링 갱신 실패: {}", "Poller", e),
            }
        }

        info!("{:<12} --> 폴링 종료 id: {}", "Poller", cache.auction_id());
    })
}
// endregion: --- Poller
