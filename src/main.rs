// region:    --- Imports
use bidding_client::api::HttpAuctionApi;
use bidding_client::cache::{CacheState, RefreshStatus};
use bidding_client::config::ClientConfig;
use bidding_client::detail::AuctionDetail;
use bidding_client::session::{AnonymousSession, Session, StaticSession};
use std::sync::Arc;
use tracing::{error, info, warn};
// endregion: --- Imports

const USAGE: &str = "usage: bidding-watch <auction-id> [bid-amount]";

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let auction_id: i64 = args.next().ok_or(USAGE)?.parse()?;
    let bid_input = args.next();

    let config = ClientConfig::from_env()?;

    // 세션 주입
    let session: Arc<dyn Session> = match &config.auth_token {
        Some(token) => Arc::new(StaticSession::new(token.clone(), config.user_id)),
        None => {
            warn!("{:<12} --> 인증 토큰 없음, 비로그인으로 실행", "Main");
            Arc::new(AnonymousSession)
        }
    };
    let api = Arc::new(HttpAuctionApi::new(
        config.api_base_url.clone(),
        config.request_timeout,
        Arc::clone(&session),
    )?);

    let detail = AuctionDetail::mount(api, session, &config, auction_id);
    let mut state_rx = detail.subscribe();

    // 입찰 금액이 주어지면 최초 조회 후 한 번 입찰
    if let Some(input) = bid_input {
        detail.loaded().await?;
        let attempt = detail.bids().submit_bid_input(&input).await;
        match attempt.outcome.rejection() {
            None => info!("{:<12} --> 입찰 결과: {:?}", "Main", attempt.outcome),
            Some(rejection) => error!(
                "{:<12} --> 입찰 거절: {} (다음 행동: {:?})",
                "Main",
                rejection,
                rejection.next_action()
            ),
        }
        detail.bids().acknowledge();
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                log_state(&state);
            }
        }
    }

    detail.unmount().await;
    Ok(())
}
// endregion: --- Main

fn log_state(state: &CacheState) {
    match (&state.snapshot, &state.status) {
        (Some(snapshot), RefreshStatus::Ready) => info!(
            "{:<12} --> 현재가: {}, 최소 입찰가: {}, 진행 중: {}, 입찰 수: {}",
            "Main",
            snapshot.current_price,
            snapshot.minimum_bid(),
            snapshot.is_active,
            state.bids.len()
        ),
        (_, RefreshStatus::Failed { error, retryable }) => warn!(
            "{:<12} --> 갱신 실패 (재시도 가능: {}): {}",
            "Main", retryable, error
        ),
        _ => {}
    }
}
