use crate::calendar::MonthCursor;
use crate::counts::RemoteCounts;
use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::persist_counts;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    NotConfigured,
    Superseded,
    Merged { days: usize, plays: u64 },
}

/// Fetches `cursor` from the scrobble service and folds it into the store.
pub async fn refresh_month(state: &AppState, cursor: MonthCursor) -> Result<RefreshOutcome, AppError> {
    let Some(credentials) = state.config.credentials() else {
        debug!("scrobble account not configured; skipping fetch");
        return Ok(RefreshOutcome::NotConfigured);
    };

    let generation = state.begin_fetch();
    let remote = state.fetcher.fetch_month_or_empty(&credentials, cursor).await;
    apply_remote(state, generation, cursor, remote).await
}

pub async fn apply_remote(
    state: &AppState,
    generation: u64,
    cursor: MonthCursor,
    remote: RemoteCounts,
) -> Result<RefreshOutcome, AppError> {
    if !state.is_current_fetch(generation) {
        debug!(generation, month = %cursor.title(), "dropping superseded fetch result");
        return Ok(RefreshOutcome::Superseded);
    }

    let days = remote.len();
    let plays = remote.values().copied().fold(0u64, u64::saturating_add);
    if days == 0 {
        return Ok(RefreshOutcome::Merged { days, plays });
    }

    let mut counts = state.counts.lock().await;
    counts.merge(remote);
    if counts.is_dirty() {
        persist_counts(&state.counts_path, &mut counts).await?;
    }
    info!(
        month = %cursor.title(),
        days,
        plays,
        month_total = counts.total_in_month(cursor),
        "merged scrobbles"
    );
    Ok(RefreshOutcome::Merged { days, plays })
}

/// Fire-and-forget refresh used by navigation.
pub fn spawn_refresh(state: &AppState, cursor: MonthCursor) -> bool {
    if state.config.credentials().is_none() {
        return false;
    }
    let state = state.clone();
    tokio::spawn(async move {
        if let Err(err) = refresh_month(&state, cursor).await {
            error!("failed to store scrobbles: {}", err.message);
        }
    });
    true
}

/// Refreshes the displayed month right away and then every `period`.
pub fn spawn_refresh_timer(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let cursor = *state.cursor.lock().await;
            if let Err(err) = refresh_month(&state, cursor).await {
                error!("failed to store scrobbles: {}", err.message);
            }
        }
    })
}
