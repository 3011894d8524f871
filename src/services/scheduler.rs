use std::time::Duration;

use tokio::time::sleep;

use crate::state::AppState;

/// Background loop that keeps the ledger honest: pending payments whose due
/// date has passed become overdue. Each sweep runs in its own `tokio::spawn`
/// so a slow or failing sweep never stalls the loop.
pub async fn run_background_scheduler(state: AppState) {
    if !state.config.overdue_sweep_enabled {
        tracing::info!("Overdue sweep disabled, scheduler not starting");
        return;
    }

    let interval = Duration::from_secs(state.config.overdue_sweep_interval_seconds.max(60));
    tracing::info!(
        interval_seconds = interval.as_secs(),
        "Background scheduler started"
    );

    loop {
        sleep(interval).await;

        let pool = state.db_pool.clone();
        tokio::spawn(async move {
            match crate::services::ledger::sweep_overdue(&pool).await {
                Ok(0) => {}
                Ok(count) => {
                    tracing::info!(count, "Scheduler: marked past-due payments overdue");
                }
                Err(error) => {
                    tracing::warn!(%error, "Scheduler: overdue sweep failed");
                }
            }
        });
    }
}
