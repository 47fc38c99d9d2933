use crate::blockchain::scanner::Scanner;
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Run one round for every subscribed address, one address at a time.
/// A failing address is logged and never stops the others.
pub async fn scan_all_accounts(scanner: &Scanner) -> usize {
    let addresses = scanner.store().addresses();
    if addresses.is_empty() {
        debug!("No subscribed accounts to scan");
        return 0;
    }

    let mut total_appended = 0;

    for address in addresses {
        let cursor = scanner.store().get_cursor(&address).unwrap_or_default();
        info!("Update account for address [{}] and block number [{}]", address, cursor);

        match scanner.scan_round(&address).await {
            Ok(appended) => total_appended += appended.len(),
            Err(e) => error!("Round for {} failed: {}", address, e),
        }
    }

    total_appended
}

/// Periodically scan all accounts until `shutdown` is cancelled.
/// A round in progress always runs to completion.
pub async fn start_polling(state: Arc<AppState>, shutdown: CancellationToken) {
    // `interval` rejects a zero period.
    let period = state.config.poll_interval.max(Duration::from_millis(1));
    info!("Starting account polling every {:?}", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let appended = scan_all_accounts(&state.scanner).await;
                if appended > 0 {
                    info!("Round appended {} transactions", appended);
                }
            }
            _ = shutdown.cancelled() => {
                info!("Shutting down account polling");
                break;
            }
        }
    }
}
