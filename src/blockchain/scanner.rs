use crate::blockchain::client::{fetch_with_deadline, ChainClient, ClientError};
use crate::blockchain::decoder::{decode_block, get_block_payload, DecodeError};
use crate::config::ScanConfig;
use crate::models::Transaction;
use crate::store::{Account, AccountStore, StoreError};
use crate::validation::normalize_address;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Longest aggregated failure message a round reports.
pub const MAX_ERROR_SUMMARY_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// One or more heights of a round could not be scanned. They were skipped.
#[derive(Error, Debug)]
#[error("{failed} of {window} blocks failed ({persisted} transactions persisted): {summary}")]
pub struct RoundError {
    pub window: u64,
    pub failed: u64,
    pub persisted: usize,
    pub summary: String,
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Round(#[from] RoundError),
}

/// State shared by the workers of one round.
#[derive(Default)]
struct RoundState {
    remaining: u64,
    matches: Vec<Transaction>,
    failures: Vec<String>,
}

pub struct Scanner {
    store: Arc<AccountStore>,
    client: Arc<dyn ChainClient>,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(store: Arc<AccountStore>, client: Arc<dyn ChainClient>, config: ScanConfig) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    pub fn store(&self) -> &Arc<AccountStore> {
        &self.store
    }

    /// Scan the next `blocks_per_round` heights of one account with a pool of
    /// concurrent workers and append every transaction sent from or to it.
    ///
    /// Failed heights are skipped, never retried. The cursor always ends
    /// exactly one window further than it started; matches found are saved
    /// even when the round reports an error.
    pub async fn scan_round(&self, address: &str) -> Result<Vec<Transaction>, ScanError> {
        let address = normalize_address(address).map_err(StoreError::from)?;
        let account = self.store.account(&address)?;

        let window = self.config.blocks_per_round;
        let start = account.cursor();
        let round = Arc::new(Mutex::new(RoundState {
            remaining: window,
            ..Default::default()
        }));

        debug!("Scanning {} from block {} ({} blocks)", address, start, window);

        let handles: Vec<_> = (0..self.config.worker_count.max(1))
            .map(|id| {
                let worker = Worker {
                    id,
                    address: address.clone(),
                    account: account.clone(),
                    client: self.client.clone(),
                    round: round.clone(),
                    timeout: self.config.request_timeout,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        for result in join_all(handles).await {
            if let Err(e) = result {
                error!("Scan worker for {} aborted: {}", address, e);
                round.lock().await.failures.push(format!("worker aborted: {}", e));
            }
        }

        let RoundState {
            remaining,
            matches,
            mut failures,
        } = std::mem::take(&mut *round.lock().await);

        let mut failed = failures.len() as u64;
        if remaining > 0 {
            // Every worker stopped early; the rest of the window is skipped too.
            let from = account.skip_heights(remaining);
            warn!(
                "All workers for {} stopped, skipping blocks {}..{}",
                address,
                from,
                from + remaining
            );
            failures.push(format!("{} unclaimed blocks skipped", remaining));
            failed += remaining;
        }

        let persisted = matches.len();
        if !matches.is_empty() {
            self.store.save_transactions(&address, &matches).await?;
        }

        info!(
            "Round for {} covered blocks {}..{}: {} matched, {} failed",
            address,
            start,
            account.cursor(),
            persisted,
            failed
        );

        if failures.is_empty() {
            Ok(matches)
        } else {
            Err(RoundError {
                window,
                failed,
                persisted,
                summary: summarize(&failures),
            }
            .into())
        }
    }
}

struct Worker {
    id: usize,
    address: String,
    account: Arc<Account>,
    client: Arc<dyn ChainClient>,
    round: Arc<Mutex<RoundState>>,
    timeout: Duration,
}

impl Worker {
    async fn run(self) {
        debug!("Scan worker {} started for {}", self.id, self.address);

        while let Some(height) = self.claim().await {
            match self.scan_block(height).await {
                Ok(found) => {
                    if !found.is_empty() {
                        debug!(
                            "Worker {} found {} transactions in block {}",
                            self.id,
                            found.len(),
                            height
                        );
                        self.round.lock().await.matches.extend(found);
                    }
                }
                Err(e) => {
                    warn!("Worker {} skipping block {} for {}: {}", self.id, height, self.address, e);
                    self.round
                        .lock()
                        .await
                        .failures
                        .push(format!("block {}: {}", height, e));
                    break;
                }
            }
        }

        debug!("Scan worker {} finished for {}", self.id, self.address);
    }

    /// Take one unit off the countdown and reserve the height that goes with it.
    async fn claim(&self) -> Option<u64> {
        let mut round = self.round.lock().await;
        if round.remaining == 0 {
            return None;
        }
        round.remaining -= 1;
        Some(self.account.claim_next_height())
    }

    async fn scan_block(&self, height: u64) -> Result<Vec<Transaction>, BlockError> {
        let data =
            fetch_with_deadline(self.client.as_ref(), &get_block_payload(height), self.timeout)
                .await?;
        let block = decode_block(&data)?;

        Ok(block
            .transactions
            .into_iter()
            .filter(|tx| tx.involves(&self.address))
            .collect())
    }
}

fn summarize(failures: &[String]) -> String {
    let joined = failures.join(" | ");
    if joined.len() <= MAX_ERROR_SUMMARY_LEN {
        return joined;
    }

    let mut end = MAX_ERROR_SUMMARY_LEN;
    while !joined.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &joined[..end])
}
