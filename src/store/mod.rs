//! In-memory account store.
//!
//! Accounts live in a sharded concurrent map keyed by normalized address, so
//! work on one address never waits on a lock held for another.

pub mod account;

pub use account::Account;

use crate::blockchain::client::{fetch_with_deadline, ChainClient};
use crate::blockchain::decoder::{block_number_payload, decode_block_number};
use crate::config::ScanConfig;
use crate::models::Transaction;
use crate::validation::{normalize_address, ValidationError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    InvalidAddress(#[from] ValidationError),

    #[error("account for address [{0}] already subscribed")]
    AlreadySubscribed(String),

    #[error("account for address [{0}] does not exist")]
    UnknownAccount(String),

    #[error("chain unavailable: {0}")]
    ChainUnavailable(String),
}

pub struct AccountStore {
    accounts: DashMap<String, Arc<Account>>,
    client: Arc<dyn ChainClient>,
    config: ScanConfig,
}

impl AccountStore {
    pub fn new(client: Arc<dyn ChainClient>, config: ScanConfig) -> Self {
        Self {
            accounts: DashMap::new(),
            client,
            config,
        }
    }

    /// Subscribe an address. Its cursor starts `lookback_blocks` behind the chain head.
    pub async fn create_account(&self, address: &str) -> Result<u64, StoreError> {
        let address = normalize_address(address)?;

        // Cheap rejection before going to the network.
        if self.accounts.contains_key(&address) {
            return Err(StoreError::AlreadySubscribed(address));
        }

        let cursor = self.bootstrap_cursor().await?;

        match self.accounts.entry(address) {
            Entry::Occupied(entry) => Err(StoreError::AlreadySubscribed(entry.key().clone())),
            Entry::Vacant(entry) => {
                info!("Subscribed account {} starting at block {}", entry.key(), cursor);
                entry.insert(Arc::new(Account::new(cursor)));
                Ok(cursor)
            }
        }
    }

    /// Append transactions to an account's history. No deduplication.
    pub async fn save_transactions(
        &self,
        address: &str,
        transactions: &[Transaction],
    ) -> Result<usize, StoreError> {
        let account = self.account(address)?;
        let added = transactions.len();
        let total = account.append(transactions).await;
        debug!("Saved {} transactions for {} ({} total)", added, address, total);
        Ok(total)
    }

    pub fn get_cursor(&self, address: &str) -> Result<u64, StoreError> {
        Ok(self.account(address)?.cursor())
    }

    /// History sorted by decreasing block height.
    pub async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>, StoreError> {
        let account = self.account(address)?;
        Ok(account.sorted_transactions().await)
    }

    /// Shared handle to an account's state. The map shard is released before returning.
    pub fn account(&self, address: &str) -> Result<Arc<Account>, StoreError> {
        let address = normalize_address(address)?;
        self.accounts
            .get(&address)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::UnknownAccount(address))
    }

    /// Snapshot of every subscribed address.
    pub fn addresses(&self) -> Vec<String> {
        self.accounts.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    async fn bootstrap_cursor(&self) -> Result<u64, StoreError> {
        let data = fetch_with_deadline(
            self.client.as_ref(),
            &block_number_payload(),
            self.config.request_timeout,
        )
        .await
        .map_err(|e| StoreError::ChainUnavailable(e.to_string()))?;

        let head =
            decode_block_number(&data).map_err(|e| StoreError::ChainUnavailable(e.to_string()))?;

        Ok(head.saturating_sub(self.config.lookback_blocks))
    }
}
