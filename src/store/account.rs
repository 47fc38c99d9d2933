use crate::models::Transaction;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Per-address state: the scan cursor and the transactions found so far.
#[derive(Debug)]
pub struct Account {
    /// Next height no worker has claimed yet.
    cursor: AtomicU64,
    /// Discovery order, not block order.
    transactions: Mutex<Vec<Transaction>>,
}

impl Account {
    pub fn new(cursor: u64) -> Self {
        Self {
            cursor: AtomicU64::new(cursor),
            transactions: Mutex::new(Vec::new()),
        }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Reserve the next height. Concurrent callers always get distinct heights.
    pub fn claim_next_height(&self) -> u64 {
        self.cursor.fetch_add(1, Ordering::SeqCst)
    }

    /// Move the cursor past `count` heights without scanning them.
    pub fn skip_heights(&self, count: u64) -> u64 {
        self.cursor.fetch_add(count, Ordering::SeqCst)
    }

    pub async fn append(&self, transactions: &[Transaction]) -> usize {
        let mut stored = self.transactions.lock().await;
        stored.extend_from_slice(transactions);
        stored.len()
    }

    /// Copy of the history, highest block first. Equal heights keep discovery order.
    pub async fn sorted_transactions(&self) -> Vec<Transaction> {
        let mut snapshot = self.transactions.lock().await.clone();
        snapshot.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        snapshot
    }
}
