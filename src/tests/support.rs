//! Scripted in-memory chain used by the scenario tests.

use crate::blockchain::client::{ChainClient, ClientError};
use crate::blockchain::scanner::Scanner;
use crate::config::ScanConfig;
use crate::models::{parse_hex_u64, to_hex_quantity, Transaction};
use crate::store::AccountStore;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADDR: &str = "0xe946502872da09009aa6dc975272ac24ab5b4f36";
pub const OTHER: &str = "0x23ca95b9de14a83cbf4a43b11c2c3825e72c7d9b";
pub const STRANGER: &str = "0x00000000000000000000000000000000000000aa";

pub const HEAD: u64 = 14_000_000;
pub const LOOKBACK: u64 = 1_000;

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// The request never produced a body.
    Transport,
    /// Well-formed JSON-RPC error object.
    Remote,
    /// Body that is neither a result nor an error.
    Malformed,
    /// `"result": null`
    Missing,
    /// Never answers within any sane deadline.
    Stall,
}

#[derive(Default)]
pub struct MockChain {
    head: Option<u64>,
    blocks: HashMap<u64, Vec<Transaction>>,
    faults: HashMap<u64, Fault>,
    fail_all: Option<Fault>,
    fail_first: usize,
    block_requests: AtomicUsize,
    requested: Mutex<Vec<u64>>,
}

impl MockChain {
    pub fn new(head: u64) -> Self {
        Self {
            head: Some(head),
            ..Default::default()
        }
    }

    /// No answer to `eth_blockNumber`.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, height: u64, transactions: Vec<Transaction>) -> Self {
        self.blocks.insert(height, transactions);
        self
    }

    pub fn with_fault(mut self, height: u64, fault: Fault) -> Self {
        self.faults.insert(height, fault);
        self
    }

    pub fn failing_everywhere(mut self, fault: Fault) -> Self {
        self.fail_all = Some(fault);
        self
    }

    /// The first `n` block requests fail, whatever height they ask for.
    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn requested_heights(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }

    fn fault_for(&self, height: u64, nth_request: usize) -> Option<Fault> {
        if nth_request < self.fail_first {
            return Some(Fault::Transport);
        }
        self.fail_all.or_else(|| self.faults.get(&height).copied())
    }

    async fn serve_block(&self, height: u64, timeout: Duration) -> Result<Vec<u8>, ClientError> {
        let nth = self.block_requests.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(height);

        // Let other workers interleave.
        tokio::time::sleep(Duration::from_millis(1)).await;

        let body = match self.fault_for(height, nth) {
            Some(Fault::Transport) => return Err(ClientError::Timeout(timeout)),
            Some(Fault::Stall) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                return Err(ClientError::Timeout(timeout));
            }
            Some(Fault::Remote) => json!({
                "jsonrpc": "2.0",
                "error": {"code": -32000, "message": "header not found"},
                "id": 2304,
            }),
            Some(Fault::Malformed) => return Ok(b"<html>502 Bad Gateway</html>".to_vec()),
            Some(Fault::Missing) => json!({"jsonrpc": "2.0", "result": null, "id": 2304}),
            None => json!({
                "jsonrpc": "2.0",
                "id": 2304,
                "result": {
                    "number": to_hex_quantity(height),
                    "hash": format!("0xblock{:x}", height),
                    "transactions": self.blocks.get(&height).cloned().unwrap_or_default(),
                },
            }),
        };

        Ok(body.to_string().into_bytes())
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn fetch(&self, payload: &str, timeout: Duration) -> Result<Vec<u8>, ClientError> {
        let request: Value = serde_json::from_str(payload).unwrap();

        match request["method"].as_str() {
            Some("eth_blockNumber") => match self.head {
                Some(head) => Ok(json!({"jsonrpc": "2.0", "result": to_hex_quantity(head), "id": 1})
                    .to_string()
                    .into_bytes()),
                None => Err(ClientError::Timeout(timeout)),
            },
            Some("eth_getBlockByNumber") => {
                let height = parse_hex_u64(request["params"][0].as_str().unwrap()).unwrap();
                self.serve_block(height, timeout).await
            }
            other => panic!("unexpected method {:?}", other),
        }
    }
}

pub fn scan_config(blocks_per_round: u64, worker_count: usize) -> ScanConfig {
    ScanConfig {
        lookback_blocks: LOOKBACK,
        blocks_per_round,
        worker_count,
        request_timeout: Duration::from_millis(200),
    }
}

pub fn setup(chain: Arc<MockChain>, config: ScanConfig) -> (Arc<AccountStore>, Scanner) {
    let store = Arc::new(AccountStore::new(chain.clone(), config.clone()));
    let scanner = Scanner::new(store.clone(), chain, config);
    (store, scanner)
}

pub fn tx(hash: &str, from: &str, to: Option<&str>, block_number: u64) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        from: from.to_string(),
        to: to.map(str::to_string),
        block_number,
        value: "0x1".to_string(),
        ..Default::default()
    }
}

/// First height a freshly subscribed account scans.
pub fn start_height() -> u64 {
    HEAD - LOOKBACK
}
