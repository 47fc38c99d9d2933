// Configuration for:
// - RPC endpoint URL, timeout and optional rate limit
// - Server listening address/port
// - Scan window, worker count and lookback from the chain head
// - Interval between scan rounds

use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Blocks behind the chain head where a new account starts scanning.
pub const LOOKBACK_BLOCKS: u64 = 1_000_000;

/// Heights scanned per account per round.
pub const BLOCKS_PER_ROUND: u64 = 100;

/// Concurrent workers inside a single round.
pub const NUM_WORKERS: usize = 6;

/// Upper bound on a single JSON-RPC request.
pub const RPC_TIMEOUT: Duration = Duration::from_millis(1000);

/// Idle period between rounds.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Engine constants shared by the account store and the scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub lookback_blocks: u64,
    pub blocks_per_round: u64,
    pub worker_count: usize,
    pub request_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_blocks: LOOKBACK_BLOCKS,
            blocks_per_round: BLOCKS_PER_ROUND,
            worker_count: NUM_WORKERS,
            request_timeout: RPC_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub rpc_url: String,
    pub rpc_rate_limit: Option<u32>,
    pub poll_interval: Duration,
    pub scan: ScanConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env_or("SERVER_PORT", 8485);
        let rpc_url = env::var("RPC_URL")
            .unwrap_or_else(|_| "https://cloudflare-eth.com".to_string());
        let rpc_rate_limit = env::var("RPC_RATE_LIMIT")
            .map(|v| v.parse().ok())
            .unwrap_or(None);
        let poll_interval =
            Duration::from_secs(env_or("POLL_INTERVAL_SECS", POLL_INTERVAL.as_secs()).max(1));

        let scan = ScanConfig {
            lookback_blocks: env_or("LOOKBACK_BLOCKS", LOOKBACK_BLOCKS),
            blocks_per_round: env_or("BLOCKS_PER_ROUND", BLOCKS_PER_ROUND),
            worker_count: env_or("SCAN_WORKERS", NUM_WORKERS).max(1),
            request_timeout: Duration::from_millis(env_or(
                "RPC_TIMEOUT_MS",
                RPC_TIMEOUT.as_millis() as u64,
            )),
        };

        Self {
            server_host,
            server_port,
            rpc_url,
            rpc_rate_limit,
            poll_interval,
            scan,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
