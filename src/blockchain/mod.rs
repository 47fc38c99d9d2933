pub mod client;
pub mod decoder;
pub mod polling;
pub mod scanner;

// Re-exports for convenience
pub use client::{ChainClient, RpcClient};
pub use polling::{scan_all_accounts, start_polling};
pub use scanner::Scanner;
