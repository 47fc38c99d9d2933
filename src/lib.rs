pub mod api;
pub mod blockchain;
pub mod config;
pub mod models;
pub mod state;
pub mod store;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::response::ApiResponse;
pub use api::route::{create_router, AddressQuery};
pub use blockchain::scanner::{RoundError, ScanError, Scanner};
pub use models::{Block, Transaction};
pub use store::{AccountStore, StoreError};
pub use validation::{normalize_address, validate_address};
