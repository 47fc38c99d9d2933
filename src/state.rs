use crate::blockchain::client::ChainClient;
use crate::blockchain::scanner::Scanner;
use crate::config::Config;
use crate::store::AccountStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub store: Arc<AccountStore>,
    pub scanner: Scanner,
}

impl AppState {
    /// Wire the store and the scanner onto one chain client.
    pub fn new(config: Config, client: Arc<dyn ChainClient>) -> Self {
        let store = Arc::new(AccountStore::new(client.clone(), config.scan.clone()));
        let scanner = Scanner::new(store.clone(), client, config.scan.clone());

        Self {
            config,
            store,
            scanner,
        }
    }
}
