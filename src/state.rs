//! Application state for the IMIS client.
//!
//! Wires the API client, token storage, notifier and session store
//! together from the resolved configuration.

use std::io::IsTerminal;
use std::sync::Arc;

use clap::ValueEnum;

use crate::api::client::ApiClient;
use crate::auth::storage::{FileStorage, MemoryStorage, StorageError, TokenStorage};
use crate::auth::store::AuthStore;
use crate::config::Config;
use crate::notification::{ConsoleNotifier, LogNotifier, Notifier};

/// Where the session token is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// JSON file in the user's data directory.
    File,
    /// OS keychain.
    #[cfg(feature = "keychain")]
    Keychain,
    /// Nothing survives the process.
    Memory,
}

impl StorageKind {
    pub fn open(self) -> Result<Arc<dyn TokenStorage>, StorageError> {
        Ok(match self {
            StorageKind::File => {
                let storage = FileStorage::default_location()?;
                log::debug!("Using file storage at {}", storage.path().display());
                Arc::new(storage)
            }
            #[cfg(feature = "keychain")]
            StorageKind::Keychain => Arc::new(crate::auth::storage::KeychainStorage::new()),
            StorageKind::Memory => Arc::new(MemoryStorage::new()),
        })
    }
}

pub struct AppState {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub notifier: Arc<dyn Notifier>,
    pub auth: AuthStore,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn TokenStorage>, notifier: Arc<dyn Notifier>) -> Self {
        let api = Arc::new(ApiClient::new(&config.api_base_url));
        let auth = AuthStore::new(
            api.clone(),
            storage,
            notifier.clone(),
            config.show_all_views,
        );
        Self {
            config,
            api,
            notifier,
            auth,
        }
    }

    /// Notifications go to the console when a user is watching stderr,
    /// otherwise only to the log.
    pub fn open(config: Config, storage: StorageKind) -> Result<Self, StorageError> {
        let notifier: Arc<dyn Notifier> = if std::io::stderr().is_terminal() {
            Arc::new(ConsoleNotifier)
        } else {
            Arc::new(LogNotifier)
        };
        Ok(Self::new(config, storage.open()?, notifier))
    }
}
