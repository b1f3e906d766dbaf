pub mod config;
pub mod cosmos;
pub mod notifier;
pub mod store;

pub use config::{RuntimeProfile, WalletAdapterConfig};
pub use cosmos::{detect_providers, CosmosOfflineSigner, CosmosWalletAdapter};
pub use notifier::ToastQueue;
#[cfg(target_arch = "wasm32")]
pub use store::BrowserStore;
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
pub use store::{MemoryStore, RuntimeStore};

use omnia_wallet_core::WalletSessionManager;

/// Manager wired to the runtime adapters.
pub type RuntimeWalletManager = WalletSessionManager<CosmosWalletAdapter, RuntimeStore, ToastQueue>;

pub fn runtime_manager(config: &WalletAdapterConfig, notifier: ToastQueue) -> RuntimeWalletManager {
    WalletSessionManager::new(
        detect_providers(config),
        RuntimeStore::from_config(config),
        notifier,
        config.session_options(),
    )
}
