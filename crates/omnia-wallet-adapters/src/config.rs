use std::path::PathBuf;

use omnia_wallet_core::{ProviderKind, SessionOptions, DEFAULT_CHAIN_ID, DEFAULT_STORAGE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeProfile {
    #[default]
    Development,
    Production,
}

impl RuntimeProfile {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalletAdapterConfig {
    pub runtime_profile: RuntimeProfile,
    pub default_chain_id: String,
    pub storage_key: String,
    pub proxy_url: Option<String>,
    pub proxy_timeout_ms: u64,
    pub store_path: Option<PathBuf>,
    /// Fixture wallets exposed natively when no proxy is configured.
    pub deterministic_wallets: Vec<ProviderKind>,
    pub notify_stale_session: bool,
}

impl Default for WalletAdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            default_chain_id: DEFAULT_CHAIN_ID.to_owned(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            proxy_url: None,
            proxy_timeout_ms: 15_000,
            store_path: None,
            deterministic_wallets: ProviderKind::ALL.to_vec(),
            notify_stale_session: false,
        }
    }
}

impl WalletAdapterConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(profile) =
            env_var("OMNIA_RUNTIME_PROFILE").and_then(|v| RuntimeProfile::parse(&v))
        {
            cfg.runtime_profile = profile;
        }
        if let Some(chain_id) = env_var("OMNIA_DEFAULT_CHAIN_ID") {
            cfg.default_chain_id = chain_id;
        }
        if let Some(key) = env_var("OMNIA_STORAGE_KEY") {
            cfg.storage_key = key;
        }
        cfg.proxy_url = env_var("OMNIA_WALLET_PROXY_URL");
        if let Some(ms) = env_var("OMNIA_PROXY_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            cfg.proxy_timeout_ms = ms;
        }
        cfg.store_path = env_var("OMNIA_STORE_PATH").map(PathBuf::from);
        if let Some(flag) = env_var("OMNIA_NOTIFY_STALE_SESSION") {
            cfg.notify_stale_session = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        cfg
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            default_chain_id: self.default_chain_id.clone(),
            storage_key: self.storage_key.clone(),
            notify_stale_session: self.notify_stale_session,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// Browser builds have no process environment.
#[cfg(target_arch = "wasm32")]
fn env_var(_key: &str) -> Option<String> {
    None
}
