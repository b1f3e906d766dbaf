#![allow(async_fn_in_trait)]

use thiserror::Error;

use crate::domain::{Notice, ProviderKind, WalletAccount};

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("wallet not installed: {0}")]
    NotInstalled(String),
    #[error("provider rejected request: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// One injected wallet extension. Only the calls the session manager uses
/// are exposed.
pub trait WalletProviderPort {
    type Signer: OfflineSignerPort;

    fn kind(&self) -> ProviderKind;

    /// Ask the extension to authorize `chain_id` for this origin.
    async fn enable(&self, chain_id: &str) -> Result<(), PortError>;

    fn offline_signer(&self, chain_id: &str) -> Result<Self::Signer, PortError>;
}

/// Opaque signing handle scoped to one chain. Nothing here signs; accounts
/// are the only thing read from it.
pub trait OfflineSignerPort {
    fn chain_id(&self) -> &str;

    async fn get_accounts(&self) -> Result<Vec<WalletAccount>, PortError>;
}

/// Raw string key-value storage, e.g. browser `localStorage`.
pub trait SessionStorePort {
    fn load(&self, key: &str) -> Result<Option<String>, PortError>;
    fn save(&self, key: &str, value: &str) -> Result<(), PortError>;
    fn remove(&self, key: &str) -> Result<(), PortError>;
}

pub trait NotifierPort {
    fn notify(&self, notice: Notice);
}

/// Providers detected at startup, at most one per kind.
#[derive(Debug, Clone)]
pub struct ProviderSet<P> {
    keplr: Option<P>,
    leap: Option<P>,
}

impl<P> Default for ProviderSet<P> {
    fn default() -> Self {
        Self {
            keplr: None,
            leap: None,
        }
    }
}

impl<P: WalletProviderPort> ProviderSet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under its own kind, replacing any earlier one.
    pub fn with(mut self, provider: P) -> Self {
        self.insert(provider);
        self
    }

    pub fn insert(&mut self, provider: P) {
        match provider.kind() {
            ProviderKind::Keplr => self.keplr = Some(provider),
            ProviderKind::Leap => self.leap = Some(provider),
        }
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&P> {
        match kind {
            ProviderKind::Keplr => self.keplr.as_ref(),
            ProviderKind::Leap => self.leap.as_ref(),
        }
    }

    pub fn is_installed(&self, kind: ProviderKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn installed(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.is_installed(*kind))
            .collect()
    }
}
