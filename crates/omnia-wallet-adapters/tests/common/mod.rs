#![allow(dead_code)]

use omnia_wallet_adapters::{CosmosWalletAdapter, MemoryStore, ToastQueue};
use omnia_wallet_core::{
    ProviderKind, ProviderSet, SessionOptions, WalletAccount, WalletSession, WalletSessionManager,
};

pub type TestManager = WalletSessionManager<CosmosWalletAdapter, MemoryStore, ToastQueue>;

pub const STORAGE_KEY: &str = "omniaWallet";

pub struct Harness {
    pub manager: TestManager,
    pub store: MemoryStore,
    pub toasts: ToastQueue,
}

pub fn options() -> SessionOptions {
    SessionOptions::default()
}

pub fn providers(kinds: &[ProviderKind]) -> ProviderSet<CosmosWalletAdapter> {
    kinds.iter().fold(ProviderSet::new(), |set, kind| {
        set.with(CosmosWalletAdapter::deterministic(*kind))
    })
}

pub fn harness(kinds: &[ProviderKind]) -> Harness {
    harness_with(providers(kinds), MemoryStore::new(), options())
}

/// Fresh manager over an existing store, as after a page reload.
pub fn harness_with(
    providers: ProviderSet<CosmosWalletAdapter>,
    store: MemoryStore,
    options: SessionOptions,
) -> Harness {
    let toasts = ToastQueue::new();
    Harness {
        manager: WalletSessionManager::new(providers, store.clone(), toasts.clone(), options),
        store,
        toasts,
    }
}

pub fn provider(h: &Harness, kind: ProviderKind) -> &CosmosWalletAdapter {
    h.manager.providers.get(kind).expect("provider installed")
}

pub fn account(address: &str) -> WalletAccount {
    WalletAccount {
        address: address.to_owned(),
        algo: "secp256k1".to_owned(),
        pubkey: vec![0x02; 33],
    }
}

pub fn persisted(store: &MemoryStore) -> Option<WalletSession> {
    use omnia_wallet_core::SessionStorePort;

    store
        .load(STORAGE_KEY)
        .expect("load persisted record")
        .map(|raw| serde_json::from_str(&raw).expect("persisted record is valid json"))
}

pub fn seed_session(store: &MemoryStore, session: &WalletSession) {
    use omnia_wallet_core::SessionStorePort;

    store
        .save(
            STORAGE_KEY,
            &serde_json::to_string(session).expect("serialize session"),
        )
        .expect("seed session");
}
