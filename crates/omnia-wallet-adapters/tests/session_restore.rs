mod common;

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use omnia_wallet_adapters::{MemoryStore, ToastQueue};
use omnia_wallet_core::{
    PortError, ProviderKind, SessionAction, SessionOptions, SessionPhase, SessionStorePort,
    WalletSession, WalletSessionManager, WalletSnapshot,
};

use common::{
    harness, harness_with, options, persisted, provider, providers, seed_session, STORAGE_KEY,
};

/// Records, for every removal, whether a new snapshot had already been
/// published when the record was deleted.
#[derive(Clone, Default)]
struct OrderedStore {
    inner: MemoryStore,
    observer: Arc<Mutex<Option<watch::Receiver<WalletSnapshot>>>>,
    published_before_remove: Arc<Mutex<Vec<bool>>>,
}

impl OrderedStore {
    fn observe(&self, rx: watch::Receiver<WalletSnapshot>) {
        *self.observer.lock().expect("observer lock") = Some(rx);
    }

    fn removals(&self) -> Vec<bool> {
        self.published_before_remove.lock().expect("removals lock").clone()
    }
}

impl SessionStorePort for OrderedStore {
    fn load(&self, key: &str) -> Result<Option<String>, PortError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PortError> {
        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PortError> {
        if let Some(rx) = self.observer.lock().expect("observer lock").as_ref() {
            let published = rx.has_changed().unwrap_or(true);
            self.published_before_remove
                .lock()
                .expect("removals lock")
                .push(published);
        }
        self.inner.remove(key)
    }
}

fn keplr_session() -> WalletSession {
    WalletSession::connected(
        "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu",
        "cosmoshub-4",
        ProviderKind::Keplr,
    )
}

#[tokio::test]
async fn session_survives_restart_when_provider_still_authorizes() {
    let first = harness(&[ProviderKind::Keplr]);
    assert!(first.manager.connect(ProviderKind::Keplr).await);
    let before = first.manager.session().expect("session");

    let restarted = harness_with(
        providers(&[ProviderKind::Keplr]),
        first.store.clone(),
        options(),
    );
    assert_eq!(restarted.manager.startup().await, SessionPhase::Connected);

    assert_eq!(restarted.manager.session(), Some(before.clone()));
    assert_eq!(persisted(&restarted.store), Some(before));
    assert!(restarted.toasts.is_empty());
}

#[tokio::test]
async fn restored_session_is_optimistic_until_verified() {
    let store = MemoryStore::new();
    seed_session(&store, &keplr_session());
    let h = harness_with(providers(&[ProviderKind::Keplr]), store, options());

    let restored = h.manager.restore().expect("restored session");
    assert_eq!(restored, keplr_session());
    assert_eq!(h.manager.phase(), SessionPhase::Restoring);
    assert!(h.manager.is_connected());
    assert!(h.manager.get_offline_signer(None).is_some());

    assert!(h.manager.verify_existing_session(&restored).await);
    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Connected);
    assert_eq!(snapshot.session, Some(keplr_session()));
    assert_eq!(
        snapshot.last_transition.map(|t| t.action),
        Some(SessionAction::Verified)
    );
    assert_eq!(
        provider(&h, ProviderKind::Keplr)
            .debug_enable_requests()
            .expect("enable requests"),
        vec!["cosmoshub-4".to_owned()]
    );
}

#[tokio::test]
async fn revoked_authorization_evicts_restored_session() {
    let store = MemoryStore::new();
    seed_session(&store, &keplr_session());
    let h = harness_with(providers(&[ProviderKind::Keplr]), store, options());
    provider(&h, ProviderKind::Keplr)
        .debug_revoke()
        .expect("revoke");

    assert_eq!(h.manager.startup().await, SessionPhase::Disconnected);

    assert!(h.manager.session().is_none());
    assert!(persisted(&h.store).is_none());
    // eviction is silent unless enabled
    assert!(h.toasts.is_empty());
}

#[tokio::test]
async fn eviction_notice_can_be_enabled() {
    let store = MemoryStore::new();
    seed_session(&store, &keplr_session());
    let h = harness_with(
        providers(&[ProviderKind::Keplr]),
        store,
        SessionOptions {
            notify_stale_session: true,
            ..SessionOptions::default()
        },
    );
    provider(&h, ProviderKind::Keplr)
        .debug_revoke()
        .expect("revoke");

    assert_eq!(h.manager.startup().await, SessionPhase::Disconnected);

    let toasts = h.toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Wallet session expired");
    assert!(toasts[0].description.contains("Keplr"));
}

#[tokio::test]
async fn missing_extension_evicts_restored_session() {
    let store = MemoryStore::new();
    let leap = WalletSession::connected("cosmos1leapuser", "cosmoshub-4", ProviderKind::Leap);
    seed_session(&store, &leap);
    let h = harness_with(providers(&[ProviderKind::Keplr]), store, options());

    assert_eq!(h.manager.startup().await, SessionPhase::Disconnected);
    assert!(persisted(&h.store).is_none());
    assert!(h
        .manager
        .providers
        .get(ProviderKind::Keplr)
        .expect("keplr")
        .debug_enable_requests()
        .expect("enable requests")
        .is_empty());
}

#[tokio::test]
async fn malformed_record_is_discarded_at_startup() {
    let store = MemoryStore::new();
    store.save(STORAGE_KEY, "{not json").expect("seed garbage");
    let h = harness_with(providers(&[ProviderKind::Keplr]), store, options());

    assert_eq!(h.manager.startup().await, SessionPhase::Disconnected);
    assert!(h.store.load(STORAGE_KEY).expect("load").is_none());
    assert!(h.toasts.is_empty());
}

#[tokio::test]
async fn partially_connected_record_is_discarded() {
    let store = MemoryStore::new();
    store
        .save(
            STORAGE_KEY,
            r#"{"address":"","chainId":"cosmoshub-4","walletType":"keplr","isConnected":false}"#,
        )
        .expect("seed partial record");
    let h = harness_with(providers(&[ProviderKind::Keplr]), store, options());

    assert_eq!(h.manager.startup().await, SessionPhase::Disconnected);
    assert!(h.store.load(STORAGE_KEY).expect("load").is_none());
}

#[tokio::test]
async fn empty_store_settles_disconnected() {
    let h = harness(&[ProviderKind::Keplr, ProviderKind::Leap]);
    assert_eq!(h.manager.phase(), SessionPhase::Unknown);
    assert_eq!(h.manager.startup().await, SessionPhase::Disconnected);
    assert!(h.manager.restore().is_none());
}

#[tokio::test]
async fn restore_is_skipped_once_settled() {
    let h = harness(&[ProviderKind::Keplr]);
    assert!(h.manager.connect(ProviderKind::Keplr).await);

    assert!(h.manager.restore().is_none());
    assert_eq!(h.manager.phase(), SessionPhase::Connected);
}

#[tokio::test]
async fn late_verification_does_not_resurrect_disconnected_session() {
    let store = MemoryStore::new();
    seed_session(&store, &keplr_session());
    let h = harness_with(providers(&[ProviderKind::Keplr]), store, options());
    let gate = provider(&h, ProviderKind::Keplr)
        .debug_hold_next_enable()
        .expect("hold enable");

    let (phase, _) = tokio::join!(h.manager.startup(), async {
        while h.manager.phase() != SessionPhase::Restoring {
            tokio::task::yield_now().await;
        }
        h.manager.disconnect();
        gate.notify_one();
    });

    assert_eq!(phase, SessionPhase::Disconnected);
    assert!(h.manager.session().is_none());
    assert!(persisted(&h.store).is_none());
}

#[tokio::test]
async fn late_verification_failure_keeps_newer_connection() {
    let store = MemoryStore::new();
    seed_session(&store, &keplr_session());
    let h = harness_with(
        providers(&[ProviderKind::Keplr, ProviderKind::Leap]),
        store,
        options(),
    );
    let keplr = provider(&h, ProviderKind::Keplr);
    keplr.debug_revoke().expect("revoke");
    let gate = keplr.debug_hold_next_enable().expect("hold enable");

    let (phase, connected) = tokio::join!(h.manager.startup(), async {
        while h.manager.phase() != SessionPhase::Restoring {
            tokio::task::yield_now().await;
        }
        let connected = h.manager.connect(ProviderKind::Leap).await;
        gate.notify_one();
        connected
    });

    assert!(connected);
    assert_eq!(phase, SessionPhase::Connected);
    let session = h.manager.session().expect("leap session");
    assert_eq!(session.wallet_type, ProviderKind::Leap);
    assert_eq!(persisted(&h.store), Some(session));
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let h = harness(&[ProviderKind::Keplr]);

    h.manager.disconnect();
    h.manager.disconnect();

    assert_eq!(h.manager.phase(), SessionPhase::Disconnected);
    assert!(h.manager.session().is_none());
    let toasts = h.toasts.drain();
    assert_eq!(toasts.len(), 2);
    assert!(toasts.iter().all(|t| t.title == "Wallet disconnected"));
}

#[tokio::test]
async fn disconnect_clears_memory_and_store_without_calling_provider() {
    let h = harness(&[ProviderKind::Keplr]);
    assert!(h.manager.connect(ProviderKind::Keplr).await);
    let requests_before = provider(&h, ProviderKind::Keplr)
        .debug_enable_requests()
        .expect("enable requests")
        .len();

    h.manager.disconnect();

    assert!(h.manager.session().is_none());
    assert!(!h.manager.is_connected());
    assert!(persisted(&h.store).is_none());
    assert_eq!(
        provider(&h, ProviderKind::Keplr)
            .debug_enable_requests()
            .expect("enable requests")
            .len(),
        requests_before
    );
}

#[tokio::test]
async fn record_is_removed_before_disconnect_is_published() {
    let store = OrderedStore::default();
    seed_session(&store.inner, &keplr_session());
    let manager = WalletSessionManager::new(
        providers(&[ProviderKind::Keplr]),
        store.clone(),
        ToastQueue::new(),
        options(),
    );
    manager
        .providers
        .get(ProviderKind::Keplr)
        .expect("keplr")
        .debug_revoke()
        .expect("revoke");

    let restored = manager.restore().expect("restored session");
    store.observe(manager.subscribe());
    assert!(!manager.verify_existing_session(&restored).await);

    assert_eq!(manager.phase(), SessionPhase::Disconnected);
    assert_eq!(store.removals(), vec![false]);
    assert!(persisted(&store.inner).is_none());

    manager
        .providers
        .get(ProviderKind::Keplr)
        .expect("keplr")
        .debug_authorize()
        .expect("authorize");
    assert!(manager.connect(ProviderKind::Keplr).await);
    store.observe(manager.subscribe());
    manager.disconnect();

    assert_eq!(store.removals(), vec![false, false]);
    assert!(persisted(&store.inner).is_none());
}
