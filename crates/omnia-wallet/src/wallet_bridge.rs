//! Bridge between the egui shell and the wallet workspace crates.
//! This must remain the only shell-facing boundary for session operations.

use std::future::Future;
use std::sync::{Arc, Mutex};

use eframe::egui;

use omnia_wallet_adapters::{runtime_manager, RuntimeWalletManager, ToastQueue, WalletAdapterConfig};
use omnia_wallet_core::{Notice, OfflineSignerPort, ProviderKind, WalletSnapshot};

use crate::state::SignerCheck;

#[derive(Clone)]
pub struct WalletBridge {
    manager: Arc<RuntimeWalletManager>,
    toasts: ToastQueue,
    signer_check: Arc<Mutex<Option<SignerCheck>>>,
}

impl WalletBridge {
    pub fn new(config: &WalletAdapterConfig) -> Self {
        let toasts = ToastQueue::new();
        let manager = runtime_manager(config, toasts.clone());
        tracing::info!(
            installed = ?manager.providers.installed(),
            profile = ?config.runtime_profile,
            chain_id = %manager.options().default_chain_id,
            "wallet runtime ready"
        );
        if config.strict_runtime_required() && manager.providers.installed().is_empty() {
            tracing::warn!("production profile without a wallet runtime; connect will fail");
        }
        Self {
            manager: Arc::new(manager),
            toasts,
            signer_check: Arc::new(Mutex::new(None)),
        }
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        self.manager.snapshot()
    }

    pub fn installed(&self) -> Vec<ProviderKind> {
        self.manager.providers.installed()
    }

    pub fn drain_notices(&self) -> Vec<Notice> {
        self.toasts.drain()
    }

    pub fn take_signer_check(&self) -> Option<SignerCheck> {
        match self.signer_check.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => {
                tracing::warn!("signer check lock poisoned");
                None
            }
        }
    }

    /// Restores the saved session and re-confirms it with the wallet.
    pub fn start(&self, ctx: &egui::Context) {
        let manager = Arc::clone(&self.manager);
        spawn_task(ctx, move || async move {
            let phase = manager.startup().await;
            tracing::debug!(?phase, "startup verification finished");
        });
    }

    pub fn connect(&self, kind: ProviderKind, ctx: &egui::Context) {
        let manager = Arc::clone(&self.manager);
        spawn_task(ctx, move || async move {
            manager.connect(kind).await;
        });
    }

    pub fn disconnect(&self) {
        self.manager.disconnect();
    }

    /// Fetches the offline signer for the active session and counts its accounts.
    pub fn check_signer(&self, ctx: &egui::Context) {
        let manager = Arc::clone(&self.manager);
        let slot = Arc::clone(&self.signer_check);
        spawn_task(ctx, move || async move {
            let check = match manager.get_offline_signer(None) {
                None => SignerCheck::NoSession,
                Some(signer) => {
                    let chain_id = signer.chain_id().to_owned();
                    match signer.get_accounts().await {
                        Ok(accounts) => SignerCheck::Ready {
                            chain_id,
                            accounts: accounts.len(),
                        },
                        Err(e) => SignerCheck::Failed {
                            chain_id,
                            error: e.to_string(),
                        },
                    }
                }
            };
            if let Ok(mut guard) = slot.lock() {
                *guard = Some(check);
            }
        });
    }
}

/// Runs wallet work off the UI thread and repaints once it finishes.
#[cfg(not(target_arch = "wasm32"))]
fn spawn_task<F, Fut>(ctx: &egui::Context, make: F)
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let ctx = ctx.clone();
    std::thread::spawn(move || {
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(make()),
            Err(e) => tracing::error!(error = %e, "failed to start async runtime"),
        }
        ctx.request_repaint();
    });
}

#[cfg(target_arch = "wasm32")]
fn spawn_task<F, Fut>(ctx: &egui::Context, make: F)
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let ctx = ctx.clone();
    wasm_bindgen_futures::spawn_local(async move {
        make().await;
        ctx.request_repaint();
    });
}
