use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::{Notice, ProviderKind, SessionOptions, WalletSession};
use crate::ports::{
    NotifierPort, OfflineSignerPort, PortError, ProviderSet, SessionStorePort, WalletProviderPort,
};
use crate::state_machine::{
    session_transition, IllegalTransition, SessionAction, SessionPhase, StateTransition,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0} wallet not installed")]
    ProviderMissing(ProviderKind),
    #[error("a wallet connection is already in progress")]
    ConnectInFlight,
    #[error("no accounts found in {0} wallet")]
    NoAccounts(ProviderKind),
    #[error("provider call failed: {0}")]
    Provider(#[source] PortError),
    #[error("session storage failed: {0}")]
    Storage(#[source] PortError),
    #[error("malformed session record: {0}")]
    MalformedRecord(String),
    #[error("session record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),
}

/// What every consumer observes. Only the manager writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub session: Option<WalletSession>,
    pub phase: SessionPhase,
    pub is_connecting: bool,
    pub last_transition: Option<StateTransition>,
}

impl WalletSnapshot {
    pub fn is_connected(&self) -> bool {
        self.phase.is_connected() && self.session.is_some()
    }
}

pub struct WalletSessionManager<P, S, N>
where
    P: WalletProviderPort,
    S: SessionStorePort,
    N: NotifierPort,
{
    pub providers: ProviderSet<P>,
    pub store: S,
    pub notifier: N,
    options: SessionOptions,
    state: watch::Sender<WalletSnapshot>,
}

/// Clears `is_connecting` when a connect attempt settles or its future is
/// dropped.
struct ConnectGuard<'a> {
    state: &'a watch::Sender<WalletSnapshot>,
}

impl Drop for ConnectGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|snapshot| {
            let was_connecting = snapshot.is_connecting;
            snapshot.is_connecting = false;
            was_connecting
        });
    }
}

impl<P, S, N> WalletSessionManager<P, S, N>
where
    P: WalletProviderPort,
    S: SessionStorePort,
    N: NotifierPort,
{
    pub fn new(providers: ProviderSet<P>, store: S, notifier: N, options: SessionOptions) -> Self {
        let (state, _) = watch::channel(WalletSnapshot::default());
        Self {
            providers,
            store,
            notifier,
            options,
            state,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletSnapshot> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Option<WalletSession> {
        self.state.borrow().session.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    pub fn is_connecting(&self) -> bool {
        self.state.borrow().is_connecting
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected()
    }

    /// Restores any persisted session and re-verifies it with its provider.
    pub async fn startup(&self) -> SessionPhase {
        if let Some(session) = self.restore() {
            self.verify_existing_session(&session).await;
        }
        self.phase()
    }

    /// Reads the persisted record and reinstates it optimistically in the
    /// `Restoring` phase. The returned session still needs
    /// [`verify_existing_session`](Self::verify_existing_session).
    pub fn restore(&self) -> Option<WalletSession> {
        let raw = match self.store.load(&self.options.storage_key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to read saved wallet data");
                self.forget_persisted();
                None
            }
        };

        let Some(raw) = raw else {
            self.settle_without_session();
            return None;
        };

        let session = match parse_record(&raw) {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "failed to parse saved wallet data");
                self.forget_persisted();
                self.settle_without_session();
                return None;
            }
        };

        let restored = self.transition_if(
            SessionAction::Restore,
            Some(session.clone()),
            |s| s.phase == SessionPhase::Unknown,
            || Ok(()),
        );
        match restored {
            Ok(Some(_)) => Some(session),
            Ok(None) => {
                debug!("wallet session already settled; skipping restore");
                None
            }
            Err(e) => {
                warn!(error = %e, "wallet session restore rejected");
                None
            }
        }
    }

    /// Best-effort liveness check of a restored session: the provider must
    /// still be present and must re-authorize the session's chain. The
    /// account address itself is not reconfirmed.
    pub async fn verify_existing_session(&self, session: &WalletSession) -> bool {
        let kind = session.wallet_type;
        let valid = match self.providers.get(kind) {
            None => {
                warn!(wallet = %kind, "wallet extension missing; restored session is invalid");
                false
            }
            Some(provider) => match provider.enable(&session.chain_id).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(wallet = %kind, error = %e, "wallet connection no longer valid");
                    false
                }
            },
        };

        let (action, next) = if valid {
            (SessionAction::Verified, Some(session.clone()))
        } else {
            (SessionAction::VerificationFailed, None)
        };

        let applied = self.transition_if(
            action,
            next,
            |s| s.phase == SessionPhase::Restoring && s.session.as_ref() == Some(session),
            || {
                if !valid {
                    self.forget_persisted();
                }
                Ok(())
            },
        );

        match applied {
            Ok(Some(_)) if !valid => {
                if self.options.notify_stale_session {
                    self.notifier.notify(Notice::session_expired(kind));
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!(wallet = %kind, valid, "ignoring verification result for a session no longer being restored");
            }
            Err(e) => warn!(error = %e, "verification result rejected"),
        }

        valid
    }

    /// Connects `kind` and reports success as a flag; every failure is
    /// surfaced as a notice and logged, never returned.
    pub async fn connect(&self, kind: ProviderKind) -> bool {
        match self.try_connect(kind).await {
            Ok(session) => {
                self.notifier.notify(Notice::connected(&session));
                true
            }
            Err(SessionError::ConnectInFlight) => {
                debug!(wallet = %kind, "connect ignored; another connection is in progress");
                false
            }
            Err(SessionError::ProviderMissing(kind)) => {
                warn!(wallet = %kind, "wallet extension not found");
                self.notifier.notify(Notice::provider_missing(kind));
                false
            }
            Err(e) => {
                error!(wallet = %kind, error = %e, "failed to connect wallet");
                self.notifier.notify(Notice::connect_failed(kind));
                false
            }
        }
    }

    /// Same flow as [`connect`](Self::connect) without notices. The record
    /// is saved as part of publishing the session, so a storage failure
    /// leaves both memory and storage untouched.
    pub async fn try_connect(&self, kind: ProviderKind) -> Result<WalletSession, SessionError> {
        let _guard = self.begin_connect()?;

        let provider = self
            .providers
            .get(kind)
            .ok_or(SessionError::ProviderMissing(kind))?;

        let chain_id = self.options.default_chain_id.clone();
        provider
            .enable(&chain_id)
            .await
            .map_err(SessionError::Provider)?;
        let signer = provider
            .offline_signer(&chain_id)
            .map_err(SessionError::Provider)?;
        let accounts = signer
            .get_accounts()
            .await
            .map_err(SessionError::Provider)?;

        let account = accounts
            .into_iter()
            .next()
            .ok_or(SessionError::NoAccounts(kind))?;
        let session = WalletSession::connected(account.address, chain_id, kind);
        if !session.is_complete() {
            return Err(SessionError::Provider(PortError::Validation(
                "account address is empty".to_owned(),
            )));
        }

        let record = serde_json::to_string(&session)?;
        self.transition(SessionAction::Connect, Some(session.clone()), || {
            self.store
                .save(&self.options.storage_key, &record)
                .map_err(SessionError::Storage)
        })?;

        info!(wallet = %kind, chain_id = %session.chain_id, address = %session.short_address(), "wallet connected");
        Ok(session)
    }

    /// Purely local: the extension is not told.
    pub fn disconnect(&self) {
        let result = self.transition(SessionAction::Disconnect, None, || {
            self.forget_persisted();
            Ok(())
        });
        if let Err(e) = result {
            warn!(error = %e, "disconnect transition rejected");
        }
        self.notifier.notify(Notice::disconnected());
    }

    /// Signing handle for the current session's provider, scoped to the
    /// session chain or `chain_id_override`.
    pub fn get_offline_signer(&self, chain_id_override: Option<&str>) -> Option<P::Signer> {
        let session = self.session()?;
        let Some(provider) = self.providers.get(session.wallet_type) else {
            debug!(wallet = %session.wallet_type, "offline signer requested for a missing provider");
            return None;
        };
        let chain_id = chain_id_override.unwrap_or(&session.chain_id);
        match provider.offline_signer(chain_id) {
            Ok(signer) => Some(signer),
            Err(e) => {
                error!(wallet = %session.wallet_type, chain_id, error = %e, "failed to get offline signer");
                None
            }
        }
    }

    fn begin_connect(&self) -> Result<ConnectGuard<'_>, SessionError> {
        let acquired = self.state.send_if_modified(|snapshot| {
            if snapshot.is_connecting {
                false
            } else {
                snapshot.is_connecting = true;
                true
            }
        });
        if !acquired {
            return Err(SessionError::ConnectInFlight);
        }
        Ok(ConnectGuard { state: &self.state })
    }

    fn forget_persisted(&self) {
        if let Err(e) = self.store.remove(&self.options.storage_key) {
            warn!(error = %e, "failed to remove saved wallet data");
        }
    }

    fn settle_without_session(&self) {
        let _ = self.transition_if(
            SessionAction::NoSavedSession,
            None,
            |s| s.phase == SessionPhase::Unknown,
            || Ok(()),
        );
    }

    fn transition(
        &self,
        action: SessionAction,
        next: Option<WalletSession>,
        persist: impl FnOnce() -> Result<(), SessionError>,
    ) -> Result<StateTransition, SessionError> {
        self.transition_if(action, next, |_| true, persist)?
            .ok_or_else(|| {
                SessionError::IllegalTransition(IllegalTransition {
                    from: self.phase(),
                    action,
                })
            })
    }

    /// Applies `action` atomically when `precondition` holds on the current
    /// snapshot. `Ok(None)` means the precondition did not hold.
    ///
    /// `persist` runs under the state lock after the transition is known to
    /// be legal and before it is published, so storage changes in the same
    /// order as the snapshot. If it fails nothing is published.
    fn transition_if(
        &self,
        action: SessionAction,
        next: Option<WalletSession>,
        precondition: impl FnOnce(&WalletSnapshot) -> bool,
        persist: impl FnOnce() -> Result<(), SessionError>,
    ) -> Result<Option<StateTransition>, SessionError> {
        let mut result: Result<Option<StateTransition>, SessionError> = Ok(None);
        self.state.send_if_modified(|snapshot| {
            if !precondition(snapshot) {
                return false;
            }
            let (to, transition) = match session_transition(snapshot.phase, action) {
                Ok(next_phase) => next_phase,
                Err(e) => {
                    result = Err(e.into());
                    return false;
                }
            };
            if let Err(e) = persist() {
                result = Err(e);
                return false;
            }
            snapshot.phase = to;
            snapshot.session = next;
            snapshot.last_transition = Some(transition.clone());
            result = Ok(Some(transition));
            true
        });

        if let Ok(Some(transition)) = &result {
            info!(
                from = ?transition.from,
                to = ?transition.to,
                action = ?transition.action,
                "wallet session transition"
            );
        }
        result
    }
}

/// Parses a persisted record, rejecting partially-connected states.
pub fn parse_record(raw: &str) -> Result<WalletSession, SessionError> {
    let session: WalletSession = serde_json::from_str(raw)?;
    if !session.is_complete() {
        return Err(SessionError::MalformedRecord(
            "record is not a fully connected session".to_owned(),
        ));
    }
    Ok(session)
}
