use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of the single wallet session.
///
/// `Restoring` means a persisted session was reinstated but its provider has
/// not confirmed it yet; consumers treat it as connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    Unknown,
    Restoring,
    Connected,
    Disconnected,
}

impl SessionPhase {
    pub fn is_connected(self) -> bool {
        matches!(self, SessionPhase::Restoring | SessionPhase::Connected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionAction {
    NoSavedSession,
    Restore,
    Verified,
    VerificationFailed,
    Connect,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: SessionPhase,
    pub to: SessionPhase,
    pub action: SessionAction,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal session transition: {from:?} --{action:?}-->")]
pub struct IllegalTransition {
    pub from: SessionPhase,
    pub action: SessionAction,
}

pub fn session_transition(
    from: SessionPhase,
    action: SessionAction,
) -> Result<(SessionPhase, StateTransition), IllegalTransition> {
    use SessionAction as A;
    use SessionPhase as S;

    let to = match (from, action) {
        (S::Unknown, A::NoSavedSession) => S::Disconnected,
        (S::Unknown, A::Restore) => S::Restoring,
        (S::Restoring, A::Verified) => S::Connected,
        (S::Restoring, A::VerificationFailed) => S::Disconnected,
        (_, A::Connect) => S::Connected,
        (_, A::Disconnect) => S::Disconnected,
        _ => return Err(IllegalTransition { from, action }),
    };

    Ok((to, StateTransition { from, to, action }))
}
