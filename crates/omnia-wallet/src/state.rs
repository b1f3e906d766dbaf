//! Shell-side view state derived from the session manager.

use omnia_wallet_core::{Notice, SessionPhase, WalletSnapshot};

/// How long a notice stays on screen, in seconds.
pub const TOAST_TTL_SECS: f64 = 4.0;

/// Connection state as shown in the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Startup restore has not finished yet.
    Checking,
    Disconnected,
    Connecting,
    /// A saved session is shown while the wallet re-confirms it.
    Verifying,
    Connected,
}

impl ConnectionStatus {
    pub fn from_snapshot(snapshot: &WalletSnapshot) -> Self {
        if snapshot.is_connecting {
            return Self::Connecting;
        }
        match snapshot.phase {
            SessionPhase::Unknown => Self::Checking,
            SessionPhase::Restoring => Self::Verifying,
            SessionPhase::Connected => Self::Connected,
            SessionPhase::Disconnected => Self::Disconnected,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Checking => "Checking saved session",
            Self::Disconnected => "Not connected",
            Self::Connecting => "Connecting",
            Self::Verifying => "Verifying saved session",
            Self::Connected => "Connected",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Checking | Self::Connecting | Self::Verifying)
    }
}

/// A notice queued for display with the time it appeared.
#[derive(Clone, Debug)]
pub struct ShellToast {
    pub notice: Notice,
    pub shown_at: f64,
}

impl ShellToast {
    pub fn new(notice: Notice, now: f64) -> Self {
        Self {
            notice,
            shown_at: now,
        }
    }

    pub fn expired(&self, now: f64) -> bool {
        now - self.shown_at >= TOAST_TTL_SECS
    }
}

/// Result of asking the active wallet for its offline signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignerCheck {
    NoSession,
    Ready {
        chain_id: String,
        accounts: usize,
    },
    Failed {
        chain_id: String,
        error: String,
    },
}

pub fn prune_toasts(toasts: &mut Vec<ShellToast>, now: f64) {
    toasts.retain(|t| !t.expired(now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnia_wallet_core::{ProviderKind, WalletSession};

    fn snapshot(phase: SessionPhase, is_connecting: bool) -> WalletSnapshot {
        WalletSnapshot {
            session: Some(WalletSession::connected(
                "cosmos1abc",
                "cosmoshub-4",
                ProviderKind::Keplr,
            )),
            phase,
            is_connecting,
            last_transition: None,
        }
    }

    #[test]
    fn connecting_flag_wins_over_phase() {
        let status = ConnectionStatus::from_snapshot(&snapshot(SessionPhase::Connected, true));
        assert_eq!(status, ConnectionStatus::Connecting);
        assert!(status.is_busy());
    }

    #[test]
    fn phases_map_to_header_status() {
        let cases = [
            (SessionPhase::Unknown, ConnectionStatus::Checking),
            (SessionPhase::Restoring, ConnectionStatus::Verifying),
            (SessionPhase::Connected, ConnectionStatus::Connected),
            (SessionPhase::Disconnected, ConnectionStatus::Disconnected),
        ];
        for (phase, expected) in cases {
            assert_eq!(ConnectionStatus::from_snapshot(&snapshot(phase, false)), expected);
        }
    }

    #[test]
    fn toasts_expire_after_ttl() {
        let mut toasts = vec![
            ShellToast::new(Notice::disconnected(), 0.0),
            ShellToast::new(Notice::disconnected(), 3.0),
        ];
        prune_toasts(&mut toasts, TOAST_TTL_SECS + 0.5);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].shown_at, 3.0);
    }
}
