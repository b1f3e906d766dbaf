use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAIN_ID: &str = "cosmoshub-4";
pub const DEFAULT_STORAGE_KEY: &str = "omniaWallet";

/// Browser-injected Cosmos wallet extensions the manager can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Keplr,
    Leap,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Keplr, ProviderKind::Leap];

    /// Name of the `window` global the extension injects.
    pub fn global_name(self) -> &'static str {
        match self {
            ProviderKind::Keplr => "keplr",
            ProviderKind::Leap => "leap",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Keplr => "Keplr",
            ProviderKind::Leap => "Leap",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The single connected-wallet record, persisted verbatim as
/// `{address, chainId, walletType, isConnected}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub address: String,
    pub chain_id: String,
    pub wallet_type: ProviderKind,
    pub is_connected: bool,
}

impl WalletSession {
    pub fn connected(
        address: impl Into<String>,
        chain_id: impl Into<String>,
        wallet_type: ProviderKind,
    ) -> Self {
        Self {
            address: address.into(),
            chain_id: chain_id.into(),
            wallet_type,
            is_connected: true,
        }
    }

    /// A record is usable only when fully connected; anything else is a
    /// partial state that must not be restored.
    pub fn is_complete(&self) -> bool {
        self.is_connected && !self.address.trim().is_empty() && !self.chain_id.trim().is_empty()
    }

    /// `cosmos1a...wxyz` style: first 8 and last 4 characters.
    pub fn short_address(&self) -> String {
        shorten_address(&self.address)
    }
}

pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_owned();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: String,
    pub algo: String,
    #[serde(default)]
    pub pubkey: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Transient user-visible message (a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn provider_missing(kind: ProviderKind) -> Self {
        Self {
            title: format!("{kind} wallet not found"),
            description: format!(
                "Please install {kind} wallet extension and refresh the page."
            ),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn connect_failed(kind: ProviderKind) -> Self {
        Self {
            title: "Connection failed".to_owned(),
            description: format!("Failed to connect to {kind} wallet. Please try again."),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn connected(session: &WalletSession) -> Self {
        Self {
            title: "Wallet connected".to_owned(),
            description: format!("Connected to {}", session.short_address()),
            variant: NoticeVariant::Default,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            title: "Wallet disconnected".to_owned(),
            description: "You've been disconnected from your wallet.".to_owned(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn session_expired(kind: ProviderKind) -> Self {
        Self {
            title: "Wallet session expired".to_owned(),
            description: format!(
                "Your {kind} wallet no longer authorizes this session. Please connect again."
            ),
            variant: NoticeVariant::Default,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

/// Manager settings that are not tied to a particular adapter runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub default_chain_id: String,
    pub storage_key: String,
    pub notify_stale_session: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_chain_id: DEFAULT_CHAIN_ID.to_owned(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            notify_stale_session: false,
        }
    }
}
