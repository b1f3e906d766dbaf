pub mod domain;
pub mod manager;
pub mod ports;
pub mod state_machine;

pub use domain::{
    shorten_address, Notice, NoticeVariant, ProviderKind, SessionOptions, WalletAccount,
    WalletSession, DEFAULT_CHAIN_ID, DEFAULT_STORAGE_KEY,
};
pub use manager::{parse_record, SessionError, WalletSessionManager, WalletSnapshot};
pub use ports::{
    NotifierPort, OfflineSignerPort, PortError, ProviderSet, SessionStorePort, WalletProviderPort,
};
pub use state_machine::{
    session_transition, IllegalTransition, SessionAction, SessionPhase, StateTransition,
};
