use omnia_wallet_core::{
    parse_record, shorten_address, Notice, NoticeVariant, ProviderKind, SessionError,
    WalletSession,
};

#[test]
fn session_record_uses_persisted_field_names() {
    let session = WalletSession::connected(
        "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu",
        "cosmoshub-4",
        ProviderKind::Keplr,
    );
    let value = serde_json::to_value(&session).expect("serialize session");

    assert_eq!(
        value,
        serde_json::json!({
            "address": "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu",
            "chainId": "cosmoshub-4",
            "walletType": "keplr",
            "isConnected": true
        })
    );
}

#[test]
fn leap_record_parses() {
    let raw = r#"{"address":"cosmos1leap","chainId":"cosmoshub-4","walletType":"leap","isConnected":true}"#;
    let session = parse_record(raw).expect("parse leap record");
    assert_eq!(session.wallet_type, ProviderKind::Leap);
    assert_eq!(session.address, "cosmos1leap");
}

#[test]
fn non_json_record_is_rejected() {
    let err = parse_record("{not json").expect_err("must fail");
    assert!(matches!(err, SessionError::Serialization(_)));
}

#[test]
fn unknown_wallet_type_is_rejected() {
    let raw = r#"{"address":"cosmos1x","chainId":"cosmoshub-4","walletType":"metamask","isConnected":true}"#;
    parse_record(raw).expect_err("unknown provider must fail");
}

#[test]
fn partially_connected_record_is_malformed() {
    let raw = r#"{"address":"","chainId":"cosmoshub-4","walletType":"keplr","isConnected":true}"#;
    let err = parse_record(raw).expect_err("empty address must fail");
    assert!(matches!(err, SessionError::MalformedRecord(_)));

    let raw = r#"{"address":"cosmos1x","chainId":"cosmoshub-4","walletType":"keplr","isConnected":false}"#;
    let err = parse_record(raw).expect_err("disconnected record must fail");
    assert!(matches!(err, SessionError::MalformedRecord(_)));
}

#[test]
fn address_is_shortened_to_head_and_tail() {
    assert_eq!(
        shorten_address("cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu"),
        "cosmos1q...v7xu"
    );
    assert_eq!(shorten_address("addr1"), "addr1");
}

#[test]
fn short_addresses_are_shown_whole() {
    assert_eq!(shorten_address("cosmos1abcde"), "cosmos1abcde");
    assert_eq!(shorten_address("cosmos1abcdef"), "cosmos1a...cdef");
    assert_eq!(shorten_address(""), "");
}

#[test]
fn notices_name_the_provider() {
    let missing = Notice::provider_missing(ProviderKind::Leap);
    assert_eq!(missing.title, "Leap wallet not found");
    assert!(missing.description.contains("install Leap wallet extension"));
    assert_eq!(missing.variant, NoticeVariant::Destructive);

    let failed = Notice::connect_failed(ProviderKind::Keplr);
    assert_eq!(failed.title, "Connection failed");
    assert!(failed.description.contains("Keplr"));

    let session = WalletSession::connected(
        "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu",
        "cosmoshub-4",
        ProviderKind::Keplr,
    );
    let connected = Notice::connected(&session);
    assert_eq!(connected.description, "Connected to cosmos1q...v7xu");
    assert!(!connected.is_destructive());
}
