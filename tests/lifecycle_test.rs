//! Transaction lifecycle transitions and conditional query enablement
//!
//! The lifecycle only moves on worker events in the expected order;
//! stray events are ignored. Queries are only issued when every
//! precondition holds, and late results for replaced inputs or a
//! dropped session are discarded.

use alloy_primitives::{Address, B256, U256};
use allowance_doctor::app::{App, ConnectionState, TxLifecycle};
use allowance_doctor::config::{ChainConfig, FileConfig, Overrides};
use allowance_doctor::infrastructure::runtime::{WalletCommand, WalletEvent};

const CONTRACT: &str = "0x1111111111111111111111111111111111111111";
const TOKEN: &str = "0x2222222222222222222222222222222222222222";
const OTHER_TOKEN: &str = "0x4444444444444444444444444444444444444444";
const SPENDER: &str = "0x3333333333333333333333333333333333333333";

fn config_with(token: Option<&str>, spender: Option<&str>, contract: Option<&str>) -> ChainConfig {
    ChainConfig::resolve(
        Overrides {
            token: token.map(str::to_string),
            spender: spender.map(str::to_string),
            contract: contract.map(str::to_string),
            ..Overrides::default()
        },
        FileConfig::default(),
    )
}

fn user() -> Address {
    Address::repeat_byte(0x42)
}

fn hash() -> B256 {
    B256::repeat_byte(0x99)
}

fn connected_app() -> App {
    let mut app = App::new(config_with(Some(TOKEN), Some(SPENDER), Some(CONTRACT)));
    app.apply_event(WalletEvent::Connected {
        address: user(),
        chain_id: 11_155_111,
    });
    app.take_commands();
    app
}

// ----- lifecycle -----

#[test]
fn happy_path_walks_idle_to_confirmed() {
    let mut app = connected_app();

    app.request_mark_cleaned();
    assert_eq!(app.tx, TxLifecycle::Submitting);

    app.apply_event(WalletEvent::TxSubmitted { hash: hash() });
    assert_eq!(app.tx, TxLifecycle::Confirming { hash: hash() });
    assert_eq!(app.last_tx_hash, Some(hash()));

    app.apply_event(WalletEvent::TxConfirmed { hash: hash() });
    assert_eq!(app.tx, TxLifecycle::Confirmed { hash: hash() });
    assert!(app.can_mark_cleaned());
}

#[test]
fn broadcast_failure_lands_in_failed() {
    let mut app = connected_app();
    app.request_mark_cleaned();

    app.apply_event(WalletEvent::TxFailed {
        message: "transaction failed: nonce too low".to_string(),
    });

    assert!(matches!(app.tx, TxLifecycle::Failed { .. }));
    assert!(app.can_mark_cleaned(), "a failed write unlocks the control");
}

#[test]
fn receipt_failure_lands_in_failed() {
    let mut app = connected_app();
    app.request_mark_cleaned();
    app.apply_event(WalletEvent::TxSubmitted { hash: hash() });

    app.apply_event(WalletEvent::TxFailed {
        message: "transaction failed: transaction reverted on-chain".to_string(),
    });

    assert!(matches!(app.tx, TxLifecycle::Failed { .. }));
    // The hash of the attempt stays visible for the explorer link.
    assert_eq!(app.last_tx_hash, Some(hash()));
}

#[test]
fn stray_lifecycle_events_are_ignored() {
    let mut app = connected_app();

    app.apply_event(WalletEvent::TxConfirmed { hash: hash() });
    assert_eq!(app.tx, TxLifecycle::Idle);

    app.apply_event(WalletEvent::TxSubmitted { hash: hash() });
    assert_eq!(app.tx, TxLifecycle::Idle);
    assert_eq!(app.last_tx_hash, None);
}

// ----- query enablement -----

#[test]
fn no_queries_without_any_valid_input() {
    let mut app = App::new(config_with(None, None, Some(CONTRACT)));
    app.refresh_queries();
    assert!(app.take_commands().is_empty());
}

#[test]
fn valid_token_alone_only_fetches_metadata() {
    let mut app = App::new(config_with(Some(TOKEN), None, Some(CONTRACT)));
    app.refresh_queries();

    let commands = app.take_commands();
    assert_eq!(
        commands,
        vec![WalletCommand::FetchTokenMeta {
            token: TOKEN.parse().unwrap()
        }]
    );
}

#[test]
fn malformed_input_suppresses_the_query() {
    let mut app = App::new(config_with(None, None, Some(CONTRACT)));
    app.token_input = "0x1234".to_string();
    app.refresh_queries();

    assert!(app.token_input_invalid());
    assert!(app.take_commands().is_empty());
}

#[test]
fn connecting_enables_the_full_query_set() {
    let mut app = App::new(config_with(Some(TOKEN), Some(SPENDER), Some(CONTRACT)));
    app.apply_event(WalletEvent::Connected {
        address: user(),
        chain_id: 11_155_111,
    });

    let commands = app.take_commands();
    assert_eq!(
        commands,
        vec![
            WalletCommand::FetchTokenMeta {
                token: TOKEN.parse().unwrap()
            },
            WalletCommand::FetchAllowance {
                token: TOKEN.parse().unwrap(),
                owner: user(),
                spender: SPENDER.parse().unwrap(),
            },
            WalletCommand::FetchCleanRecord { user: user() },
        ]
    );
}

#[test]
fn hygiene_read_needs_a_configured_contract() {
    let mut app = App::new(config_with(Some(TOKEN), Some(SPENDER), None));
    app.apply_event(WalletEvent::Connected {
        address: user(),
        chain_id: 11_155_111,
    });

    let commands = app.take_commands();
    assert!(commands
        .iter()
        .all(|cmd| !matches!(cmd, WalletCommand::FetchCleanRecord { .. })));
}

// ----- stale results -----

#[test]
fn allowance_for_a_replaced_token_is_dropped() {
    let mut app = connected_app();

    app.token_input = OTHER_TOKEN.to_string();
    app.apply_event(WalletEvent::AllowanceReady {
        token: TOKEN.parse().unwrap(),
        spender: SPENDER.parse().unwrap(),
        allowance: U256::from(7u64),
    });

    assert_eq!(app.allowance, None);
}

#[test]
fn clean_record_for_another_account_is_dropped() {
    let mut app = connected_app();

    app.apply_event(WalletEvent::CleanRecordReady {
        user: Address::repeat_byte(0x0f),
        has_cleaned_once: true,
        last_cleaned_at: 1_700_000_000,
    });

    assert_eq!(app.has_cleaned_once, None);
    assert_eq!(app.last_cleaned_at, None);
}

#[test]
fn disconnect_clears_account_keyed_results() {
    let mut app = connected_app();
    app.apply_event(WalletEvent::AllowanceReady {
        token: TOKEN.parse().unwrap(),
        spender: SPENDER.parse().unwrap(),
        allowance: U256::from(7u64),
    });
    app.apply_event(WalletEvent::CleanRecordReady {
        user: user(),
        has_cleaned_once: true,
        last_cleaned_at: 1_700_000_000,
    });

    app.apply_event(WalletEvent::Disconnected);

    assert_eq!(app.connection, ConnectionState::Disconnected);
    assert_eq!(app.allowance, None);
    assert_eq!(app.has_cleaned_once, None);
    assert_eq!(app.last_cleaned_at, None);

    // A read that was in flight when the session dropped is not rendered.
    app.apply_event(WalletEvent::AllowanceReady {
        token: TOKEN.parse().unwrap(),
        spender: SPENDER.parse().unwrap(),
        allowance: U256::from(9u64),
    });
    assert_eq!(app.allowance, None);
}
