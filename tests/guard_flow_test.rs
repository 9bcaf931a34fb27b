//! Guard sequence around the mark-cleaned action
//!
//! The write must be blocked by missing configuration, by a missing
//! wallet session, and by an undismissed confirmation when the
//! allowance is nonzero. Declining the confirmation is a silent no-op.

use alloy_primitives::{Address, U256};
use allowance_doctor::app::{App, StatusLevel, TxLifecycle};
use allowance_doctor::config::{ChainConfig, FileConfig, Overrides};
use allowance_doctor::infrastructure::runtime::{WalletCommand, WalletEvent};

const CONTRACT: &str = "0x1111111111111111111111111111111111111111";
const TOKEN: &str = "0x2222222222222222222222222222222222222222";
const SPENDER: &str = "0x3333333333333333333333333333333333333333";

fn test_config(with_contract: bool) -> ChainConfig {
    ChainConfig::resolve(
        Overrides {
            contract: with_contract.then(|| CONTRACT.to_string()),
            token: Some(TOKEN.to_string()),
            spender: Some(SPENDER.to_string()),
            ..Overrides::default()
        },
        FileConfig::default(),
    )
}

fn user() -> Address {
    Address::repeat_byte(0x42)
}

fn connected_app(with_contract: bool) -> App {
    let mut app = App::new(test_config(with_contract));
    app.apply_event(WalletEvent::Connected {
        address: user(),
        chain_id: 11_155_111,
    });
    // Drop the query burst triggered by connecting.
    app.take_commands();
    app.status = None;
    app
}

fn seed_allowance(app: &mut App, amount: u64) {
    app.apply_event(WalletEvent::AllowanceReady {
        token: TOKEN.parse().unwrap(),
        spender: SPENDER.parse().unwrap(),
        allowance: U256::from(amount),
    });
}

#[test]
fn missing_contract_blocks_the_write() {
    let mut app = connected_app(false);
    app.request_mark_cleaned();

    assert!(app.take_commands().is_empty());
    assert_eq!(app.tx, TxLifecycle::Idle);
    let (text, level) = app.status_text().expect("configuration error surfaced");
    assert!(text.contains("not configured"), "got: {text}");
    assert_eq!(level, StatusLevel::Error);
}

#[test]
fn disconnected_wallet_blocks_the_write() {
    let mut app = App::new(test_config(true));
    app.request_mark_cleaned();

    assert!(app.take_commands().is_empty());
    assert_eq!(app.tx, TxLifecycle::Idle);
    let (text, level) = app.status_text().expect("connection error surfaced");
    assert!(text.contains("no wallet connected"), "got: {text}");
    assert_eq!(level, StatusLevel::Error);
}

#[test]
fn nonzero_allowance_asks_for_confirmation_first() {
    let mut app = connected_app(true);
    seed_allowance(&mut app, 500);

    app.request_mark_cleaned();

    assert!(app.confirm_open);
    assert!(app.take_commands().is_empty());
    assert_eq!(app.tx, TxLifecycle::Idle);
}

#[test]
fn declining_the_confirmation_is_a_silent_noop() {
    let mut app = connected_app(true);
    seed_allowance(&mut app, 500);

    app.request_mark_cleaned();
    app.take_commands();
    app.resolve_confirm(false);

    assert!(!app.confirm_open);
    assert!(app.take_commands().is_empty());
    assert_eq!(app.tx, TxLifecycle::Idle);
    assert!(app.status_text().is_none(), "decline must not set an error");
}

#[test]
fn accepting_the_confirmation_sends_the_write() {
    let mut app = connected_app(true);
    seed_allowance(&mut app, 500);

    app.request_mark_cleaned();
    app.resolve_confirm(true);

    assert_eq!(app.take_commands(), vec![WalletCommand::MarkCleaned]);
    assert_eq!(app.tx, TxLifecycle::Submitting);
}

#[test]
fn zero_allowance_skips_the_confirmation() {
    let mut app = connected_app(true);
    seed_allowance(&mut app, 0);

    app.request_mark_cleaned();

    assert!(!app.confirm_open);
    assert_eq!(app.take_commands(), vec![WalletCommand::MarkCleaned]);
    assert_eq!(app.tx, TxLifecycle::Submitting);
}

#[test]
fn unknown_allowance_skips_the_confirmation() {
    // Guard three only fires when the allowance is known and positive.
    let mut app = connected_app(true);

    app.request_mark_cleaned();

    assert!(!app.confirm_open);
    assert_eq!(app.take_commands(), vec![WalletCommand::MarkCleaned]);
}

#[test]
fn no_second_write_while_one_is_outstanding() {
    let mut app = connected_app(true);
    seed_allowance(&mut app, 0);

    app.request_mark_cleaned();
    app.take_commands();
    assert!(app.tx.in_flight());
    assert!(!app.can_mark_cleaned());

    app.request_mark_cleaned();
    assert!(app.take_commands().is_empty());
}
