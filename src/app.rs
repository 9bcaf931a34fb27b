//! Application state and the guard logic around the one write action
//!
//! Everything here is synchronous state manipulation: the event loop
//! feeds key presses and worker events in, and drains queued
//! [`WalletCommand`]s out. Display values are derived on every render
//! from the latest query results; nothing is cached beyond them.

use std::time::{Duration, Instant};

use alloy_primitives::{Address, B256, U256};

use crate::config::ChainConfig;
use crate::domain::address;
use crate::domain::format;
use crate::domain::risk::{self, RiskBucket};
use crate::infrastructure::runtime::{WalletCommand, WalletError, WalletEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Token,
    Spender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing(InputField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected { address: Address },
}

impl ConnectionState {
    pub fn address(&self) -> Option<Address> {
        match self {
            ConnectionState::Connected { address } => Some(*address),
            _ => None,
        }
    }
}

/// Lifecycle of the single outstanding markCleaned transaction.
///
/// Transitions are driven only by worker events: broadcast success moves
/// `Submitting` to `Confirming`, the receipt moves `Confirming` to
/// `Confirmed`, and a failure at either stage lands in `Failed`. Stray
/// events for states we are not in are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxLifecycle {
    Idle,
    Submitting,
    Confirming { hash: B256 },
    Confirmed { hash: B256 },
    Failed { message: String },
}

impl TxLifecycle {
    pub fn in_flight(&self) -> bool {
        matches!(self, TxLifecycle::Submitting | TxLifecycle::Confirming { .. })
    }

    fn submitted(&mut self, hash: B256) -> bool {
        if matches!(self, TxLifecycle::Submitting) {
            *self = TxLifecycle::Confirming { hash };
            true
        } else {
            false
        }
    }

    fn confirmed(&mut self, hash: B256) -> bool {
        if matches!(self, TxLifecycle::Confirming { .. }) {
            *self = TxLifecycle::Confirmed { hash };
            true
        } else {
            false
        }
    }

    fn failed(&mut self, message: String) -> bool {
        if self.in_flight() {
            *self = TxLifecycle::Failed { message };
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

pub struct App {
    pub config: ChainConfig,
    pub token_input: String,
    pub spender_input: String,
    pub focus: InputField,
    pub input_mode: InputMode,
    pub connection: ConnectionState,
    /// Chain id reported by the node at connect time.
    pub chain_id: Option<u64>,
    pub connect_error: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub allowance: Option<U256>,
    pub allowance_error: Option<String>,
    pub allowance_loading: bool,
    pub has_cleaned_once: Option<bool>,
    pub last_cleaned_at: Option<u64>,
    pub tx: TxLifecycle,
    /// Hash of the most recent broadcast, kept for the explorer link
    /// even after a failed receipt wait.
    pub last_tx_hash: Option<B256>,
    /// Confirmation modal for marking cleaned while allowance is nonzero.
    pub confirm_open: bool,
    pub help_open: bool,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
    pending_commands: Vec<WalletCommand>,
}

impl App {
    pub fn new(config: ChainConfig) -> Self {
        let token_input = config.default_token.clone().unwrap_or_default();
        let spender_input = config.default_spender.clone().unwrap_or_default();
        Self {
            config,
            token_input,
            spender_input,
            focus: InputField::Token,
            input_mode: InputMode::Normal,
            connection: ConnectionState::Disconnected,
            chain_id: None,
            connect_error: None,
            symbol: None,
            decimals: None,
            allowance: None,
            allowance_error: None,
            allowance_loading: false,
            has_cleaned_once: None,
            last_cleaned_at: None,
            tx: TxLifecycle::Idle,
            last_tx_hash: None,
            confirm_open: false,
            help_open: false,
            status: None,
            should_quit: false,
            pending_commands: Vec::new(),
        }
    }

    /// Drain queued commands for the runtime bridge.
    pub fn take_commands(&mut self) -> Vec<WalletCommand> {
        std::mem::take(&mut self.pending_commands)
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(5) {
                self.status = None;
            }
        }
    }

    // ----- derived view state -----

    pub fn normalized_token(&self) -> Option<Address> {
        address::normalize(&self.token_input)
    }

    pub fn normalized_spender(&self) -> Option<Address> {
        address::normalize(&self.spender_input)
    }

    /// Non-empty input that does not parse renders an inline format error.
    pub fn token_input_invalid(&self) -> bool {
        !self.token_input.is_empty() && self.normalized_token().is_none()
    }

    pub fn spender_input_invalid(&self) -> bool {
        !self.spender_input.is_empty() && self.normalized_spender().is_none()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected { .. })
    }

    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or("TOKEN")
    }

    pub fn display_decimals(&self) -> u8 {
        self.decimals.unwrap_or(18)
    }

    /// Decimal-scaled allowance, falling back to the raw integer form if
    /// scaling is not possible. Never panics.
    pub fn formatted_allowance(&self) -> String {
        match self.allowance {
            None => "-".to_string(),
            Some(amount) => format::format_units(amount, self.display_decimals())
                .unwrap_or_else(|| amount.to_string()),
        }
    }

    pub fn risk(&self) -> RiskBucket {
        risk::classify(self.allowance, self.display_decimals())
    }

    /// True when the connected node reports a different chain than the
    /// configured one.
    pub fn chain_mismatch(&self) -> bool {
        matches!(self.chain_id, Some(id) if id != self.config.chain_id)
    }

    pub fn formatted_last_cleaned(&self) -> String {
        format::format_timestamp(self.last_cleaned_at)
    }

    /// Explorer page for the most recent transaction, if any.
    pub fn explorer_tx_url(&self) -> Option<String> {
        self.last_tx_hash
            .map(|hash| self.config.tx_url(&hash.to_string()))
    }

    /// The mark-cleaned control is unavailable while disconnected or
    /// while a previous write is still outstanding.
    pub fn can_mark_cleaned(&self) -> bool {
        self.is_connected() && !self.tx.in_flight()
    }

    // ----- connection -----

    pub fn request_connect(&mut self) {
        match self.connection {
            ConnectionState::Connected { .. } => {
                self.set_status("Wallet already connected", StatusLevel::Info);
            }
            ConnectionState::Connecting => {}
            ConnectionState::Disconnected => {
                self.connection = ConnectionState::Connecting;
                self.connect_error = None;
                self.pending_commands.push(WalletCommand::Connect);
            }
        }
    }

    pub fn request_disconnect(&mut self) {
        if self.is_connected() {
            self.pending_commands.push(WalletCommand::Disconnect);
        }
    }

    // ----- input editing -----

    pub fn start_editing(&mut self, field: InputField) {
        self.focus = field;
        self.input_mode = InputMode::Editing(field);
    }

    /// Leave edit mode and re-run whatever queries the new inputs enable.
    pub fn stop_editing(&mut self) {
        if matches!(self.input_mode, InputMode::Editing(_)) {
            self.input_mode = InputMode::Normal;
            self.refresh_queries();
        }
    }

    pub fn input_char(&mut self, ch: char) {
        let InputMode::Editing(field) = self.input_mode else {
            return;
        };
        let buf = self.input_buffer_mut(field);
        buf.push(ch);
        // Inputs are kept trimmed on every edit.
        *buf = buf.trim().to_string();
    }

    pub fn input_backspace(&mut self) {
        let InputMode::Editing(field) = self.input_mode else {
            return;
        };
        self.input_buffer_mut(field).pop();
    }

    fn input_buffer_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::Token => &mut self.token_input,
            InputField::Spender => &mut self.spender_input,
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            InputField::Token => InputField::Spender,
            InputField::Spender => InputField::Token,
        };
    }

    // ----- queries -----

    /// Issue every read whose preconditions hold. Queries with missing
    /// preconditions are not issued at all; their results stay absent
    /// and the UI renders a placeholder.
    pub fn refresh_queries(&mut self) {
        let token = self.normalized_token();
        let spender = self.normalized_spender();
        let account = self.connection.address();

        if token.is_none() {
            self.symbol = None;
            self.decimals = None;
        }
        self.allowance_error = None;

        match (token, spender, account) {
            (Some(token), Some(spender), Some(owner)) => {
                self.allowance_loading = true;
                self.pending_commands
                    .push(WalletCommand::FetchTokenMeta { token });
                self.pending_commands.push(WalletCommand::FetchAllowance {
                    token,
                    owner,
                    spender,
                });
            }
            (Some(token), _, _) => {
                self.allowance = None;
                self.allowance_loading = false;
                self.pending_commands
                    .push(WalletCommand::FetchTokenMeta { token });
            }
            _ => {
                self.allowance = None;
                self.allowance_loading = false;
            }
        }

        if let (Some(user), Some(_)) = (account, self.config.contract_address.as_ref()) {
            self.pending_commands
                .push(WalletCommand::FetchCleanRecord { user });
        }
    }

    // ----- mark cleaned -----

    /// Guard sequence for the one state-changing action, evaluated
    /// synchronously on the key event.
    pub fn request_mark_cleaned(&mut self) {
        if self.tx.in_flight() {
            return;
        }
        if self.config.contract_address.is_none() {
            self.set_status(WalletError::Configuration.to_string(), StatusLevel::Error);
            return;
        }
        if !self.is_connected() {
            self.set_status(WalletError::NotConnected.to_string(), StatusLevel::Error);
            return;
        }
        // A nonzero allowance means the user is about to record a cleanup
        // that has not actually happened; ask first.
        if matches!(self.allowance, Some(amount) if !amount.is_zero()) {
            self.confirm_open = true;
            return;
        }
        self.dispatch_mark_cleaned();
    }

    /// Resolve the confirmation modal. Declining is a silent no-op.
    pub fn resolve_confirm(&mut self, accepted: bool) {
        if !self.confirm_open {
            return;
        }
        self.confirm_open = false;
        if accepted {
            self.dispatch_mark_cleaned();
        }
    }

    fn dispatch_mark_cleaned(&mut self) {
        self.tx = TxLifecycle::Submitting;
        self.pending_commands.push(WalletCommand::MarkCleaned);
    }

    // ----- worker events -----

    pub fn apply_event(&mut self, event: WalletEvent) {
        match event {
            WalletEvent::Connected { address, chain_id } => {
                self.connection = ConnectionState::Connected { address };
                self.chain_id = Some(chain_id);
                self.connect_error = None;
                self.set_status(
                    format!(
                        "Connected as {}",
                        format::shorten_address(&address.to_string())
                    ),
                    StatusLevel::Info,
                );
                self.refresh_queries();
            }
            WalletEvent::ConnectFailed { message } => {
                self.connection = ConnectionState::Disconnected;
                self.connect_error = Some(message.clone());
                self.set_status(message, StatusLevel::Error);
            }
            WalletEvent::Disconnected => {
                self.connection = ConnectionState::Disconnected;
                self.chain_id = None;
                // Account-keyed results are meaningless now; anything
                // still in flight will be dropped on arrival.
                self.allowance = None;
                self.allowance_error = None;
                self.allowance_loading = false;
                self.has_cleaned_once = None;
                self.last_cleaned_at = None;
                self.set_status("Wallet disconnected", StatusLevel::Info);
            }
            WalletEvent::TokenMetaReady {
                token,
                symbol,
                decimals,
            } => {
                // Ignore results for a token the user has since replaced.
                if self.normalized_token() == Some(token) {
                    self.symbol = symbol;
                    self.decimals = decimals;
                }
            }
            WalletEvent::AllowanceReady {
                token,
                spender,
                allowance,
            } => {
                let current = (self.normalized_token(), self.normalized_spender());
                if current == (Some(token), Some(spender)) && self.is_connected() {
                    self.allowance = Some(allowance);
                    self.allowance_error = None;
                    self.allowance_loading = false;
                }
            }
            WalletEvent::AllowanceFailed { message } => {
                if self.is_connected() {
                    self.allowance = None;
                    self.allowance_error = Some(message);
                    self.allowance_loading = false;
                }
            }
            WalletEvent::CleanRecordReady {
                user,
                has_cleaned_once,
                last_cleaned_at,
            } => {
                if self.connection.address() == Some(user) {
                    self.has_cleaned_once = Some(has_cleaned_once);
                    self.last_cleaned_at = Some(last_cleaned_at);
                }
            }
            WalletEvent::TxSubmitted { hash } => {
                if self.tx.submitted(hash) {
                    self.last_tx_hash = Some(hash);
                    self.set_status("Transaction submitted, waiting for receipt", StatusLevel::Info);
                }
            }
            WalletEvent::TxConfirmed { hash } => {
                if self.tx.confirmed(hash) {
                    self.set_status(
                        "Cleanup record confirmed on-chain; refresh to re-read state",
                        StatusLevel::Info,
                    );
                }
            }
            WalletEvent::TxFailed { message } => {
                if self.tx.failed(message.clone()) {
                    self.set_status(message, StatusLevel::Error);
                }
            }
            WalletEvent::Error { message } => {
                self.set_status(message, StatusLevel::Error);
            }
        }
    }
}
