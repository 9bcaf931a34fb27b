//! Runtime bridge - connects the sync TUI thread with the async worker
//!
//! The TUI never blocks on the network: it sends [`WalletCommand`]s over
//! a channel and drains [`WalletEvent`]s once per frame. The worker
//! thread owns a tokio runtime and the alloy provider.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use alloy_primitives::{Address, B256, U256};
use thiserror::Error;
use tokio::runtime::Runtime;

use crate::config::ChainConfig;
use crate::infrastructure::runtime::worker::run_async_worker;

/// User-visible failure categories. Everything renders as inline text;
/// nothing here aborts the process.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("hygiene log contract address is not configured")]
    Configuration,

    #[error("no wallet connected")]
    NotConnected,

    #[error("wallet connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl WalletError {
    /// Pass the transport's message through verbatim, with a generic
    /// fallback when it has none.
    pub fn query(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            WalletError::Query("unknown query failure".to_string())
        } else {
            WalletError::Query(message)
        }
    }
}

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCommand {
    /// Load the configured signer and establish a wallet session
    Connect,
    /// Drop the wallet session
    Disconnect,
    /// Read symbol/decimals for a token
    FetchTokenMeta { token: Address },
    /// Read allowance(owner, spender) on a token
    FetchAllowance {
        token: Address,
        owner: Address,
        spender: Address,
    },
    /// Read the hygiene record for an account
    FetchCleanRecord { user: Address },
    /// Submit markCleaned() and wait for its receipt
    MarkCleaned,
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
    /// Wallet session established
    Connected { address: Address, chain_id: u64 },
    /// Connection attempt failed
    ConnectFailed { message: String },
    /// Wallet session dropped
    Disconnected,
    /// Token metadata; either field may be absent if its read failed
    TokenMetaReady {
        token: Address,
        symbol: Option<String>,
        decimals: Option<u8>,
    },
    /// Allowance read result
    AllowanceReady {
        token: Address,
        spender: Address,
        allowance: U256,
    },
    /// Allowance read failed
    AllowanceFailed { message: String },
    /// Hygiene record read result
    CleanRecordReady {
        user: Address,
        has_cleaned_once: bool,
        last_cleaned_at: u64,
    },
    /// markCleaned() broadcast, receipt wait started
    TxSubmitted { hash: B256 },
    /// Receipt arrived with success status
    TxConfirmed { hash: B256 },
    /// Broadcast or receipt wait failed
    TxFailed { message: String },
    /// Any other failure
    Error { message: String },
}

/// Bridge between the sync TUI thread and the async tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<WalletCommand>,
    evt_rx: Receiver<WalletEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread with its own tokio runtime.
    pub fn new(config: ChainConfig) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WalletCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<WalletEvent>();

        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    let _ = evt_tx.send(WalletEvent::Error {
                        message: format!("Failed to start async runtime: {err}"),
                    });
                    return;
                }
            };
            rt.block_on(async {
                if let Err(err) = run_async_worker(config, cmd_rx, evt_tx.clone()).await {
                    let _ = evt_tx.send(WalletEvent::Error {
                        message: format!("Worker exited: {err:#}"),
                    });
                }
            });
        });

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: WalletCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<WalletEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WalletCommand::Shutdown);
    }
}
