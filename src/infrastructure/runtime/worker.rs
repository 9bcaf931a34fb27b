//! Async worker - owns the provider and serves chain operations
//!
//! Reads go through a signerless HTTP client available from startup.
//! The write path only exists once a wallet session is established by a
//! Connect command. Long-running operations are spawned so a slow query
//! never delays the command loop.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::ChainConfig;
use crate::domain::address;
use crate::infrastructure::ethereum::{AlloyClient, ChainClient};
use crate::infrastructure::runtime::bridge::{WalletCommand, WalletError, WalletEvent};

/// An established wallet session: the signing client plus the account
/// it signs for. Cloned into spawned tasks.
#[derive(Clone)]
struct WalletSession {
    address: Address,
    client: Arc<dyn ChainClient>,
}

/// Run the async worker loop
pub async fn run_async_worker(
    config: ChainConfig,
    cmd_rx: Receiver<WalletCommand>,
    evt_tx: Sender<WalletEvent>,
) -> Result<()> {
    let reader: Arc<dyn ChainClient> = Arc::new(AlloyClient::connect_http(&config.rpc_url)?);
    let contract = config
        .contract_address
        .as_deref()
        .and_then(address::normalize);
    let mut session: Option<WalletSession> = None;

    info!(rpc = %config.rpc_url, "worker started");

    loop {
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                WalletCommand::Shutdown => return Ok(()),

                WalletCommand::Connect => {
                    match establish_session(&config).await {
                        Ok((new_session, chain_id)) => {
                            info!(address = %new_session.address, chain_id, "wallet session established");
                            let _ = evt_tx.send(WalletEvent::Connected {
                                address: new_session.address,
                                chain_id,
                            });
                            session = Some(new_session);
                        }
                        Err(err) => {
                            error!("wallet connection failed: {err:#}");
                            let _ = evt_tx.send(WalletEvent::ConnectFailed {
                                message: WalletError::Connection(format!("{err:#}")).to_string(),
                            });
                        }
                    }
                }

                WalletCommand::Disconnect => {
                    session = None;
                    info!("wallet session closed");
                    let _ = evt_tx.send(WalletEvent::Disconnected);
                }

                WalletCommand::FetchTokenMeta { token } => {
                    let client = Arc::clone(&reader);
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        // symbol/decimals fail independently; an absent
                        // field just renders as the fallback.
                        let symbol = client.token_symbol(token).await.ok();
                        let decimals = client.token_decimals(token).await.ok();
                        let _ = evt_tx.send(WalletEvent::TokenMetaReady {
                            token,
                            symbol,
                            decimals,
                        });
                    });
                }

                WalletCommand::FetchAllowance {
                    token,
                    owner,
                    spender,
                } => {
                    let client = Arc::clone(&reader);
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        match client.allowance(token, owner, spender).await {
                            Ok(allowance) => {
                                let _ = evt_tx.send(WalletEvent::AllowanceReady {
                                    token,
                                    spender,
                                    allowance,
                                });
                            }
                            Err(err) => {
                                error!("allowance query failed: {err:#}");
                                let _ = evt_tx.send(WalletEvent::AllowanceFailed {
                                    message: WalletError::query(format!("{err:#}")).to_string(),
                                });
                            }
                        }
                    });
                }

                WalletCommand::FetchCleanRecord { user } => {
                    let Some(contract) = contract else {
                        let _ = evt_tx.send(WalletEvent::Error {
                            message: WalletError::Configuration.to_string(),
                        });
                        continue;
                    };
                    let client = Arc::clone(&reader);
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let record = async {
                            let has_cleaned_once =
                                client.has_cleaned_once(contract, user).await?;
                            let last_cleaned_at =
                                client.last_cleaned_at(contract, user).await?;
                            anyhow::Ok((has_cleaned_once, last_cleaned_at))
                        }
                        .await;

                        match record {
                            Ok((has_cleaned_once, last_cleaned_at)) => {
                                let _ = evt_tx.send(WalletEvent::CleanRecordReady {
                                    user,
                                    has_cleaned_once,
                                    last_cleaned_at: last_cleaned_at.saturating_to::<u64>(),
                                });
                            }
                            Err(err) => {
                                error!("hygiene record query failed: {err:#}");
                                let _ = evt_tx.send(WalletEvent::Error {
                                    message: WalletError::query(format!("{err:#}")).to_string(),
                                });
                            }
                        }
                    });
                }

                WalletCommand::MarkCleaned => {
                    let Some(contract) = contract else {
                        let _ = evt_tx.send(WalletEvent::TxFailed {
                            message: WalletError::Configuration.to_string(),
                        });
                        continue;
                    };
                    let Some(session) = session.clone() else {
                        let _ = evt_tx.send(WalletEvent::TxFailed {
                            message: WalletError::NotConnected.to_string(),
                        });
                        continue;
                    };
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        match session.client.submit_mark_cleaned(contract).await {
                            Ok(hash) => {
                                info!(%hash, from = %session.address, "markCleaned submitted");
                                let _ = evt_tx.send(WalletEvent::TxSubmitted { hash });
                                match session.client.confirm(hash).await {
                                    Ok(true) => {
                                        info!(%hash, "markCleaned confirmed");
                                        let _ =
                                            evt_tx.send(WalletEvent::TxConfirmed { hash });
                                    }
                                    Ok(false) => {
                                        error!(%hash, "markCleaned reverted");
                                        let _ = evt_tx.send(WalletEvent::TxFailed {
                                            message: WalletError::Transaction(
                                                "transaction reverted on-chain".to_string(),
                                            )
                                            .to_string(),
                                        });
                                    }
                                    Err(err) => {
                                        error!(%hash, "receipt wait failed: {err:#}");
                                        let _ = evt_tx.send(WalletEvent::TxFailed {
                                            message: WalletError::Transaction(format!(
                                                "{err:#}"
                                            ))
                                            .to_string(),
                                        });
                                    }
                                }
                            }
                            Err(err) => {
                                error!("markCleaned broadcast failed: {err:#}");
                                let _ = evt_tx.send(WalletEvent::TxFailed {
                                    message: WalletError::Transaction(format!("{err:#}"))
                                        .to_string(),
                                });
                            }
                        }
                    });
                }
            }
        }

        // Small yield to prevent busy loop
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn establish_session(config: &ChainConfig) -> Result<(WalletSession, u64)> {
    let signer = load_signer(config)?;
    let address = signer.address();
    let client = AlloyClient::connect_http_with_signer(&config.rpc_url, signer)?;
    let client: Arc<dyn ChainClient> = Arc::new(client);

    // Probe the node once so a dead endpoint fails at connect time, and
    // so the UI can warn when the node is not on the configured chain.
    let chain_id = client.chain_id().await.context("chain id probe failed")?;

    Ok((WalletSession { address, client }, chain_id))
}

/// The terminal analog of the browser's injected wallet: a local key,
/// taken from `DOCTOR_PRIVATE_KEY` or from the configured key file.
fn load_signer(config: &ChainConfig) -> Result<PrivateKeySigner> {
    let raw = if let Ok(key) = std::env::var("DOCTOR_PRIVATE_KEY") {
        key
    } else if let Some(path) = &config.key_file {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read key file {}", path.display()))?
    } else {
        anyhow::bail!("no wallet key: set DOCTOR_PRIVATE_KEY or key_file in the config");
    };

    raw.trim()
        .parse::<PrivateKeySigner>()
        .context("Invalid private key")
}
