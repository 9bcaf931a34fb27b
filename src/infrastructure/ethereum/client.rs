//! Chain access behind a trait seam
//!
//! The worker talks to the chain through [`ChainClient`] so app-level
//! tests can run without a node. [`AlloyClient`] is the one real
//! implementation: an HTTP provider, optionally carrying a wallet for
//! the single state-changing call.

use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, B256, U256};
use anyhow::{Context, Result};

use crate::infrastructure::ethereum::contracts::{Erc20, HygieneLog};

#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    async fn chain_id(&self) -> Result<u64>;

    async fn token_symbol(&self, token: Address) -> Result<String>;

    async fn token_decimals(&self, token: Address) -> Result<u8>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    async fn has_cleaned_once(&self, contract: Address, user: Address) -> Result<bool>;

    async fn last_cleaned_at(&self, contract: Address, user: Address) -> Result<U256>;

    /// Submit `markCleaned()`. Resolves as soon as the transaction is
    /// broadcast, returning its hash; inclusion is a separate wait.
    async fn submit_mark_cleaned(&self, contract: Address) -> Result<B256>;

    /// Wait for a submitted transaction to land. `true` means it
    /// executed successfully, `false` means it reverted.
    async fn confirm(&self, hash: B256) -> Result<bool>;
}

/// Alloy-backed client over a single HTTP transport.
pub struct AlloyClient {
    provider: DynProvider,
}

impl AlloyClient {
    /// Read-only client. No signer, so the write path will be rejected
    /// by the node; callers gate writes on a connected session instead.
    pub fn connect_http(url: &str) -> Result<Self> {
        let rpc_url = url.parse().context("Invalid HTTP RPC URL")?;
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Ok(Self { provider })
    }

    /// Client with a local signer attached; used once a wallet session
    /// is established.
    pub fn connect_http_with_signer(url: &str, signer: PrivateKeySigner) -> Result<Self> {
        let rpc_url = url.parse().context("Invalid HTTP RPC URL")?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(rpc_url)
            .erased();
        Ok(Self { provider })
    }
}

#[async_trait::async_trait]
impl ChainClient for AlloyClient {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn token_symbol(&self, token: Address) -> Result<String> {
        let erc20 = Erc20::new(token, self.provider.clone());
        Ok(erc20.symbol().call().await?)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        let erc20 = Erc20::new(token, self.provider.clone());
        Ok(erc20.decimals().call().await?)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let erc20 = Erc20::new(token, self.provider.clone());
        Ok(erc20.allowance(owner, spender).call().await?)
    }

    async fn has_cleaned_once(&self, contract: Address, user: Address) -> Result<bool> {
        let log = HygieneLog::new(contract, self.provider.clone());
        Ok(log.hasCleanedOnce(user).call().await?)
    }

    async fn last_cleaned_at(&self, contract: Address, user: Address) -> Result<U256> {
        let log = HygieneLog::new(contract, self.provider.clone());
        Ok(log.lastCleanedAt(user).call().await?)
    }

    async fn submit_mark_cleaned(&self, contract: Address) -> Result<B256> {
        let log = HygieneLog::new(contract, self.provider.clone());
        let pending = log.markCleaned().send().await?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, hash: B256) -> Result<bool> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .get_receipt()
            .await?;
        Ok(receipt.status())
    }
}
