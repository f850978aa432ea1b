//! JSON-RPC staking client
//!
//! Implements [`StakingClient`] over a standard Ethereum JSON-RPC
//! endpoint: views go through `eth_call`, transactions through
//! `eth_sendRawTransaction` with receipt polling for confirmation.

use crate::abi;
use crate::signer::WalletSigner;
use async_trait::async_trait;
use kora_core::{KoraError, OrchestratorAddress, Result, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Hash of a submitted transaction
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub fn new(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|_| KoraError::Chain(format!("invalid tx hash: {}", s)))?;
        if bytes.len() != 32 {
            return Err(KoraError::Chain(format!("invalid tx hash length: {}", s)));
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Ok(Self(hash))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", &self.to_hex()[..18])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Bonding-manager view of a delegator
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct DelegatorInfo {
    /// Amount currently delegated, native token units
    pub bonded_amount: u128,

    /// Unclaimed fees, native token units
    pub fees: u128,
}

/// Chain endpoint and contract configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL
    pub rpc_url: String,

    /// Bonding manager contract address (hex)
    pub bonding_manager: String,

    /// Staking token contract address (hex)
    pub token: String,

    /// Receipt poll interval in milliseconds
    pub poll_interval_ms: u64,

    /// Maximum receipt polls before giving up
    pub max_poll_attempts: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            bonding_manager: "0x35b648a5e5d1db0ba22c0f1c72c1888b8cd33e31".to_string(),
            token: "0x58b6a8a3302369daec383334672404ee733ab239".to_string(),
            poll_interval_ms: 2_000,
            max_poll_attempts: 30,
        }
    }
}

/// On-chain staking operations the wallet needs
///
/// Every transaction method submits, waits for confirmation, and returns
/// the transaction hash. View methods are read-only `eth_call`s.
#[async_trait]
pub trait StakingClient: Send + Sync {
    /// Token balance of a wallet, native units
    async fn balance_of(&self, wallet: &WalletAddress) -> Result<u128>;

    /// Token allowance granted to the bonding manager, native units
    async fn allowance(&self, owner: &WalletAddress) -> Result<u128>;

    /// Unclaimed fees of a delegator, native units
    async fn pending_fees(&self, wallet: &WalletAddress) -> Result<u128>;

    /// Delegator record from the bonding manager
    async fn delegator_info(&self, wallet: &WalletAddress) -> Result<DelegatorInfo>;

    /// Approve the bonding manager to spend `amount` tokens
    async fn approve(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash>;

    /// Delegate `amount` tokens to an orchestrator
    async fn delegate(
        &self,
        signer: &dyn WalletSigner,
        orchestrator: &OrchestratorAddress,
        amount: u128,
    ) -> Result<TxHash>;

    /// Undelegate `amount` tokens
    async fn undelegate(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash>;

    /// Withdraw accumulated fees back to the signer's wallet
    async fn withdraw_fees(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash>;
}

/// [`StakingClient`] over an Ethereum JSON-RPC endpoint
pub struct RpcStakingClient {
    http: reqwest::Client,
    config: ChainConfig,
    bonding_manager: [u8; 20],
    token: [u8; 20],
}

impl RpcStakingClient {
    pub fn new(config: ChainConfig) -> Result<Self> {
        let bonding_manager = parse_contract(&config.bonding_manager)?;
        let token = parse_contract(&config.token)?;
        Ok(Self {
            http: reqwest::Client::new(),
            config,
            bonding_manager,
            token,
        })
    }

    async fn rpc(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        let response: serde_json::Value = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| KoraError::Chain(format!("{} request failed: {}", method, e)))?
            .json()
            .await
            .map_err(|e| KoraError::Chain(format!("{} bad response: {}", method, e)))?;

        if let Some(error) = response.get("error") {
            return Err(KoraError::Chain(format!("{} error: {}", method, error)));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| KoraError::Chain(format!("{}: missing result", method)))
    }

    /// Read-only contract call returning the raw return bytes
    async fn eth_call(&self, to: &[u8; 20], data: Vec<u8>) -> Result<Vec<u8>> {
        let params = serde_json::json!([
            {
                "to": format!("0x{}", hex::encode(to)),
                "data": format!("0x{}", hex::encode(&data)),
            },
            "latest",
        ]);
        let result = self.rpc("eth_call", params).await?;
        let payload = result
            .as_str()
            .ok_or_else(|| KoraError::Chain("eth_call: non-string result".to_string()))?;
        abi::decode_hex_return(payload).map_err(|e| KoraError::Chain(e.to_string()))
    }

    /// Sign, submit, and await confirmation of a contract transaction
    async fn send_transaction(
        &self,
        signer: &dyn WalletSigner,
        to: &[u8; 20],
        data: Vec<u8>,
    ) -> Result<TxHash> {
        let mut payload = Vec::with_capacity(20 + data.len());
        payload.extend_from_slice(to);
        payload.extend_from_slice(&data);
        let signature = signer.sign(&payload);
        payload.extend_from_slice(&signature);

        let raw = format!("0x{}", hex::encode(&payload));
        let result = self
            .rpc("eth_sendRawTransaction", serde_json::json!([raw]))
            .await?;
        let hash_str = result.as_str().ok_or_else(|| {
            KoraError::Chain("eth_sendRawTransaction: non-string result".to_string())
        })?;
        let tx_hash = TxHash::from_hex(hash_str)?;

        self.wait_for_confirmation(tx_hash).await?;
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<()> {
        for attempt in 0..self.config.max_poll_attempts {
            let receipt = self
                .rpc(
                    "eth_getTransactionReceipt",
                    serde_json::json!([tx_hash.to_hex()]),
                )
                .await?;

            if !receipt.is_null() {
                let status = receipt.get("status").and_then(|s| s.as_str());
                return match status {
                    Some("0x1") => Ok(()),
                    other => Err(KoraError::Chain(format!(
                        "transaction {} reverted (status {:?})",
                        tx_hash, other
                    ))),
                };
            }

            tracing::debug!(tx = %tx_hash, attempt, "receipt not yet available");
            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }

        Err(KoraError::Unconfirmed(tx_hash.to_hex()))
    }
}

fn parse_contract(hex_addr: &str) -> Result<[u8; 20]> {
    let stripped = hex_addr.strip_prefix("0x").unwrap_or(hex_addr);
    let bytes = hex::decode(stripped)
        .map_err(|_| KoraError::InvalidInput(format!("bad contract address: {}", hex_addr)))?;
    if bytes.len() != 20 {
        return Err(KoraError::InvalidInput(format!(
            "bad contract address length: {}",
            hex_addr
        )));
    }
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}

#[async_trait]
impl StakingClient for RpcStakingClient {
    async fn balance_of(&self, wallet: &WalletAddress) -> Result<u128> {
        let data = abi::encode_balance_of(wallet);
        let ret = self.eth_call(&self.token, data).await?;
        abi::decode_uint_word(&ret).map_err(|e| KoraError::Chain(e.to_string()))
    }

    async fn allowance(&self, owner: &WalletAddress) -> Result<u128> {
        let data = abi::encode_allowance(owner, &self.bonding_manager);
        let ret = self.eth_call(&self.token, data).await?;
        abi::decode_uint_word(&ret).map_err(|e| KoraError::Chain(e.to_string()))
    }

    async fn pending_fees(&self, wallet: &WalletAddress) -> Result<u128> {
        // endRound 0 = current round on the bonding manager
        let data = abi::encode_pending_fees(wallet, 0);
        let ret = self.eth_call(&self.bonding_manager, data).await?;
        abi::decode_uint_word(&ret).map_err(|e| KoraError::Chain(e.to_string()))
    }

    async fn delegator_info(&self, wallet: &WalletAddress) -> Result<DelegatorInfo> {
        let data = abi::encode_delegators(wallet);
        let ret = self.eth_call(&self.bonding_manager, data).await?;
        let bonded_amount =
            abi::decode_uint_word_at(&ret, 0).map_err(|e| KoraError::Chain(e.to_string()))?;
        let fees =
            abi::decode_uint_word_at(&ret, 1).map_err(|e| KoraError::Chain(e.to_string()))?;
        Ok(DelegatorInfo {
            bonded_amount,
            fees,
        })
    }

    async fn approve(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash> {
        let data = abi::encode_approve(&self.bonding_manager, amount);
        let token = self.token;
        tracing::info!(wallet = %signer.address(), amount, "submitting approve");
        self.send_transaction(signer, &token, data).await
    }

    async fn delegate(
        &self,
        signer: &dyn WalletSigner,
        orchestrator: &OrchestratorAddress,
        amount: u128,
    ) -> Result<TxHash> {
        let data = abi::encode_delegate(amount, orchestrator);
        let bonding_manager = self.bonding_manager;
        tracing::info!(wallet = %signer.address(), orchestrator = %orchestrator, amount, "submitting delegate");
        self.send_transaction(signer, &bonding_manager, data).await
    }

    async fn undelegate(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash> {
        let data = abi::encode_undelegate(amount);
        let bonding_manager = self.bonding_manager;
        tracing::info!(wallet = %signer.address(), amount, "submitting undelegate");
        self.send_transaction(signer, &bonding_manager, data).await
    }

    async fn withdraw_fees(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash> {
        let recipient = signer.address();
        let data = abi::encode_withdraw_fees(&recipient, amount);
        let bonding_manager = self.bonding_manager;
        tracing::info!(wallet = %recipient, amount, "submitting withdrawFees");
        self.send_transaction(signer, &bonding_manager, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_hash_hex_round_trip() {
        let hash = TxHash::new([0x5a; 32]);
        assert_eq!(TxHash::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn test_tx_hash_rejects_bad_input() {
        assert!(TxHash::from_hex("0x1234").is_err());
        assert!(TxHash::from_hex("not-hex").is_err());
    }

    #[test]
    fn test_default_config_contracts_parse() {
        let config = ChainConfig::default();
        assert!(RpcStakingClient::new(config).is_ok());
    }

    #[test]
    fn test_bad_contract_address_rejected() {
        let config = ChainConfig {
            bonding_manager: "0x1234".to_string(),
            ..ChainConfig::default()
        };
        assert!(RpcStakingClient::new(config).is_err());
    }
}
