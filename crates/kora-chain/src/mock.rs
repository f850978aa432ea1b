//! In-memory staking chain
//!
//! A [`StakingClient`] over plain maps, used by the node's dev mode and
//! by tests. Every submitted transaction is recorded so tests can assert
//! exactly which calls reached the chain.

use crate::client::{DelegatorInfo, StakingClient, TxHash};
use crate::signer::WalletSigner;
use async_trait::async_trait;
use kora_core::{KoraError, OrchestratorAddress, Result, WalletAddress};
use parking_lot::RwLock;
use std::collections::HashMap;

/// A transaction the mock chain accepted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockTx {
    Approve { owner: WalletAddress, amount: u128 },
    Delegate {
        owner: WalletAddress,
        orchestrator: OrchestratorAddress,
        amount: u128,
    },
    Undelegate { owner: WalletAddress, amount: u128 },
    WithdrawFees { owner: WalletAddress, amount: u128 },
}

#[derive(Default)]
struct MockState {
    balances: HashMap<WalletAddress, u128>,
    allowances: HashMap<WalletAddress, u128>,
    bonded: HashMap<WalletAddress, u128>,
    fees: HashMap<WalletAddress, u128>,
    transactions: Vec<MockTx>,
    fail_next_delegate: bool,
    next_nonce: u64,
}

/// In-memory [`StakingClient`]
#[derive(Default)]
pub struct MockStakingClient {
    state: RwLock<MockState>,
}

impl MockStakingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a wallet balance, native units
    pub fn set_balance(&self, wallet: WalletAddress, amount: u128) {
        self.state.write().balances.insert(wallet, amount);
    }

    /// Seed unclaimed fees for a wallet
    pub fn set_pending_fees(&self, wallet: WalletAddress, amount: u128) {
        self.state.write().fees.insert(wallet, amount);
    }

    /// Make the next delegate call fail after any approve succeeded
    ///
    /// Reproduces the approved-but-undelegated partial failure.
    pub fn fail_next_delegate(&self) {
        self.state.write().fail_next_delegate = true;
    }

    /// Every transaction the chain accepted, in order
    pub fn transactions(&self) -> Vec<MockTx> {
        self.state.read().transactions.clone()
    }

    /// Count of accepted transactions
    pub fn transaction_count(&self) -> usize {
        self.state.read().transactions.len()
    }

    fn next_tx_hash(state: &mut MockState) -> TxHash {
        state.next_nonce += 1;
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&state.next_nonce.to_be_bytes());
        TxHash::new(hash)
    }
}

#[async_trait]
impl StakingClient for MockStakingClient {
    async fn balance_of(&self, wallet: &WalletAddress) -> Result<u128> {
        Ok(*self.state.read().balances.get(wallet).unwrap_or(&0))
    }

    async fn allowance(&self, owner: &WalletAddress) -> Result<u128> {
        Ok(*self.state.read().allowances.get(owner).unwrap_or(&0))
    }

    async fn pending_fees(&self, wallet: &WalletAddress) -> Result<u128> {
        Ok(*self.state.read().fees.get(wallet).unwrap_or(&0))
    }

    async fn delegator_info(&self, wallet: &WalletAddress) -> Result<DelegatorInfo> {
        let state = self.state.read();
        Ok(DelegatorInfo {
            bonded_amount: *state.bonded.get(wallet).unwrap_or(&0),
            fees: *state.fees.get(wallet).unwrap_or(&0),
        })
    }

    async fn approve(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash> {
        let mut state = self.state.write();
        let owner = signer.address();
        state.allowances.insert(owner, amount);
        state.transactions.push(MockTx::Approve { owner, amount });
        Ok(Self::next_tx_hash(&mut state))
    }

    async fn delegate(
        &self,
        signer: &dyn WalletSigner,
        orchestrator: &OrchestratorAddress,
        amount: u128,
    ) -> Result<TxHash> {
        let mut state = self.state.write();
        if state.fail_next_delegate {
            state.fail_next_delegate = false;
            return Err(KoraError::Chain("delegate reverted".to_string()));
        }

        let owner = signer.address();
        let balance = *state.balances.get(&owner).unwrap_or(&0);
        let allowance = *state.allowances.get(&owner).unwrap_or(&0);
        if balance < amount {
            return Err(KoraError::Chain("transfer amount exceeds balance".to_string()));
        }
        if allowance < amount {
            return Err(KoraError::Chain("transfer amount exceeds allowance".to_string()));
        }

        state.balances.insert(owner, balance - amount);
        state.allowances.insert(owner, allowance - amount);
        *state.bonded.entry(owner).or_insert(0) += amount;
        state.transactions.push(MockTx::Delegate {
            owner,
            orchestrator: *orchestrator,
            amount,
        });
        Ok(Self::next_tx_hash(&mut state))
    }

    async fn undelegate(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash> {
        let mut state = self.state.write();
        let owner = signer.address();
        let bonded = *state.bonded.get(&owner).unwrap_or(&0);
        if bonded < amount {
            return Err(KoraError::Chain("amount exceeds bonded stake".to_string()));
        }
        state.bonded.insert(owner, bonded - amount);
        *state.balances.entry(owner).or_insert(0) += amount;
        state.transactions.push(MockTx::Undelegate { owner, amount });
        Ok(Self::next_tx_hash(&mut state))
    }

    async fn withdraw_fees(&self, signer: &dyn WalletSigner, amount: u128) -> Result<TxHash> {
        let mut state = self.state.write();
        let owner = signer.address();
        let fees = *state.fees.get(&owner).unwrap_or(&0);
        if fees < amount {
            return Err(KoraError::Chain("amount exceeds pending fees".to_string()));
        }
        state.fees.insert(owner, fees - amount);
        *state.balances.entry(owner).or_insert(0) += amount;
        state.transactions.push(MockTx::WithdrawFees { owner, amount });
        Ok(Self::next_tx_hash(&mut state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::LocalSigner;

    #[tokio::test]
    async fn test_delegate_moves_balance_to_bonded() {
        let chain = MockStakingClient::new();
        let signer = LocalSigner::from_label("alice");
        chain.set_balance(signer.address(), 100);

        chain.approve(&signer, 60).await.unwrap();
        chain
            .delegate(&signer, &OrchestratorAddress::new([1u8; 20]), 60)
            .await
            .unwrap();

        assert_eq!(chain.balance_of(&signer.address()).await.unwrap(), 40);
        let info = chain.delegator_info(&signer.address()).await.unwrap();
        assert_eq!(info.bonded_amount, 60);
        assert_eq!(chain.transaction_count(), 2);
    }

    #[tokio::test]
    async fn test_delegate_without_allowance_rejected() {
        let chain = MockStakingClient::new();
        let signer = LocalSigner::from_label("bob");
        chain.set_balance(signer.address(), 100);

        let result = chain
            .delegate(&signer, &OrchestratorAddress::new([1u8; 20]), 50)
            .await;
        assert!(matches!(result, Err(KoraError::Chain(_))));
    }

    #[tokio::test]
    async fn test_withdraw_fees_requires_balance() {
        let chain = MockStakingClient::new();
        let signer = LocalSigner::from_label("carol");
        chain.set_pending_fees(signer.address(), 5);

        assert!(chain.withdraw_fees(&signer, 10).await.is_err());
        chain.withdraw_fees(&signer, 5).await.unwrap();
        assert_eq!(chain.balance_of(&signer.address()).await.unwrap(), 5);
    }
}
