//! Delegation sequencing
//!
//! [`DelegationSubmitter`] drives a delegation from a display-currency
//! amount to a persisted stake record:
//!
//! 1. convert to native token units via the static rate table
//! 2. balance check (fails before any transaction is issued)
//! 3. approve if the bonding manager's allowance is short, await confirm
//! 4. delegate, await confirm
//! 5. persist the stake record and reload the user's full stake list
//!
//! The approve/delegate pair has no atomicity. A crash between the two
//! leaves an approved-but-undelegated allowance; step 3 re-reads the
//! allowance, so a retry skips the approval instead of stacking a second
//! one.

use crate::client::{StakingClient, TxHash};
use crate::signer::WalletSigner;
use async_trait::async_trait;
use kora_core::{KoraError, Orchestrator, Result, Stake, UserId};
use kora_economics::RateProvider;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Persistence hook invoked after a confirmed delegation
///
/// Implementations write the record and return the user's complete,
/// freshly reloaded stake list (no incremental merge).
#[async_trait]
pub trait StakeRecorder: Send + Sync {
    async fn record_stake(&self, stake: Stake) -> Result<Vec<Stake>>;
}

/// Counters for the delegation flow
#[derive(Clone, Debug, Default)]
pub struct DelegationStats {
    /// Delegations attempted
    pub submitted: u64,
    /// Approve transactions issued
    pub approvals_issued: u64,
    /// Delegations confirmed and persisted
    pub confirmed: u64,
    /// Delegations failed at any step
    pub failed: u64,
    /// Undelegations confirmed
    pub undelegations: u64,
    /// Fee withdrawals confirmed
    pub fee_withdrawals: u64,
}

/// Outcome of a successful delegation
#[derive(Clone, Debug)]
pub struct DelegationReceipt {
    /// The persisted stake record
    pub stake: Stake,

    /// Hash of the delegate transaction
    pub tx_hash: TxHash,

    /// Hash of the approve transaction, if one was needed
    pub approval_tx: Option<TxHash>,

    /// The user's full stake list after the reload
    pub stakes: Vec<Stake>,
}

/// Sequences wallet staking operations against the chain
pub struct DelegationSubmitter {
    client: Arc<dyn StakingClient>,
    recorder: Arc<dyn StakeRecorder>,
    rates: RateProvider,
    stats: RwLock<DelegationStats>,
}

impl DelegationSubmitter {
    pub fn new(
        client: Arc<dyn StakingClient>,
        recorder: Arc<dyn StakeRecorder>,
        rates: RateProvider,
    ) -> Self {
        Self {
            client,
            recorder,
            rates,
            stats: RwLock::new(DelegationStats::default()),
        }
    }

    /// Current counters
    pub fn stats(&self) -> DelegationStats {
        self.stats.read().clone()
    }

    /// Delegate a display-currency amount to an orchestrator
    pub async fn delegate(
        &self,
        signer: &dyn WalletSigner,
        user_id: UserId,
        orchestrator: &Orchestrator,
        amount: f64,
        currency: &str,
    ) -> Result<DelegationReceipt> {
        self.stats.write().submitted += 1;

        let native = self.to_native(amount, currency)?;
        let wallet = signer.address();

        // Balance check short-circuits before any transaction is issued
        let balance = self.client.balance_of(&wallet).await?;
        if balance < native {
            self.stats.write().failed += 1;
            return Err(KoraError::InsufficientBalance {
                needed: native,
                available: balance,
            });
        }

        // Re-read the allowance every attempt: a prior failed run may
        // have left an approval in place, in which case we skip it.
        let allowance = self.client.allowance(&wallet).await?;
        let approval_tx = if allowance < native {
            let tx = match self.client.approve(signer, native).await {
                Ok(tx) => tx,
                Err(e) => {
                    self.stats.write().failed += 1;
                    return Err(e);
                }
            };
            self.stats.write().approvals_issued += 1;
            info!(wallet = %wallet, tx = %tx, "approve confirmed");
            Some(tx)
        } else {
            None
        };

        let tx_hash = match self
            .client
            .delegate(signer, &orchestrator.address, native)
            .await
        {
            Ok(tx) => tx,
            Err(e) => {
                // The approval (if any) stays in place; retry picks it up.
                self.stats.write().failed += 1;
                warn!(wallet = %wallet, orchestrator = %orchestrator.address, "delegate failed: {}", e);
                return Err(e);
            }
        };

        let stake = Stake::new(
            user_id,
            orchestrator.address,
            orchestrator.name.clone(),
            amount,
            orchestrator.apy,
        );
        let stakes = match self.recorder.record_stake(stake.clone()).await {
            Ok(stakes) => stakes,
            Err(e) => {
                // The delegate confirmed on-chain but the record is lost;
                // the attempt still counts as failed, never confirmed.
                self.stats.write().failed += 1;
                warn!(wallet = %wallet, tx = %tx_hash, "stake persistence failed: {}", e);
                return Err(e);
            }
        };

        self.stats.write().confirmed += 1;
        info!(
            wallet = %wallet,
            orchestrator = %orchestrator.address,
            amount,
            currency,
            tx = %tx_hash,
            "delegation confirmed"
        );

        Ok(DelegationReceipt {
            stake,
            tx_hash,
            approval_tx,
            stakes,
        })
    }

    /// Undelegate a display-currency amount from the signer's stake
    pub async fn undelegate(
        &self,
        signer: &dyn WalletSigner,
        amount: f64,
        currency: &str,
    ) -> Result<TxHash> {
        let native = self.to_native(amount, currency)?;
        let info = self.client.delegator_info(&signer.address()).await?;
        if info.bonded_amount < native {
            return Err(KoraError::InsufficientBalance {
                needed: native,
                available: info.bonded_amount,
            });
        }

        let tx = self.client.undelegate(signer, native).await?;
        self.stats.write().undelegations += 1;
        Ok(tx)
    }

    /// Withdraw all pending fees back to the signer's wallet
    pub async fn withdraw_fees(&self, signer: &dyn WalletSigner) -> Result<TxHash> {
        let pending = self.client.pending_fees(&signer.address()).await?;
        if pending == 0 {
            return Err(KoraError::InvalidInput("no pending fees".to_string()));
        }

        let tx = self.client.withdraw_fees(signer, pending).await?;
        self.stats.write().fee_withdrawals += 1;
        Ok(tx)
    }

    fn to_native(&self, amount: f64, currency: &str) -> Result<u128> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(KoraError::InvalidInput(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        let native = self.rates.to_native_units(amount, currency);
        if native == 0 {
            return Err(KoraError::InvalidInput(
                "amount rounds to zero token units".to_string(),
            ));
        }
        Ok(native)
    }
}
