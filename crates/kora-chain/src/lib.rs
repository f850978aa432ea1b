//! # Kora Chain
//!
//! The wallet's on-chain seam: calldata encoding for the two staking
//! contracts, a JSON-RPC [`StakingClient`], and the
//! [`DelegationSubmitter`] that sequences a delegation end to end.
//!
//! ## Contract surface
//!
//! Two fixed contract addresses, configured per deployment:
//!
//! | Contract | Functions |
//! |-----------------|----------------------------------------------------------|
//! | bonding manager | `delegate`, `undelegate`, `withdrawFees`, `pendingFees`, `delegators` |
//! | token (ERC-20) | `approve`, `balanceOf`, `allowance` |
//!
//! ## Delegation sequence
//!
//! ```text
//! fiat amount ──convert──▶ native units
//!                            │
//!                  balance_of ≥ amount?  ──no──▶ InsufficientBalance (no tx issued)
//!                            │ yes
//!                  allowance ≥ amount?   ──no──▶ approve + confirm
//!                            │ yes / approved
//!                        delegate + confirm
//!                            │
//!                  persist stake record, reload stake list
//! ```
//!
//! The approve and delegate transactions are not atomic. A failure after
//! the approval leaves an approved-but-undelegated allowance; a retry
//! re-reads the allowance and skips straight to the delegate call.

pub mod abi;
pub mod client;
pub mod delegation;
pub mod mock;
pub mod signer;

pub use client::{ChainConfig, DelegatorInfo, RpcStakingClient, StakingClient, TxHash};
pub use delegation::{DelegationReceipt, DelegationStats, DelegationSubmitter, StakeRecorder};
pub use mock::{MockStakingClient, MockTx};
pub use signer::{LocalSigner, WalletSigner};
