//! Contract call encoding
//!
//! Hand-rolled ABI encoding for the handful of functions the wallet
//! touches: a 4-byte selector followed by 32-byte words. Addresses are
//! left-padded to 32 bytes, amounts are big-endian u128 in the low half
//! of the word.

use kora_core::{OrchestratorAddress, WalletAddress};

/// Calldata encode/decode errors
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("Return data too short: expected {expected} bytes, got {got}")]
    ShortReturnData { expected: usize, got: usize },

    #[error("Return value exceeds u128 range")]
    Overflow,

    #[error("Invalid hex in return data: {0}")]
    InvalidHex(String),
}

// Token contract (ERC-20) selectors: first 4 bytes of keccak256(signature)
/// `approve(address,uint256)`
pub const SEL_APPROVE: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
/// `balanceOf(address)`
pub const SEL_BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
/// `allowance(address,address)`
pub const SEL_ALLOWANCE: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];

// Bonding manager selectors
/// `delegate(uint256,address)`
pub const SEL_DELEGATE: [u8; 4] = [0xb8, 0x8a, 0x80, 0x2f];
/// `undelegate(uint256)`
pub const SEL_UNDELEGATE: [u8; 4] = [0x92, 0xab, 0x89, 0xbb];
/// `withdrawFees(address,uint256)`
pub const SEL_WITHDRAW_FEES: [u8; 4] = [0x6a, 0xf9, 0x8e, 0x3a];
/// `pendingFees(address,uint256)`
pub const SEL_PENDING_FEES: [u8; 4] = [0xf5, 0x95, 0xa5, 0x49];
/// `delegators(address)`
pub const SEL_DELEGATORS: [u8; 4] = [0x1b, 0xcf, 0x0b, 0x4e];

fn push_address_word(data: &mut Vec<u8>, addr: &[u8; 20]) {
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(addr);
}

fn push_amount_word(data: &mut Vec<u8>, amount: u128) {
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&amount.to_be_bytes());
}

/// Encode `approve(spender, amount)`
pub fn encode_approve(spender: &[u8; 20], amount: u128) -> Vec<u8> {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&SEL_APPROVE);
    push_address_word(&mut data, spender);
    push_amount_word(&mut data, amount);
    data
}

/// Encode `balanceOf(owner)`
pub fn encode_balance_of(owner: &WalletAddress) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&SEL_BALANCE_OF);
    push_address_word(&mut data, owner.as_bytes());
    data
}

/// Encode `allowance(owner, spender)`
pub fn encode_allowance(owner: &WalletAddress, spender: &[u8; 20]) -> Vec<u8> {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&SEL_ALLOWANCE);
    push_address_word(&mut data, owner.as_bytes());
    push_address_word(&mut data, spender);
    data
}

/// Encode `delegate(amount, orchestrator)`
pub fn encode_delegate(amount: u128, orchestrator: &OrchestratorAddress) -> Vec<u8> {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&SEL_DELEGATE);
    push_amount_word(&mut data, amount);
    push_address_word(&mut data, orchestrator.as_bytes());
    data
}

/// Encode `undelegate(amount)`
pub fn encode_undelegate(amount: u128) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&SEL_UNDELEGATE);
    push_amount_word(&mut data, amount);
    data
}

/// Encode `withdrawFees(recipient, amount)`
pub fn encode_withdraw_fees(recipient: &WalletAddress, amount: u128) -> Vec<u8> {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&SEL_WITHDRAW_FEES);
    push_address_word(&mut data, recipient.as_bytes());
    push_amount_word(&mut data, amount);
    data
}

/// Encode `pendingFees(delegator, endRound)`
pub fn encode_pending_fees(delegator: &WalletAddress, end_round: u128) -> Vec<u8> {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&SEL_PENDING_FEES);
    push_address_word(&mut data, delegator.as_bytes());
    push_amount_word(&mut data, end_round);
    data
}

/// Encode `delegators(delegator)`
pub fn encode_delegators(delegator: &WalletAddress) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&SEL_DELEGATORS);
    push_address_word(&mut data, delegator.as_bytes());
    data
}

/// Decode a single uint256 return word into u128
///
/// Errors if the word is shorter than 32 bytes or the high 16 bytes are
/// non-zero.
pub fn decode_uint_word(data: &[u8]) -> Result<u128, AbiError> {
    if data.len() < 32 {
        return Err(AbiError::ShortReturnData {
            expected: 32,
            got: data.len(),
        });
    }
    if data[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow);
    }
    let mut word = [0u8; 16];
    word.copy_from_slice(&data[16..32]);
    Ok(u128::from_be_bytes(word))
}

/// Decode the n-th uint256 word of a multi-word return
pub fn decode_uint_word_at(data: &[u8], index: usize) -> Result<u128, AbiError> {
    let start = index * 32;
    if data.len() < start + 32 {
        return Err(AbiError::ShortReturnData {
            expected: start + 32,
            got: data.len(),
        });
    }
    decode_uint_word(&data[start..start + 32])
}

/// Decode a `0x`-prefixed hex return payload
pub fn decode_hex_return(payload: &str) -> Result<Vec<u8>, AbiError> {
    let stripped = payload.strip_prefix("0x").unwrap_or(payload);
    hex::decode(stripped).map_err(|_| AbiError::InvalidHex(payload.to_string()))
}
