//! Wallet signer capability
//!
//! The node never holds user keys. Signing is a capability handed in by
//! the connected wallet: an address plus the ability to sign a payload.

use kora_core::WalletAddress;

/// Capability obtained from a connected wallet
pub trait WalletSigner: Send + Sync {
    /// Address of the signing wallet
    fn address(&self) -> WalletAddress;

    /// Sign a transaction payload, returning the raw signed bytes
    fn sign(&self, payload: &[u8]) -> Vec<u8>;
}

/// Deterministic in-process signer
///
/// Used by the CLI and tests, where no external wallet is connected.
/// The "signature" is a keyed hash of the payload; the mock and dev
/// chains accept it as-is.
pub struct LocalSigner {
    address: WalletAddress,
    seed: [u8; 32],
}

impl LocalSigner {
    pub fn new(address: WalletAddress, seed: [u8; 32]) -> Self {
        Self { address, seed }
    }

    /// Derive a signer (address and seed) from a label, for tests
    pub fn from_label(label: &str) -> Self {
        let seed = *blake3::hash(label.as_bytes()).as_bytes();
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&seed[..20]);
        Self {
            address: WalletAddress::new(addr),
            seed,
        }
    }
}

impl WalletSigner for LocalSigner {
    fn address(&self) -> WalletAddress {
        self.address
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut input = Vec::with_capacity(32 + payload.len());
        input.extend_from_slice(&self.seed);
        input.extend_from_slice(payload);
        blake3::hash(&input).as_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_signer_is_deterministic() {
        let a = LocalSigner::from_label("alice");
        let b = LocalSigner::from_label("alice");
        assert_eq!(a.address(), b.address());
        assert_eq!(a.sign(b"payload"), b.sign(b"payload"));
    }

    #[test]
    fn test_different_labels_differ() {
        let a = LocalSigner::from_label("alice");
        let b = LocalSigner::from_label("bob");
        assert_ne!(a.address(), b.address());
    }
}
