//! Fixed fallback orchestrator list
//!
//! Served whenever no live provider is configured or a live fetch fails
//! with nothing cached. Display values are preset; the list is exactly
//! five entries.

use kora_core::{Orchestrator, OrchestratorAddress};

const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

/// The five fallback orchestrators
pub fn fallback_orchestrators() -> Vec<Orchestrator> {
    vec![
        Orchestrator {
            address: OrchestratorAddress::new([
                0x4f, 0x42, 0x6b, 0x02, 0x0f, 0xf4, 0x0c, 0xf8, 0x9b, 0xa8, 0x7b, 0x94, 0x7d,
                0x6c, 0x1e, 0x0f, 0x98, 0x12, 0x3a, 0xa1,
            ]),
            name: "Titan Node".to_string(),
            apy: 65.6,
            total_stake: 1_250_000 * ONE_TOKEN,
            performance: 99.2,
            fee: 0.0,
            reward: 120 * ONE_TOKEN,
            active: true,
        },
        Orchestrator {
            address: OrchestratorAddress::new([
                0x9d, 0x2b, 0x45, 0x60, 0x1a, 0x77, 0x83, 0x9e, 0xc0, 0x55, 0x31, 0x08, 0xe2,
                0x4b, 0x90, 0xaf, 0x16, 0xcc, 0x7d, 0x02,
            ]),
            name: "Harmonic Labs".to_string(),
            apy: 58.3,
            total_stake: 980_000 * ONE_TOKEN,
            performance: 98.7,
            fee: 0.05,
            reward: 95 * ONE_TOKEN,
            active: true,
        },
        Orchestrator {
            address: OrchestratorAddress::new([
                0x1c, 0x88, 0x0e, 0xfa, 0x3d, 0x24, 0x51, 0x9f, 0x7a, 0x60, 0x13, 0xb7, 0x2c,
                0xd8, 0x44, 0x05, 0xe1, 0x92, 0x6b, 0x33,
            ]),
            name: "Savanna Stream".to_string(),
            apy: 61.4,
            total_stake: 1_040_000 * ONE_TOKEN,
            performance: 97.9,
            fee: 0.1,
            reward: 102 * ONE_TOKEN,
            active: true,
        },
        Orchestrator {
            address: OrchestratorAddress::new([
                0x6e, 0x05, 0x97, 0xc3, 0x28, 0xb4, 0x76, 0x0d, 0x5f, 0x83, 0xa9, 0x42, 0x6f,
                0x11, 0xd5, 0x9b, 0x70, 0x28, 0xe8, 0x54,
            ]),
            name: "Meridian Media".to_string(),
            apy: 54.8,
            total_stake: 760_000 * ONE_TOKEN,
            performance: 99.5,
            fee: 0.15,
            reward: 76 * ONE_TOKEN,
            active: true,
        },
        Orchestrator {
            address: OrchestratorAddress::new([
                0xb3, 0x71, 0x2a, 0x05, 0x4e, 0x09, 0xc8, 0x66, 0x91, 0x0f, 0xde, 0x58, 0x37,
                0xaa, 0x20, 0xc4, 0x8d, 0x64, 0x17, 0xe5,
            ]),
            name: "Lighthouse Video".to_string(),
            apy: 49.1,
            total_stake: 530_000 * ONE_TOKEN,
            performance: 96.4,
            fee: 0.25,
            reward: 48 * ONE_TOKEN,
            active: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fallback_has_exactly_five_entries() {
        assert_eq!(fallback_orchestrators().len(), 5);
    }

    #[test]
    fn test_fallback_addresses_unique() {
        let list = fallback_orchestrators();
        let addrs: HashSet<_> = list.iter().map(|o| o.address).collect();
        assert_eq!(addrs.len(), list.len());
    }

    #[test]
    fn test_fallback_fees_are_fractions() {
        for orch in fallback_orchestrators() {
            assert!((0.0..=1.0).contains(&orch.fee), "{}", orch.name);
        }
    }
}
