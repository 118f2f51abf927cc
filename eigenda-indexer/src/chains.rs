//! Static configuration for known EigenDA deployments.
//!
//! Unlike CREATE2-deployed contract suites, EigenDA addresses differ per
//! network and per contract, and some (ejection manager, payment vault)
//! are only published for a subset of networks. Addresses missing here can
//! be supplied through `config.toml`; contracts with no resolvable address
//! are skipped during sync.

use alloy::primitives::{Address, address};

/// The EigenDA contracts this indexer listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// `EigenDAServiceManager` — batch confirmations.
    ServiceManager,
    /// `RegistryCoordinator` — operator lifecycle and admin updates.
    RegistryCoordinator,
    /// `BLSApkRegistry` — pubkey registrations and quorum membership.
    BlsApkRegistry,
    /// `EjectionManager` — operator ejections.
    EjectionManager,
    /// `PaymentVault` — reservations and on-demand deposits.
    PaymentVault,
}

impl ContractKind {
    /// All contract kinds, in dispatch order.
    pub const ALL: &[Self] = &[
        Self::ServiceManager,
        Self::RegistryCoordinator,
        Self::BlsApkRegistry,
        Self::EjectionManager,
        Self::PaymentVault,
    ];

    /// Short name used in logs and config keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServiceManager => "service_manager",
            Self::RegistryCoordinator => "registry_coordinator",
            Self::BlsApkRegistry => "bls_apk_registry",
            Self::EjectionManager => "ejection_manager",
            Self::PaymentVault => "payment_vault",
        }
    }
}

/// Per-network contract address set; `None` means the address is not
/// published here and must come from config to be indexed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractAddresses {
    /// `EigenDAServiceManager`.
    pub service_manager: Option<Address>,
    /// `RegistryCoordinator`.
    pub registry_coordinator: Option<Address>,
    /// `BLSApkRegistry`.
    pub bls_apk_registry: Option<Address>,
    /// `EjectionManager`.
    pub ejection_manager: Option<Address>,
    /// `PaymentVault`.
    pub payment_vault: Option<Address>,
}

impl ContractAddresses {
    /// Address for one contract kind.
    #[must_use]
    pub const fn get(&self, kind: ContractKind) -> Option<Address> {
        match kind {
            ContractKind::ServiceManager => self.service_manager,
            ContractKind::RegistryCoordinator => self.registry_coordinator,
            ContractKind::BlsApkRegistry => self.bls_apk_registry,
            ContractKind::EjectionManager => self.ejection_manager,
            ContractKind::PaymentVault => self.payment_vault,
        }
    }

    /// The contract kind deployed at `address`, if any.
    #[must_use]
    pub fn kind_of(&self, address: Address) -> Option<ContractKind> {
        ContractKind::ALL
            .iter()
            .copied()
            .find(|&kind| self.get(kind) == Some(address))
    }
}

/// A known EigenDA network deployment.
#[derive(Debug, Clone, Copy)]
pub struct ChainSpec {
    /// Config/CLI name of the network.
    pub name: &'static str,
    /// EIP-155 chain ID.
    pub chain_id: u64,
    /// Suggested public RPC endpoint.
    pub default_rpc: &'static str,
    /// Block to start a fresh sync from (at or before the earliest
    /// EigenDA contract deployment on this network).
    pub start_block: u64,
    /// Published contract addresses.
    pub addresses: ContractAddresses,
    /// Whether this is a testnet deployment.
    pub is_testnet: bool,
}

/// All known EigenDA deployments (single source of truth).
pub const ALL: &[ChainSpec] = &[
    ChainSpec {
        name: "mainnet",
        chain_id: 1,
        default_rpc: "https://ethereum-rpc.publicnode.com",
        start_block: 19_305_000,
        addresses: ContractAddresses {
            service_manager: Some(address!("870679e138bcdf293b7ff14dd44b70fc97e12fc0")),
            registry_coordinator: Some(address!("0baac79acd45a023e19345c352d8a7a83c4e5656")),
            bls_apk_registry: None,
            ejection_manager: None,
            payment_vault: None,
        },
        is_testnet: false,
    },
    ChainSpec {
        name: "holesky",
        chain_id: 17_000,
        default_rpc: "https://ethereum-holesky-rpc.publicnode.com",
        start_block: 1_160_000,
        addresses: ContractAddresses {
            service_manager: Some(address!("d4a7e1bd8015057293f0d0a557088c286942e84b")),
            registry_coordinator: Some(address!("53012c69a189cfa2d9d29eb6f19b32e0a2ea3490")),
            bls_apk_registry: None,
            ejection_manager: None,
            payment_vault: None,
        },
        is_testnet: true,
    },
    ChainSpec {
        name: "sepolia",
        chain_id: 11_155_111,
        default_rpc: "https://ethereum-sepolia-rpc.publicnode.com",
        start_block: 0,
        addresses: ContractAddresses {
            service_manager: None,
            registry_coordinator: None,
            bls_apk_registry: None,
            ejection_manager: None,
            payment_vault: None,
        },
        is_testnet: true,
    },
];

/// Look up a [`ChainSpec`] by its config/CLI name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static ChainSpec> {
    ALL.iter().find(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_resolvable() {
        for spec in ALL {
            assert_eq!(by_name(spec.name).map(|c| c.chain_id), Some(spec.chain_id));
        }
        assert!(by_name("goerli").is_none());
    }

    #[test]
    fn kind_of_resolves_published_addresses() {
        let mainnet = by_name("mainnet").unwrap();
        let sm = mainnet.addresses.service_manager.unwrap();
        assert_eq!(mainnet.addresses.kind_of(sm), Some(ContractKind::ServiceManager));
        assert_eq!(mainnet.addresses.kind_of(Address::ZERO), None);
    }
}
