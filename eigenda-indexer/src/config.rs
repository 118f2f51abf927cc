//! Runtime configuration loaded from `config.toml`.
//!
//! Provides per-network RPC endpoint lists that the sync engine uses with
//! automatic fallback (if the primary RPC fails, the next one is tried)
//! and contract address overrides for deployments that are not baked into
//! [`crate::chains`].
//!
//! When no config file is present the built-in defaults from
//! [`crate::chains::ChainSpec`] are used.

use std::collections::HashMap;
use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::chains::{ChainSpec, ContractAddresses};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Per-network overrides, keyed by network name (`mainnet`, `holesky`, ...).
    #[serde(default)]
    pub networks: HashMap<String, NetworkConfig>,
}

/// Overrides for a single network.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkConfig {
    /// Ordered list of RPC URLs (best first).
    #[serde(default)]
    pub rpcs: Vec<String>,
    /// Block to start a fresh sync from, overriding the built-in default.
    pub start_block: Option<u64>,
    /// Contract addresses to add or replace.
    #[serde(default)]
    pub contracts: AddressOverrides,
}

/// Contract addresses supplied through config.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AddressOverrides {
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

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns [`Config::default`] if the file does not exist, allowing
    /// the binary to work without any config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Return the RPC URL list for a network, falling back to the built-in
    /// default if the config has no entry for it.
    #[must_use]
    pub fn rpcs_for(&self, spec: &ChainSpec) -> Vec<String> {
        match self.networks.get(spec.name) {
            Some(n) if !n.rpcs.is_empty() => n.rpcs.clone(),
            _ => vec![spec.default_rpc.to_owned()],
        }
    }

    /// Return the first block to sync for a network.
    #[must_use]
    pub fn start_block_for(&self, spec: &ChainSpec) -> u64 {
        self.networks
            .get(spec.name)
            .and_then(|n| n.start_block)
            .unwrap_or(spec.start_block)
    }

    /// Built-in addresses merged with config overrides, overrides winning.
    #[must_use]
    pub fn addresses_for(&self, spec: &ChainSpec) -> ContractAddresses {
        let base = spec.addresses;
        let Some(over) = self.networks.get(spec.name).map(|n| n.contracts) else {
            return base;
        };
        ContractAddresses {
            service_manager: over.service_manager.or(base.service_manager),
            registry_coordinator: over.registry_coordinator.or(base.registry_coordinator),
            bls_apk_registry: over.bls_apk_registry.or(base.bls_apk_registry),
            ejection_manager: over.ejection_manager.or(base.ejection_manager),
            payment_vault: over.payment_vault.or(base.payment_vault),
        }
    }
}
