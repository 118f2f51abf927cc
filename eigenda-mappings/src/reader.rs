//! The live contract-state read boundary.
//!
//! The quorum aggregate key is recomputed from authoritative contract state
//! on every membership change instead of being incrementally updated, so
//! missed events cannot cause drift. The read is modeled as an injected
//! capability rather than a live network binding; tests substitute a
//! scripted fake.

use alloy::primitives::U256;

use crate::error::ReadError;
use crate::events::G1Point;

/// Synchronous as-of-current-chain-state contract views.
pub trait ContractReader {
    /// Fetch the current aggregate G1 public key for a quorum
    /// (`BLSApkRegistry.getApk`).
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] if the view call fails; the caller treats
    /// this as fatal to the current event and writes nothing.
    fn quorum_apk(&self, quorum: u8) -> Result<G1Point, ReadError>;
}

/// A scripted [`ContractReader`] returning pre-loaded responses, for tests
/// and for runners that prefetch view results.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    apks: std::collections::BTreeMap<u8, G1Point>,
}

impl ScriptedReader {
    /// Create an empty reader; every call fails until scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the aggregate key returned for `quorum`.
    pub fn set_apk(&mut self, quorum: u8, x: U256, y: U256) {
        self.apks.insert(quorum, G1Point { x, y });
    }
}

impl ContractReader for ScriptedReader {
    fn quorum_apk(&self, quorum: u8) -> Result<G1Point, ReadError> {
        self.apks
            .get(&quorum)
            .copied()
            .ok_or_else(|| ReadError(format!("no apk scripted for quorum {quorum}")))
    }
}
