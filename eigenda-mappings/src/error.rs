//! Per-event failure taxonomy for the projection handlers.
//!
//! Recoverable conditions (missing receipt, status event for an unseen
//! operator) are not errors: the handler logs them and returns success so
//! the host keeps processing subsequent events. Everything in
//! [`MappingError`] is fatal to the *current* event only — the handler
//! aborts without partial writes and the failure is surfaced to the host.

use thiserror::Error;

/// Failure of a [`crate::reader::ContractReader`] view call.
#[derive(Debug, Clone, Error)]
#[error("contract read failed: {0}")]
pub struct ReadError(pub String);

/// Failure of the underlying entity store.
#[derive(Debug, Clone, Error)]
#[error("entity store failed: {0}")]
pub struct StoreError(pub String);

/// Fatal per-event projection failure.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A BLS public-key coordinate was wider than the fixed 32-byte
    /// representation assumed by the operator-id hash. This violates a
    /// contract-level invariant and must never be silently truncated.
    #[error("pubkey coordinate is {0} bytes, exceeds 32-byte width")]
    CoordinateOverflow(usize),

    /// A live contract view call failed; no entities for the event are
    /// written (not even for the quorums that were read successfully).
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The entity store rejected a load or save.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored record could not be encoded or decoded.
    #[error("entity codec: {0}")]
    Codec(#[from] serde_json::Error),
}
