//! Deterministic entity identifier derivation.
//!
//! Two construction patterns cover every entity kind:
//!
//! - **Log-scoped**: `txHash ++ logIndex` (fixed-width big-endian), unique
//!   per emitted log by chain construction. Used for append-only event-log
//!   entities.
//! - **Prefixed**: `constantPrefix ++ key`, used when at most one entity of
//!   a kind exists per transaction (batch, header, gas fees, non-signing
//!   record) or when the entity is addressed by a domain key (operator,
//!   reservation). The per-kind prefixes keep ids from colliding when
//!   several kinds share a transaction hash.
//!
//! The operator identifier is the Keccak-256 hash of the operator's
//! registered BN254 G1 public key, with both coordinates serialized to
//! 32-byte big-endian. This must stay byte-identical to the convention of
//! the on-chain `BLSApkRegistry` so that non-signer references join against
//! `Operator` entities.

use alloy::primitives::{B256, Bytes, U256, keccak256};

use crate::error::MappingError;

/// Id prefix for [`crate::entities::Batch`].
pub const BATCH_PREFIX: &[u8] = b"batch-";
/// Id prefix for [`crate::entities::BatchHeader`].
pub const BATCH_HEADER_PREFIX: &[u8] = b"header-";
/// Id prefix for [`crate::entities::GasFees`].
pub const GAS_FEES_PREFIX: &[u8] = b"gasfees-";
/// Id prefix for [`crate::entities::NonSigning`].
pub const NON_SIGNING_PREFIX: &[u8] = b"nonsigning-";

/// Identifier for an append-only event-log entity: the transaction hash
/// followed by the log index as 8-byte big-endian.
#[must_use]
pub fn log_scoped_id(tx_hash: B256, log_index: u64) -> Bytes {
    let mut buf = Vec::with_capacity(40);
    buf.extend_from_slice(tx_hash.as_slice());
    buf.extend_from_slice(&log_index.to_be_bytes());
    buf.into()
}

/// Identifier built from a constant per-kind prefix and a domain key.
#[must_use]
pub fn prefixed_id(prefix: &[u8], key: &[u8]) -> Bytes {
    let mut buf = Vec::with_capacity(prefix.len() + key.len());
    buf.extend_from_slice(prefix);
    buf.extend_from_slice(key);
    buf.into()
}

/// Identifier for a [`crate::entities::QuorumApk`] record: the log-scoped
/// id of the membership-change event extended with the quorum number.
#[must_use]
pub fn quorum_apk_id(tx_hash: B256, log_index: u64, quorum: u8) -> Bytes {
    let mut buf = Vec::with_capacity(41);
    buf.extend_from_slice(tx_hash.as_slice());
    buf.extend_from_slice(&log_index.to_be_bytes());
    buf.push(quorum);
    buf.into()
}

/// Canonical operator identifier: `keccak256(x_be32 ++ y_be32)` over the
/// operator's G1 public key coordinates.
///
/// Leading-zero representations of the coordinates hash identically because
/// both are padded to exactly 32 bytes before hashing.
#[must_use]
pub fn operator_id(pubkey_g1_x: U256, pubkey_g1_y: U256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(&pubkey_g1_x.to_be_bytes::<32>());
    buf[32..].copy_from_slice(&pubkey_g1_y.to_be_bytes::<32>());
    keccak256(buf)
}

/// [`operator_id`] over raw big-endian coordinate bytes.
///
/// # Errors
///
/// Returns [`MappingError::CoordinateOverflow`] if either coordinate is
/// wider than 32 bytes — a contract-level invariant violation that must
/// abort the event instead of being truncated.
pub fn operator_id_from_be_bytes(x: &[u8], y: &[u8]) -> Result<B256, MappingError> {
    let pad = |coord: &[u8]| -> Result<[u8; 32], MappingError> {
        if coord.len() > 32 {
            return Err(MappingError::CoordinateOverflow(coord.len()));
        }
        let mut out = [0u8; 32];
        out[32 - coord.len()..].copy_from_slice(coord);
        Ok(out)
    };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(&pad(x)?);
    buf[32..].copy_from_slice(&pad(y)?);
    Ok(keccak256(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    #[test]
    fn log_scoped_ids_differ_per_log() {
        let tx_a = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let tx_b = b256!("2222222222222222222222222222222222222222222222222222222222222222");

        assert_ne!(log_scoped_id(tx_a, 0), log_scoped_id(tx_a, 1));
        assert_ne!(log_scoped_id(tx_a, 0), log_scoped_id(tx_b, 0));
        assert_eq!(log_scoped_id(tx_a, 7), log_scoped_id(tx_a, 7));
    }

    #[test]
    fn prefixes_separate_entity_kinds() {
        let tx = b256!("3333333333333333333333333333333333333333333333333333333333333333");
        let batch = prefixed_id(BATCH_PREFIX, tx.as_slice());
        let header = prefixed_id(BATCH_HEADER_PREFIX, tx.as_slice());
        let fees = prefixed_id(GAS_FEES_PREFIX, tx.as_slice());

        assert_ne!(batch, header);
        assert_ne!(batch, fees);
        assert_ne!(header, fees);
    }

    #[test]
    fn quorum_apk_id_scopes_by_quorum() {
        let tx = b256!("4444444444444444444444444444444444444444444444444444444444444444");
        assert_ne!(quorum_apk_id(tx, 3, 1), quorum_apk_id(tx, 3, 2));
        assert_ne!(quorum_apk_id(tx, 3, 1), quorum_apk_id(tx, 4, 1));
    }

    #[test]
    fn operator_id_invariant_to_leading_zeros() {
        let x = U256::from(123u64);
        let y = U256::from(456u64);
        let id = operator_id(x, y);

        // The same coordinates presented with and without leading zeros
        // must hash identically.
        let from_short = operator_id_from_be_bytes(&[123], &[1, 200]).unwrap();
        let from_padded =
            operator_id_from_be_bytes(&[0, 0, 0, 123], &[0, 0, 1, 200]).unwrap();
        assert_eq!(from_short, from_padded);
        assert_eq!(id, from_short);
    }

    #[test]
    fn operator_id_matches_keccak_of_padded_coordinates() {
        let x = U256::from(5u64);
        let y = U256::from(9u64);
        let mut buf = [0u8; 64];
        buf[31] = 5;
        buf[63] = 9;
        assert_eq!(operator_id(x, y), keccak256(buf));
    }

    #[test]
    fn oversized_coordinate_is_fatal() {
        let wide = [1u8; 33];
        let err = operator_id_from_be_bytes(&wide, &[1]).unwrap_err();
        assert!(matches!(err, MappingError::CoordinateOverflow(33)));
    }
}
