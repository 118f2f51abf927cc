//! Projectors for `EigenDAServiceManager` batch confirmations.
//!
//! A confirmation produces four records across two handlers: the
//! `BatchConfirmed` event yields [`Batch`] and [`GasFees`], while the
//! `confirmBatch` call payload yields [`BatchHeader`] and [`NonSigning`].
//! All four share the transaction hash in their ids, so the links between
//! them are derivable without reads.

use alloy::primitives::{Address, Bytes, U256};

use crate::entities::{
    Batch, BatchHeader, DEREGISTERED_NEVER, GasFees, NonSigning, Operator, OperatorStatus,
};
use crate::error::MappingError;
use crate::events::{BatchConfirmed, ConfirmBatchCall, EventContext};
use crate::ids;
use crate::store::EntityStore;

/// Project a `BatchConfirmed` event into [`Batch`] and [`GasFees`].
///
/// A missing transaction receipt is a recoverable skip: the event is logged
/// and dropped without writing any entity, and processing of subsequent
/// events continues.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_batch_confirmed<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &BatchConfirmed,
) -> Result<(), MappingError> {
    let Some(receipt) = ctx.receipt else {
        tracing::error!(
            tx_hash = %ctx.tx_hash,
            batch_id = event.batch_id,
            "no receipt for batch confirmation, skipping"
        );
        return Ok(());
    };

    let gas_fees_id = ids::prefixed_id(ids::GAS_FEES_PREFIX, ctx.tx_hash.as_slice());
    let gas_used = u128::from(receipt.gas_used);
    store.save(&GasFees {
        id: gas_fees_id.clone(),
        gas_price: receipt.effective_gas_price,
        gas_used,
        tx_fee: receipt.effective_gas_price.saturating_mul(gas_used),
    })?;

    store.save(&Batch {
        id: ids::prefixed_id(ids::BATCH_PREFIX, ctx.tx_hash.as_slice()),
        batch_id: event.batch_id,
        batch_header_hash: event.batch_header_hash,
        gas_fees: gas_fees_id,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;

    Ok(())
}

/// Project a decoded `confirmBatch` call into [`BatchHeader`] and
/// [`NonSigning`], creating an [`Operator`] stub for any non-signer public
/// key not seen before.
///
/// The non-signer reference list preserves the exact order of the call
/// payload. Existing operators are never overwritten at this join point.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_confirm_batch<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    call: &ConfirmBatchCall,
) -> Result<(), MappingError> {
    let batch_ref = ids::prefixed_id(ids::BATCH_PREFIX, ctx.tx_hash.as_slice());

    store.save(&BatchHeader {
        id: ids::prefixed_id(ids::BATCH_HEADER_PREFIX, ctx.tx_hash.as_slice()),
        batch: batch_ref.clone(),
        blob_headers_root: call.blob_headers_root,
        quorum_numbers: call.quorum_numbers.clone(),
        signed_stake_for_quorums: call.signed_stake_for_quorums.clone(),
        reference_block_number: call.reference_block_number,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
    })?;

    let mut non_signers = Vec::with_capacity(call.non_signer_pubkeys.len());
    for pubkey in &call.non_signer_pubkeys {
        let operator_id = ids::operator_id(pubkey.x, pubkey.y);
        let id = Bytes::copy_from_slice(operator_id.as_slice());
        if store.load::<Operator>(&id)?.is_none() {
            store.save(&Operator {
                id: id.clone(),
                operator: Address::ZERO,
                pubkey_g1_x: pubkey.x,
                pubkey_g1_y: pubkey.y,
                pubkey_g2_x: [U256::ZERO; 2],
                pubkey_g2_y: [U256::ZERO; 2],
                deregistration_block_number: DEREGISTERED_NEVER,
                status: OperatorStatus::Unregistered,
            })?;
        }
        non_signers.push(id);
    }

    store.save(&NonSigning {
        id: ids::prefixed_id(ids::NON_SIGNING_PREFIX, ctx.tx_hash.as_slice()),
        batch: batch_ref,
        non_signers,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DEREGISTERED_ACTIVE, EntityKind};
    use crate::events::G1Point;
    use crate::handlers::testutil::{bare_operator, ctx, ctx_with_receipt};
    use crate::store::MemoryStore;
    use alloy::primitives::B256;

    fn confirmed() -> BatchConfirmed {
        BatchConfirmed {
            batch_header_hash: B256::repeat_byte(0xbb),
            batch_id: 42,
        }
    }

    fn call_with_non_signers(keys: &[(u64, u64)]) -> ConfirmBatchCall {
        ConfirmBatchCall {
            blob_headers_root: B256::repeat_byte(0xcc),
            quorum_numbers: vec![0, 1].into(),
            signed_stake_for_quorums: vec![90, 80].into(),
            reference_block_number: 55,
            non_signer_pubkeys: keys
                .iter()
                .map(|&(x, y)| G1Point {
                    x: U256::from(x),
                    y: U256::from(y),
                })
                .collect(),
        }
    }

    #[test]
    fn derives_tx_fee_from_receipt() {
        let mut store = MemoryStore::new();
        let ctx = ctx_with_receipt(0xaa, 0, 3, 7);

        handle_batch_confirmed(&mut store, &ctx, &confirmed()).unwrap();

        let id = ids::prefixed_id(ids::GAS_FEES_PREFIX, ctx.tx_hash.as_slice());
        let fees: GasFees = store.load(&id).unwrap().unwrap();
        assert_eq!(fees.tx_fee, 21);

        let batch_id = ids::prefixed_id(ids::BATCH_PREFIX, ctx.tx_hash.as_slice());
        let batch: Batch = store.load(&batch_id).unwrap().unwrap();
        assert_eq!(batch.batch_id, 42);
        assert_eq!(batch.gas_fees, id);
    }

    #[test]
    fn missing_receipt_skips_without_writes() {
        let mut store = MemoryStore::new();
        let ctx = ctx(0xaa, 0);

        handle_batch_confirmed(&mut store, &ctx, &confirmed()).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn replay_is_byte_identical() {
        let ctx = ctx_with_receipt(0xaa, 0, 11, 13);

        let mut first = MemoryStore::new();
        handle_batch_confirmed(&mut first, &ctx, &confirmed()).unwrap();
        let mut second = MemoryStore::new();
        handle_batch_confirmed(&mut second, &ctx, &confirmed()).unwrap();

        let id = ids::prefixed_id(ids::BATCH_PREFIX, ctx.tx_hash.as_slice());
        assert_eq!(
            first.load_raw(EntityKind::Batch, &id).unwrap(),
            second.load_raw(EntityKind::Batch, &id).unwrap()
        );
    }

    #[test]
    fn non_signer_order_matches_payload() {
        let mut store = MemoryStore::new();
        let ctx = ctx(0xaa, 0);
        let call = call_with_non_signers(&[(7, 8), (1, 2), (5, 6)]);

        handle_confirm_batch(&mut store, &ctx, &call).unwrap();

        let id = ids::prefixed_id(ids::NON_SIGNING_PREFIX, ctx.tx_hash.as_slice());
        let record: NonSigning = store.load(&id).unwrap().unwrap();
        let expected: Vec<Bytes> = call
            .non_signer_pubkeys
            .iter()
            .map(|p| Bytes::copy_from_slice(ids::operator_id(p.x, p.y).as_slice()))
            .collect();
        assert_eq!(record.non_signers, expected);
        assert_eq!(store.count(EntityKind::Operator), 3);
    }

    #[test]
    fn existing_operator_is_not_overwritten_by_stub() {
        let mut store = MemoryStore::new();
        let ctx = ctx(0xaa, 0);

        let op_id = ids::operator_id(U256::from(7u64), U256::from(8u64));
        let mut existing = bare_operator(op_id, 7, 8);
        existing.deregistration_block_number = DEREGISTERED_ACTIVE;
        existing.status = OperatorStatus::Registered;
        store.save(&existing).unwrap();

        handle_confirm_batch(&mut store, &ctx, &call_with_non_signers(&[(7, 8)])).unwrap();

        let loaded: Operator = store.load(op_id.as_slice()).unwrap().unwrap();
        assert_eq!(loaded.deregistration_block_number, DEREGISTERED_ACTIVE);
        assert_eq!(loaded.status, OperatorStatus::Registered);
    }
}
