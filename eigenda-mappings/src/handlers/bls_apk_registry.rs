//! Projectors for `BLSApkRegistry` events.
//!
//! `NewPubkeyRegistration` creates (or completes) the operator record from
//! its key material. Quorum membership changes write an append-only log
//! entity and rebuild the affected quorums' aggregate keys from live
//! contract state — recomputed from the authoritative source rather than
//! incrementally updated, so missed events cannot cause drift.

use alloy::primitives::Bytes;

use crate::entities::{
    DEREGISTERED_NEVER, Operator, OperatorAddedToQuorum, OperatorRemovedFromQuorum,
    OperatorStatus, QuorumApk,
};
use crate::error::MappingError;
use crate::events::{EventContext, NewPubkeyRegistration, QuorumUpdate};
use crate::ids;
use crate::reader::ContractReader;
use crate::store::EntityStore;

/// Project `NewPubkeyRegistration`: upsert the [`Operator`] addressed by
/// the BLS-derived id with its full key material.
///
/// A stub previously created from a non-signer list is completed here;
/// registration status already recorded on the operator survives.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_new_pubkey_registration<S: EntityStore>(
    store: &mut S,
    _ctx: &EventContext,
    event: &NewPubkeyRegistration,
) -> Result<(), MappingError> {
    let operator_id = ids::operator_id(event.pubkey_g1.x, event.pubkey_g1.y);
    let id = Bytes::copy_from_slice(operator_id.as_slice());

    store.upsert::<Operator>(
        &id,
        || Operator {
            id: id.clone(),
            operator: event.operator,
            pubkey_g1_x: event.pubkey_g1.x,
            pubkey_g1_y: event.pubkey_g1.y,
            pubkey_g2_x: event.pubkey_g2.x,
            pubkey_g2_y: event.pubkey_g2.y,
            deregistration_block_number: DEREGISTERED_NEVER,
            status: OperatorStatus::Unregistered,
        },
        |operator| {
            operator.operator = event.operator;
            operator.pubkey_g1_x = event.pubkey_g1.x;
            operator.pubkey_g1_y = event.pubkey_g1.y;
            operator.pubkey_g2_x = event.pubkey_g2.x;
            operator.pubkey_g2_y = event.pubkey_g2.y;
        },
    )?;

    Ok(())
}

/// Project `OperatorAddedToQuorums`: log entity plus a [`QuorumApk`]
/// rebuild for every listed quorum.
///
/// # Errors
///
/// Returns [`MappingError`] if any view call or store write fails; on a
/// read failure nothing is written, including for quorums already read.
pub fn handle_operator_added_to_quorums<S: EntityStore, R: ContractReader>(
    store: &mut S,
    reader: &R,
    ctx: &EventContext,
    event: &QuorumUpdate,
) -> Result<(), MappingError> {
    let apks = fetch_apks(reader, &event.quorum_numbers)?;

    store.save(&OperatorAddedToQuorum {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        operator: event.operator,
        operator_id: event.operator_id,
        quorum_numbers: event.quorum_numbers.clone(),
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;

    save_apks(store, ctx, apks)
}

/// Project `OperatorRemovedFromQuorums`: log entity plus a [`QuorumApk`]
/// rebuild for every listed quorum.
///
/// # Errors
///
/// Returns [`MappingError`] if any view call or store write fails; on a
/// read failure nothing is written, including for quorums already read.
pub fn handle_operator_removed_from_quorums<S: EntityStore, R: ContractReader>(
    store: &mut S,
    reader: &R,
    ctx: &EventContext,
    event: &QuorumUpdate,
) -> Result<(), MappingError> {
    let apks = fetch_apks(reader, &event.quorum_numbers)?;

    store.save(&OperatorRemovedFromQuorum {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        operator: event.operator,
        operator_id: event.operator_id,
        quorum_numbers: event.quorum_numbers.clone(),
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;

    save_apks(store, ctx, apks)
}

/// Read every listed quorum's aggregate key before anything is written, so
/// a failed call cannot leave a partial rebuild.
fn fetch_apks<R: ContractReader>(
    reader: &R,
    quorum_numbers: &Bytes,
) -> Result<Vec<(u8, crate::events::G1Point)>, MappingError> {
    let mut apks = Vec::with_capacity(quorum_numbers.len());
    for &quorum in quorum_numbers.iter() {
        apks.push((quorum, reader.quorum_apk(quorum)?));
    }
    Ok(apks)
}

fn save_apks<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    apks: Vec<(u8, crate::events::G1Point)>,
) -> Result<(), MappingError> {
    for (quorum, point) in apks {
        store.save(&QuorumApk {
            id: ids::quorum_apk_id(ctx.tx_hash, ctx.log_index, quorum),
            quorum_number: quorum,
            apk_x: point.x,
            apk_y: point.y,
            block_number: ctx.block_number,
            block_timestamp: ctx.block_timestamp,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DEREGISTERED_ACTIVE, EntityKind};
    use crate::events::{G1Point, G2Point};
    use crate::handlers::testutil::ctx;
    use crate::reader::ScriptedReader;
    use crate::store::MemoryStore;
    use alloy::primitives::{Address, B256, U256};

    fn registration(x: u64, y: u64) -> NewPubkeyRegistration {
        NewPubkeyRegistration {
            operator: Address::repeat_byte(0x33),
            pubkey_g1: G1Point {
                x: U256::from(x),
                y: U256::from(y),
            },
            pubkey_g2: G2Point::default(),
        }
    }

    fn membership(quorums: &[u8]) -> QuorumUpdate {
        QuorumUpdate {
            operator: Address::repeat_byte(0x44),
            operator_id: B256::repeat_byte(0x55),
            quorum_numbers: quorums.to_vec().into(),
        }
    }

    #[test]
    fn pubkey_registration_creates_operator() {
        let mut store = MemoryStore::new();
        handle_new_pubkey_registration(&mut store, &ctx(0x01, 0), &registration(9, 10)).unwrap();

        let id = ids::operator_id(U256::from(9u64), U256::from(10u64));
        let operator: Operator = store.load(id.as_slice()).unwrap().unwrap();
        assert_eq!(operator.status, OperatorStatus::Unregistered);
        assert_eq!(operator.deregistration_block_number, DEREGISTERED_NEVER);
        assert_eq!(operator.pubkey_g1_x, U256::from(9u64));
    }

    #[test]
    fn pubkey_registration_preserves_existing_status() {
        let mut store = MemoryStore::new();
        let event = registration(9, 10);
        handle_new_pubkey_registration(&mut store, &ctx(0x01, 0), &event).unwrap();

        let id = ids::operator_id(U256::from(9u64), U256::from(10u64));
        let mut operator: Operator = store.load(id.as_slice()).unwrap().unwrap();
        operator.deregistration_block_number = DEREGISTERED_ACTIVE;
        operator.status = OperatorStatus::Registered;
        store.save(&operator).unwrap();

        // Re-delivery of the key material must not reset the lifecycle.
        handle_new_pubkey_registration(&mut store, &ctx(0x02, 0), &event).unwrap();
        let reloaded: Operator = store.load(id.as_slice()).unwrap().unwrap();
        assert_eq!(reloaded.deregistration_block_number, DEREGISTERED_ACTIVE);
        assert_eq!(reloaded.status, OperatorStatus::Registered);
    }

    #[test]
    fn membership_change_rebuilds_each_listed_quorum() {
        let mut store = MemoryStore::new();
        let mut reader = ScriptedReader::new();
        for q in [1u8, 2, 5] {
            reader.set_apk(q, U256::from(u64::from(q) * 100), U256::from(u64::from(q) * 200));
        }
        let ctx = ctx(0x06, 3);

        handle_operator_added_to_quorums(&mut store, &reader, &ctx, &membership(&[1, 2, 5]))
            .unwrap();

        assert_eq!(store.count(EntityKind::QuorumApk), 3);
        for q in [1u8, 2, 5] {
            let id = ids::quorum_apk_id(ctx.tx_hash, ctx.log_index, q);
            let apk: QuorumApk = store.load(&id).unwrap().unwrap();
            assert_eq!(apk.quorum_number, q);
            assert_eq!(apk.apk_x, U256::from(u64::from(q) * 100));
            assert_eq!(apk.apk_y, U256::from(u64::from(q) * 200));
        }
        assert_eq!(store.count(EntityKind::OperatorAddedToQuorum), 1);
    }

    #[test]
    fn failed_read_writes_nothing() {
        let mut store = MemoryStore::new();
        let mut reader = ScriptedReader::new();
        // Quorum 2 is missing, so the second read fails.
        reader.set_apk(1, U256::from(1u64), U256::from(2u64));

        let err = handle_operator_removed_from_quorums(
            &mut store,
            &reader,
            &ctx(0x07, 0),
            &membership(&[1, 2]),
        )
        .unwrap_err();

        assert!(matches!(err, MappingError::Read(_)));
        assert!(store.is_empty());
    }
}
