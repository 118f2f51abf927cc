//! Routing from decoded chain events to their projectors.
//!
//! The host drives [`dispatch`] strictly sequentially in chain order
//! (ascending block height, ascending log index within a block). The
//! read-modify-write upserts rely on that ordering: no two invocations for
//! the same chain ever overlap, so no race exists between an entity's load
//! and its save.

use crate::error::MappingError;
use crate::events::{
    BatchConfirmed, ChurnApproverChanged, ConfirmBatchCall, EjectorChanged, EjectorStatusChanged,
    EventContext, GlobalRatePeriodIntervalChanged, GlobalSymbolsPerPeriodChanged,
    NewPubkeyRegistration, OnDemandPaymentChanged, OperatorEjected, OperatorStatusChange,
    QuorumEjected, QuorumUpdate, ReservationUpdated, SocketUpdated,
};
use crate::handlers::{
    bls_apk_registry, ejection_manager, payment_vault, registry_coordinator, service_manager,
};
use crate::reader::ContractReader;
use crate::store::EntityStore;

/// One decoded event or call, as delivered by the chain event source.
#[derive(Debug, Clone)]
pub enum ChainEvent {
    /// `EigenDAServiceManager.BatchConfirmed`.
    BatchConfirmed(BatchConfirmed),
    /// The `EigenDAServiceManager.confirmBatch` call payload.
    ConfirmBatchCall(ConfirmBatchCall),
    /// `BLSApkRegistry.NewPubkeyRegistration`.
    NewPubkeyRegistration(NewPubkeyRegistration),
    /// `BLSApkRegistry.OperatorAddedToQuorums`.
    OperatorAddedToQuorums(QuorumUpdate),
    /// `BLSApkRegistry.OperatorRemovedFromQuorums`.
    OperatorRemovedFromQuorums(QuorumUpdate),
    /// `RegistryCoordinator.OperatorRegistered`.
    OperatorRegistered(OperatorStatusChange),
    /// `RegistryCoordinator.OperatorDeregistered`.
    OperatorDeregistered(OperatorStatusChange),
    /// `RegistryCoordinator.OperatorSocketUpdate`.
    OperatorSocketUpdate(SocketUpdated),
    /// `RegistryCoordinator.ChurnApproverUpdated`.
    ChurnApproverUpdated(ChurnApproverChanged),
    /// `RegistryCoordinator.EjectorUpdated`.
    EjectorUpdated(EjectorChanged),
    /// `EjectionManager.EjectorUpdated`.
    EjectorStatusUpdated(EjectorStatusChanged),
    /// `EjectionManager.OperatorEjected`.
    OperatorEjected(OperatorEjected),
    /// `EjectionManager.QuorumEjection`.
    QuorumEjection(QuorumEjected),
    /// `PaymentVault.ReservationUpdated`.
    ReservationUpdated(ReservationUpdated),
    /// `PaymentVault.OnDemandPaymentUpdated`.
    OnDemandPaymentUpdated(OnDemandPaymentChanged),
    /// `PaymentVault.GlobalSymbolsPerPeriodUpdated`.
    GlobalSymbolsPerPeriodUpdated(GlobalSymbolsPerPeriodChanged),
    /// `PaymentVault.GlobalRatePeriodIntervalUpdated`.
    GlobalRatePeriodIntervalUpdated(GlobalRatePeriodIntervalChanged),
}

/// Route one decoded event to its projector.
///
/// # Errors
///
/// Returns [`MappingError`] when the event's projection fails; the caller
/// logs the failure and continues with the next event (per-event failure,
/// never a run abort).
pub fn dispatch<S: EntityStore, R: ContractReader>(
    store: &mut S,
    reader: &R,
    ctx: &EventContext,
    event: &ChainEvent,
) -> Result<(), MappingError> {
    match event {
        ChainEvent::BatchConfirmed(ev) => {
            service_manager::handle_batch_confirmed(store, ctx, ev)
        }
        ChainEvent::ConfirmBatchCall(call) => {
            service_manager::handle_confirm_batch(store, ctx, call)
        }
        ChainEvent::NewPubkeyRegistration(ev) => {
            bls_apk_registry::handle_new_pubkey_registration(store, ctx, ev)
        }
        ChainEvent::OperatorAddedToQuorums(ev) => {
            bls_apk_registry::handle_operator_added_to_quorums(store, reader, ctx, ev)
        }
        ChainEvent::OperatorRemovedFromQuorums(ev) => {
            bls_apk_registry::handle_operator_removed_from_quorums(store, reader, ctx, ev)
        }
        ChainEvent::OperatorRegistered(ev) => {
            registry_coordinator::handle_operator_registered(store, ctx, ev)
        }
        ChainEvent::OperatorDeregistered(ev) => {
            registry_coordinator::handle_operator_deregistered(store, ctx, ev)
        }
        ChainEvent::OperatorSocketUpdate(ev) => {
            registry_coordinator::handle_operator_socket_update(store, ctx, ev)
        }
        ChainEvent::ChurnApproverUpdated(ev) => {
            registry_coordinator::handle_churn_approver_updated(store, ctx, ev)
        }
        ChainEvent::EjectorUpdated(ev) => {
            registry_coordinator::handle_ejector_updated(store, ctx, ev)
        }
        ChainEvent::EjectorStatusUpdated(ev) => {
            ejection_manager::handle_ejector_status_updated(store, ctx, ev)
        }
        ChainEvent::OperatorEjected(ev) => {
            ejection_manager::handle_operator_ejected(store, ctx, ev)
        }
        ChainEvent::QuorumEjection(ev) => {
            ejection_manager::handle_quorum_ejection(store, ctx, ev)
        }
        ChainEvent::ReservationUpdated(ev) => {
            payment_vault::handle_reservation_updated(store, ctx, ev)
        }
        ChainEvent::OnDemandPaymentUpdated(ev) => {
            payment_vault::handle_on_demand_payment_updated(store, ctx, ev)
        }
        ChainEvent::GlobalSymbolsPerPeriodUpdated(ev) => {
            payment_vault::handle_global_symbols_per_period_updated(store, ctx, ev)
        }
        ChainEvent::GlobalRatePeriodIntervalUpdated(ev) => {
            payment_vault::handle_global_rate_period_interval_updated(store, ctx, ev)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EntityKind, Operator, OperatorStatus};
    use crate::events::{G1Point, G2Point, ReceiptMeta};
    use crate::handlers::testutil::ctx;
    use crate::ids;
    use crate::reader::ScriptedReader;
    use crate::store::MemoryStore;
    use alloy::primitives::{Address, U256};

    /// Drive a realistic sequence end to end: pubkey registration, quorum
    /// join, operator registration, and a batch confirmation naming the
    /// operator as a non-signer.
    #[test]
    fn sequential_dispatch_projects_a_full_flow() {
        let mut store = MemoryStore::new();
        let mut reader = ScriptedReader::new();
        reader.set_apk(0, U256::from(40u64), U256::from(41u64));

        let g1 = G1Point {
            x: U256::from(15u64),
            y: U256::from(16u64),
        };
        let operator_id = ids::operator_id(g1.x, g1.y);
        let operator = Address::repeat_byte(0x21);

        let flow = [
            (
                ctx(0x01, 0),
                ChainEvent::NewPubkeyRegistration(NewPubkeyRegistration {
                    operator,
                    pubkey_g1: g1,
                    pubkey_g2: G2Point::default(),
                }),
            ),
            (
                ctx(0x01, 1),
                ChainEvent::OperatorAddedToQuorums(QuorumUpdate {
                    operator,
                    operator_id,
                    quorum_numbers: vec![0].into(),
                }),
            ),
            (
                ctx(0x01, 2),
                ChainEvent::OperatorRegistered(OperatorStatusChange {
                    operator,
                    operator_id,
                }),
            ),
            (
                EventContext {
                    receipt: Some(ReceiptMeta {
                        gas_used: 5,
                        effective_gas_price: 2,
                    }),
                    ..ctx(0x02, 0)
                },
                ChainEvent::BatchConfirmed(BatchConfirmed {
                    batch_header_hash: alloy::primitives::B256::repeat_byte(0x99),
                    batch_id: 1,
                }),
            ),
            (
                ctx(0x02, 0),
                ChainEvent::ConfirmBatchCall(ConfirmBatchCall {
                    blob_headers_root: alloy::primitives::B256::repeat_byte(0x98),
                    quorum_numbers: vec![0].into(),
                    signed_stake_for_quorums: vec![100].into(),
                    reference_block_number: 90,
                    non_signer_pubkeys: vec![g1],
                }),
            ),
        ];

        for (ctx, event) in &flow {
            dispatch(&mut store, &reader, ctx, event).unwrap();
        }

        let op: Operator = store.load(operator_id.as_slice()).unwrap().unwrap();
        assert_eq!(op.status, OperatorStatus::Registered);
        assert_eq!(op.operator, operator);
        // The non-signer stub path must not have reset the registration.
        assert_eq!(op.deregistration_block_number, 4_294_967_295);

        assert_eq!(store.count(EntityKind::QuorumApk), 1);
        assert_eq!(store.count(EntityKind::Batch), 1);
        assert_eq!(store.count(EntityKind::BatchHeader), 1);
        assert_eq!(store.count(EntityKind::NonSigning), 1);
        assert_eq!(store.count(EntityKind::Operator), 1);
    }
}
