//! Projectors for `RegistryCoordinator` events.
//!
//! Registration and deregistration drive the operator lifecycle
//! reconciliation; the remaining events are append-only log entities.
//! The lifecycle sentinel moves `0` (never registered) →
//! `0xFFFFFFFF` (registered) → block number (deregistered), and may return
//! to registered. No other projector mutates it.

use crate::entities::{
    ChurnApproverUpdate, DEREGISTERED_ACTIVE, EjectorUpdate, Operator, OperatorDeregistration,
    OperatorRegistration, OperatorStatus, SocketUpdate,
};
use crate::error::MappingError;
use crate::events::{
    ChurnApproverChanged, EjectorChanged, EventContext, OperatorStatusChange, SocketUpdated,
};
use crate::ids;
use crate::store::EntityStore;

/// Project `OperatorRegistered`: write the log entity and mark the operator
/// as currently registered.
///
/// A registration for an operator whose public key was never seen is a
/// data-integrity error: the event is logged and dropped, since an operator
/// record cannot be fabricated without its pubkey coordinates.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_operator_registered<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &OperatorStatusChange,
) -> Result<(), MappingError> {
    let Some(mut operator) = store.load::<Operator>(event.operator_id.as_slice())? else {
        tracing::error!(
            operator_id = %event.operator_id,
            tx_hash = %ctx.tx_hash,
            "registration event for unknown operator, dropping"
        );
        return Ok(());
    };

    store.save(&OperatorRegistration {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        operator: event.operator,
        operator_id: event.operator_id,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;

    operator.operator = event.operator;
    operator.deregistration_block_number = DEREGISTERED_ACTIVE;
    operator.status = OperatorStatus::Registered;
    store.save(&operator)?;

    Ok(())
}

/// Project `OperatorDeregistered`: write the log entity and record the
/// deregistration block on the operator.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_operator_deregistered<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &OperatorStatusChange,
) -> Result<(), MappingError> {
    let Some(mut operator) = store.load::<Operator>(event.operator_id.as_slice())? else {
        tracing::error!(
            operator_id = %event.operator_id,
            tx_hash = %ctx.tx_hash,
            "deregistration event for unknown operator, dropping"
        );
        return Ok(());
    };

    store.save(&OperatorDeregistration {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        operator: event.operator,
        operator_id: event.operator_id,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;

    operator.deregistration_block_number = ctx.block_number;
    operator.status = OperatorStatus::Deregistered;
    store.save(&operator)?;

    Ok(())
}

/// Project `OperatorSocketUpdate` as an append-only log entity.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_operator_socket_update<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &SocketUpdated,
) -> Result<(), MappingError> {
    store.save(&SocketUpdate {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        operator_id: event.operator_id,
        socket: event.socket.clone(),
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;
    Ok(())
}

/// Project `ChurnApproverUpdated` as an append-only log entity.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_churn_approver_updated<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &ChurnApproverChanged,
) -> Result<(), MappingError> {
    store.save(&ChurnApproverUpdate {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        prev_churn_approver: event.prev_churn_approver,
        new_churn_approver: event.new_churn_approver,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;
    Ok(())
}

/// Project the registry coordinator's `EjectorUpdated` as an append-only
/// log entity.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_ejector_updated<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &EjectorChanged,
) -> Result<(), MappingError> {
    store.save(&EjectorUpdate {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        prev_ejector: event.prev_ejector,
        new_ejector: event.new_ejector,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;
    Ok(())
}
