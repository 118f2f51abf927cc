//! Projectors for `EjectionManager` events. All append-only log entities.

use crate::entities::{EjectorStatusUpdate, OperatorEjection, QuorumEjection};
use crate::error::MappingError;
use crate::events::{EjectorStatusChanged, EventContext, OperatorEjected, QuorumEjected};
use crate::ids;
use crate::store::EntityStore;

/// Project `OperatorEjected` as an append-only log entity.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_operator_ejected<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &OperatorEjected,
) -> Result<(), MappingError> {
    store.save(&OperatorEjection {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        operator_id: event.operator_id,
        quorum_number: event.quorum_number,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;
    Ok(())
}

/// Project `QuorumEjection` as an append-only log entity.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_quorum_ejection<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &QuorumEjected,
) -> Result<(), MappingError> {
    store.save(&QuorumEjection {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        ejected_operators: event.ejected_operators,
        ratelimit_hit: event.ratelimit_hit,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;
    Ok(())
}

/// Project the ejection manager's `EjectorUpdated` as an append-only log
/// entity.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_ejector_status_updated<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &EjectorStatusChanged,
) -> Result<(), MappingError> {
    store.save(&EjectorStatusUpdate {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        ejector: event.ejector,
        status: event.status,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityKind;
    use crate::handlers::testutil::ctx;
    use crate::store::MemoryStore;
    use alloy::primitives::B256;

    #[test]
    fn ejection_events_project_to_log_entities() {
        let mut store = MemoryStore::new();

        handle_operator_ejected(
            &mut store,
            &ctx(0x01, 0),
            &OperatorEjected {
                operator_id: B256::repeat_byte(0x12),
                quorum_number: 1,
            },
        )
        .unwrap();
        handle_quorum_ejection(
            &mut store,
            &ctx(0x01, 1),
            &QuorumEjected {
                ejected_operators: 4,
                ratelimit_hit: true,
            },
        )
        .unwrap();

        assert_eq!(store.count(EntityKind::OperatorEjection), 1);
        let id = ids::log_scoped_id(ctx(0x01, 1).tx_hash, 1);
        let record: QuorumEjection = store.load(&id).unwrap().unwrap();
        assert_eq!(record.ejected_operators, 4);
        assert!(record.ratelimit_hit);
    }
}
