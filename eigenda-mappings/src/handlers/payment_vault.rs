//! Projectors for `PaymentVault` events.
//!
//! Reservation and on-demand deposit updates each write two records: an
//! immutable log entity of the raw event, and an upsert of the singleton
//! per-account entity holding only the latest terms. The log accumulates
//! history; the singleton always reflects the most recent event.

use alloy::primitives::Bytes;

use crate::entities::{
    ActiveReservation, GlobalRatePeriodIntervalUpdate, GlobalSymbolsPerPeriodUpdate,
    OnDemandPayment, OnDemandPaymentUpdate, ReservationUpdate,
};
use crate::error::MappingError;
use crate::events::{
    EventContext, GlobalRatePeriodIntervalChanged, GlobalSymbolsPerPeriodChanged,
    OnDemandPaymentChanged, ReservationUpdated,
};
use crate::ids;
use crate::store::EntityStore;

/// Project `ReservationUpdated`: immutable [`ReservationUpdate`] log plus
/// [`ActiveReservation`] upsert keyed by the account address.
///
/// Both records are written for every event; a second event for the same
/// account overwrites every mutable term while the log entities accumulate.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_reservation_updated<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &ReservationUpdated,
) -> Result<(), MappingError> {
    let terms = &event.reservation;

    store.save(&ReservationUpdate {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        account: event.account,
        symbols_per_second: terms.symbols_per_second,
        start_timestamp: terms.start_timestamp,
        end_timestamp: terms.end_timestamp,
        quorum_numbers: terms.quorum_numbers.clone(),
        quorum_splits: terms.quorum_splits.clone(),
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;

    let id = Bytes::copy_from_slice(event.account.as_slice());
    store.upsert::<ActiveReservation>(
        &id,
        || ActiveReservation {
            id: id.clone(),
            account: event.account,
            symbols_per_second: 0,
            start_timestamp: 0,
            end_timestamp: 0,
            quorum_numbers: Bytes::new(),
            quorum_splits: Bytes::new(),
            last_updated_block: 0,
            last_updated_timestamp: 0,
            last_updated_tx_hash: ctx.tx_hash,
        },
        |reservation| {
            reservation.symbols_per_second = terms.symbols_per_second;
            reservation.start_timestamp = terms.start_timestamp;
            reservation.end_timestamp = terms.end_timestamp;
            reservation.quorum_numbers = terms.quorum_numbers.clone();
            reservation.quorum_splits = terms.quorum_splits.clone();
            reservation.last_updated_block = ctx.block_number;
            reservation.last_updated_timestamp = ctx.block_timestamp;
            reservation.last_updated_tx_hash = ctx.tx_hash;
        },
    )?;

    Ok(())
}

/// Project `OnDemandPaymentUpdated`: immutable log plus [`OnDemandPayment`]
/// upsert keyed by the account address.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_on_demand_payment_updated<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &OnDemandPaymentChanged,
) -> Result<(), MappingError> {
    store.save(&OnDemandPaymentUpdate {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        account: event.account,
        on_demand_payment: event.on_demand_payment,
        total_deposit: event.total_deposit,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;

    let id = Bytes::copy_from_slice(event.account.as_slice());
    store.upsert::<OnDemandPayment>(
        &id,
        || OnDemandPayment {
            id: id.clone(),
            account: event.account,
            total_deposit: 0,
            last_updated_block: 0,
            last_updated_timestamp: 0,
            last_updated_tx_hash: ctx.tx_hash,
        },
        |payment| {
            payment.total_deposit = event.total_deposit;
            payment.last_updated_block = ctx.block_number;
            payment.last_updated_timestamp = ctx.block_timestamp;
            payment.last_updated_tx_hash = ctx.tx_hash;
        },
    )?;

    Ok(())
}

/// Project `GlobalSymbolsPerPeriodUpdated` as an append-only log entity.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_global_symbols_per_period_updated<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &GlobalSymbolsPerPeriodChanged,
) -> Result<(), MappingError> {
    store.save(&GlobalSymbolsPerPeriodUpdate {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        previous_value: event.previous_value,
        new_value: event.new_value,
        block_number: ctx.block_number,
        block_timestamp: ctx.block_timestamp,
        tx_hash: ctx.tx_hash,
    })?;
    Ok(())
}

/// Project `GlobalRatePeriodIntervalUpdated` as an append-only log entity.
///
/// # Errors
///
/// Returns [`MappingError`] on a store failure.
pub fn handle_global_rate_period_interval_updated<S: EntityStore>(
    store: &mut S,
    ctx: &EventContext,
    event: &GlobalRatePeriodIntervalChanged,
) -> Result<(), MappingError> {
    store.save(&GlobalRatePeriodIntervalUpdate {
        id: ids::log_scoped_id(ctx.tx_hash, ctx.log_index),
        previous_value: event.previous_value,
        new_value: event.new_value,
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
    use crate::events::ReservationTerms;
    use crate::handlers::testutil::ctx;
    use crate::store::MemoryStore;
    use alloy::primitives::Address;

    fn reservation(account: Address, sps: u64, end: u64) -> ReservationUpdated {
        ReservationUpdated {
            account,
            reservation: ReservationTerms {
                symbols_per_second: sps,
                start_timestamp: 1_000,
                end_timestamp: end,
                quorum_numbers: vec![0, 1].into(),
                quorum_splits: vec![50, 50].into(),
            },
        }
    }

    #[test]
    fn second_reservation_wins_while_logs_accumulate() {
        let mut store = MemoryStore::new();
        let account = Address::repeat_byte(0x66);

        handle_reservation_updated(&mut store, &ctx(0x01, 0), &reservation(account, 100, 2_000))
            .unwrap();
        handle_reservation_updated(&mut store, &ctx(0x02, 0), &reservation(account, 250, 9_000))
            .unwrap();

        assert_eq!(store.count(EntityKind::ReservationUpdate), 2);
        assert_eq!(store.count(EntityKind::ActiveReservation), 1);

        let current: ActiveReservation = store.load(account.as_slice()).unwrap().unwrap();
        assert_eq!(current.symbols_per_second, 250);
        assert_eq!(current.end_timestamp, 9_000);
        assert_eq!(current.last_updated_tx_hash, ctx(0x02, 0).tx_hash);
    }

    #[test]
    fn accounts_get_separate_current_reservations() {
        let mut store = MemoryStore::new();
        let a = Address::repeat_byte(0x01);
        let b = Address::repeat_byte(0x02);

        handle_reservation_updated(&mut store, &ctx(0x01, 0), &reservation(a, 10, 100)).unwrap();
        handle_reservation_updated(&mut store, &ctx(0x01, 1), &reservation(b, 20, 200)).unwrap();

        let for_a: ActiveReservation = store.load(a.as_slice()).unwrap().unwrap();
        let for_b: ActiveReservation = store.load(b.as_slice()).unwrap().unwrap();
        assert_eq!(for_a.symbols_per_second, 10);
        assert_eq!(for_b.symbols_per_second, 20);
    }

    #[test]
    fn on_demand_deposit_tracks_latest_total() {
        let mut store = MemoryStore::new();
        let account = Address::repeat_byte(0x77);

        let first = OnDemandPaymentChanged {
            account,
            on_demand_payment: 500,
            total_deposit: 500,
        };
        let second = OnDemandPaymentChanged {
            account,
            on_demand_payment: 250,
            total_deposit: 750,
        };
        handle_on_demand_payment_updated(&mut store, &ctx(0x01, 0), &first).unwrap();
        handle_on_demand_payment_updated(&mut store, &ctx(0x02, 0), &second).unwrap();

        assert_eq!(store.count(EntityKind::OnDemandPaymentUpdate), 2);
        let current: OnDemandPayment = store.load(account.as_slice()).unwrap().unwrap();
        assert_eq!(current.total_deposit, 750);
    }
}
