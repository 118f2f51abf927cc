//! The projected entity model.
//!
//! Every record carries its own id ([`ids`](crate::ids) derivation) plus
//! block/transaction provenance. Immutable entities are written exactly
//! once and never reloaded; mutable entities (`Operator`,
//! `ActiveReservation`, `OnDemandPayment`) are always loaded (or default-
//! constructed) before being written, so fields an event does not touch
//! survive the upsert.

use alloy::primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Sentinel for an operator whose public key is known but which never
/// completed registration.
pub const DEREGISTERED_NEVER: u64 = 0;
/// Sentinel for a currently registered operator (max 32-bit unsigned).
pub const DEREGISTERED_ACTIVE: u64 = 0xFFFF_FFFF;

/// The distinct entity kinds the store keys by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// [`Batch`].
    Batch,
    /// [`BatchHeader`].
    BatchHeader,
    /// [`GasFees`].
    GasFees,
    /// [`NonSigning`].
    NonSigning,
    /// [`Operator`].
    Operator,
    /// [`QuorumApk`].
    QuorumApk,
    /// [`OperatorRegistration`].
    OperatorRegistration,
    /// [`OperatorDeregistration`].
    OperatorDeregistration,
    /// [`SocketUpdate`].
    SocketUpdate,
    /// [`ChurnApproverUpdate`].
    ChurnApproverUpdate,
    /// [`EjectorUpdate`].
    EjectorUpdate,
    /// [`EjectorStatusUpdate`].
    EjectorStatusUpdate,
    /// [`OperatorAddedToQuorum`].
    OperatorAddedToQuorum,
    /// [`OperatorRemovedFromQuorum`].
    OperatorRemovedFromQuorum,
    /// [`OperatorEjection`].
    OperatorEjection,
    /// [`QuorumEjection`].
    QuorumEjection,
    /// [`ReservationUpdate`].
    ReservationUpdate,
    /// [`ActiveReservation`].
    ActiveReservation,
    /// [`OnDemandPaymentUpdate`].
    OnDemandPaymentUpdate,
    /// [`OnDemandPayment`].
    OnDemandPayment,
    /// [`GlobalSymbolsPerPeriodUpdate`].
    GlobalSymbolsPerPeriodUpdate,
    /// [`GlobalRatePeriodIntervalUpdate`].
    GlobalRatePeriodIntervalUpdate,
}

impl EntityKind {
    /// Stable kind name, used for store namespacing and logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::BatchHeader => "batch_header",
            Self::GasFees => "gas_fees",
            Self::NonSigning => "non_signing",
            Self::Operator => "operator",
            Self::QuorumApk => "quorum_apk",
            Self::OperatorRegistration => "operator_registration",
            Self::OperatorDeregistration => "operator_deregistration",
            Self::SocketUpdate => "socket_update",
            Self::ChurnApproverUpdate => "churn_approver_update",
            Self::EjectorUpdate => "ejector_update",
            Self::EjectorStatusUpdate => "ejector_status_update",
            Self::OperatorAddedToQuorum => "operator_added_to_quorum",
            Self::OperatorRemovedFromQuorum => "operator_removed_from_quorum",
            Self::OperatorEjection => "operator_ejection",
            Self::QuorumEjection => "quorum_ejection",
            Self::ReservationUpdate => "reservation_update",
            Self::ActiveReservation => "active_reservation",
            Self::OnDemandPaymentUpdate => "on_demand_payment_update",
            Self::OnDemandPayment => "on_demand_payment",
            Self::GlobalSymbolsPerPeriodUpdate => "global_symbols_per_period_update",
            Self::GlobalRatePeriodIntervalUpdate => "global_rate_period_interval_update",
        }
    }
}

/// A storable record with a fixed kind and a self-describing id.
pub trait Entity: Serialize + DeserializeOwned {
    /// The store namespace this entity lives in.
    const KIND: EntityKind;

    /// The entity's identifier bytes.
    fn id(&self) -> &[u8];
}

macro_rules! impl_entity {
    ($ty:ident, $kind:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            fn id(&self) -> &[u8] {
                &self.id
            }
        }
    };
}

/// A confirmed batch, one per `confirmBatch` transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Batch {
    /// `batch-` ++ txHash.
    pub id: Bytes,
    /// Sequential batch number from the service manager.
    pub batch_id: u32,
    /// Hash of the confirmed batch header.
    pub batch_header_hash: B256,
    /// Id of the linked [`GasFees`] record.
    pub gas_fees: Bytes,
    /// Block the confirmation landed in.
    pub block_number: u64,
    /// Timestamp of that block.
    pub block_timestamp: u64,
    /// Confirming transaction.
    pub tx_hash: B256,
}
impl_entity!(Batch, Batch);

/// The batch header fields from the `confirmBatch` call payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchHeader {
    /// `header-` ++ txHash.
    pub id: Bytes,
    /// Id of the linked [`Batch`].
    pub batch: Bytes,
    /// Merkle root over the batch's blob headers.
    pub blob_headers_root: B256,
    /// Quorum numbers the batch was dispersed to.
    pub quorum_numbers: Bytes,
    /// Signed stake percentage per quorum.
    pub signed_stake_for_quorums: Bytes,
    /// Operator-state reference block.
    pub reference_block_number: u32,
    /// Block the confirmation landed in.
    pub block_number: u64,
    /// Timestamp of that block.
    pub block_timestamp: u64,
}
impl_entity!(BatchHeader, BatchHeader);

/// Gas accounting for a batch confirmation, derived from the receipt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GasFees {
    /// `gasfees-` ++ txHash.
    pub id: Bytes,
    /// Effective gas price paid, in wei.
    pub gas_price: u128,
    /// Gas consumed by the transaction.
    pub gas_used: u128,
    /// `gas_price * gas_used`; derived once, recomputed identically on
    /// replay, never re-read from chain.
    pub tx_fee: u128,
}
impl_entity!(GasFees, GasFees);

/// The ordered non-signer set of one batch confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NonSigning {
    /// `nonsigning-` ++ txHash.
    pub id: Bytes,
    /// Id of the linked [`Batch`].
    pub batch: Bytes,
    /// Operator ids in the exact order of the call's non-signer pubkey
    /// list (never re-sorted).
    pub non_signers: Vec<Bytes>,
}
impl_entity!(NonSigning, NonSigning);

/// Registration status of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorStatus {
    /// Public key seen, registration never completed.
    Unregistered,
    /// Currently registered.
    Registered,
    /// Deregistered at `deregistration_block_number`.
    Deregistered,
}

/// The mutable current-state record for an operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operator {
    /// 32-byte operator id (BLS-derived or registry-supplied).
    pub id: Bytes,
    /// The operator's on-chain address, when known.
    pub operator: Address,
    /// G1 public key X coordinate.
    pub pubkey_g1_x: U256,
    /// G1 public key Y coordinate.
    pub pubkey_g1_y: U256,
    /// G2 public key X coordinates `[x0, x1]`.
    pub pubkey_g2_x: [U256; 2],
    /// G2 public key Y coordinates `[y0, y1]`.
    pub pubkey_g2_y: [U256; 2],
    /// Lifecycle sentinel: [`DEREGISTERED_NEVER`], [`DEREGISTERED_ACTIVE`],
    /// or the deregistration block number. Mutated only by the
    /// registration/deregistration projectors.
    pub deregistration_block_number: u64,
    /// Derived lifecycle status, kept in lockstep with the sentinel.
    pub status: OperatorStatus,
}
impl_entity!(Operator, Operator);

/// A quorum's aggregate public key, re-fetched from the contract on every
/// membership change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuorumApk {
    /// txHash ++ logIndex ++ quorumNumber.
    pub id: Bytes,
    /// The quorum this aggregate key belongs to.
    pub quorum_number: u8,
    /// Aggregate key X coordinate, as returned by the live view call.
    pub apk_x: U256,
    /// Aggregate key Y coordinate.
    pub apk_y: U256,
    /// Block of the membership-change event.
    pub block_number: u64,
    /// Timestamp of that block.
    pub block_timestamp: u64,
}
impl_entity!(QuorumApk, QuorumApk);

macro_rules! log_entity {
    ($(#[$doc:meta])* $ty:ident, $kind:ident { $($(#[$fdoc:meta])* $field:ident : $fty:ty),* $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
        pub struct $ty {
            /// Log-scoped id: txHash ++ logIndex.
            pub id: Bytes,
            $($(#[$fdoc])* pub $field: $fty,)*
            /// Block of the event.
            pub block_number: u64,
            /// Timestamp of that block.
            pub block_timestamp: u64,
            /// Emitting transaction.
            pub tx_hash: B256,
        }
        impl_entity!($ty, $kind);
    };
}

log_entity!(
    /// Append-only record of an `OperatorRegistered` event.
    OperatorRegistration, OperatorRegistration {
        /// The operator's address.
        operator: Address,
        /// The operator's registry identifier.
        operator_id: B256,
    }
);

log_entity!(
    /// Append-only record of an `OperatorDeregistered` event.
    OperatorDeregistration, OperatorDeregistration {
        /// The operator's address.
        operator: Address,
        /// The operator's registry identifier.
        operator_id: B256,
    }
);

log_entity!(
    /// Append-only record of an `OperatorSocketUpdate` event.
    SocketUpdate, SocketUpdate {
        /// The operator's registry identifier.
        operator_id: B256,
        /// The newly advertised socket.
        socket: String,
    }
);

log_entity!(
    /// Append-only record of a `ChurnApproverUpdated` event.
    ChurnApproverUpdate, ChurnApproverUpdate {
        /// Previous churn approver.
        prev_churn_approver: Address,
        /// New churn approver.
        new_churn_approver: Address,
    }
);

log_entity!(
    /// Append-only record of the registry coordinator's `EjectorUpdated`.
    EjectorUpdate, EjectorUpdate {
        /// Previous ejector.
        prev_ejector: Address,
        /// New ejector.
        new_ejector: Address,
    }
);

log_entity!(
    /// Append-only record of the ejection manager's `EjectorUpdated`.
    EjectorStatusUpdate, EjectorStatusUpdate {
        /// The ejector account.
        ejector: Address,
        /// Whether the account is now authorized.
        status: bool,
    }
);

log_entity!(
    /// Append-only record of an `OperatorAddedToQuorums` event.
    OperatorAddedToQuorum, OperatorAddedToQuorum {
        /// The operator's address.
        operator: Address,
        /// The operator's registry identifier.
        operator_id: B256,
        /// The quorums joined, one byte each.
        quorum_numbers: Bytes,
    }
);

log_entity!(
    /// Append-only record of an `OperatorRemovedFromQuorums` event.
    OperatorRemovedFromQuorum, OperatorRemovedFromQuorum {
        /// The operator's address.
        operator: Address,
        /// The operator's registry identifier.
        operator_id: B256,
        /// The quorums left, one byte each.
        quorum_numbers: Bytes,
    }
);

log_entity!(
    /// Append-only record of an `OperatorEjected` event.
    OperatorEjection, OperatorEjection {
        /// Identifier of the ejected operator.
        operator_id: B256,
        /// Quorum the operator was ejected from.
        quorum_number: u8,
    }
);

log_entity!(
    /// Append-only record of a `QuorumEjection` event.
    QuorumEjection, QuorumEjection {
        /// Number of operators ejected.
        ejected_operators: u32,
        /// Whether the rate limit was hit.
        ratelimit_hit: bool,
    }
);

log_entity!(
    /// Append-only record of a `ReservationUpdated` event.
    ReservationUpdate, ReservationUpdate {
        /// The reserving account.
        account: Address,
        /// Reserved symbols per second.
        symbols_per_second: u64,
        /// Window start (unix seconds).
        start_timestamp: u64,
        /// Window end (unix seconds).
        end_timestamp: u64,
        /// Covered quorums, one byte each.
        quorum_numbers: Bytes,
        /// Per-quorum splits, parallel to `quorum_numbers`.
        quorum_splits: Bytes,
    }
);

log_entity!(
    /// Append-only record of an `OnDemandPaymentUpdated` event.
    OnDemandPaymentUpdate, OnDemandPaymentUpdate {
        /// The depositing account.
        account: Address,
        /// Deposit amount of this update, in wei.
        on_demand_payment: u128,
        /// Cumulative deposit after this update, in wei.
        total_deposit: u128,
    }
);

log_entity!(
    /// Append-only record of a `GlobalSymbolsPerPeriodUpdated` event.
    GlobalSymbolsPerPeriodUpdate, GlobalSymbolsPerPeriodUpdate {
        /// Value before the update.
        previous_value: u64,
        /// Value after the update.
        new_value: u64,
    }
);

log_entity!(
    /// Append-only record of a `GlobalRatePeriodIntervalUpdated` event.
    GlobalRatePeriodIntervalUpdate, GlobalRatePeriodIntervalUpdate {
        /// Value before the update.
        previous_value: u64,
        /// Value after the update.
        new_value: u64,
    }
);

/// The singleton-per-account mutable reservation, holding only the latest
/// terms. Keyed by the account address; a later `ReservationUpdated`
/// overwrites every term while the [`ReservationUpdate`] log accumulates
/// history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveReservation {
    /// The account address bytes.
    pub id: Bytes,
    /// The reserving account.
    pub account: Address,
    /// Reserved symbols per second.
    pub symbols_per_second: u64,
    /// Window start (unix seconds).
    pub start_timestamp: u64,
    /// Window end (unix seconds).
    pub end_timestamp: u64,
    /// Covered quorums, one byte each.
    pub quorum_numbers: Bytes,
    /// Per-quorum splits, parallel to `quorum_numbers`.
    pub quorum_splits: Bytes,
    /// Block of the latest update.
    pub last_updated_block: u64,
    /// Timestamp of the latest update.
    pub last_updated_timestamp: u64,
    /// Transaction of the latest update.
    pub last_updated_tx_hash: B256,
}
impl_entity!(ActiveReservation, ActiveReservation);

/// The singleton-per-account cumulative on-demand deposit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnDemandPayment {
    /// The account address bytes.
    pub id: Bytes,
    /// The depositing account.
    pub account: Address,
    /// Latest cumulative deposit, in wei.
    pub total_deposit: u128,
    /// Block of the latest update.
    pub last_updated_block: u64,
    /// Timestamp of the latest update.
    pub last_updated_timestamp: u64,
    /// Transaction of the latest update.
    pub last_updated_tx_hash: B256,
}
impl_entity!(OnDemandPayment, OnDemandPayment);
