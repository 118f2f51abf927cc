//! Decoded event/call payloads and their block context.
//!
//! The host runtime (or the `eigenda-indexer` runner) performs ABI decoding
//! and delivers these plain payloads in chain order. Field names follow the
//! source contract ABIs.

use alloy::primitives::{Address, B256, Bytes, U256};

/// Block and transaction provenance delivered alongside every payload.
#[derive(Debug, Clone, Copy)]
pub struct EventContext {
    /// Hash of the transaction that emitted the event.
    pub tx_hash: B256,
    /// Index of the log within the block.
    pub log_index: u64,
    /// Height of the containing block.
    pub block_number: u64,
    /// Timestamp of the containing block (seconds).
    pub block_timestamp: u64,
    /// Transaction receipt, when the host could supply one. Projectors
    /// that need it treat absence as a recoverable skip.
    pub receipt: Option<ReceiptMeta>,
}

/// The receipt fields the gas-fee projection needs.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptMeta {
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// Effective gas price paid, in wei.
    pub effective_gas_price: u128,
}

/// A BN254 G1 point as a pair of field coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G1Point {
    /// X coordinate.
    pub x: U256,
    /// Y coordinate.
    pub y: U256,
}

/// A BN254 G2 point; each coordinate is two field elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct G2Point {
    /// X coordinate `[x0, x1]`.
    pub x: [U256; 2],
    /// Y coordinate `[y0, y1]`.
    pub y: [U256; 2],
}

/// `EigenDAServiceManager.BatchConfirmed(bytes32 batchHeaderHash, uint32 batchId)`.
#[derive(Debug, Clone, Copy)]
pub struct BatchConfirmed {
    /// Hash of the confirmed batch header.
    pub batch_header_hash: B256,
    /// Sequential batch number assigned by the service manager.
    pub batch_id: u32,
}

/// The decoded `EigenDAServiceManager.confirmBatch` call payload.
#[derive(Debug, Clone)]
pub struct ConfirmBatchCall {
    /// Merkle root over the blob headers in the batch.
    pub blob_headers_root: B256,
    /// Quorum numbers the batch was dispersed to, one byte each.
    pub quorum_numbers: Bytes,
    /// Signed stake percentage per quorum, parallel to `quorum_numbers`.
    pub signed_stake_for_quorums: Bytes,
    /// Block the operator state was referenced at.
    pub reference_block_number: u32,
    /// G1 public keys of the operators that did not sign, in call order.
    pub non_signer_pubkeys: Vec<G1Point>,
}

/// `BLSApkRegistry.NewPubkeyRegistration`.
#[derive(Debug, Clone, Copy)]
pub struct NewPubkeyRegistration {
    /// Address of the registering operator.
    pub operator: Address,
    /// The operator's G1 public key.
    pub pubkey_g1: G1Point,
    /// The operator's G2 public key.
    pub pubkey_g2: G2Point,
}

/// `BLSApkRegistry.OperatorAddedToQuorums` / `OperatorRemovedFromQuorums`.
#[derive(Debug, Clone)]
pub struct QuorumUpdate {
    /// Address of the affected operator.
    pub operator: Address,
    /// The operator's registry identifier.
    pub operator_id: B256,
    /// Affected quorum numbers, one byte each.
    pub quorum_numbers: Bytes,
}

/// `RegistryCoordinator.OperatorRegistered` / `OperatorDeregistered`.
#[derive(Debug, Clone, Copy)]
pub struct OperatorStatusChange {
    /// Address of the operator.
    pub operator: Address,
    /// The operator's registry identifier.
    pub operator_id: B256,
}

/// `RegistryCoordinator.OperatorSocketUpdate`.
#[derive(Debug, Clone)]
pub struct SocketUpdated {
    /// The operator's registry identifier.
    pub operator_id: B256,
    /// The advertised socket string (`host:port`).
    pub socket: String,
}

/// `RegistryCoordinator.ChurnApproverUpdated`.
#[derive(Debug, Clone, Copy)]
pub struct ChurnApproverChanged {
    /// Previous churn approver address.
    pub prev_churn_approver: Address,
    /// New churn approver address.
    pub new_churn_approver: Address,
}

/// `RegistryCoordinator.EjectorUpdated`.
#[derive(Debug, Clone, Copy)]
pub struct EjectorChanged {
    /// Previous ejector address.
    pub prev_ejector: Address,
    /// New ejector address.
    pub new_ejector: Address,
}

/// `EjectionManager.EjectorUpdated(address ejector, bool status)`.
#[derive(Debug, Clone, Copy)]
pub struct EjectorStatusChanged {
    /// The ejector account.
    pub ejector: Address,
    /// Whether the account is now authorized to eject.
    pub status: bool,
}

/// `EjectionManager.OperatorEjected`.
#[derive(Debug, Clone, Copy)]
pub struct OperatorEjected {
    /// Identifier of the ejected operator.
    pub operator_id: B256,
    /// Quorum the operator was ejected from.
    pub quorum_number: u8,
}

/// `EjectionManager.QuorumEjection`.
#[derive(Debug, Clone, Copy)]
pub struct QuorumEjected {
    /// Number of operators ejected in this pass.
    pub ejected_operators: u32,
    /// Whether the ejection rate limit was hit.
    pub ratelimit_hit: bool,
}

/// The reservation terms carried by `PaymentVault.ReservationUpdated`.
#[derive(Debug, Clone)]
pub struct ReservationTerms {
    /// Reserved bandwidth in symbols per second.
    pub symbols_per_second: u64,
    /// Start of the reservation window (unix seconds).
    pub start_timestamp: u64,
    /// End of the reservation window (unix seconds).
    pub end_timestamp: u64,
    /// Quorum numbers covered by the reservation, one byte each.
    pub quorum_numbers: Bytes,
    /// Per-quorum bandwidth splits, parallel to `quorum_numbers`.
    pub quorum_splits: Bytes,
}

/// `PaymentVault.ReservationUpdated`.
#[derive(Debug, Clone)]
pub struct ReservationUpdated {
    /// The reserving account.
    pub account: Address,
    /// The full replacement reservation terms.
    pub reservation: ReservationTerms,
}

/// `PaymentVault.OnDemandPaymentUpdated`.
#[derive(Debug, Clone, Copy)]
pub struct OnDemandPaymentChanged {
    /// The depositing account.
    pub account: Address,
    /// The deposit amount of this update, in wei.
    pub on_demand_payment: u128,
    /// The account's cumulative deposit after this update, in wei.
    pub total_deposit: u128,
}

/// `PaymentVault.GlobalSymbolsPerPeriodUpdated`.
#[derive(Debug, Clone, Copy)]
pub struct GlobalSymbolsPerPeriodChanged {
    /// Value before the update.
    pub previous_value: u64,
    /// Value after the update.
    pub new_value: u64,
}

/// `PaymentVault.GlobalRatePeriodIntervalUpdated`.
#[derive(Debug, Clone, Copy)]
pub struct GlobalRatePeriodIntervalChanged {
    /// Value before the update.
    pub previous_value: u64,
    /// Value after the update.
    pub new_value: u64,
}
