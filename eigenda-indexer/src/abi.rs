//! Contract ABI definitions and raw-log decoding.
//!
//! Each contract gets its own `sol!` block because the registry
//! coordinator and the ejection manager both declare an `EjectorUpdated`
//! event with different parameter lists; keeping them in separate modules
//! keeps both signatures addressable. Decoding maps a raw log to a
//! [`ChainEvent`] by matching `topic0` against the known signatures of the
//! emitting contract; unknown topics are skipped, not errors.

use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};
use anyhow::{Context, Result};
use eigenda_mappings::ChainEvent;
use eigenda_mappings::events as payload;

use crate::chains::ContractKind;

mod service_manager {
    use alloy::sol;

    sol! {
        struct G1Point {
            uint256 x;
            uint256 y;
        }

        struct G2Point {
            uint256[2] x;
            uint256[2] y;
        }

        struct BatchHeader {
            bytes32 blobHeadersRoot;
            bytes quorumNumbers;
            bytes signedStakeForQuorums;
            uint32 referenceBlockNumber;
        }

        struct NonSignerStakesAndSignature {
            uint32[] nonSignerQuorumBitmapIndices;
            G1Point[] nonSignerPubkeys;
            G1Point[] quorumApks;
            G2Point apkG2;
            G1Point sigma;
            uint32[] quorumApkIndices;
            uint32[] totalStakeIndices;
            uint32[][] nonSignerStakeIndices;
        }

        event BatchConfirmed(bytes32 indexed batchHeaderHash, uint32 batchId);

        function confirmBatch(
            BatchHeader calldata batchHeader,
            NonSignerStakesAndSignature memory nonSignerStakesAndSignature
        ) external;
    }
}

mod bls_apk_registry {
    use alloy::sol;

    sol! {
        struct G1Point {
            uint256 x;
            uint256 y;
        }

        struct G2Point {
            uint256[2] x;
            uint256[2] y;
        }

        event NewPubkeyRegistration(address indexed operator, G1Point pubkeyG1, G2Point pubkeyG2);
        event OperatorAddedToQuorums(address operator, bytes32 operatorId, bytes quorumNumbers);
        event OperatorRemovedFromQuorums(address operator, bytes32 operatorId, bytes quorumNumbers);

        function getApk(uint8 quorumNumber) external view returns (G1Point memory);
    }
}

mod registry_coordinator {
    use alloy::sol;

    sol! {
        event OperatorRegistered(address indexed operator, bytes32 indexed operatorId);
        event OperatorDeregistered(address indexed operator, bytes32 indexed operatorId);
        event OperatorSocketUpdate(bytes32 indexed operatorId, string socket);
        event ChurnApproverUpdated(address prevChurnApprover, address newChurnApprover);
        event EjectorUpdated(address prevEjector, address newEjector);
    }
}

mod ejection_manager {
    use alloy::sol;

    sol! {
        event OperatorEjected(bytes32 operatorId, uint8 quorumNumber);
        event QuorumEjection(uint32 ejectedOperators, bool ratelimitHit);
        event EjectorUpdated(address ejector, bool status);
    }
}

mod payment_vault {
    use alloy::sol;

    sol! {
        struct Reservation {
            uint64 symbolsPerSecond;
            uint64 startTimestamp;
            uint64 endTimestamp;
            bytes quorumNumbers;
            bytes quorumSplits;
        }

        event ReservationUpdated(address indexed account, Reservation reservation);
        event OnDemandPaymentUpdated(address indexed account, uint80 onDemandPayment, uint80 totalDeposit);
        event GlobalSymbolsPerPeriodUpdated(uint64 previousValue, uint64 newValue);
        event GlobalRatePeriodIntervalUpdated(uint64 previousValue, uint64 newValue);
    }
}

/// Decode one raw log from a known contract into a [`ChainEvent`].
///
/// Returns `Ok(None)` for topics this indexer does not project (contracts
/// emit more events than the entity model tracks).
///
/// # Errors
///
/// Returns an error when the topic matches a tracked signature but the log
/// body does not decode against it.
pub fn decode_log(source: ContractKind, log: &Log) -> Result<Option<ChainEvent>> {
    let Some(&topic0) = log.topic0() else {
        return Ok(None);
    };
    let data = &log.inner.data;

    let event = match source {
        ContractKind::ServiceManager => match topic0 {
            t if t == service_manager::BatchConfirmed::SIGNATURE_HASH => {
                let ev = service_manager::BatchConfirmed::decode_log_data(data)?;
                ChainEvent::BatchConfirmed(payload::BatchConfirmed {
                    batch_header_hash: ev.batchHeaderHash,
                    batch_id: ev.batchId,
                })
            }
            _ => return Ok(None),
        },
        ContractKind::BlsApkRegistry => match topic0 {
            t if t == bls_apk_registry::NewPubkeyRegistration::SIGNATURE_HASH => {
                let ev = bls_apk_registry::NewPubkeyRegistration::decode_log_data(data)?;
                ChainEvent::NewPubkeyRegistration(payload::NewPubkeyRegistration {
                    operator: ev.operator,
                    pubkey_g1: payload::G1Point {
                        x: ev.pubkeyG1.x,
                        y: ev.pubkeyG1.y,
                    },
                    pubkey_g2: payload::G2Point {
                        x: ev.pubkeyG2.x,
                        y: ev.pubkeyG2.y,
                    },
                })
            }
            t if t == bls_apk_registry::OperatorAddedToQuorums::SIGNATURE_HASH => {
                let ev = bls_apk_registry::OperatorAddedToQuorums::decode_log_data(data)?;
                ChainEvent::OperatorAddedToQuorums(payload::QuorumUpdate {
                    operator: ev.operator,
                    operator_id: ev.operatorId,
                    quorum_numbers: ev.quorumNumbers,
                })
            }
            t if t == bls_apk_registry::OperatorRemovedFromQuorums::SIGNATURE_HASH => {
                let ev = bls_apk_registry::OperatorRemovedFromQuorums::decode_log_data(data)?;
                ChainEvent::OperatorRemovedFromQuorums(payload::QuorumUpdate {
                    operator: ev.operator,
                    operator_id: ev.operatorId,
                    quorum_numbers: ev.quorumNumbers,
                })
            }
            _ => return Ok(None),
        },
        ContractKind::RegistryCoordinator => match topic0 {
            t if t == registry_coordinator::OperatorRegistered::SIGNATURE_HASH => {
                let ev = registry_coordinator::OperatorRegistered::decode_log_data(data)?;
                ChainEvent::OperatorRegistered(payload::OperatorStatusChange {
                    operator: ev.operator,
                    operator_id: ev.operatorId,
                })
            }
            t if t == registry_coordinator::OperatorDeregistered::SIGNATURE_HASH => {
                let ev = registry_coordinator::OperatorDeregistered::decode_log_data(data)?;
                ChainEvent::OperatorDeregistered(payload::OperatorStatusChange {
                    operator: ev.operator,
                    operator_id: ev.operatorId,
                })
            }
            t if t == registry_coordinator::OperatorSocketUpdate::SIGNATURE_HASH => {
                let ev = registry_coordinator::OperatorSocketUpdate::decode_log_data(data)?;
                ChainEvent::OperatorSocketUpdate(payload::SocketUpdated {
                    operator_id: ev.operatorId,
                    socket: ev.socket,
                })
            }
            t if t == registry_coordinator::ChurnApproverUpdated::SIGNATURE_HASH => {
                let ev = registry_coordinator::ChurnApproverUpdated::decode_log_data(data)?;
                ChainEvent::ChurnApproverUpdated(payload::ChurnApproverChanged {
                    prev_churn_approver: ev.prevChurnApprover,
                    new_churn_approver: ev.newChurnApprover,
                })
            }
            t if t == registry_coordinator::EjectorUpdated::SIGNATURE_HASH => {
                let ev = registry_coordinator::EjectorUpdated::decode_log_data(data)?;
                ChainEvent::EjectorUpdated(payload::EjectorChanged {
                    prev_ejector: ev.prevEjector,
                    new_ejector: ev.newEjector,
                })
            }
            _ => return Ok(None),
        },
        ContractKind::EjectionManager => match topic0 {
            t if t == ejection_manager::OperatorEjected::SIGNATURE_HASH => {
                let ev = ejection_manager::OperatorEjected::decode_log_data(data)?;
                ChainEvent::OperatorEjected(payload::OperatorEjected {
                    operator_id: ev.operatorId,
                    quorum_number: ev.quorumNumber,
                })
            }
            t if t == ejection_manager::QuorumEjection::SIGNATURE_HASH => {
                let ev = ejection_manager::QuorumEjection::decode_log_data(data)?;
                ChainEvent::QuorumEjection(payload::QuorumEjected {
                    ejected_operators: ev.ejectedOperators,
                    ratelimit_hit: ev.ratelimitHit,
                })
            }
            t if t == ejection_manager::EjectorUpdated::SIGNATURE_HASH => {
                let ev = ejection_manager::EjectorUpdated::decode_log_data(data)?;
                ChainEvent::EjectorStatusUpdated(payload::EjectorStatusChanged {
                    ejector: ev.ejector,
                    status: ev.status,
                })
            }
            _ => return Ok(None),
        },
        ContractKind::PaymentVault => match topic0 {
            t if t == payment_vault::ReservationUpdated::SIGNATURE_HASH => {
                let ev = payment_vault::ReservationUpdated::decode_log_data(data)?;
                ChainEvent::ReservationUpdated(payload::ReservationUpdated {
                    account: ev.account,
                    reservation: payload::ReservationTerms {
                        symbols_per_second: ev.reservation.symbolsPerSecond,
                        start_timestamp: ev.reservation.startTimestamp,
                        end_timestamp: ev.reservation.endTimestamp,
                        quorum_numbers: ev.reservation.quorumNumbers,
                        quorum_splits: ev.reservation.quorumSplits,
                    },
                })
            }
            t if t == payment_vault::OnDemandPaymentUpdated::SIGNATURE_HASH => {
                let ev = payment_vault::OnDemandPaymentUpdated::decode_log_data(data)?;
                ChainEvent::OnDemandPaymentUpdated(payload::OnDemandPaymentChanged {
                    account: ev.account,
                    on_demand_payment: ev.onDemandPayment.to::<u128>(),
                    total_deposit: ev.totalDeposit.to::<u128>(),
                })
            }
            t if t == payment_vault::GlobalSymbolsPerPeriodUpdated::SIGNATURE_HASH => {
                let ev = payment_vault::GlobalSymbolsPerPeriodUpdated::decode_log_data(data)?;
                ChainEvent::GlobalSymbolsPerPeriodUpdated(payload::GlobalSymbolsPerPeriodChanged {
                    previous_value: ev.previousValue,
                    new_value: ev.newValue,
                })
            }
            t if t == payment_vault::GlobalRatePeriodIntervalUpdated::SIGNATURE_HASH => {
                let ev = payment_vault::GlobalRatePeriodIntervalUpdated::decode_log_data(data)?;
                ChainEvent::GlobalRatePeriodIntervalUpdated(
                    payload::GlobalRatePeriodIntervalChanged {
                        previous_value: ev.previousValue,
                        new_value: ev.newValue,
                    },
                )
            }
            _ => return Ok(None),
        },
    };

    Ok(Some(event))
}

/// Decode a `confirmBatch` transaction input into its call payload.
///
/// Returns `Ok(None)` when the transaction is not a `confirmBatch` call
/// (batch confirmations can also be emitted from wrapper contracts whose
/// outer calldata differs).
///
/// # Errors
///
/// Returns an error when the selector matches but the calldata does not
/// decode.
pub fn decode_confirm_batch(input: &[u8]) -> Result<Option<payload::ConfirmBatchCall>> {
    if input.len() < 4 || input[..4] != service_manager::confirmBatchCall::SELECTOR {
        return Ok(None);
    }
    let call = service_manager::confirmBatchCall::abi_decode(input)
        .context("decoding confirmBatch calldata")?;

    let header = call.batchHeader;
    let non_signers = call
        .nonSignerStakesAndSignature
        .nonSignerPubkeys
        .into_iter()
        .map(|p| payload::G1Point { x: p.x, y: p.y })
        .collect();

    Ok(Some(payload::ConfirmBatchCall {
        blob_headers_root: header.blobHeadersRoot,
        quorum_numbers: header.quorumNumbers,
        signed_stake_for_quorums: header.signedStakeForQuorums,
        reference_block_number: header.referenceBlockNumber,
        non_signer_pubkeys: non_signers,
    }))
}

/// Encode a `getApk(uint8)` view call against the BLS APK registry.
#[must_use]
pub fn encode_get_apk(quorum: u8) -> Vec<u8> {
    bls_apk_registry::getApkCall {
        quorumNumber: quorum,
    }
    .abi_encode()
}

/// Decode the `getApk` return value.
///
/// # Errors
///
/// Returns an error if the return data does not decode as a G1 point.
pub fn decode_get_apk(data: &[u8]) -> Result<payload::G1Point> {
    let point = bls_apk_registry::getApkCall::abi_decode_returns(data)
        .context("decoding getApk return")?;
    Ok(payload::G1Point {
        x: point.x,
        y: point.y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, U256};
    use alloy::sol_types::SolValue;

    fn log_from(address: Address, data: alloy::primitives::LogData) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            ..Default::default()
        }
    }

    #[test]
    fn batch_confirmed_decodes() {
        let ev = service_manager::BatchConfirmed {
            batchHeaderHash: B256::repeat_byte(0xaa),
            batchId: 42,
        };
        let log = log_from(Address::repeat_byte(0x01), ev.encode_log_data());

        let decoded = decode_log(ContractKind::ServiceManager, &log).unwrap().unwrap();
        match decoded {
            ChainEvent::BatchConfirmed(b) => {
                assert_eq!(b.batch_header_hash, B256::repeat_byte(0xaa));
                assert_eq!(b.batch_id, 42);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn ejector_updated_signatures_stay_distinct() {
        // Same event name on two contracts; different parameter lists must
        // produce different topics.
        assert_ne!(
            registry_coordinator::EjectorUpdated::SIGNATURE_HASH,
            ejection_manager::EjectorUpdated::SIGNATURE_HASH,
        );

        let ev = ejection_manager::EjectorUpdated {
            ejector: Address::repeat_byte(0x02),
            status: true,
        };
        let log = log_from(Address::repeat_byte(0x01), ev.encode_log_data());
        let decoded = decode_log(ContractKind::EjectionManager, &log).unwrap().unwrap();
        assert!(matches!(decoded, ChainEvent::EjectorStatusUpdated(e) if e.status));

        // The registry coordinator does not know this topic.
        assert!(
            decode_log(ContractKind::RegistryCoordinator, &log)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn unknown_topic_is_skipped() {
        let data = alloy::primitives::LogData::new_unchecked(
            vec![B256::repeat_byte(0xfe)],
            alloy::primitives::Bytes::new(),
        );
        let log = log_from(Address::repeat_byte(0x01), data);
        assert!(decode_log(ContractKind::PaymentVault, &log).unwrap().is_none());
    }

    #[test]
    fn confirm_batch_calldata_round_trips() {
        let call = service_manager::confirmBatchCall {
            batchHeader: service_manager::BatchHeader {
                blobHeadersRoot: B256::repeat_byte(0x11),
                quorumNumbers: vec![0, 1].into(),
                signedStakeForQuorums: vec![90, 85].into(),
                referenceBlockNumber: 1_000,
            },
            nonSignerStakesAndSignature: service_manager::NonSignerStakesAndSignature {
                nonSignerQuorumBitmapIndices: vec![0],
                nonSignerPubkeys: vec![service_manager::G1Point {
                    x: U256::from(7u64),
                    y: U256::from(8u64),
                }],
                quorumApks: vec![],
                apkG2: service_manager::G2Point {
                    x: [U256::ZERO, U256::ZERO],
                    y: [U256::ZERO, U256::ZERO],
                },
                sigma: service_manager::G1Point {
                    x: U256::ZERO,
                    y: U256::ZERO,
                },
                quorumApkIndices: vec![],
                totalStakeIndices: vec![],
                nonSignerStakeIndices: vec![],
            },
        };

        let input = call.abi_encode();
        let decoded = decode_confirm_batch(&input).unwrap().unwrap();
        assert_eq!(decoded.blob_headers_root, B256::repeat_byte(0x11));
        assert_eq!(decoded.reference_block_number, 1_000);
        assert_eq!(decoded.non_signer_pubkeys.len(), 1);
        assert_eq!(decoded.non_signer_pubkeys[0].x, U256::from(7u64));

        // Unrelated calldata is not an error.
        assert!(decode_confirm_batch(&[0xde, 0xad, 0xbe, 0xef]).unwrap().is_none());
    }

    #[test]
    fn get_apk_call_round_trips() {
        let input = encode_get_apk(3);
        assert_eq!(input[..4], bls_apk_registry::getApkCall::SELECTOR);

        let returned = bls_apk_registry::G1Point {
            x: U256::from(5u64),
            y: U256::from(6u64),
        }
        .abi_encode();
        let point = decode_get_apk(&returned).unwrap();
        assert_eq!(point.x, U256::from(5u64));
        assert_eq!(point.y, U256::from(6u64));
    }
}
