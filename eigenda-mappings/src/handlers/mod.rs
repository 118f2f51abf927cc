//! Event projectors, one module per source contract.
//!
//! Every handler follows the same contract: derive deterministic ids,
//! populate fields by direct mapping from the decoded payload, attach block
//! provenance, and persist through the injected store. Recoverable skips
//! log at error severity and return success; fatal failures abort the
//! single event with no partial writes.

pub mod bls_apk_registry;
pub mod ejection_manager;
pub mod payment_vault;
pub mod registry_coordinator;
pub mod service_manager;

#[cfg(test)]
pub(crate) mod testutil {
    use alloy::primitives::{B256, U256};

    use crate::entities::{DEREGISTERED_NEVER, Operator, OperatorStatus};
    use crate::events::{EventContext, ReceiptMeta};

    pub(crate) fn tx_hash(byte: u8) -> B256 {
        B256::repeat_byte(byte)
    }

    pub(crate) fn ctx(tx_byte: u8, log_index: u64) -> EventContext {
        EventContext {
            tx_hash: tx_hash(tx_byte),
            log_index,
            block_number: 100,
            block_timestamp: 1_700_000_000,
            receipt: None,
        }
    }

    pub(crate) fn ctx_with_receipt(
        tx_byte: u8,
        log_index: u64,
        gas_price: u128,
        gas_used: u64,
    ) -> EventContext {
        EventContext {
            receipt: Some(ReceiptMeta {
                gas_used,
                effective_gas_price: gas_price,
            }),
            ..ctx(tx_byte, log_index)
        }
    }

    pub(crate) fn bare_operator(id: B256, x: u64, y: u64) -> Operator {
        Operator {
            id: id.as_slice().to_vec().into(),
            operator: alloy::primitives::Address::ZERO,
            pubkey_g1_x: U256::from(x),
            pubkey_g1_y: U256::from(y),
            pubkey_g2_x: [U256::ZERO; 2],
            pubkey_g2_y: [U256::ZERO; 2],
            deregistration_block_number: DEREGISTERED_NEVER,
            status: OperatorStatus::Unregistered,
        }
    }
}
