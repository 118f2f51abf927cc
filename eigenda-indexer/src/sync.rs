//! RPC log fetching and projection orchestration.
//!
//! For each network the engine:
//! 1. Loads the checkpoint (if any) to find the first unprojected block.
//! 2. Queries `eth_getLogs` over all tracked contracts in adaptive windows
//!    up to the chain tip.
//! 3. Decodes each log and feeds it through the mapping dispatch in
//!    `(block number, log index)` order, fetching the receipt, calldata and
//!    aggregate-key state the individual projections need.
//! 4. Advances the checkpoint after each fully-projected window.
//!
//! Projection failures are per-event: the offending log is reported and
//! skipped, and the sync keeps going.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use alloy::consensus::Transaction as _;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionRequest};
use anyhow::{Context, Result, bail};
use eigenda_mappings::events::{EventContext, ReceiptMeta};
use eigenda_mappings::reader::ScriptedReader;
use eigenda_mappings::{ChainEvent, MappingError, dispatch};

use crate::abi;
use crate::chains::{ChainSpec, ContractAddresses, ContractKind};
use crate::checkpoint::Checkpoint;
use crate::config::Config;
use crate::store::JsonFileStore;

/// Per-request timeout for RPC calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between consecutive `eth_getLogs` calls to avoid rate-limiting.
const INTER_WINDOW_DELAY: Duration = Duration::from_millis(100);

/// Maximum consecutive RPC errors before giving up on an endpoint.
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Progress is logged every N windows.
const PROGRESS_INTERVAL: u64 = 50;

/// Tracks the `eth_getLogs` window size with an adaptive ceiling.
///
/// On success the span doubles toward the ceiling; on error the ceiling
/// is permanently lowered so the RPC's actual limit is learned once.
struct Window {
    span: u64,
    ceiling: u64,
}

impl Window {
    const DEFAULT: u64 = 2_000;
    const MIN: u64 = 10;

    const fn new() -> Self {
        Self {
            span: Self::DEFAULT,
            ceiling: Self::DEFAULT,
        }
    }

    /// Grow toward the learned ceiling after a successful request.
    fn grow(&mut self) {
        self.span = (self.span * 2).min(self.ceiling);
    }

    /// Shrink and lower the ceiling after a failed request.
    /// Returns `false` when already at the minimum (caller should bail).
    fn shrink(&mut self) -> bool {
        if self.span <= Self::MIN {
            return false;
        }
        self.ceiling = (self.span / 2).max(Self::MIN);
        self.span = self.ceiling;
        true
    }
}

/// Synchronize a single network with automatic RPC fallback.
///
/// Tries each configured RPC in order. The checkpoint only advances past
/// fully-projected windows and every projection is idempotent, so a failed
/// endpoint never corrupts the data directory.
///
/// The data directory layout is:
/// ```text
/// <data_dir>/<network>/
///   ├── checkpoint.json
///   └── entities/<kind>/<id>.json
/// ```
///
/// # Errors
///
/// Returns an error only if *all* RPCs fail.
///
/// # Panics
///
/// Panics if the configured RPC list is empty.
pub async fn sync_network(spec: &ChainSpec, config: &Config, data_dir: &Path) -> Result<()> {
    let rpcs = config.rpcs_for(spec);
    let mut last_err = None;

    for (i, rpc_url) in rpcs.iter().enumerate() {
        match try_sync(spec, config, data_dir, rpc_url).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                if i + 1 < rpcs.len() {
                    tracing::warn!(
                        network = spec.name,
                        rpc = %rpc_url,
                        next = %rpcs[i + 1],
                        error = %e,
                        "RPC failed, falling back"
                    );
                } else {
                    tracing::error!(network = spec.name, rpc = %rpc_url, error = %e, "last RPC failed");
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.expect("rpcs is non-empty"))
}

/// Attempt a full sync using a single RPC endpoint.
async fn try_sync(spec: &ChainSpec, config: &Config, data_dir: &Path, rpc_url: &str) -> Result<()> {
    let network_dir = data_dir.join(spec.name);
    std::fs::create_dir_all(&network_dir)?;

    let addresses = config.addresses_for(spec);
    let tracked: Vec<Address> = ContractKind::ALL
        .iter()
        .filter_map(|&kind| addresses.get(kind))
        .collect();
    if tracked.is_empty() {
        bail!(
            "no contract addresses known for {}; add them under [networks.{}.contracts] in config.toml",
            spec.name,
            spec.name
        );
    }
    for &kind in ContractKind::ALL {
        if addresses.get(kind).is_none() {
            tracing::warn!(network = spec.name, contract = kind.as_str(), "no address, skipping");
        }
    }

    tracing::info!(network = spec.name, rpc = rpc_url, "connecting");

    let provider = ProviderBuilder::new().connect_http(
        rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL: {rpc_url}"))?,
    );

    let latest = tokio::time::timeout(REQUEST_TIMEOUT, provider.get_block_number())
        .await
        .context("get_block_number timed out")?
        .context("get_block_number failed")?;

    let start = Checkpoint::load(&network_dir)?
        .map_or_else(|| config.start_block_for(spec), |c| c.last_block + 1);

    if start > latest {
        tracing::info!(network = spec.name, latest, "already up to date");
        return Ok(());
    }

    tracing::info!(
        network = spec.name,
        from = start,
        to = latest,
        blocks = latest - start,
        "syncing"
    );

    let mut store = JsonFileStore::new(&network_dir);
    let mut timestamps = HashMap::new();
    let mut window = Window::new();
    let mut block = start;
    let mut count = 0u64;
    let mut errors = 0u32;

    while block <= latest {
        let end = (block + window.span - 1).min(latest);
        let filter = Filter::new()
            .address(tracked.clone())
            .from_block(block)
            .to_block(end);

        let result = tokio::time::timeout(REQUEST_TIMEOUT, provider.get_logs(&filter))
            .await
            .map_err(|_| anyhow::anyhow!("request timed out"))
            .and_then(|r| r.map_err(|e| anyhow::anyhow!("{e}")));

        match result {
            Ok(mut logs) => {
                errors = 0;
                logs.sort_by_key(|l| (l.block_number.unwrap_or(0), l.log_index.unwrap_or(0)));
                for log in &logs {
                    project_log(&provider, &addresses, &mut store, &mut timestamps, log).await;
                }
                Checkpoint::now(end).save(&network_dir)?;

                window.grow();
                block = end + 1;
                count += 1;
                if count.is_multiple_of(PROGRESS_INTERVAL) {
                    tracing::info!(
                        network = spec.name,
                        window = count,
                        block,
                        progress = %pct(block, start, latest),
                        "projecting"
                    );
                }
                tokio::time::sleep(INTER_WINDOW_DELAY).await;
            }
            Err(e) => {
                errors += 1;
                if errors >= MAX_CONSECUTIVE_ERRORS {
                    bail!("{}: {errors} consecutive errors at block {block}: {e}", spec.name);
                }
                if !window.shrink() {
                    bail!("{}: failed at min window size (block {block}): {e}", spec.name);
                }
                tracing::warn!(network = spec.name, block, span = window.span, error = %e, "retrying");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }

    tracing::info!(network = spec.name, last_block = latest, "checkpoint updated");
    Ok(())
}

/// Format progress as a percentage string.
fn pct(current: u64, from: u64, to: u64) -> String {
    if to <= from {
        return "100%".into();
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = (current - from) as f64 / (to - from) as f64 * 100.0;
    format!("{ratio:.0}%")
}

/// Decode and project a single log; failures are reported and swallowed so
/// one bad event cannot stall the sync.
async fn project_log<P: Provider>(
    provider: &P,
    addresses: &ContractAddresses,
    store: &mut JsonFileStore,
    timestamps: &mut HashMap<u64, u64>,
    log: &Log,
) {
    if let Err(e) = try_project_log(provider, addresses, store, timestamps, log).await {
        tracing::error!(
            address = %log.address(),
            tx_hash = ?log.transaction_hash,
            log_index = ?log.log_index,
            error = %e,
            "failed to project event, skipping"
        );
    }
}

async fn try_project_log<P: Provider>(
    provider: &P,
    addresses: &ContractAddresses,
    store: &mut JsonFileStore,
    timestamps: &mut HashMap<u64, u64>,
    log: &Log,
) -> Result<()> {
    let Some(kind) = addresses.kind_of(log.address()) else {
        return Ok(());
    };
    let Some(event) = abi::decode_log(kind, log)? else {
        return Ok(());
    };

    let tx_hash = log.transaction_hash.context("log missing transaction hash")?;
    let log_index = log.log_index.context("log missing index")?;
    let block_number = log.block_number.context("log missing block number")?;
    let block_timestamp = match log.block_timestamp {
        Some(ts) => ts,
        None => block_timestamp(provider, block_number, timestamps).await?,
    };

    let receipt = if matches!(event, ChainEvent::BatchConfirmed(_)) {
        fetch_receipt(provider, tx_hash).await?
    } else {
        None
    };

    let ctx = EventContext {
        tx_hash,
        log_index,
        block_number,
        block_timestamp,
        receipt,
    };

    let reader = prefetch_apks(provider, log.address(), block_number, &event).await?;

    log_mapping_error(dispatch(store, &reader, &ctx, &event));

    // A batch confirmation also projects the calldata of the confirming
    // transaction (blob headers root, quorums, non-signers).
    if matches!(event, ChainEvent::BatchConfirmed(_)) {
        if let Some(call) = fetch_confirm_batch(provider, tx_hash).await? {
            log_mapping_error(dispatch(store, &reader, &ctx, &ChainEvent::ConfirmBatchCall(call)));
        }
    }

    Ok(())
}

fn log_mapping_error(result: Result<(), MappingError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "projection failed, skipping event");
    }
}

/// Receipt metadata for the gas-fee projection, when the RPC has it.
async fn fetch_receipt<P: Provider>(provider: &P, tx_hash: B256) -> Result<Option<ReceiptMeta>> {
    let receipt = provider
        .get_transaction_receipt(tx_hash)
        .await
        .context("get_transaction_receipt failed")?;
    Ok(receipt.map(|r| ReceiptMeta {
        gas_used: r.gas_used,
        effective_gas_price: r.effective_gas_price,
    }))
}

/// The decoded `confirmBatch` calldata of the confirming transaction, if
/// the transaction is a direct call.
async fn fetch_confirm_batch<P: Provider>(
    provider: &P,
    tx_hash: B256,
) -> Result<Option<eigenda_mappings::events::ConfirmBatchCall>> {
    let Some(tx) = provider
        .get_transaction_by_hash(tx_hash)
        .await
        .context("get_transaction_by_hash failed")?
    else {
        return Ok(None);
    };
    abi::decode_confirm_batch(tx.input())
}

/// For quorum membership events, read the affected quorums' aggregate keys
/// from the emitting registry at the event's block.
///
/// All reads happen before dispatch so the handler sees a consistent
/// snapshot or nothing.
async fn prefetch_apks<P: Provider>(
    provider: &P,
    registry: Address,
    block_number: u64,
    event: &ChainEvent,
) -> Result<ScriptedReader> {
    let mut reader = ScriptedReader::new();

    let quorums = match event {
        ChainEvent::OperatorAddedToQuorums(update)
        | ChainEvent::OperatorRemovedFromQuorums(update) => &update.quorum_numbers,
        _ => return Ok(reader),
    };

    for &quorum in quorums.iter() {
        let req = TransactionRequest::default()
            .with_to(registry)
            .with_input(abi::encode_get_apk(quorum));
        let data = provider
            .call(req)
            .block(block_number.into())
            .await
            .with_context(|| format!("getApk({quorum}) failed"))?;
        let point = abi::decode_get_apk(&data)?;
        reader.set_apk(quorum, point.x, point.y);
    }

    Ok(reader)
}

/// Block timestamp lookup with a per-window cache; most RPCs omit
/// `blockTimestamp` on logs.
async fn block_timestamp<P: Provider>(
    provider: &P,
    number: u64,
    cache: &mut HashMap<u64, u64>,
) -> Result<u64> {
    if let Some(&ts) = cache.get(&number) {
        return Ok(ts);
    }
    let block = provider
        .get_block_by_number(number.into())
        .await
        .context("get_block_by_number failed")?
        .with_context(|| format!("block {number} not found"))?;
    cache.insert(number, block.header.timestamp);
    Ok(block.header.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_grows_to_ceiling_and_learns_limits() {
        let mut w = Window::new();
        assert_eq!(w.span, Window::DEFAULT);
        w.grow();
        assert_eq!(w.span, Window::DEFAULT);

        assert!(w.shrink());
        assert_eq!(w.span, 1_000);
        w.grow();
        // The ceiling was lowered for good.
        assert_eq!(w.span, 1_000);
    }

    #[test]
    fn window_refuses_to_shrink_below_minimum() {
        let mut w = Window::new();
        while w.span > Window::MIN {
            assert!(w.shrink());
        }
        assert!(!w.shrink());
    }

    #[test]
    fn pct_is_clamped_and_rounded() {
        assert_eq!(pct(5, 10, 10), "100%");
        assert_eq!(pct(50, 0, 100), "50%");
    }
}
