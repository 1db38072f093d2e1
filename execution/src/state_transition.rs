//! Apply a block's calls to state.
//!
//! Blocks must be applied in height order. Re-applying a height that is already reflected in state
//! is a no-op, so replaying a block after a crash converges to the same state.

use crate::{state::height as stored_height, Deployment, Layer, OwnerQuery, State};
use anyhow::{anyhow, Context as _};
use commonware_codec::Encode;
use commonware_cryptography::{sha256::Digest, Hasher, Sha256};
use gamehub_types::execution::{Call, Key, Output, Value};

/// Result of executing a block.
#[derive(Debug)]
pub struct BlockResult {
    pub height: u64,
    pub outputs: Vec<Output>,
    /// SHA-256 over the encoded change set, in key order.
    pub changes_digest: Digest,
    /// Number of keys written or deleted.
    pub changes: usize,
    /// Number of calls that took effect.
    pub executed_calls: usize,
}

/// Execute the block at `height` with block time `timestamp` (microseconds).
///
/// Only the next expected height is executed. Heights at or below the stored height return an
/// empty result, and gaps are an error.
pub async fn execute_block<S: State, O: OwnerQuery>(
    state: &mut S,
    owners: &O,
    deployment: Deployment,
    height: u64,
    timestamp: u64,
    calls: Vec<Call>,
) -> anyhow::Result<BlockResult> {
    let state_height = stored_height(state).await.context("read state height")?;

    if height <= state_height {
        return Ok(BlockResult {
            height: state_height,
            outputs: Vec::new(),
            changes_digest: Sha256::new().finalize(),
            changes: 0,
            executed_calls: 0,
        });
    }

    let expected_next_height = state_height.saturating_add(1);
    if height != expected_next_height {
        return Err(anyhow!(
            "non-sequential height: state_height={state_height}, expected={expected_next_height}, requested={height}"
        ));
    }

    let mut layer = Layer::new(&*state, owners, deployment, timestamp);
    let outputs = layer
        .execute(calls)
        .await
        .with_context(|| format!("execute layer (height={height})"))?;
    State::insert(&mut layer, Key::Height, Value::Height(height))
        .await
        .context("record height")?;
    let changes = layer.commit();

    let mut hasher = Sha256::new();
    for (key, status) in &changes {
        hasher.update(key.encode().as_ref());
        hasher.update(status.encode().as_ref());
    }
    let changes_digest = hasher.finalize();
    let changes_len = changes.len();

    state
        .apply(changes)
        .await
        .with_context(|| format!("apply state changes (height={height})"))?;

    let executed_calls = outputs
        .iter()
        .filter(|output| matches!(output, Output::Call(_)))
        .count();
    tracing::info!(
        height,
        executed_calls,
        rejected = outputs
            .iter()
            .filter(|output| matches!(output, Output::Rejected { .. }))
            .count(),
        changes = changes_len,
        "block applied"
    );

    Ok(BlockResult {
        height,
        outputs,
        changes_digest,
        changes: changes_len,
        executed_calls,
    })
}
