//! Peer and read-channel setup.
//!
//! Each step reads current state first and only writes when it differs, so
//! re-running against an already wired pair sends no transactions.

use alloy::primitives::{Address, B256};
use eyre::Result;
use tracing::info;

use crate::{
    app::ReadApp,
    retry::{with_retry, RetryConfig},
};

/// Peer encoding used by the protocol: the address left-padded to 32 bytes.
pub fn peer_word(address: Address) -> B256 {
    address.into_word()
}

/// Returns whether a transaction was sent.
pub async fn ensure_peer(
    app: &dyn ReadApp,
    remote_eid: u32,
    remote: Address,
    retry: &RetryConfig,
) -> Result<bool> {
    let wanted = peer_word(remote);
    let current = with_retry(retry, "peers", || app.peer(remote_eid)).await?;
    if current == wanted {
        info!(app = %app.address(), remote_eid, %remote, "peer already set");
        return Ok(false);
    }

    let tx_hash = app.set_peer(remote_eid, wanted).await?;
    info!(app = %app.address(), remote_eid, %remote, %tx_hash, "peer set");
    Ok(true)
}

/// Read channels are stored as a peer entry pointing at the app itself.
pub async fn ensure_read_channel(
    app: &dyn ReadApp,
    channel_id: u32,
    retry: &RetryConfig,
) -> Result<bool> {
    let current = with_retry(retry, "peers", || app.peer(channel_id)).await?;
    if current == peer_word(app.address()) {
        info!(app = %app.address(), channel_id, "read channel already enabled");
        return Ok(false);
    }

    let tx_hash = app.set_read_channel(channel_id, true).await?;
    info!(app = %app.address(), channel_id, %tx_hash, "read channel enabled");
    Ok(true)
}

/// Links `a` and `b` as mutual peers and enables `channel_id` on both.
/// Returns the number of transactions sent.
pub async fn wire_pair(
    a: &dyn ReadApp,
    b: &dyn ReadApp,
    channel_id: u32,
    retry: &RetryConfig,
) -> Result<usize> {
    let mut sent = 0;

    for (app, remote) in [(a, b), (b, a)] {
        if ensure_peer(app, remote.eid(), remote.address(), retry).await? {
            sent += 1;
        }
    }
    for app in [a, b] {
        if ensure_read_channel(app, channel_id, retry).await? {
            sent += 1;
        }
    }

    info!(sent, "wiring complete");
    Ok(sent)
}
