use anyhow::Result;
use gamehub_types::Address;
use std::future::Future;

/// Resolves the owner a game contract reports for itself.
///
/// Proposal submission asks the submitted score address who owns it and only accepts the
/// proposal from that account. Failures (missing contract, reverted call) surface as errors.
pub trait OwnerQuery {
    fn score_owner(&self, score: &Address) -> impl Future<Output = Result<Address>>;
}
