//! Payout risk policy.

use crate::registry::LedgerEntry;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PayoutDecision {
    Accept,
    RejectOverpayment { requested: u128, max_payout: u128 },
    RejectExcessLoss { max_loss: u128, loss: i128 },
}

impl PayoutDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept)
    }

    /// Reason recorded with the suspension, if the payout was refused.
    pub fn note(&self) -> Option<String> {
        match self {
            Self::Accept => None,
            Self::RejectOverpayment {
                requested,
                max_payout,
            } => Some(format!(
                "To prevent overpayment. Requested payout: {requested}. MaxPayout: {max_payout}."
            )),
            Self::RejectExcessLoss { max_loss, loss } => Some(format!(
                "To limit loss. MaxLoss: {max_loss}. Loss incurred if payout: {loss}."
            )),
        }
    }
}

/// Decide whether `requested` may be paid out given the game's ceiling, the global loss ceiling
/// and what the game has already booked today.
///
/// The loss check is `payouts + requested - wagers >= max_loss` in signed arithmetic, so a day in
/// profit can absorb larger payouts.
pub fn evaluate_payout(
    max_payout: u128,
    max_loss: u128,
    today: &LedgerEntry,
    requested: u128,
) -> PayoutDecision {
    if requested > max_payout {
        return PayoutDecision::RejectOverpayment {
            requested,
            max_payout,
        };
    }

    let loss = signed(today.payouts)
        .saturating_add(signed(requested))
        .saturating_sub(signed(today.wagers));
    if loss >= signed(max_loss) {
        return PayoutDecision::RejectExcessLoss { max_loss, loss };
    }

    PayoutDecision::Accept
}

fn signed(value: u128) -> i128 {
    i128::try_from(value).unwrap_or(i128::MAX)
}
