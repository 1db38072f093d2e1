//! Read-only accessors over registry state.
//!
//! Every query works against anything implementing [`State`], so callers can read committed state
//! or a [`crate::Layer`] with pending changes. Queries that depend on "today" take the current
//! timestamp in microseconds.

use crate::state::{
    load_address, load_admins, load_approved_games, load_developers_share,
    load_dividend_change_time, load_excess, load_ledger, load_max_payout, load_proposal,
    load_proposal_list, load_watchdog, CallError, State,
};
use gamehub_types::{
    execution::Key,
    registry::{
        day_index, developers_amount, GameMetadata, GameProposal, GameStatus, GameType,
        LedgerEntry, METADATA_FIELDS,
    },
    Address, RegistryError,
};
use std::collections::BTreeMap;

/// Resolve a ledger day argument: values below 1 count back from today.
fn resolve_relative_day(now: u64, day: i64) -> Result<u64, RegistryError> {
    let resolved = if day < 1 {
        i128::from(day) + i128::from(day_index(now))
    } else {
        i128::from(day)
    };
    u64::try_from(resolved).map_err(|_| RegistryError::InvalidDay { day })
}

async fn require_proposal<S: State>(state: &S, game: &Address) -> Result<GameProposal, CallError> {
    load_proposal(state, game)
        .await?
        .ok_or_else(|| RegistryError::game_not_found(game).into())
}

// === Admin Registry ===

pub async fn super_admin<S: State>(state: &S) -> Result<Option<Address>, CallError> {
    Ok(load_address(state, &Key::SuperAdmin).await?)
}

/// All admins in ascending address order.
pub async fn admins<S: State>(state: &S) -> Result<Vec<Address>, CallError> {
    Ok(load_admins(state).await?.admins.into_iter().collect())
}

// === Game Registry ===

/// Every submitted game in submission order.
pub async fn score_list<S: State>(state: &S) -> Result<Vec<Address>, CallError> {
    Ok(load_proposal_list(state).await?.games)
}

/// Games currently in `gameApproved`, in submission order.
pub async fn approved_games<S: State>(state: &S) -> Result<Vec<Address>, CallError> {
    Ok(load_approved_games(state).await?)
}

pub async fn game_status<S: State>(state: &S, game: &Address) -> Result<GameStatus, CallError> {
    Ok(require_proposal(state, game).await?.status)
}

/// The metadata exactly as it was submitted.
pub async fn proposal_data<S: State>(state: &S, game: &Address) -> Result<String, CallError> {
    Ok(require_proposal(state, game).await?.metadata)
}

pub async fn revshare_wallet_address<S: State>(
    state: &S,
    game: &Address,
) -> Result<Address, CallError> {
    let proposal = require_proposal(state, game).await?;
    let metadata = GameMetadata::parse(&proposal.metadata, false)?;
    Ok(metadata.rev_share_wallet_address)
}

pub fn metadata_fields() -> &'static [&'static str] {
    &METADATA_FIELDS
}

pub fn game_types() -> Vec<&'static str> {
    GameType::ALL.iter().map(GameType::as_str).collect()
}

// === Ledger ===

pub async fn ledger_caller<S: State>(state: &S) -> Result<Option<Address>, CallError> {
    Ok(load_address(state, &Key::LedgerCaller).await?)
}

pub async fn dividend_change_time<S: State>(state: &S) -> Result<Option<u64>, CallError> {
    Ok(load_dividend_change_time(state).await?)
}

async fn daily_totals<S: State>(
    state: &S,
    now: u64,
    day: i64,
    pick: fn(&LedgerEntry) -> u128,
) -> Result<BTreeMap<Address, String>, CallError> {
    let day = resolve_relative_day(now, day)?;
    let mut totals = BTreeMap::new();
    for game in load_approved_games(state).await? {
        let entry = load_ledger(state, day, &game).await?;
        totals.insert(game, pick(&entry).to_string());
    }
    Ok(totals)
}

/// Wagers per approved game on `day` (0 is today, -1 yesterday, positive values are absolute).
pub async fn daily_wagers<S: State>(
    state: &S,
    now: u64,
    day: i64,
) -> Result<BTreeMap<Address, String>, CallError> {
    daily_totals(state, now, day, |entry| entry.wagers).await
}

/// Payouts per approved game on `day`, with the same day convention as [`daily_wagers`].
pub async fn daily_payouts<S: State>(
    state: &S,
    now: u64,
    day: i64,
) -> Result<BTreeMap<Address, String>, CallError> {
    daily_totals(state, now, day, |entry| entry.payouts).await
}

// === Excess ===

pub async fn developers_share<S: State>(state: &S) -> Result<u64, CallError> {
    Ok(load_developers_share(state).await?)
}

/// Running excess of every approved game.
pub async fn todays_games_excess<S: State>(
    state: &S,
) -> Result<BTreeMap<Address, String>, CallError> {
    let mut excess = BTreeMap::new();
    for game in load_approved_games(state).await? {
        let value = load_excess(state, &Key::TodaysExcess(game)).await?;
        excess.insert(game, value.to_string());
    }
    Ok(excess)
}

/// Archived excess of every approved game for `day`.
///
/// 0 returns the running values, negative days count back from today and positive days are
/// absolute.
pub async fn games_excess<S: State>(
    state: &S,
    now: u64,
    day: i64,
) -> Result<BTreeMap<Address, String>, CallError> {
    if day == 0 {
        return todays_games_excess(state).await;
    }
    let day = resolve_relative_day(now, day)?;
    let mut excess = BTreeMap::new();
    for game in load_approved_games(state).await? {
        let value = load_excess(state, &Key::ExcessHistory { day, game }).await?;
        excess.insert(game, value.to_string());
    }
    Ok(excess)
}

pub async fn yesterdays_games_excess<S: State>(
    state: &S,
    now: u64,
) -> Result<BTreeMap<Address, String>, CallError> {
    games_excess(state, now, -1).await
}

/// Developers' share of today's positive excess, as `record_excess` would compute it now.
pub async fn excess<S: State>(state: &S) -> Result<u128, CallError> {
    let mut positive_excess: u128 = 0;
    for game in load_approved_games(state).await? {
        let value = load_excess(state, &Key::TodaysExcess(game)).await?;
        if value >= 0 {
            positive_excess = positive_excess
                .checked_add(value.unsigned_abs())
                .ok_or(RegistryError::Overflow("positive excess"))?;
        }
    }
    let share = load_developers_share(state).await?;
    Ok(developers_amount(share, positive_excess)
        .ok_or(RegistryError::Overflow("developers amount"))?)
}

// === Watchdog ===

/// Payout ceiling of a submitted game (0 when none was set).
pub async fn max_payout<S: State>(state: &S, game: &Address) -> Result<u128, CallError> {
    require_proposal(state, game).await?;
    Ok(load_max_payout(state, game).await?)
}

pub async fn max_loss<S: State>(state: &S) -> Result<u128, CallError> {
    Ok(load_watchdog(state).await?.max_loss)
}

pub async fn watchdog_enabled<S: State>(state: &S) -> Result<bool, CallError> {
    Ok(load_watchdog(state).await?.enabled)
}
