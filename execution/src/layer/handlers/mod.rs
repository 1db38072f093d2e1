use super::*;
use crate::state::{
    load_approved_games, load_developers_share, load_dividend_change_time, load_excess,
    load_ledger, load_max_payout, load_proposal, load_proposal_list, load_watchdog,
};
use tracing::{debug, info, warn};

mod admin;
mod excess;
mod ledger;
mod proposal;
mod watchdog;
