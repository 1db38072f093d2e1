use super::*;
use gamehub_types::{
    registry::GameStatus,
    watchdog::{evaluate_payout, PayoutDecision},
};

impl<'a, S: State, O: OwnerQuery> Layer<'a, S, O> {
    // === Ledger ===

    /// Whether wagers and payouts currently feed today's excess.
    async fn dividend_regime_active(&self) -> anyhow::Result<bool> {
        Ok(load_dividend_change_time(self)
            .await?
            .is_some_and(|marker| self.timestamp >= marker))
    }

    /// The game's running excess after applying `delta` (a wager, or a negated payout), or `None`
    /// outside the dividend regime.
    async fn todays_excess_after(
        &self,
        game: &Address,
        delta: impl FnOnce(i128) -> Option<i128>,
    ) -> Result<Option<i128>, CallError> {
        if !self.dividend_regime_active().await? {
            return Ok(None);
        }
        let excess = load_excess(self, &Key::TodaysExcess(*game)).await?;
        let excess = delta(excess).ok_or(RegistryError::Overflow("today's excess"))?;
        Ok(Some(excess))
    }

    pub async fn set_ledger_caller(
        &mut self,
        caller: &Address,
        address: &Address,
    ) -> Result<Vec<Event>, CallError> {
        self.require_contract_owner(caller)?;
        self.insert(Key::LedgerCaller, Value::Address(*address));
        info!(ledger_caller = %address, "ledger caller set");
        Ok(vec![])
    }

    /// Set the moment (microseconds) from which the dividend regime applies.
    ///
    /// Moving the marker restarts excess accounting: every submitted game's running excess is
    /// cleared.
    pub async fn set_dividend_change_time(
        &mut self,
        caller: &Address,
        timestamp: u64,
    ) -> Result<Vec<Event>, CallError> {
        self.require_contract_owner(caller)?;
        self.insert(Key::DividendChangeTime, Value::Timestamp(timestamp));
        let list = load_proposal_list(self).await?;
        for game in list.games {
            self.remove(Key::TodaysExcess(game));
        }
        info!(timestamp, "dividend change time set");
        Ok(vec![])
    }

    pub async fn record_wager(
        &mut self,
        caller: &Address,
        game: &Address,
        amount: u128,
    ) -> Result<Vec<Event>, CallError> {
        self.require_ledger_caller(caller).await?;

        let day = self.current_day();
        let mut entry = load_ledger(self, day, game).await?;
        entry.wagers = entry
            .wagers
            .checked_add(amount)
            .ok_or(RegistryError::Overflow("daily wagers"))?;
        let excess = self
            .todays_excess_after(game, |excess| {
                excess.checked_add(i128::try_from(amount).ok()?)
            })
            .await?;

        self.insert(Key::Ledger { day, game: *game }, Value::Ledger(entry));
        if let Some(excess) = excess {
            self.insert(Key::TodaysExcess(*game), Value::Excess(excess));
        }

        debug!(game = %game, day, amount, "wager recorded");
        Ok(vec![])
    }

    /// Record a payout, subject to the watchdog when it is enabled.
    ///
    /// A refused payout is not an error: the ledger is left untouched and the refusal is returned
    /// alongside an [`Event::PayoutRefused`]. A game in `gameApproved` is also suspended, which is
    /// reported as [`Event::GameSuspended`]; games still under review keep their status.
    pub async fn record_payout(
        &mut self,
        caller: &Address,
        game: &Address,
        amount: u128,
    ) -> Result<(PayoutDecision, Vec<Event>), CallError> {
        self.require_ledger_caller(caller).await?;

        let day = self.current_day();
        let mut entry = load_ledger(self, day, game).await?;

        let watchdog = load_watchdog(self).await?;
        if watchdog.enabled {
            let max_payout = load_max_payout(self, game).await?;
            let decision = evaluate_payout(max_payout, watchdog.max_loss, &entry, amount);
            if let Some(note) = decision.note() {
                let mut events = vec![Event::PayoutRefused {
                    game: *game,
                    decision,
                    note: note.clone(),
                }];
                match load_proposal(self, game).await? {
                    Some(mut proposal) if proposal.status == GameStatus::GameApproved => {
                        proposal.status = GameStatus::GameSuspended;
                        self.insert(Key::Proposal(*game), Value::Proposal(proposal));
                        warn!(game = %game, day, amount, %note, "payout refused; game suspended");
                        events.push(Event::GameSuspended {
                            score: *game,
                            note,
                        });
                    }
                    _ => warn!(game = %game, day, amount, %note, "payout refused"),
                }
                return Ok((decision, events));
            }
        }

        entry.payouts = entry
            .payouts
            .checked_add(amount)
            .ok_or(RegistryError::Overflow("daily payouts"))?;
        let excess = self
            .todays_excess_after(game, |excess| {
                excess.checked_sub(i128::try_from(amount).ok()?)
            })
            .await?;

        self.insert(Key::Ledger { day, game: *game }, Value::Ledger(entry));
        if let Some(excess) = excess {
            self.insert(Key::TodaysExcess(*game), Value::Excess(excess));
        }

        debug!(game = %game, day, amount, "payout recorded");
        Ok((PayoutDecision::Accept, vec![]))
    }
}
