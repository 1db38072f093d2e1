use super::*;
use gamehub_types::registry::developers_amount;

impl<'a, S: State, O: OwnerQuery> Layer<'a, S, O> {
    // === Excess Snapshotter ===

    pub async fn set_developers_share(
        &mut self,
        caller: &Address,
        percent: u64,
    ) -> Result<Vec<Event>, CallError> {
        self.require_contract_owner(caller)?;
        if percent > 100 {
            return Err(RegistryError::InvalidAmount {
                what: "developers share",
                value: u128::from(percent),
            }
            .into());
        }
        self.insert(Key::DevelopersShare, Value::Share(percent));
        info!(percent, "developers share set");
        Ok(vec![])
    }

    /// Roll the day: archive every approved game's running excess under yesterday and return the
    /// developers' share of the positive part.
    ///
    /// Non-negative balances restart from zero; negative balances carry into the new day.
    pub async fn record_excess(
        &mut self,
        caller: &Address,
    ) -> Result<(u128, Vec<Event>), CallError> {
        self.require_ledger_caller(caller).await?;

        let today = self.current_day();
        let day = today
            .checked_sub(1)
            .ok_or(RegistryError::InvalidDay { day: -1 })?;

        let mut snapshot = Vec::new();
        let mut positive_excess: u128 = 0;
        for game in load_approved_games(self).await? {
            let excess = load_excess(self, &Key::TodaysExcess(game)).await?;
            if excess >= 0 {
                positive_excess = positive_excess
                    .checked_add(excess.unsigned_abs())
                    .ok_or(RegistryError::Overflow("positive excess"))?;
            }
            snapshot.push((game, excess));
        }
        let share = load_developers_share(self).await?;
        let developers_amount = developers_amount(share, positive_excess)
            .ok_or(RegistryError::Overflow("developers amount"))?;

        for (game, excess) in snapshot {
            self.insert(Key::ExcessHistory { day, game }, Value::Excess(excess));
            if excess >= 0 {
                self.insert(Key::TodaysExcess(game), Value::Excess(0));
            }
        }

        info!(day, positive_excess, developers_amount, "excess recorded");
        Ok((
            developers_amount,
            vec![Event::ExcessRecorded {
                day,
                positive_excess,
                developers_amount,
            }],
        ))
    }
}
