use super::*;
use gamehub_types::registry::MIN_AMOUNT;

impl<'a, S: State, O: OwnerQuery> Layer<'a, S, O> {
    // === Watchdog ===

    pub async fn set_max_payout(
        &mut self,
        caller: &Address,
        game: &Address,
        amount: u128,
    ) -> Result<Vec<Event>, CallError> {
        self.require_admin(caller).await?;
        if amount < MIN_AMOUNT {
            return Err(RegistryError::InvalidAmount {
                what: "max payout",
                value: amount,
            }
            .into());
        }
        if load_proposal(self, game).await?.is_none() {
            return Err(RegistryError::game_not_found(game).into());
        }

        self.insert(Key::MaxPayout(*game), Value::Amount(amount));
        info!(game = %game, amount, "max payout set");
        Ok(vec![])
    }

    pub async fn set_max_loss(
        &mut self,
        caller: &Address,
        amount: u128,
    ) -> Result<Vec<Event>, CallError> {
        self.require_admin(caller).await?;
        if amount < MIN_AMOUNT {
            return Err(RegistryError::InvalidAmount {
                what: "max loss",
                value: amount,
            }
            .into());
        }

        let mut watchdog = load_watchdog(self).await?;
        watchdog.max_loss = amount;
        self.insert(Key::Watchdog, Value::Watchdog(watchdog));
        info!(amount, "max loss set");
        Ok(vec![])
    }

    /// Flip the watchdog on or off.
    ///
    /// It can only be switched on once the loss ceiling and the payout ceiling of every approved
    /// game are at least [`MIN_AMOUNT`].
    pub async fn toggle_watchdog(&mut self, caller: &Address) -> Result<Vec<Event>, CallError> {
        self.require_admin(caller).await?;

        let mut watchdog = load_watchdog(self).await?;
        if !watchdog.enabled {
            for game in load_approved_games(self).await? {
                if load_max_payout(self, &game).await? < MIN_AMOUNT {
                    return Err(RegistryError::PreconditionFailed(format!(
                        "maxPayout of {game} is less than 0.1 units"
                    ))
                    .into());
                }
            }
            if watchdog.max_loss < MIN_AMOUNT {
                return Err(RegistryError::PreconditionFailed(
                    "maxLoss is set to a value less than 0.1 units".to_string(),
                )
                .into());
            }
        }

        watchdog.enabled = !watchdog.enabled;
        self.insert(Key::Watchdog, Value::Watchdog(watchdog));
        info!(enabled = watchdog.enabled, admin = %caller, "watchdog toggled");
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        approve_game, contract, deployment, install_admins, sample_metadata, wallet,
        StaticOwners,
    };
    use crate::query;
    use crate::state::Memory;
    use commonware_runtime::{deterministic::Runner, Runner as _};
    use gamehub_types::registry::{GameStatus, MULTIPLIER, PROPOSAL_FEE};

    #[test]
    fn ceilings_have_a_floor() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let owners = StaticOwners::default().with_owner(contract(1), wallet(10));
            let mut layer = Layer::new(&state, &owners, deployment(), 0);
            install_admins(&mut layer, &wallet(1), &[]).await;

            let err = layer.set_max_loss(&wallet(1), MIN_AMOUNT - 1).await.unwrap_err();
            assert!(matches!(
                err.rejection(),
                Some(RegistryError::InvalidAmount { what: "max loss", .. })
            ));
            assert!(layer.set_max_loss(&wallet(10), MIN_AMOUNT).await.is_err());
            layer.set_max_loss(&wallet(1), MIN_AMOUNT).await.unwrap();
            assert_eq!(query::max_loss(&layer).await.unwrap(), MIN_AMOUNT);

            let err = layer
                .set_max_payout(&wallet(1), &contract(1), MULTIPLIER)
                .await
                .unwrap_err();
            assert!(matches!(err.rejection(), Some(RegistryError::NotFound { .. })));
            assert!(query::max_payout(&layer, &contract(1)).await.is_err());

            let metadata = sample_metadata(&contract(1), &wallet(11), None);
            layer
                .submit_proposal(&wallet(10), &metadata, PROPOSAL_FEE)
                .await
                .unwrap();
            let err = layer
                .set_max_payout(&wallet(1), &contract(1), MIN_AMOUNT - 1)
                .await
                .unwrap_err();
            assert!(matches!(
                err.rejection(),
                Some(RegistryError::InvalidAmount { what: "max payout", .. })
            ));
            assert_eq!(query::max_payout(&layer, &contract(1)).await.unwrap(), 0);
            layer
                .set_max_payout(&wallet(1), &contract(1), MULTIPLIER)
                .await
                .unwrap();
            assert_eq!(
                query::max_payout(&layer, &contract(1)).await.unwrap(),
                MULTIPLIER
            );
        });
    }

    #[test]
    fn enabling_requires_every_ceiling() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let owners = StaticOwners::default().with_owner(contract(1), wallet(10));
            let mut layer = Layer::new(&state, &owners, deployment(), 0);
            install_admins(&mut layer, &wallet(1), &[]).await;
            approve_game(&mut layer, &wallet(1), &wallet(10), &contract(1), None).await;
            assert_eq!(
                query::game_status(&layer, &contract(1)).await.unwrap(),
                GameStatus::GameApproved
            );

            // Approved game without a payout ceiling.
            layer.set_max_loss(&wallet(1), MIN_AMOUNT).await.unwrap();
            assert!(layer.toggle_watchdog(&wallet(1)).await.is_err());
            assert!(!query::watchdog_enabled(&layer).await.unwrap());

            layer
                .set_max_payout(&wallet(1), &contract(1), MIN_AMOUNT)
                .await
                .unwrap();
            assert!(layer.toggle_watchdog(&wallet(10)).await.is_err());
            layer.toggle_watchdog(&wallet(1)).await.unwrap();
            assert!(query::watchdog_enabled(&layer).await.unwrap());

            // Switching off has no precondition.
            layer.toggle_watchdog(&wallet(1)).await.unwrap();
            assert!(!query::watchdog_enabled(&layer).await.unwrap());
        });
    }

    #[test]
    fn enabling_requires_a_loss_ceiling() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let owners = StaticOwners::default();
            let mut layer = Layer::new(&state, &owners, deployment(), 0);
            install_admins(&mut layer, &wallet(1), &[]).await;

            let err = layer.toggle_watchdog(&wallet(1)).await.unwrap_err();
            assert!(matches!(
                err.rejection(),
                Some(RegistryError::PreconditionFailed(_))
            ));
            assert!(!query::watchdog_enabled(&layer).await.unwrap());
        });
    }
}
