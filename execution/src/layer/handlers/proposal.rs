use super::*;
use gamehub_types::registry::{
    GameMetadata, GameProposal, GameStatus, MAX_PROPOSALS, PROPOSAL_FEE,
};

impl<'a, S: State, O: OwnerQuery> Layer<'a, S, O> {
    // === Game Registry ===

    /// Submit a game for review. `value` is the fee attached to the call.
    pub async fn submit_proposal(
        &mut self,
        caller: &Address,
        metadata: &str,
        value: u128,
    ) -> Result<Vec<Event>, CallError> {
        if value != PROPOSAL_FEE {
            return Err(RegistryError::InvalidAmount {
                what: "proposal fee",
                value,
            }
            .into());
        }

        let watchdog = load_watchdog(self).await?;
        let parsed = GameMetadata::parse(metadata, watchdog.enabled)?;
        let score = parsed.score_address;

        let mut list = load_proposal_list(self).await?;
        if list.contains(&score) {
            return Err(RegistryError::DuplicateProposal(score).into());
        }
        if list.games.len() >= MAX_PROPOSALS {
            return Err(
                RegistryError::PreconditionFailed("proposal list is full".to_string()).into(),
            );
        }

        let owner = self.owners.score_owner(&score).await.map_err(|err| {
            RegistryError::OwnerQueryFailed {
                score,
                reason: format!("{err:#}"),
            }
        })?;
        if owner != *caller {
            return Err(RegistryError::OwnerMismatch {
                expected: owner,
                caller: *caller,
            }
            .into());
        }

        list.games.push(score);
        self.insert(Key::ProposalList, Value::ProposalList(list));
        self.insert(
            Key::Proposal(score),
            Value::Proposal(GameProposal {
                owner: *caller,
                metadata: metadata.to_string(),
                status: GameStatus::Waiting,
            }),
        );
        if watchdog.enabled {
            if let Some(max_payout) = parsed.max_payout {
                self.insert(Key::MaxPayout(score), Value::Amount(max_payout));
            }
        }

        info!(game = %score, owner = %caller, name = %parsed.name, "proposal submitted");
        Ok(vec![
            Event::ProposalSubmitted {
                sender: *caller,
                score,
            },
            Event::FundTransfer {
                recipient: self.deployment.registry,
                amount: value,
                note: "Proposal fee received".to_string(),
            },
        ])
    }

    /// Owner marks an approved proposal as deployed and ready for review.
    pub async fn set_game_ready(
        &mut self,
        caller: &Address,
        game: &Address,
    ) -> Result<Vec<Event>, CallError> {
        let mut proposal = load_proposal(self, game)
            .await?
            .ok_or_else(|| RegistryError::game_not_found(game))?;
        if proposal.owner != *caller {
            return Err(RegistryError::unauthorized(caller, Role::GameOwner).into());
        }
        let from = proposal.status;
        if !from.owner_can_mark_ready() {
            return Err(RegistryError::IllegalTransition {
                from,
                to: GameStatus::GameReady,
            }
            .into());
        }

        proposal.status = GameStatus::GameReady;
        self.insert(Key::Proposal(*game), Value::Proposal(proposal));
        info!(game = %game, "game ready");
        Ok(vec![Event::GameStatusChanged {
            score: *game,
            from,
            to: GameStatus::GameReady,
        }])
    }

    pub async fn set_game_status(
        &mut self,
        caller: &Address,
        status: GameStatus,
        game: &Address,
    ) -> Result<Vec<Event>, CallError> {
        self.require_admin(caller).await?;

        let mut proposal = load_proposal(self, game)
            .await?
            .ok_or_else(|| RegistryError::game_not_found(game))?;
        let from = proposal.status;
        if !from.admin_can_transition(status) {
            return Err(RegistryError::IllegalTransition { from, to: status }.into());
        }

        proposal.status = status;
        self.insert(Key::Proposal(*game), Value::Proposal(proposal));
        info!(game = %game, %from, to = %status, admin = %caller, "game status changed");
        Ok(vec![Event::GameStatusChanged {
            score: *game,
            from,
            to: status,
        }])
    }
}
