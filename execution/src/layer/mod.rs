use anyhow::{Context as _, Result};
use gamehub_types::{
    execution::{Call, Event, Instruction, Key, Output, Value},
    registry::day_index,
    Address, RegistryError, Role,
};
use std::collections::BTreeMap;
use tracing::debug;

use crate::owner::OwnerQuery;
use crate::state::{load_address, load_admins, CallError, State, Status};

mod handlers;

/// Identities fixed when the registry is installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Account that installed the registry. Sole holder of the contract-owner role.
    pub owner: Address,
    /// The registry's own address; recipient of proposal fees.
    pub registry: Address,
}

/// Pending changes for one block, layered over committed state.
///
/// Calls run one after another against the overlay. A call that is rejected leaves no trace in
/// the overlay; nothing reaches the underlying state until [`Layer::commit`].
pub struct Layer<'a, S: State, O: OwnerQuery> {
    state: &'a S,
    owners: &'a O,
    pending: BTreeMap<Key, Status>,

    deployment: Deployment,
    timestamp: u64,
}

impl<'a, S: State, O: OwnerQuery> Layer<'a, S, O> {
    /// `timestamp` is the block time in microseconds.
    pub fn new(state: &'a S, owners: &'a O, deployment: Deployment, timestamp: u64) -> Self {
        Self {
            state,
            owners,
            pending: BTreeMap::new(),

            deployment,
            timestamp,
        }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn current_day(&self) -> u64 {
        day_index(self.timestamp)
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn remove(&mut self, key: Key) {
        self.pending.insert(key, Status::Delete);
    }

    fn require_contract_owner(&self, caller: &Address) -> Result<(), RegistryError> {
        if *caller != self.deployment.owner {
            return Err(RegistryError::unauthorized(caller, Role::ContractOwner));
        }
        Ok(())
    }

    async fn require_super_admin(&self, caller: &Address) -> Result<(), CallError> {
        match load_address(self, &Key::SuperAdmin).await? {
            Some(super_admin) if super_admin == *caller => Ok(()),
            _ => Err(RegistryError::unauthorized(caller, Role::SuperAdmin).into()),
        }
    }

    async fn require_admin(&self, caller: &Address) -> Result<(), CallError> {
        if !load_admins(self).await?.contains(caller) {
            return Err(RegistryError::unauthorized(caller, Role::Admin).into());
        }
        Ok(())
    }

    async fn require_ledger_caller(&self, caller: &Address) -> Result<(), CallError> {
        match load_address(self, &Key::LedgerCaller).await? {
            Some(ledger_caller) if ledger_caller == *caller => Ok(()),
            _ => Err(RegistryError::unauthorized(caller, Role::LedgerCaller).into()),
        }
    }

    async fn apply(&mut self, call: &Call) -> Result<Vec<Event>, CallError> {
        let caller = &call.caller;
        let instruction = &call.instruction;

        // Only proposal submission accepts funds.
        if call.value != 0 && !matches!(instruction, Instruction::SubmitProposal { .. }) {
            return Err(RegistryError::InvalidAmount {
                what: "attached value",
                value: call.value,
            }
            .into());
        }

        match instruction {
            Instruction::SetSuperAdmin { admin } => self.set_super_admin(caller, admin).await,
            Instruction::AddAdmin { admin } => self.add_admin(caller, admin).await,
            Instruction::RemoveAdmin { admin } => self.remove_admin(caller, admin).await,

            Instruction::SubmitProposal { metadata } => {
                self.submit_proposal(caller, metadata, call.value).await
            }
            Instruction::SetGameReady { game } => self.set_game_ready(caller, game).await,
            Instruction::SetGameStatus { game, status } => {
                self.set_game_status(caller, *status, game).await
            }

            Instruction::SetLedgerCaller { address } => {
                self.set_ledger_caller(caller, address).await
            }
            Instruction::SetDevelopersShare { percent } => {
                self.set_developers_share(caller, *percent).await
            }
            Instruction::SetDividendChangeTime { timestamp } => {
                self.set_dividend_change_time(caller, *timestamp).await
            }

            Instruction::RecordWager { game, amount } => {
                self.record_wager(caller, game, *amount).await
            }
            Instruction::RecordPayout { game, amount } => self
                .record_payout(caller, game, *amount)
                .await
                .map(|(_, events)| events),
            Instruction::RecordExcess => self.record_excess(caller).await.map(|(_, events)| events),

            Instruction::SetMaxPayout { game, amount } => {
                self.set_max_payout(caller, game, *amount).await
            }
            Instruction::SetMaxLoss { amount } => self.set_max_loss(caller, *amount).await,
            Instruction::ToggleWatchdog => self.toggle_watchdog(caller).await,
        }
    }

    /// Execute `calls` in order.
    ///
    /// Rejected calls are reported as [`Output::Rejected`] and their changes discarded. A storage
    /// failure aborts the whole batch.
    pub async fn execute(&mut self, calls: Vec<Call>) -> Result<Vec<Output>> {
        let mut outputs = Vec::new();

        for call in calls {
            let checkpoint = self.pending.clone();
            match self.apply(&call).await {
                Ok(events) => {
                    outputs.extend(events.into_iter().map(Output::Event));
                    outputs.push(Output::Call(call));
                }
                Err(CallError::Rejected(err)) => {
                    self.pending = checkpoint;
                    debug!(
                        caller = %call.caller,
                        code = err.code(),
                        reason = %err,
                        "call rejected; discarding its changes"
                    );
                    outputs.push(Output::Rejected {
                        caller: call.caller,
                        code: err.code(),
                        message: err.to_string(),
                    });
                }
                Err(CallError::State(err)) => {
                    return Err(err).context("state error during call");
                }
            }
        }

        Ok(outputs)
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State, O: OwnerQuery> State for Layer<'a, S, O> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}
