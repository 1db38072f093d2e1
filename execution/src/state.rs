use anyhow::Result;
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use gamehub_types::{
    execution::{Key, Value},
    registry::{AdminSet, GameProposal, GameStatus, LedgerEntry, ProposalList, WatchdogState},
    Address, RegistryError,
};
use std::future::Future;

#[cfg(any(test, feature = "mocks"))]
use std::collections::HashMap;

/// Why a call did not take effect.
///
/// `Rejected` is a business-rule failure: the call's changes are discarded and execution moves on
/// to the next call. `State` means storage itself failed and the block cannot be executed.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    Rejected(#[from] RegistryError),
    #[error(transparent)]
    State(#[from] anyhow::Error),
}

impl CallError {
    pub fn rejection(&self) -> Option<&RegistryError> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::State(_) => None,
        }
    }
}

pub trait State {
    fn get(&self, key: &Key) -> impl Future<Output = Result<Option<Value>>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = Result<()>>;
    fn delete(&mut self, key: &Key) -> impl Future<Output = Result<()>>;

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = Result<()>> {
        async {
            for (key, status) in changes {
                match status {
                    Status::Update(value) => self.insert(key, value).await?,
                    Status::Delete => self.delete(&key).await?,
                }
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "mocks"))]
#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

#[cfg(any(test, feature = "mocks"))]
impl Memory {
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

#[cfg(any(test, feature = "mocks"))]
impl State for Memory {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.state.get(key).cloned())
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.state.insert(key, value);
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.state.remove(key);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Update(Value),
    Delete,
}

impl Write for Status {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Status::Update(value) => {
                0u8.write(writer);
                value.write(writer);
            }
            Status::Delete => 1u8.write(writer),
        }
    }
}

impl Read for Status {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Status::Update(Value::read(reader)?)),
            1 => Ok(Status::Delete),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Status {
    fn encode_size(&self) -> usize {
        1 + match self {
            Status::Update(value) => value.encode_size(),
            Status::Delete => 0,
        }
    }
}

/// Height of the last block applied to `state` (0 before the first block).
pub async fn height<S: State>(state: &S) -> Result<u64> {
    Ok(match state.get(&Key::Height).await? {
        Some(Value::Height(height)) => height,
        _ => 0,
    })
}

pub(crate) async fn load_address<S: State>(state: &S, key: &Key) -> Result<Option<Address>> {
    Ok(match state.get(key).await? {
        Some(Value::Address(address)) => Some(address),
        _ => None,
    })
}

pub(crate) async fn load_admins<S: State>(state: &S) -> Result<AdminSet> {
    Ok(match state.get(&Key::Admins).await? {
        Some(Value::Admins(admins)) => admins,
        _ => AdminSet::default(),
    })
}

pub(crate) async fn load_proposal_list<S: State>(state: &S) -> Result<ProposalList> {
    Ok(match state.get(&Key::ProposalList).await? {
        Some(Value::ProposalList(list)) => list,
        _ => ProposalList::default(),
    })
}

pub(crate) async fn load_proposal<S: State>(
    state: &S,
    game: &Address,
) -> Result<Option<GameProposal>> {
    Ok(match state.get(&Key::Proposal(*game)).await? {
        Some(Value::Proposal(proposal)) => Some(proposal),
        _ => None,
    })
}

/// Every game currently in `GameApproved`, in submission order.
pub(crate) async fn load_approved_games<S: State>(state: &S) -> Result<Vec<Address>> {
    let list = load_proposal_list(state).await?;
    let mut approved = Vec::new();
    for game in list.games {
        if let Some(proposal) = load_proposal(state, &game).await? {
            if proposal.status == GameStatus::GameApproved {
                approved.push(game);
            }
        }
    }
    Ok(approved)
}

pub(crate) async fn load_ledger<S: State>(state: &S, day: u64, game: &Address) -> Result<LedgerEntry> {
    Ok(
        match state.get(&Key::Ledger { day, game: *game }).await? {
            Some(Value::Ledger(entry)) => entry,
            _ => LedgerEntry::default(),
        },
    )
}

pub(crate) async fn load_excess<S: State>(state: &S, key: &Key) -> Result<i128> {
    Ok(match state.get(key).await? {
        Some(Value::Excess(excess)) => excess,
        _ => 0,
    })
}

pub(crate) async fn load_watchdog<S: State>(state: &S) -> Result<WatchdogState> {
    Ok(match state.get(&Key::Watchdog).await? {
        Some(Value::Watchdog(watchdog)) => watchdog,
        _ => WatchdogState::default(),
    })
}

pub(crate) async fn load_max_payout<S: State>(state: &S, game: &Address) -> Result<u128> {
    Ok(match state.get(&Key::MaxPayout(*game)).await? {
        Some(Value::Amount(amount)) => amount,
        _ => 0,
    })
}

pub(crate) async fn load_developers_share<S: State>(state: &S) -> Result<u64> {
    Ok(match state.get(&Key::DevelopersShare).await? {
        Some(Value::Share(share)) => share,
        _ => 0,
    })
}

pub(crate) async fn load_dividend_change_time<S: State>(state: &S) -> Result<Option<u64>> {
    Ok(match state.get(&Key::DividendChangeTime).await? {
        Some(Value::Timestamp(ts)) => Some(ts),
        _ => None,
    })
}
