use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};

use crate::{
    address::Address,
    registry::{AdminSet, GameProposal, GameStatus, LedgerEntry, ProposalList, WatchdogState},
    watchdog::PayoutDecision,
};

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Last executed block height (tag 0)
    Height,

    // Admin keys (tags 10-11)
    SuperAdmin,
    Admins,

    // Game registry keys (tags 12-13)
    ProposalList,
    Proposal(Address),

    // Platform settings (tags 14-16)
    LedgerCaller,
    DevelopersShare,
    DividendChangeTime,

    // Ledger and excess (tags 17-19)
    Ledger { day: u64, game: Address },
    TodaysExcess(Address),
    ExcessHistory { day: u64, game: Address },

    // Watchdog (tags 20-21)
    Watchdog,
    MaxPayout(Address),
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Height => 0u8.write(writer),

            Self::SuperAdmin => 10u8.write(writer),
            Self::Admins => 11u8.write(writer),

            Self::ProposalList => 12u8.write(writer),
            Self::Proposal(game) => {
                13u8.write(writer);
                game.write(writer);
            }

            Self::LedgerCaller => 14u8.write(writer),
            Self::DevelopersShare => 15u8.write(writer),
            Self::DividendChangeTime => 16u8.write(writer),

            Self::Ledger { day, game } => {
                17u8.write(writer);
                day.write(writer);
                game.write(writer);
            }
            Self::TodaysExcess(game) => {
                18u8.write(writer);
                game.write(writer);
            }
            Self::ExcessHistory { day, game } => {
                19u8.write(writer);
                day.write(writer);
                game.write(writer);
            }

            Self::Watchdog => 20u8.write(writer),
            Self::MaxPayout(game) => {
                21u8.write(writer);
                game.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Height,

            10 => Self::SuperAdmin,
            11 => Self::Admins,

            12 => Self::ProposalList,
            13 => Self::Proposal(Address::read(reader)?),

            14 => Self::LedgerCaller,
            15 => Self::DevelopersShare,
            16 => Self::DividendChangeTime,

            17 => Self::Ledger {
                day: u64::read(reader)?,
                game: Address::read(reader)?,
            },
            18 => Self::TodaysExcess(Address::read(reader)?),
            19 => Self::ExcessHistory {
                day: u64::read(reader)?,
                game: Address::read(reader)?,
            },

            20 => Self::Watchdog,
            21 => Self::MaxPayout(Address::read(reader)?),

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Height
                | Self::SuperAdmin
                | Self::Admins
                | Self::ProposalList
                | Self::LedgerCaller
                | Self::DevelopersShare
                | Self::DividendChangeTime
                | Self::Watchdog => 0,

                Self::Proposal(_) | Self::TodaysExcess(_) | Self::MaxPayout(_) => Address::SIZE,

                Self::Ledger { .. } | Self::ExcessHistory { .. } => u64::SIZE + Address::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    // System values
    Height(u64),

    // Registry values (tags 10-13)
    Address(Address),
    Admins(AdminSet),
    ProposalList(ProposalList),
    Proposal(GameProposal),

    // Settings (tags 14-15)
    Share(u64),
    Timestamp(u64),

    // Ledger values (tags 16-17)
    Ledger(LedgerEntry),
    Excess(i128),

    // Watchdog values (tags 18-19)
    Watchdog(WatchdogState),
    Amount(u128),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Height(height) => {
                0u8.write(writer);
                height.write(writer);
            }

            Self::Address(address) => {
                10u8.write(writer);
                address.write(writer);
            }
            Self::Admins(admins) => {
                11u8.write(writer);
                admins.write(writer);
            }
            Self::ProposalList(list) => {
                12u8.write(writer);
                list.write(writer);
            }
            Self::Proposal(proposal) => {
                13u8.write(writer);
                proposal.write(writer);
            }

            Self::Share(share) => {
                14u8.write(writer);
                share.write(writer);
            }
            Self::Timestamp(ts) => {
                15u8.write(writer);
                ts.write(writer);
            }

            Self::Ledger(entry) => {
                16u8.write(writer);
                entry.write(writer);
            }
            Self::Excess(excess) => {
                17u8.write(writer);
                excess.write(writer);
            }

            Self::Watchdog(watchdog) => {
                18u8.write(writer);
                watchdog.write(writer);
            }
            Self::Amount(amount) => {
                19u8.write(writer);
                amount.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Height(u64::read(reader)?),

            10 => Self::Address(Address::read(reader)?),
            11 => Self::Admins(AdminSet::read(reader)?),
            12 => Self::ProposalList(ProposalList::read(reader)?),
            13 => Self::Proposal(GameProposal::read(reader)?),

            14 => Self::Share(u64::read(reader)?),
            15 => Self::Timestamp(u64::read(reader)?),

            16 => Self::Ledger(LedgerEntry::read(reader)?),
            17 => Self::Excess(i128::read(reader)?),

            18 => Self::Watchdog(WatchdogState::read(reader)?),
            19 => Self::Amount(u128::read(reader)?),

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Height(height) => height.encode_size(),

                Self::Address(_) => Address::SIZE,
                Self::Admins(admins) => admins.encode_size(),
                Self::ProposalList(list) => list.encode_size(),
                Self::Proposal(proposal) => proposal.encode_size(),

                Self::Share(share) => share.encode_size(),
                Self::Timestamp(ts) => ts.encode_size(),

                Self::Ledger(_) => LedgerEntry::SIZE,
                Self::Excess(excess) => excess.encode_size(),

                Self::Watchdog(_) => WatchdogState::SIZE,
                Self::Amount(amount) => amount.encode_size(),
            }
    }
}

/// Observations emitted by executed calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    FundTransfer {
        recipient: Address,
        amount: u128,
        note: String,
    },
    ProposalSubmitted {
        sender: Address,
        score: Address,
    },
    GameStatusChanged {
        score: Address,
        from: GameStatus,
        to: GameStatus,
    },
    GameSuspended {
        score: Address,
        note: String,
    },
    /// The watchdog refused a payout; nothing was booked.
    PayoutRefused {
        game: Address,
        decision: PayoutDecision,
        note: String,
    },
    ExcessRecorded {
        day: u64,
        positive_excess: u128,
        developers_amount: u128,
    },
}

/// Mutating entry points of the registry.
///
/// Externally tagged in JSON (`{"record_wager": {...}}`, or a bare string for `record_excess` and
/// `toggle_watchdog`) so that amounts keep their full `u128` range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    // Admin registry
    SetSuperAdmin { admin: Address },
    AddAdmin { admin: Address },
    RemoveAdmin { admin: Address },

    // Game registry
    SubmitProposal { metadata: String },
    SetGameReady { game: Address },
    SetGameStatus { game: Address, status: GameStatus },

    // Platform settings
    SetLedgerCaller { address: Address },
    SetDevelopersShare { percent: u64 },
    SetDividendChangeTime { timestamp: u64 },

    // Ledger
    RecordWager { game: Address, amount: u128 },
    RecordPayout { game: Address, amount: u128 },
    RecordExcess,

    // Watchdog
    SetMaxPayout { game: Address, amount: u128 },
    SetMaxLoss { amount: u128 },
    ToggleWatchdog,
}

/// An instruction from an already-authenticated caller, with any funds attached to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub caller: Address,
    #[serde(default)]
    pub value: u128,
    pub instruction: Instruction,
}

impl Call {
    pub fn new(caller: Address, instruction: Instruction) -> Self {
        Self {
            caller,
            value: 0,
            instruction,
        }
    }

    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "output", rename_all = "snake_case")]
pub enum Output {
    Event(Event),
    Call(Call),
    Rejected {
        caller: Address,
        code: u8,
        message: String,
    },
}
