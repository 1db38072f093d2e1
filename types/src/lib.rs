//! Shared types for the game registry: addresses, proposal records, storage keys and values,
//! instructions and the events they emit.

pub mod address;
pub mod codec;
pub mod error;
pub mod execution;
pub mod registry;
pub mod watchdog;

pub use address::{Address, AddressError, AddressKind};
pub use error::{RegistryError, Role};
pub use execution::{Call, Event, Instruction, Key, Output, Value};
pub use registry::{
    day_index, developers_amount, AdminSet, GameMetadata, GameProposal, GameStatus, GameType,
    LedgerEntry, ProposalList, WatchdogState, MICROS_PER_DAY, MIN_AMOUNT, MULTIPLIER,
    PROPOSAL_FEE,
};
pub use watchdog::{evaluate_payout, PayoutDecision};
