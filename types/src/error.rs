use crate::{address::Address, registry::GameStatus};
use std::fmt;
use thiserror::Error as ThisError;

// Rejection codes carried in `Output::Rejected`.
pub const ERROR_UNAUTHORIZED: u8 = 1;
pub const ERROR_INVALID_METADATA: u8 = 2;
pub const ERROR_INVALID_AMOUNT: u8 = 3;
pub const ERROR_INVALID_DAY: u8 = 4;
pub const ERROR_ILLEGAL_TRANSITION: u8 = 5;
pub const ERROR_DUPLICATE_PROPOSAL: u8 = 6;
pub const ERROR_NOT_FOUND: u8 = 7;
pub const ERROR_OWNER_MISMATCH: u8 = 8;
pub const ERROR_OWNER_QUERY_FAILED: u8 = 9;
pub const ERROR_PRECONDITION_FAILED: u8 = 10;
pub const ERROR_OVERFLOW: u8 = 11;

/// Identity a call must originate from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    ContractOwner,
    SuperAdmin,
    Admin,
    GameOwner,
    LedgerCaller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ContractOwner => "contract owner",
            Self::SuperAdmin => "super admin",
            Self::Admin => "admin",
            Self::GameOwner => "game owner",
            Self::LedgerCaller => "ledger caller",
        })
    }
}

#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{caller} is not the {required}")]
    Unauthorized { caller: Address, required: Role },
    #[error("invalid metadata field {field}: {reason}")]
    InvalidMetadata { field: &'static str, reason: String },
    #[error("invalid {what}: {value}")]
    InvalidAmount { what: &'static str, value: u128 },
    #[error("day {day} resolves before the first day")]
    InvalidDay { day: i64 },
    #[error("game cannot move from {from} to {to}")]
    IllegalTransition { from: GameStatus, to: GameStatus },
    #[error("{0} is already listed in the proposal list")]
    DuplicateProposal(Address),
    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },
    #[error("owner not matched (score owner {expected}, caller {caller})")]
    OwnerMismatch { expected: Address, caller: Address },
    #[error("owner query against {score} failed: {reason}")]
    OwnerQueryFailed { score: Address, reason: String },
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

impl RegistryError {
    pub fn code(&self) -> u8 {
        match self {
            Self::Unauthorized { .. } => ERROR_UNAUTHORIZED,
            Self::InvalidMetadata { .. } => ERROR_INVALID_METADATA,
            Self::InvalidAmount { .. } => ERROR_INVALID_AMOUNT,
            Self::InvalidDay { .. } => ERROR_INVALID_DAY,
            Self::IllegalTransition { .. } => ERROR_ILLEGAL_TRANSITION,
            Self::DuplicateProposal(_) => ERROR_DUPLICATE_PROPOSAL,
            Self::NotFound { .. } => ERROR_NOT_FOUND,
            Self::OwnerMismatch { .. } => ERROR_OWNER_MISMATCH,
            Self::OwnerQueryFailed { .. } => ERROR_OWNER_QUERY_FAILED,
            Self::PreconditionFailed(_) => ERROR_PRECONDITION_FAILED,
            Self::Overflow(_) => ERROR_OVERFLOW,
        }
    }

    pub fn unauthorized(caller: &Address, required: Role) -> Self {
        Self::Unauthorized {
            caller: *caller,
            required,
        }
    }

    pub fn metadata(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            field,
            reason: reason.into(),
        }
    }

    pub fn game_not_found(game: &Address) -> Self {
        Self::NotFound {
            what: "game",
            key: game.to_string(),
        }
    }
}
