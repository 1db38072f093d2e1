//! Gamehub execution layer.
//!
//! This crate contains the deterministic call execution logic (`Layer`) for the game registry:
//! admin management, the proposal/status workflow, the per-day wager and payout ledger, excess
//! snapshots and the payout watchdog.
//!
//! ## Determinism requirements
//! - Do not read wall-clock time inside execution; the block timestamp is passed in.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Atomicity
//! Each call runs against a checkpoint of the pending overlay. A rejected call restores the
//! checkpoint and is reported as [`gamehub_types::Output::Rejected`]; storage failures abort the
//! whole block.
//!
//! The primary entrypoints are [`Layer`] and [`state_transition::execute_block`].
//!
//! ## Minimal execution pipeline (example)
//! ```rust,ignore
//! use gamehub_execution::{mocks::{deployment, Memory, StaticOwners}, state_transition};
//! use gamehub_types::{Call, Instruction};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut state = Memory::default();
//! let owners = StaticOwners::default();
//! let deployment = deployment();
//! let calls = vec![Call::new(
//!     deployment.owner,
//!     Instruction::SetDevelopersShare { percent: 10 },
//! )];
//! let result =
//!     state_transition::execute_block(&mut state, &owners, deployment, 1, 0, calls).await?;
//! assert_eq!(result.executed_calls, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod query;
pub mod state_transition;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod risk_tests;

mod layer;
mod owner;
mod state;

pub use config::{Config, ConfigError, ValidatedConfig};
pub use layer::{Deployment, Layer};
pub use owner::OwnerQuery;
pub use state::{height, CallError, State, Status};
