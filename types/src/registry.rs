//! Game registry records: statuses, proposal metadata, and the persisted aggregates.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::{
    address::Address,
    codec::{read_string, string_encode_size, write_string},
    error::RegistryError,
};

/// Base units per native token unit.
pub const MULTIPLIER: u128 = 1_000_000_000_000_000_000;
/// Fee that must accompany a proposal (50 units).
pub const PROPOSAL_FEE: u128 = 50 * MULTIPLIER;
/// Floor (0.1 units) for minBet, maxPayout and maxLoss.
pub const MIN_AMOUNT: u128 = MULTIPLIER / 10;
/// Microseconds in a day.
pub const MICROS_PER_DAY: u64 = 86_400_000_000;

pub const MAX_METADATA_LENGTH: usize = 8 * 1024;
pub const MAX_ADMINS: usize = 1024;
pub const MAX_PROPOSALS: usize = 65_536;

pub const METADATA_FIELDS: [&str; 11] = [
    "name",
    "scoreAddress",
    "minBet",
    "maxBet",
    "houseEdge",
    "gameType",
    "revShareMetadata",
    "revShareWalletAddress",
    "linkProofPage",
    "gameUrlMainnet",
    "gameUrlTestnet",
];

/// Day bucket for a timestamp in microseconds.
pub fn day_index(timestamp_micros: u64) -> u64 {
    timestamp_micros / MICROS_PER_DAY
}

/// Developers' cut of the positive excess, `share_percent` percent rounded down.
pub fn developers_amount(share_percent: u64, positive_excess: u128) -> Option<u128> {
    positive_excess
        .checked_mul(u128::from(share_percent))
        .map(|amount| amount / 100)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    Waiting = 0,
    ProposalApproved = 1,
    ProposalRejected = 2,
    GameReady = 3,
    GameApproved = 4,
    GameRejected = 5,
    GameSuspended = 6,
    GameDeleted = 7,
}

impl GameStatus {
    pub const ALL: [GameStatus; 8] = [
        Self::Waiting,
        Self::ProposalApproved,
        Self::ProposalRejected,
        Self::GameReady,
        Self::GameApproved,
        Self::GameRejected,
        Self::GameSuspended,
        Self::GameDeleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::ProposalApproved => "proposalApproved",
            Self::ProposalRejected => "proposalRejected",
            Self::GameReady => "gameReady",
            Self::GameApproved => "gameApproved",
            Self::GameRejected => "gameRejected",
            Self::GameSuspended => "gameSuspended",
            Self::GameDeleted => "gameDeleted",
        }
    }

    /// Transitions an admin may apply through `set_game_status`.
    pub fn admin_can_transition(self, to: GameStatus) -> bool {
        matches!(
            (self, to),
            (Self::Waiting, Self::ProposalApproved)
                | (Self::Waiting, Self::ProposalRejected)
                | (Self::GameReady, Self::GameApproved)
                | (Self::GameReady, Self::GameRejected)
                | (Self::GameApproved, Self::GameSuspended)
                | (Self::GameSuspended, Self::GameApproved)
                | (Self::GameSuspended, Self::GameDeleted)
        )
    }

    /// Only an approved proposal may be marked ready by its owner.
    pub fn owner_can_mark_ready(self) -> bool {
        self == Self::ProposalApproved
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ProposalRejected | Self::GameRejected | Self::GameDeleted
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid status {s:?}"))
    }
}

impl Write for GameStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::InvalidEnum(value))
    }
}

impl FixedSize for GameStatus {
    const SIZE: usize = u8::SIZE;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameType {
    PerWagerSettlement,
    IntervalSettlement,
}

impl GameType {
    pub const ALL: [GameType; 2] = [Self::PerWagerSettlement, Self::IntervalSettlement];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerWagerSettlement => "Per wager settlement",
            Self::IntervalSettlement => "Game defined interval settlement",
        }
    }
}

impl FromStr for GameType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|game_type| game_type.as_str() == s)
            .ok_or_else(|| RegistryError::metadata("gameType", "Not a valid game type"))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    name: String,
    score_address: String,
    min_bet: u128,
    max_bet: u128,
    house_edge: serde_json::Value,
    game_type: String,
    rev_share_metadata: serde_json::Value,
    rev_share_wallet_address: String,
    link_proof_page: String,
    game_url_mainnet: String,
    game_url_testnet: String,
    #[serde(default)]
    max_payout: Option<u128>,
}

/// Validated proposal metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameMetadata {
    pub name: String,
    pub score_address: Address,
    pub min_bet: u128,
    pub max_bet: u128,
    pub house_edge: String,
    pub game_type: GameType,
    pub rev_share_metadata: String,
    pub rev_share_wallet_address: Address,
    pub link_proof_page: String,
    pub game_url_mainnet: String,
    pub game_url_testnet: String,
    pub max_payout: Option<u128>,
}

fn json_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

impl GameMetadata {
    /// Parse and sanity-check a proposal payload.
    ///
    /// `require_max_payout` is set while the watchdog is enabled; the payload must then carry a
    /// `maxPayout` of at least [`MIN_AMOUNT`].
    pub fn parse(payload: &str, require_max_payout: bool) -> Result<Self, RegistryError> {
        if payload.len() > MAX_METADATA_LENGTH {
            return Err(RegistryError::metadata(
                "metadata",
                format!("payload exceeds {MAX_METADATA_LENGTH} bytes"),
            ));
        }
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(payload)
            .map_err(|err| RegistryError::metadata("metadata", err.to_string()))?;

        for field in METADATA_FIELDS {
            if !object.contains_key(field) {
                return Err(RegistryError::metadata(
                    field,
                    format!("There is no {field} for the game"),
                ));
            }
        }
        if require_max_payout && !object.contains_key("maxPayout") {
            return Err(RegistryError::metadata(
                "maxPayout",
                "There is no maxPayout for the game",
            ));
        }

        let raw: RawMetadata = serde_json::from_str(payload)
            .map_err(|err| RegistryError::metadata("metadata", err.to_string()))?;

        if require_max_payout {
            let max_payout = raw.max_payout.unwrap_or_default();
            if max_payout < MIN_AMOUNT {
                return Err(RegistryError::metadata(
                    "maxPayout",
                    format!("{max_payout} is less than 0.1 units"),
                ));
            }
        }

        if raw.name.is_empty() {
            return Err(RegistryError::metadata("name", "Game name cant be empty"));
        }

        let score_address: Address = raw
            .score_address
            .parse()
            .map_err(|err| RegistryError::metadata("scoreAddress", format!("{err}")))?;
        if !score_address.is_contract() {
            return Err(RegistryError::metadata(
                "scoreAddress",
                format!("{score_address} is not a valid contract address"),
            ));
        }

        if raw.min_bet < MIN_AMOUNT {
            return Err(RegistryError::metadata(
                "minBet",
                format!("{} is less than 0.1 units", raw.min_bet),
            ));
        }

        let game_type: GameType = raw.game_type.parse()?;

        let rev_share_wallet_address: Address =
            raw.rev_share_wallet_address.parse().map_err(|_| {
                RegistryError::metadata(
                    "revShareWalletAddress",
                    "Invalid address while getting game metadata",
                )
            })?;
        if rev_share_wallet_address.is_contract() {
            return Err(RegistryError::metadata(
                "revShareWalletAddress",
                "Not a wallet address",
            ));
        }

        Ok(Self {
            name: raw.name,
            score_address,
            min_bet: raw.min_bet,
            max_bet: raw.max_bet,
            house_edge: json_text(raw.house_edge),
            game_type,
            rev_share_metadata: json_text(raw.rev_share_metadata),
            rev_share_wallet_address,
            link_proof_page: raw.link_proof_page,
            game_url_mainnet: raw.game_url_mainnet,
            game_url_testnet: raw.game_url_testnet,
            max_payout: raw.max_payout,
        })
    }
}

/// A submitted proposal. `metadata` is the payload exactly as submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameProposal {
    pub owner: Address,
    pub metadata: String,
    pub status: GameStatus,
}

impl Write for GameProposal {
    fn write(&self, writer: &mut impl BufMut) {
        self.owner.write(writer);
        write_string(&self.metadata, writer);
        self.status.write(writer);
    }
}

impl Read for GameProposal {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            owner: Address::read(reader)?,
            metadata: read_string(reader, MAX_METADATA_LENGTH)?,
            status: GameStatus::read(reader)?,
        })
    }
}

impl EncodeSize for GameProposal {
    fn encode_size(&self) -> usize {
        Address::SIZE + string_encode_size(&self.metadata) + GameStatus::SIZE
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminSet {
    pub admins: BTreeSet<Address>,
}

impl AdminSet {
    pub fn contains(&self, address: &Address) -> bool {
        self.admins.contains(address)
    }
}

impl Write for AdminSet {
    fn write(&self, writer: &mut impl BufMut) {
        let admins: Vec<Address> = self.admins.iter().copied().collect();
        admins.write(writer);
    }
}

impl Read for AdminSet {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let admins = Vec::<Address>::read_range(reader, 0..=MAX_ADMINS)?;
        Ok(Self {
            admins: admins.into_iter().collect(),
        })
    }
}

impl EncodeSize for AdminSet {
    fn encode_size(&self) -> usize {
        self.admins.iter().copied().collect::<Vec<Address>>().encode_size()
    }
}

/// Submission-ordered list of every proposed game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProposalList {
    pub games: Vec<Address>,
}

impl ProposalList {
    pub fn contains(&self, game: &Address) -> bool {
        self.games.contains(game)
    }
}

impl Write for ProposalList {
    fn write(&self, writer: &mut impl BufMut) {
        self.games.write(writer);
    }
}

impl Read for ProposalList {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            games: Vec::<Address>::read_range(reader, 0..=MAX_PROPOSALS)?,
        })
    }
}

impl EncodeSize for ProposalList {
    fn encode_size(&self) -> usize {
        self.games.encode_size()
    }
}

/// Wagers and payouts recorded for one game on one day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    pub wagers: u128,
    pub payouts: u128,
}

impl Write for LedgerEntry {
    fn write(&self, writer: &mut impl BufMut) {
        self.wagers.write(writer);
        self.payouts.write(writer);
    }
}

impl Read for LedgerEntry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            wagers: u128::read(reader)?,
            payouts: u128::read(reader)?,
        })
    }
}

impl FixedSize for LedgerEntry {
    const SIZE: usize = u128::SIZE + u128::SIZE;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatchdogState {
    pub enabled: bool,
    pub max_loss: u128,
}

impl Write for WatchdogState {
    fn write(&self, writer: &mut impl BufMut) {
        self.enabled.write(writer);
        self.max_loss.write(writer);
    }
}

impl Read for WatchdogState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            enabled: bool::read(reader)?,
            max_loss: u128::read(reader)?,
        })
    }
}

impl FixedSize for WatchdogState {
    const SIZE: usize = bool::SIZE + u128::SIZE;
}
