//! Account and contract addresses.
//!
//! An address is a 20-byte body tagged with its kind. Wallets render as `hx…` and contracts as
//! `cx…`, followed by 40 lowercase hex characters.

use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{ed25519::PublicKey, Hasher, Sha256};
use commonware_utils::{from_hex, hex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

pub const ADDRESS_BODY_LEN: usize = 20;

const WALLET_PREFIX: &str = "hx";
const CONTRACT_PREFIX: &str = "cx";

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum AddressKind {
    Wallet = 0,
    Contract = 1,
}

impl AddressKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Wallet => WALLET_PREFIX,
            Self::Contract => CONTRACT_PREFIX,
        }
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with hx or cx (got {0:?})")]
    UnknownPrefix(String),
    #[error("address body must be {expected} hex characters (got {got})")]
    BadLength { expected: usize, got: usize },
    #[error("address body is not valid hex")]
    InvalidHex,
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address {
    kind: AddressKind,
    body: [u8; ADDRESS_BODY_LEN],
}

impl Address {
    pub const fn wallet(body: [u8; ADDRESS_BODY_LEN]) -> Self {
        Self {
            kind: AddressKind::Wallet,
            body,
        }
    }

    pub const fn contract(body: [u8; ADDRESS_BODY_LEN]) -> Self {
        Self {
            kind: AddressKind::Contract,
            body,
        }
    }

    /// Derive the wallet address controlled by an ed25519 key (last 20 bytes of its SHA-256).
    pub fn from_public_key(public: &PublicKey) -> Self {
        let digest = Sha256::hash(public.as_ref());
        let bytes = digest.as_ref();
        let mut body = [0u8; ADDRESS_BODY_LEN];
        body.copy_from_slice(&bytes[bytes.len() - ADDRESS_BODY_LEN..]);
        Self::wallet(body)
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn is_contract(&self) -> bool {
        self.kind == AddressKind::Contract
    }

    pub fn body(&self) -> &[u8; ADDRESS_BODY_LEN] {
        &self.body
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), hex(&self.body))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = if s.starts_with(WALLET_PREFIX) {
            AddressKind::Wallet
        } else if s.starts_with(CONTRACT_PREFIX) {
            AddressKind::Contract
        } else {
            return Err(AddressError::UnknownPrefix(s.chars().take(2).collect()));
        };

        let encoded = &s[2..];
        if encoded.len() != ADDRESS_BODY_LEN * 2 {
            return Err(AddressError::BadLength {
                expected: ADDRESS_BODY_LEN * 2,
                got: encoded.len(),
            });
        }
        let decoded = from_hex(encoded).ok_or(AddressError::InvalidHex)?;
        let body: [u8; ADDRESS_BODY_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidHex)?;

        Ok(Self { kind, body })
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl Write for Address {
    fn write(&self, writer: &mut impl BufMut) {
        (self.kind as u8).write(writer);
        writer.put_slice(&self.body);
    }
}

impl Read for Address {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = match u8::read(reader)? {
            0 => AddressKind::Wallet,
            1 => AddressKind::Contract,
            i => return Err(Error::InvalidEnum(i)),
        };
        if reader.remaining() < ADDRESS_BODY_LEN {
            return Err(Error::EndOfBuffer);
        }
        let mut body = [0u8; ADDRESS_BODY_LEN];
        reader.copy_to_slice(&mut body);
        Ok(Self { kind, body })
    }
}

impl FixedSize for Address {
    const SIZE: usize = u8::SIZE + ADDRESS_BODY_LEN;
}
