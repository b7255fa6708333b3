//! Core identity and classification types.
//!
//! All token amounts are `u64` base units (1 LODE = 10^8 base units).
//! Time is expressed either as Unix seconds or as epoch days
//! (`seconds / 86_400`, truncating).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_CATEGORY;
use crate::error::{AddressError, UnitError};

/// A 20-byte account address.
///
/// Identifies unit owners, referral beneficiaries, role holders and the
/// unit itself on the reward ledger.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Never a valid owner or referral.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create an address from a byte array.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministically derive an address from a label.
    ///
    /// Takes the first 20 bytes of the BLAKE3 hash of `label`. Used by
    /// tooling and tests to mint stable, distinct identities.
    ///
    /// # Examples
    ///
    /// ```
    /// use lode_core::types::Address;
    /// assert_eq!(Address::derive("alice"), Address::derive("alice"));
    /// assert_ne!(Address::derive("alice"), Address::derive("bob"));
    /// ```
    pub fn derive(label: &str) -> Self {
        let hash = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash.as_bytes()[..20]);
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits).map_err(|_| AddressError::InvalidHex)?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|v: Vec<u8>| AddressError::InvalidLength(v.len()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

/// Whether a unit takes part in reward accrual.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default,
    bincode::Encode, bincode::Decode,
)]
pub enum UnitKind {
    /// Accrues and pays out rewards from its own pre-funded balance.
    #[default]
    PoolBased,
    /// Same lifecycle, never accrues. Tokens leave only through migration.
    NonPoolBased,
}

impl UnitKind {
    pub fn is_pool_based(&self) -> bool {
        matches!(self, Self::PoolBased)
    }
}

/// Capacity tier of a unit, in `0..=5`.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Category(u8);

impl Category {
    /// Validate a raw category.
    ///
    /// # Examples
    ///
    /// ```
    /// use lode_core::types::Category;
    /// assert_eq!(Category::new(2).unwrap().get(), 2);
    /// assert!(Category::new(6).is_err());
    /// ```
    pub fn new(raw: u8) -> Result<Self, UnitError> {
        if raw > MAX_CATEGORY {
            return Err(UnitError::InvalidConstruction(format!(
                "category {raw} exceeds maximum {MAX_CATEGORY}"
            )));
        }
        Ok(Self(raw))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Position of this category in per-category lookup tables.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Category {
    type Error = UnitError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

// Decoding goes through `Category::new` so a restored snapshot can never
// carry an out-of-range category.
impl<Context> bincode::Decode<Context> for Category {
    fn decode<D: bincode::de::Decoder<Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, bincode::error::DecodeError> {
        let raw = <u8 as bincode::Decode<Context>>::decode(decoder)?;
        Self::new(raw).map_err(|e| bincode::error::DecodeError::OtherString(e.to_string()))
    }
}

impl<'de, Context> bincode::BorrowDecode<'de, Context> for Category {
    fn borrow_decode<D: bincode::de::BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, bincode::error::DecodeError> {
        <Self as bincode::Decode<Context>>::decode(decoder)
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a unit.
///
/// ```text
/// Deactivated ──activate──▶ Activated ◀──resume── Suspended
///      ▲                     │  ▲   └──suspend──▶    │
///      └─────deactivate──────┘  └──reset── Stopped ◀─┘ (stop)
/// ```
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default,
    bincode::Encode, bincode::Decode,
)]
pub enum LifecycleState {
    #[default]
    Deactivated,
    Activated,
    Suspended,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deactivated => "deactivated",
            Self::Activated => "activated",
            Self::Suspended => "suspended",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Capability a caller must hold for a gated operation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    SystemOperator,
    CoreTeamAdmin,
    Supervisor,
    /// The unit's current owner. Checked against unit state, not the role gate.
    Owner,
    /// Either the owner or a system operator.
    OwnerOrOperator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SystemOperator => "system operator",
            Self::CoreTeamAdmin => "core-team administrator",
            Self::Supervisor => "supervisor",
            Self::Owner => "owner",
            Self::OwnerOrOperator => "owner or system operator",
        };
        f.write_str(name)
    }
}
