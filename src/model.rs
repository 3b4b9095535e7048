//! Session records consumed by the engine and the transfers it produces.

use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Player identifier as assigned by the roster.
pub type PlayerId = String;

/// A seated player. Identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Who paid for a buy-in's chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingSource {
    /// Paid by the player out of pocket.
    Cash,

    /// Advanced on credit by the bank (PayBox).
    #[serde(alias = "paybox")]
    Bank,
}

impl FromStr for FundingSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(FundingSource::Cash),
            "bank" | "paybox" => Ok(FundingSource::Bank),
            other => Err(format!("unknown funding source {:?}", other)),
        }
    }
}

impl fmt::Display for FundingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundingSource::Cash => write!(f, "cash"),
            FundingSource::Bank => write!(f, "bank"),
        }
    }
}

/// Chips added by a player. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyIn {
    pub id: String,
    pub player_id: PlayerId,
    pub amount: Money,
    /// Unix epoch milliseconds. Carried for callers, not used in computation.
    #[serde(default)]
    pub timestamp: u64,
    pub source: FundingSource,
}

impl BuyIn {
    pub fn new(
        id: impl Into<String>,
        player_id: impl Into<PlayerId>,
        amount: Money,
        source: FundingSource,
    ) -> Self {
        BuyIn {
            id: id.into(),
            player_id: player_id.into(),
            amount,
            timestamp: 0,
            source,
        }
    }

    pub fn cash(id: impl Into<String>, player_id: impl Into<PlayerId>, amount: Money) -> Self {
        Self::new(id, player_id, amount, FundingSource::Cash)
    }

    pub fn bank(id: impl Into<String>, player_id: impl Into<PlayerId>, amount: Money) -> Self {
        Self::new(id, player_id, amount, FundingSource::Bank)
    }

    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// The amount paid out to a player when they leave the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashOut {
    pub player_id: PlayerId,
    pub amount: Money,
    /// Chip count at the table, if it was recorded separately from `amount`.
    #[serde(default)]
    pub stack_value: Option<Money>,
}

impl CashOut {
    pub fn new(player_id: impl Into<PlayerId>, amount: Money) -> Self {
        CashOut {
            player_id: player_id.into(),
            amount,
            stack_value: None,
        }
    }

    pub fn with_stack(mut self, stack_value: Money) -> Self {
        self.stack_value = Some(stack_value);
        self
    }

    /// The counted stack, falling back to the paid amount.
    pub fn stack_value(&self) -> Money {
        self.stack_value.unwrap_or(self.amount)
    }
}

/// One side of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Party {
    Player(PlayerId),
    Bank,
}

impl Party {
    /// How the bank is written in a settlement. No player may use this id.
    pub const BANK_LABEL: &'static str = "Bank";

    /// Whether `id` would be mistaken for the bank once printed.
    pub fn is_reserved_id(id: &str) -> bool {
        id.trim().eq_ignore_ascii_case(Self::BANK_LABEL)
    }

    pub fn player(id: impl Into<PlayerId>) -> Self {
        Party::Player(id.into())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Player(id) => write!(f, "{}", id),
            Party::Bank => write!(f, "{}", Self::BANK_LABEL),
        }
    }
}

/// A single transfer of money required to settle the session.
///
/// `amount` is strictly positive and `from != to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Party,
    pub to: Party,
    pub amount: Money,
}

impl Transaction {
    pub fn new(from: Party, to: Party, amount: Money) -> Self {
        debug_assert!(amount.is_positive(), "transfer amount must be positive");
        debug_assert!(from != to, "transfer must move money between parties");
        Transaction { from, to, amount }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}
