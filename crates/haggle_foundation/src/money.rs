//! Currency and money amounts.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A denomination of in-game money.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Currency {
    /// Gold pieces (the default when no currency is named).
    #[default]
    Gold,
    /// Silver pieces.
    Silver,
    /// Copper pieces.
    Copper,
}

impl Currency {
    /// Looks up a currency by a word or suffix (`g`, `gp`, `gold`, ...).
    #[must_use]
    pub fn from_suffix(word: &str) -> Option<Self> {
        match word {
            "g" | "gp" | "gold" | "golds" => Some(Self::Gold),
            "s" | "sp" | "silver" | "silvers" => Some(Self::Silver),
            "c" | "cp" | "copper" | "coppers" => Some(Self::Copper),
            _ => None,
        }
    }

    /// Returns the canonical word for this currency.
    #[must_use]
    pub const fn word(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Copper => "copper",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

/// An amount of money in a single currency.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Money {
    /// Number of pieces.
    pub amount: u64,
    /// Denomination.
    pub currency: Currency,
}

impl Money {
    /// Creates a new amount.
    #[must_use]
    pub const fn new(amount: u64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates an amount of gold.
    #[must_use]
    pub const fn gold(amount: u64) -> Self {
        Self::new(amount, Currency::Gold)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
