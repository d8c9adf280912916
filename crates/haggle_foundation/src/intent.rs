//! The closed set of command intents.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A recognizable kind of player command.
///
/// Extended only by adding a variant here and grammar rules for it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Intent {
    /// Buy an item, usually from a shop.
    BuyItem,
    /// Sell an item from the player's inventory.
    SellItem,
    /// Craft something from a known recipe.
    CraftFromRecipe,
    /// Set the price a player business charges for a product.
    SetProductPrice,
    /// Construct a building, usually on a plot.
    ConstructBuilding,
    /// List the player's inventory.
    CheckInventory,
    /// Show the player's currency balance.
    CheckBalance,
    /// Ask what one item costs.
    GetItemPrice,
    /// Ask for market-wide price information.
    GetMarketPriceInfo,
    /// List what a shop sells.
    BrowseShop,
    /// Start a conversation with an NPC.
    TalkToNpc,
    /// Hire an NPC to work at a business.
    HireWorker,
    /// List the recipes the player knows.
    ListRecipes,
}

impl Intent {
    /// Every intent, in the order the matcher tries them.
    pub const ALL: [Intent; 13] = [
        Intent::BuyItem,
        Intent::SellItem,
        Intent::CraftFromRecipe,
        Intent::SetProductPrice,
        Intent::ConstructBuilding,
        Intent::CheckInventory,
        Intent::CheckBalance,
        Intent::GetItemPrice,
        Intent::GetMarketPriceInfo,
        Intent::BrowseShop,
        Intent::TalkToNpc,
        Intent::HireWorker,
        Intent::ListRecipes,
    ];

    /// Returns the DSL name of this intent.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BuyItem => "buy-item",
            Self::SellItem => "sell-item",
            Self::CraftFromRecipe => "craft-from-recipe",
            Self::SetProductPrice => "set-product-price",
            Self::ConstructBuilding => "construct-building",
            Self::CheckInventory => "check-inventory",
            Self::CheckBalance => "check-balance",
            Self::GetItemPrice => "get-item-price",
            Self::GetMarketPriceInfo => "get-market-price-info",
            Self::BrowseShop => "browse-shop",
            Self::TalkToNpc => "talk-to-npc",
            Self::HireWorker => "hire-worker",
            Self::ListRecipes => "list-recipes",
        }
    }

    /// Returns a short description used when offering intents to the player.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BuyItem => "buy something",
            Self::SellItem => "sell something",
            Self::CraftFromRecipe => "craft something",
            Self::SetProductPrice => "set a product price",
            Self::ConstructBuilding => "construct a building",
            Self::CheckInventory => "check your inventory",
            Self::CheckBalance => "check your balance",
            Self::GetItemPrice => "check an item's price",
            Self::GetMarketPriceInfo => "view market prices",
            Self::BrowseShop => "browse a shop",
            Self::TalkToNpc => "talk to someone",
            Self::HireWorker => "hire a worker",
            Self::ListRecipes => "list your recipes",
        }
    }

    /// Verb phrase completing "Which X do you want to ...?".
    #[must_use]
    pub const fn verb_phrase(self) -> &'static str {
        match self {
            Self::BuyItem => "buy",
            Self::SellItem => "sell",
            Self::CraftFromRecipe => "craft",
            Self::SetProductPrice => "set the price of",
            Self::ConstructBuilding => "build",
            Self::CheckInventory => "check",
            Self::CheckBalance => "check",
            Self::GetItemPrice => "check the price of",
            Self::GetMarketPriceInfo => "see market prices for",
            Self::BrowseShop => "browse",
            Self::TalkToNpc => "talk to",
            Self::HireWorker => "hire",
            Self::ListRecipes => "list",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|intent| intent.name() == s)
            .ok_or_else(|| s.to_string())
    }
}
