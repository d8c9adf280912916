//! Action formulation.
//!
//! Turns a [`ResolvedCommand`] into a typed request for the game service
//! that executes it. The formulator only reshapes data; prices, stock and
//! permissions are the services' business.
//!
//! Slots are read by their conventional names: `item`, `quantity`, `price`,
//! `shop`, `npc`, `recipe`, `business`, `plot`, `building`.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use haggle_foundation::{EntityId, EntityKind, Intent, Money, ParseContext};

use crate::command::ResolvedCommand;

/// The game service a call is addressed to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Service {
    /// Buying and selling.
    Trade,
    /// Recipes and crafting.
    Crafting,
    /// Player businesses and construction.
    Business,
    /// The player's belongings and balance.
    Inventory,
    /// Price information.
    Market,
    /// Conversations.
    Dialogue,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trade => "trade",
            Self::Crafting => "crafting",
            Self::Business => "business",
            Self::Inventory => "inventory",
            Self::Market => "market",
            Self::Dialogue => "dialogue",
        })
    }
}

/// Buy an item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PurchaseRequest {
    /// The buying player.
    pub buyer: EntityId,
    /// The item.
    pub item: EntityId,
    /// How many.
    pub quantity: u32,
    /// Where from, if known.
    pub shop: Option<EntityId>,
    /// Price per unit the player offered.
    pub offered_unit_price: Option<Money>,
}

/// Sell an item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SaleRequest {
    /// The selling player.
    pub seller: EntityId,
    /// The item.
    pub item: EntityId,
    /// How many.
    pub quantity: u32,
    /// Where to, if known.
    pub shop: Option<EntityId>,
    /// Price per unit the player asked.
    pub asking_unit_price: Option<Money>,
}

/// Craft from a recipe.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CraftRequest {
    /// The crafting player.
    pub crafter: EntityId,
    /// The recipe.
    pub recipe: EntityId,
    /// How many times.
    pub quantity: u32,
}

/// Change a product price at a player business.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceChange {
    /// The owning player.
    pub owner: EntityId,
    /// The business, if named.
    pub business: Option<EntityId>,
    /// The product.
    pub item: EntityId,
    /// The new unit price.
    pub price: Money,
}

/// Construct a building.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstructionRequest {
    /// The building player.
    pub builder: EntityId,
    /// The blueprint.
    pub building: EntityId,
    /// Where, if named.
    pub plot: Option<EntityId>,
}

/// List a player's belongings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InventoryQuery {
    /// The player.
    pub player: EntityId,
}

/// Show a player's balance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BalanceQuery {
    /// The player.
    pub player: EntityId,
}

/// Ask the price of one item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceQuery {
    /// The asking player.
    pub player: EntityId,
    /// The item.
    pub item: EntityId,
    /// The shop asked, if any.
    pub shop: Option<EntityId>,
}

/// Ask for market-wide prices.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarketReport {
    /// The asking player.
    pub player: EntityId,
    /// Limit to one item.
    pub item: Option<EntityId>,
    /// The market the player stands in.
    pub location: Option<EntityId>,
}

/// List what a shop sells.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StockListing {
    /// The browsing player.
    pub player: EntityId,
    /// The shop.
    pub shop: EntityId,
}

/// Talk to an NPC.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Conversation {
    /// The player.
    pub player: EntityId,
    /// The NPC.
    pub npc: EntityId,
}

/// Hire an NPC.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HireRequest {
    /// The hiring player.
    pub employer: EntityId,
    /// The NPC hired.
    pub worker: EntityId,
    /// Where they will work, if named.
    pub business: Option<EntityId>,
}

/// List a player's recipes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecipeList {
    /// The player.
    pub player: EntityId,
}

/// A request addressed to a game service.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ServiceCall {
    /// See [`PurchaseRequest`].
    Purchase(PurchaseRequest),
    /// See [`SaleRequest`].
    Sale(SaleRequest),
    /// See [`CraftRequest`].
    Craft(CraftRequest),
    /// See [`PriceChange`].
    SetPrice(PriceChange),
    /// See [`ConstructionRequest`].
    Construct(ConstructionRequest),
    /// See [`InventoryQuery`].
    Inventory(InventoryQuery),
    /// See [`BalanceQuery`].
    Balance(BalanceQuery),
    /// See [`PriceQuery`].
    Price(PriceQuery),
    /// See [`MarketReport`].
    Market(MarketReport),
    /// See [`StockListing`].
    Browse(StockListing),
    /// See [`Conversation`].
    Talk(Conversation),
    /// See [`HireRequest`].
    Hire(HireRequest),
    /// See [`RecipeList`].
    Recipes(RecipeList),
}

impl ServiceCall {
    /// The service that handles this call.
    #[must_use]
    pub fn service(&self) -> Service {
        match self {
            Self::Purchase(_) | Self::Sale(_) => Service::Trade,
            Self::Craft(_) | Self::Recipes(_) => Service::Crafting,
            Self::SetPrice(_) | Self::Construct(_) | Self::Hire(_) => Service::Business,
            Self::Inventory(_) | Self::Balance(_) => Service::Inventory,
            Self::Price(_) | Self::Market(_) | Self::Browse(_) => Service::Market,
            Self::Talk(_) => Service::Dialogue,
        }
    }
}

/// Why a command could not be turned into a service call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormulationError {
    /// A required slot has no value.
    #[error("{intent} needs a {kind} in slot `{slot}`")]
    MissingSlot {
        /// The command's intent.
        intent: Intent,
        /// The slot name.
        slot: String,
        /// The kind expected.
        kind: EntityKind,
    },
    /// A slot holds a value of the wrong kind.
    #[error("slot `{slot}` of {intent} should hold a {expected}")]
    WrongKind {
        /// The command's intent.
        intent: Intent,
        /// The slot name.
        slot: String,
        /// The kind expected.
        expected: EntityKind,
    },
}

/// Builds service calls from resolved commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionFormulator;

impl ActionFormulator {
    /// Creates a formulator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Formulates the service call for a command.
    ///
    /// Quantities default to 1; a shop or NPC the player is interacting with
    /// fills in when the command does not name one.
    ///
    /// # Errors
    ///
    /// Returns [`FormulationError`] if a required entity is missing.
    pub fn formulate(&self, command: &ResolvedCommand, context: &ParseContext) -> Result<ServiceCall, FormulationError> {
        let slots = Slots { command };
        let player = context.player;
        let shop = || slots.optional_entity("shop", EntityKind::Shop).map(|s| s.or(context.active_shop()));

        let call = match command.intent {
            Intent::BuyItem => ServiceCall::Purchase(PurchaseRequest {
                buyer: player,
                item: slots.entity("item", EntityKind::Item)?,
                quantity: slots.quantity()?,
                shop: shop()?,
                offered_unit_price: slots.money("price")?,
            }),
            Intent::SellItem => ServiceCall::Sale(SaleRequest {
                seller: player,
                item: slots.entity("item", EntityKind::Item)?,
                quantity: slots.quantity()?,
                shop: shop()?,
                asking_unit_price: slots.money("price")?,
            }),
            Intent::CraftFromRecipe => ServiceCall::Craft(CraftRequest {
                crafter: player,
                recipe: slots.entity("recipe", EntityKind::Recipe)?,
                quantity: slots.quantity()?,
            }),
            Intent::SetProductPrice => ServiceCall::SetPrice(PriceChange {
                owner: player,
                business: slots.optional_entity("business", EntityKind::Business)?,
                item: slots.entity("item", EntityKind::Item)?,
                price: slots.money("price")?.ok_or_else(|| slots.missing("price", EntityKind::Currency))?,
            }),
            Intent::ConstructBuilding => ServiceCall::Construct(ConstructionRequest {
                builder: player,
                building: slots.entity("building", EntityKind::Building)?,
                plot: slots.optional_entity("plot", EntityKind::Plot)?,
            }),
            Intent::CheckInventory => ServiceCall::Inventory(InventoryQuery { player }),
            Intent::CheckBalance => ServiceCall::Balance(BalanceQuery { player }),
            Intent::GetItemPrice => ServiceCall::Price(PriceQuery {
                player,
                item: slots.entity("item", EntityKind::Item)?,
                shop: shop()?,
            }),
            Intent::GetMarketPriceInfo => ServiceCall::Market(MarketReport {
                player,
                item: slots.optional_entity("item", EntityKind::Item)?,
                location: context.location,
            }),
            Intent::BrowseShop => ServiceCall::Browse(StockListing {
                player,
                shop: shop()?.ok_or_else(|| slots.missing("shop", EntityKind::Shop))?,
            }),
            Intent::TalkToNpc => ServiceCall::Talk(Conversation {
                player,
                npc: slots
                    .optional_entity("npc", EntityKind::Npc)?
                    .or(context.active_npc())
                    .ok_or_else(|| slots.missing("npc", EntityKind::Npc))?,
            }),
            Intent::HireWorker => ServiceCall::Hire(HireRequest {
                employer: player,
                worker: slots.entity("npc", EntityKind::Npc)?,
                business: slots.optional_entity("business", EntityKind::Business)?,
            }),
            Intent::ListRecipes => ServiceCall::Recipes(RecipeList { player }),
        };

        tracing::debug!(intent = %command.intent, service = %call.service(), "formulated service call");
        Ok(call)
    }
}

struct Slots<'a> {
    command: &'a ResolvedCommand,
}

impl Slots<'_> {
    fn missing(&self, slot: &str, kind: EntityKind) -> FormulationError {
        FormulationError::MissingSlot {
            intent: self.command.intent,
            slot: slot.to_string(),
            kind,
        }
    }

    fn wrong(&self, slot: &str, expected: EntityKind) -> FormulationError {
        FormulationError::WrongKind {
            intent: self.command.intent,
            slot: slot.to_string(),
            expected,
        }
    }

    fn optional_entity(&self, slot: &str, kind: EntityKind) -> Result<Option<EntityId>, FormulationError> {
        if self.command.value(slot).is_none() {
            return Ok(None);
        }
        match self.command.entity(slot) {
            Some(e) if e.kind == kind => Ok(Some(e.id)),
            _ => Err(self.wrong(slot, kind)),
        }
    }

    fn entity(&self, slot: &str, kind: EntityKind) -> Result<EntityId, FormulationError> {
        self.optional_entity(slot, kind)?.ok_or_else(|| self.missing(slot, kind))
    }

    fn quantity(&self) -> Result<u32, FormulationError> {
        match self.command.value("quantity") {
            None => Ok(1),
            Some(_) => self
                .command
                .quantity("quantity")
                .ok_or_else(|| self.wrong("quantity", EntityKind::Number)),
        }
    }

    fn money(&self, slot: &str) -> Result<Option<Money>, FormulationError> {
        match self.command.value(slot) {
            None => Ok(None),
            Some(_) => self
                .command
                .money(slot)
                .map(Some)
                .ok_or_else(|| self.wrong(slot, EntityKind::Currency)),
        }
    }
}
