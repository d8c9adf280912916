//! Example inputs for the standard grammar.
//!
//! [`CANONICAL`] holds one fully specified input per intent; with the
//! entities it names in scope, each should be accepted without a question.
//! [`PARAPHRASES`] holds more phrasings and the rule each one must match.

use haggle_foundation::Intent;

/// An input and the rule it is expected to match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Example {
    /// The intent the input expresses.
    pub intent: Intent,
    /// Raw player input.
    pub input: &'static str,
    /// Id of the rule that should match it.
    pub rule: &'static str,
}

const fn example(intent: Intent, input: &'static str, rule: &'static str) -> Example {
    Example { intent, input, rule }
}

/// One canonical input per intent, in [`Intent::ALL`] order.
pub const CANONICAL: &[Example] = &[
    example(Intent::BuyItem, "buy 2 health potions from the Tipsy Pixie", "buy-item/from-shop"),
    example(Intent::SellItem, "sell the iron ore", "sell-item/bare"),
    example(Intent::CraftFromRecipe, "craft steel sword", "craft-from-recipe/recipe"),
    example(
        Intent::SetProductPrice,
        "set the price of fresh bread to 5 gold",
        "set-product-price/price-of",
    ),
    example(
        Intent::ConstructBuilding,
        "build a workshop on the north field",
        "construct-building/on-plot",
    ),
    example(Intent::CheckInventory, "check my inventory", "check-inventory/show"),
    example(Intent::CheckBalance, "check my balance", "check-balance/show"),
    example(Intent::GetItemPrice, "how much is a mana potion", "get-item-price/ask"),
    example(
        Intent::GetMarketPriceInfo,
        "market prices for iron ore",
        "get-market-price-info/report",
    ),
    example(Intent::BrowseShop, "browse the Tipsy Pixie", "browse-shop/shop"),
    example(Intent::TalkToNpc, "talk to Old Marta", "talk-to-npc/npc"),
    example(
        Intent::HireWorker,
        "hire Brom the Smith for the Riverside Bakery",
        "hire-worker/for-business",
    ),
    example(Intent::ListRecipes, "show my recipes", "list-recipes/show"),
];

/// Other phrasings, each matching exactly one intent.
pub const PARAPHRASES: &[Example] = &[
    example(Intent::BuyItem, "purchase a mana potion", "buy-item/bare"),
    example(Intent::BuyItem, "buy three iron ore at 4 gold", "buy-item/bare"),
    example(
        Intent::BuyItem,
        "I would like to buy a health potion, please",
        "buy-item/bare",
    ),
    example(Intent::SellItem, "sell potion", "sell-item/bare"),
    example(
        Intent::SellItem,
        "sell 3 iron ore to Grumbold's Smithy for 4 gold",
        "sell-item/to-shop",
    ),
    example(Intent::CraftFromRecipe, "make 2 healing draughts", "craft-from-recipe/recipe"),
    example(Intent::SetProductPrice, "charge 6g for fresh bread", "set-product-price/charge"),
    example(Intent::ConstructBuilding, "construct a warehouse", "construct-building/bare"),
    example(Intent::CheckInventory, "what do I have?", "check-inventory/verb"),
    example(Intent::CheckBalance, "how much gold do I have", "check-balance/verb"),
    example(
        Intent::GetItemPrice,
        "how much does the elixir of luck cost",
        "get-item-price/cost",
    ),
    example(Intent::GetItemPrice, "what's the price of iron ore", "get-item-price/ask"),
    example(
        Intent::BrowseShop,
        "check prices at the Tipsy Pixie",
        "browse-shop/prices-at",
    ),
    example(Intent::BrowseShop, "what do you sell", "browse-shop/shop"),
    example(Intent::TalkToNpc, "greet marta", "talk-to-npc/npc"),
    example(Intent::HireWorker, "hire brom", "hire-worker/bare"),
    example(Intent::ListRecipes, "what can I craft", "list-recipes/verb"),
];

/// Input that splits between browsing the current shop and the market report.
pub const AMBIGUOUS_PRICE_CHECK: &str = "check prices";

/// Input that splits between an unnamed item's price and the market report.
pub const AMBIGUOUS_ITEM_PRICE: &str = "check price";
