//! Standard economy grammar.
//!
//! Contains the default fillers, verbs and rules for the thirteen economic
//! intents. Sections are plain DSL text so games can splice in their own
//! declarations or replace a section wholesale.
//!
//! Slot names follow the conventions the action formulator reads: `item`,
//! `quantity`, `price`, `shop`, `npc`, `recipe`, `business`, `plot` and
//! `building`.

/// Politeness words and lead-in phrases.
pub const NOISE: &str = r#"
;; Ignored at either end of the input
(fillers: [please kindly pls plz])

;; Ignored at the start of the input
(preambles: [
  "i want to" "i would like to" "id like to" "i wanna" "i will" "ill"
  "can i" "could i" "may i" "can you" "could you" "let me" "lets"])
"#;

/// Surface verbs per intent.
pub const VERBS: &str = r#"
;; Trade
(intent: buy-item :verbs [buy purchase acquire order "pick up"])
(intent: sell-item :verbs [sell offload hawk "get rid of"])

;; Production
(intent: craft-from-recipe :verbs [craft make forge brew cook assemble])
(intent: construct-building :verbs [build construct erect])

;; Business management
(intent: set-product-price :verbs [set change adjust update])
(intent: hire-worker :verbs [hire employ recruit])

;; Personal queries
(intent: check-inventory :verbs [inventory inv "what do i have" "what am i carrying"])
(intent: check-balance :verbs [balance wallet funds "how much money do i have" "how much gold do i have" "how rich am i"])
(intent: list-recipes :verbs [recipes cookbook "what can i craft" "what can i make"])

;; Price queries
(intent: get-item-price :verbs [
  "how much is" "how much are" "how much for" "price of"
  "whats the price of" "what is the price of" "check the price of" "check price of"])
(intent: get-market-price-info :verbs [
  "market prices" "market price" "market report" "market rates" "compare prices" "price trends"])

;; Shops and people
(intent: browse-shop :verbs [
  browse "show wares" "show me your wares" "list wares" "what do you sell"
  "what do you have" "whats for sale" "what is for sale"])
(intent: talk-to-npc :verbs [
  "talk to" "talk with" "speak to" "speak with" "chat with" "say hello to" greet talk chat])
"#;

/// Buying and selling.
pub const TRADE_RULES: &str = r#"
;; "buy 2 health potions from the Tipsy Pixie for 5 gold"
(rule: buy-item/from-shop
  :intent buy-item
  :confidence 0.97
  :expects [price]
  :pattern "<verb> [?quantity:number] ?item:item from|at ?shop:shop [for|at ?price:price]")

;; "buy a health potion", shop from the interaction
(rule: buy-item/bare
  :intent buy-item
  :confidence 0.92
  :defaults [shop]
  :pattern "<verb> [?quantity:number] ?item:item [for|at ?price:price] [from|at ?shop:shop]")

;; "sell 3 iron ore to Grumbold's Smithy for 4 gold"
(rule: sell-item/to-shop
  :intent sell-item
  :confidence 0.96
  :expects [price]
  :pattern "<verb> [?quantity:number] ?item:item to|at ?shop:shop [for|at ?price:price]")

;; "sell potion"
(rule: sell-item/bare
  :intent sell-item
  :confidence 0.9
  :defaults [shop]
  :pattern "<verb> [?quantity:number] ?item:item [for|at ?price:price] [to ?shop:shop]")
"#;

/// Crafting, construction and running a business.
pub const PRODUCTION_RULES: &str = r#"
;; "craft 2 steel swords"
(rule: craft-from-recipe/recipe
  :intent craft-from-recipe
  :confidence 0.95
  :pattern "<verb> [?quantity:number] ?recipe:recipe")

;; "build a workshop on the north field"
(rule: construct-building/on-plot
  :intent construct-building
  :confidence 0.96
  :pattern "<verb> ?building:building on|at ?plot:plot")

(rule: construct-building/bare
  :intent construct-building
  :confidence 0.9
  :pattern "<verb> ?building:building")

;; "set the price of fresh bread to 5 gold"
(rule: set-product-price/price-of
  :intent set-product-price
  :confidence 0.96
  :pattern "<verb> [the] price of|for ?item:item [at|in ?business:business] to ?price:price")

;; "charge 5 gold for fresh bread"
(rule: set-product-price/charge
  :intent set-product-price
  :confidence 0.93
  :pattern "charge ?price:price for|per ?item:item [at|in ?business:business]")

;; "hire Brom the Smith for the Riverside Bakery"
(rule: hire-worker/for-business
  :intent hire-worker
  :confidence 0.96
  :pattern "<verb> ?npc:npc for|at|to ?business:business")

(rule: hire-worker/bare
  :intent hire-worker
  :confidence 0.9
  :pattern "<verb> ?npc:npc")
"#;

/// Questions about the player's own state.
pub const PERSONAL_RULES: &str = r#"
(rule: check-inventory/show
  :intent check-inventory
  :confidence 0.95
  :pattern "check|show|open|view|list [my] inventory|bag|pack|items")

(rule: check-inventory/verb
  :intent check-inventory
  :confidence 0.93
  :pattern "<verb>")

(rule: check-balance/show
  :intent check-balance
  :confidence 0.95
  :pattern "check|show|view|count [my] balance|wallet|gold|money|funds|purse")

(rule: check-balance/verb
  :intent check-balance
  :confidence 0.93
  :pattern "<verb>")

(rule: list-recipes/show
  :intent list-recipes
  :confidence 0.95
  :pattern "check|show|list|view [my|known] recipes|blueprints")

(rule: list-recipes/verb
  :intent list-recipes
  :confidence 0.93
  :pattern "<verb>")
"#;

/// Prices, shops and people.
///
/// A bare "check prices" matches both the market rule and the shop rule with
/// similar low confidence, so the player is asked which one they meant. A
/// bare "check price" splits the same way between the market report and the
/// price of an item that was never named.
pub const MARKET_RULES: &str = r#"
;; "how much does a mana potion cost"
(rule: get-item-price/cost
  :intent get-item-price
  :confidence 0.95
  :defaults [shop]
  :pattern "how much does|do ?item:item cost [at|in ?shop:shop]")

;; "how much is a mana potion"
(rule: get-item-price/ask
  :intent get-item-price
  :confidence 0.95
  :defaults [shop]
  :pattern "<verb> ?item:item [at|in ?shop:shop]")

;; "check price", "check the price for iron ore"
(rule: get-item-price/check-price
  :intent get-item-price
  :confidence 0.74
  :expects [item]
  :defaults [shop]
  :pattern "check [the] price [for ?item:item] [at|in ?shop:shop]")

;; "market prices for iron ore"
(rule: get-market-price-info/report
  :intent get-market-price-info
  :confidence 0.93
  :pattern "<verb> [for|of|on ?item:item]")

(rule: get-market-price-info/check-prices
  :intent get-market-price-info
  :confidence 0.72
  :pattern "check [the] price|prices")

;; "check prices at the Tipsy Pixie"
(rule: browse-shop/prices-at
  :intent browse-shop
  :confidence 0.9
  :pattern "check prices at|in ?shop:shop")

(rule: browse-shop/check-prices
  :intent browse-shop
  :confidence 0.7
  :expects [shop]
  :defaults [shop]
  :pattern "check prices [at|in ?shop:shop]")

;; "browse the Tipsy Pixie"
(rule: browse-shop/shop
  :intent browse-shop
  :confidence 0.88
  :expects [shop]
  :defaults [shop]
  :pattern "<verb> [?shop:shop]")

;; "talk to Old Marta"
(rule: talk-to-npc/npc
  :intent talk-to-npc
  :confidence 0.88
  :expects [npc]
  :defaults [npc]
  :pattern "<verb> [?npc:npc]")
"#;

/// Gets the whole standard grammar as one DSL source.
#[must_use]
pub fn economy_grammar() -> String {
    format!("{NOISE}\n{VERBS}\n{TRADE_RULES}\n{PRODUCTION_RULES}\n{PERSONAL_RULES}\n{MARKET_RULES}")
}
