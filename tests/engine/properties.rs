//! Property tests for the dispatch controller.

use haggle_engine::DispatchState;
use proptest::prelude::*;

use crate::town::Town;

const PHRASES: &[&str] = &[
    "check price",
    "buy 2 health potions from the Tipsy Pixie",
    "sell potion",
    "check prices",
    "craft steel sword",
    "what's the weather like",
    "browse",
    "sell helth potion",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn parsing_is_deterministic(index in 0..PHRASES.len(), at_shop in any::<bool>()) {
        let first = Town::new();
        let second = Town::new();
        let input = PHRASES[index];
        let ctx = if at_shop { first.at_pixie("s1") } else { first.outside("s1") };

        prop_assert_eq!(first.parse(input, &ctx), second.parse(input, &ctx));
    }

    #[test]
    fn reparsing_on_one_engine_gives_the_same_outcome(
        index in 0..PHRASES.len(),
        between in 0..PHRASES.len(),
        at_shop in any::<bool>(),
    ) {
        let town = Town::new();
        let ctx = if at_shop { town.at_pixie("s1") } else { town.outside("s1") };
        let input = PHRASES[index];

        let first = town.parse(input, &ctx);
        let again = town.parse(input, &ctx);
        prop_assert_eq!(&first, &again);

        let _ = town.parse(PHRASES[between], &ctx);
        prop_assert_eq!(&first, &town.parse(input, &ctx));
        prop_assert!(town.engine.pending_clarifications() <= 1);
    }

    #[test]
    fn arbitrary_input_never_panics(input in "\\PC{0,60}") {
        let town = Town::new();
        let outcome = town.parse(&input, &town.outside("s1"));
        prop_assert_ne!(outcome.state(), DispatchState::Parsing);
    }

    #[test]
    fn accepted_commands_clear_the_threshold(index in 0..PHRASES.len()) {
        let town = Town::new();
        if let Some(command) = town.parse(PHRASES[index], &town.at_pixie("s1")).command() {
            prop_assert!(command.overall_confidence >= 0.85);
            prop_assert!(command.slots.values().all(|s| s.is_resolved()));
        }
    }
}
