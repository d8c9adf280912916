//! Grammar DSL compiler.
//!
//! Turns DSL source into a validated [`Grammar`]. All validation happens
//! here, so a grammar that compiles can be matched without further checks.
//!
//! # Forms
//!
//! ```text
//! (fillers: [please kindly])
//! (preambles: ["i want to" "can you"])
//! (intent: buy-item :verbs [buy purchase "pick up"])
//! (rule: buy-item/bare
//!   :intent buy-item
//!   :confidence 0.92
//!   :expects [price]
//!   :defaults [shop]
//!   :pattern "<verb> [?quantity:number] ?item:item [from ?shop:shop] [for ?price:price]")
//! ```

use std::str::FromStr;

use haggle_foundation::{Error, ErrorKind, Intent, Result};

use crate::pattern::{PatternCompiler, PatternElement, adjacent_spans, first_leaves};
use crate::reader::{Datum, Reader};
use crate::rule::{Grammar, GrammarRule};

/// Compiles grammar DSL source.
pub struct GrammarCompiler;

impl GrammarCompiler {
    /// Compiles DSL source into a grammar.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for syntax errors and for any invalid
    /// declaration (see the module docs).
    pub fn compile(source: &str) -> Result<Grammar> {
        let forms = Reader::read_all(source)?;
        let mut grammar = Grammar::default();
        let mut rule_forms = Vec::new();

        for form in &forms {
            let Datum::List(items, pos) = form else {
                return Err(Error::dsl_syntax(
                    format!("expected a declaration, found {}", form.describe()),
                    form.position().line,
                    form.position().column,
                ));
            };
            let Some(head) = items.first().and_then(|d| match d {
                Datum::Symbol(s, _) => Some(s.as_str()),
                _ => None,
            }) else {
                return Err(Error::dsl_syntax("declaration needs a head symbol", pos.line, pos.column));
            };

            match head {
                "fillers:" => {
                    for word in Self::string_list(&items[1..], "fillers")? {
                        grammar.fillers.insert(word.to_lowercase());
                    }
                }
                "preambles:" => {
                    for phrase in Self::string_list(&items[1..], "preambles")? {
                        let words: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
                        if words.is_empty() {
                            return Err(Error::invalid_grammar(None, "blank preamble"));
                        }
                        grammar.preambles.push(words);
                    }
                }
                "intent:" => Self::compile_intent(&items[1..], &mut grammar)?,
                "rule:" => rule_forms.push(&items[1..]),
                other => {
                    return Err(Error::dsl_syntax(
                        format!("unknown declaration `{other}`"),
                        pos.line,
                        pos.column,
                    ));
                }
            }
        }

        // Longest preambles strip first.
        grammar.preambles.sort_by(|a, b| b.len().cmp(&a.len()));

        for (order, items) in rule_forms.into_iter().enumerate() {
            let rule = Self::compile_rule(items, order, &grammar)?;
            if grammar.rules.contains(&rule.id) {
                return Err(Error::new(ErrorKind::DuplicateRule(rule.id)));
            }
            grammar.rules.insert(rule);
        }

        if grammar.rules.is_empty() {
            return Err(Error::invalid_grammar(None, "grammar declares no rules"));
        }

        tracing::debug!(
            rules = grammar.rules.len(),
            fillers = grammar.fillers.len(),
            preambles = grammar.preambles.len(),
            "compiled grammar"
        );
        Ok(grammar)
    }

    fn compile_intent(items: &[Datum], grammar: &mut Grammar) -> Result<()> {
        let intent = Self::intent_name(items.first(), None)?;
        let options = Self::keyword_options(&items[1..], None)?;
        for (key, value) in options {
            match key.as_str() {
                "verbs" => {
                    for verb in Self::vector_strings(value, None, "verbs")? {
                        if !grammar.verbs.register(intent, &verb) {
                            return Err(Error::invalid_grammar(
                                None,
                                format!("blank verb for intent {intent}"),
                            ));
                        }
                    }
                }
                other => {
                    return Err(Error::invalid_grammar(
                        None,
                        format!("unknown option :{other} for intent {intent}"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn compile_rule(items: &[Datum], order: usize, grammar: &Grammar) -> Result<GrammarRule> {
        let Some(id) = items.first().and_then(Datum::as_text) else {
            return Err(Error::invalid_grammar(None, "rule needs an id"));
        };
        let rule_id = Some(id);
        let mut intent = None;
        let mut pattern = None;
        let mut confidence = None;
        let mut expects = Vec::new();
        let mut defaults = Vec::new();

        for (key, value) in Self::keyword_options(&items[1..], rule_id)? {
            match key.as_str() {
                "intent" => intent = Some(Self::intent_name(Some(value), rule_id)?),
                "pattern" => match value {
                    Datum::Str(text, _) => pattern = Some(text.as_str()),
                    other => {
                        return Err(Error::invalid_grammar(
                            rule_id,
                            format!(":pattern must be a string, found {}", other.describe()),
                        ));
                    }
                },
                "confidence" => match value {
                    Datum::Number(n, _) => confidence = Some(*n),
                    other => {
                        return Err(Error::invalid_grammar(
                            rule_id,
                            format!(":confidence must be a number, found {}", other.describe()),
                        ));
                    }
                },
                "expects" => expects = Self::vector_strings(value, rule_id, "expects")?,
                "defaults" => defaults = Self::vector_strings(value, rule_id, "defaults")?,
                other => {
                    return Err(Error::invalid_grammar(rule_id, format!("unknown option :{other}")));
                }
            }
        }

        let Some(intent) = intent else {
            return Err(Error::invalid_grammar(rule_id, "missing :intent"));
        };
        let Some(pattern) = pattern else {
            return Err(Error::invalid_grammar(rule_id, "missing :pattern"));
        };
        let Some(confidence) = confidence else {
            return Err(Error::invalid_grammar(rule_id, "missing :confidence"));
        };
        if !(confidence > 0.0 && confidence <= 1.0) {
            return Err(Error::invalid_grammar(
                rule_id,
                format!("confidence {confidence} is outside (0, 1]"),
            ));
        }

        let elements = PatternCompiler::new(id, intent).compile(pattern)?;
        Self::validate_elements(id, &elements, grammar)?;

        let mut rule = GrammarRule::new(id, intent, elements, confidence);
        rule.order = order;

        for name in &expects {
            match rule.slot(name) {
                None => {
                    return Err(Error::invalid_grammar(rule_id, format!("expects unknown slot `{name}`")));
                }
                Some(slot) if !slot.optional => {
                    return Err(Error::invalid_grammar(
                        rule_id,
                        format!("expects mandatory slot `{name}`"),
                    ));
                }
                Some(_) => {}
            }
        }
        for name in &defaults {
            match rule.slot(name) {
                None => {
                    return Err(Error::invalid_grammar(rule_id, format!("defaults unknown slot `{name}`")));
                }
                Some(slot) if !slot.optional => {
                    return Err(Error::invalid_grammar(
                        rule_id,
                        format!("defaults mandatory slot `{name}`"),
                    ));
                }
                Some(slot) if !slot.kind.is_context_fillable() => {
                    return Err(Error::invalid_grammar(
                        rule_id,
                        format!("slot `{name}` of kind {} cannot default from context", slot.kind),
                    ));
                }
                Some(_) => {}
            }
        }
        rule.expects = expects;
        rule.defaults = defaults;
        Ok(rule)
    }

    fn validate_elements(id: &str, elements: &[PatternElement], grammar: &Grammar) -> Result<()> {
        let (leaves, _) = first_leaves(&[elements]);
        if leaves.iter().any(|leaf| leaf.is_span()) {
            return Err(Error::invalid_pattern(
                id,
                "pattern must not start with a span slot",
            ));
        }
        if let Some((first, second)) = adjacent_spans(elements) {
            return Err(Error::invalid_pattern(
                id,
                format!("slots ?{first} and ?{second} have no word between them"),
            ));
        }
        Self::check_verbs(id, elements, grammar)
    }

    fn check_verbs(id: &str, elements: &[PatternElement], grammar: &Grammar) -> Result<()> {
        for element in elements {
            match element {
                PatternElement::Verb(intent) if !grammar.verbs.has_verbs(*intent) => {
                    return Err(Error::invalid_pattern(
                        id,
                        format!("intent {intent} has no verbs"),
                    ));
                }
                PatternElement::Optional(inner) => Self::check_verbs(id, inner, grammar)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn intent_name(datum: Option<&Datum>, rule: Option<&str>) -> Result<Intent> {
        let Some(name) = datum.and_then(Datum::as_text) else {
            return Err(Error::invalid_grammar(rule, "expected an intent name"));
        };
        Intent::from_str(name).map_err(|name| Error::new(ErrorKind::UnknownIntent(name)))
    }

    fn keyword_options<'d>(items: &'d [Datum], rule: Option<&str>) -> Result<Vec<(String, &'d Datum)>> {
        let mut options = Vec::new();
        let mut iter = items.iter();
        while let Some(key) = iter.next() {
            let Datum::Keyword(name, _) = key else {
                return Err(Error::invalid_grammar(
                    rule,
                    format!("expected a keyword, found {}", key.describe()),
                ));
            };
            let Some(value) = iter.next() else {
                return Err(Error::invalid_grammar(rule, format!(":{name} needs a value")));
            };
            options.push((name.clone(), value));
        }
        Ok(options)
    }

    fn vector_strings(datum: &Datum, rule: Option<&str>, what: &str) -> Result<Vec<String>> {
        let Datum::Vector(items, _) = datum else {
            return Err(Error::invalid_grammar(rule, format!(":{what} must be a vector")));
        };
        items
            .iter()
            .map(|item| {
                item.as_text().map(str::to_string).ok_or_else(|| {
                    Error::invalid_grammar(
                        rule,
                        format!(":{what} entries must be symbols or strings, found {}", item.describe()),
                    )
                })
            })
            .collect()
    }

    fn string_list(items: &[Datum], what: &str) -> Result<Vec<String>> {
        match items {
            [single] => Self::vector_strings(single, None, what),
            _ => Err(Error::invalid_grammar(None, format!("{what}: expects one vector"))),
        }
    }
}
