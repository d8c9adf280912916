//! Integration tests for the haggle_grammar crate.
//!
//! Tests for the structural half of the pipeline:
//! - Tokenization
//! - Grammar DSL compilation and validation
//! - Rule matching against the standard economy grammar

mod dsl_validation;
mod standard_matching;
mod tokenizer_tests;
