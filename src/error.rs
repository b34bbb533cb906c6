//! Error taxonomy for every fallible public entry point.
//!
//! Grouped by subsystem rather than lumped into one enum, so callers can match on the
//! specific failure mode without matching on variants that can never occur for the API
//! they called.

use thiserror::Error;

/// A regex token or character that could not be consumed by the grammar in §4.9.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character {0:?} in regex source")]
    UnexpectedChar(char),
    #[error("unmatched '(' with no closing ')' or ')*'")]
    UnmatchedOpenParen,
    #[error("unexpected ')' with no matching '('")]
    UnmatchedCloseParen,
    #[error("unexpected token at end of factor")]
    UnexpectedTokenInFactor,
    #[error("trailing input after a complete expression")]
    TrailingInput,
    #[error("empty regex source")]
    EmptySource,
}

/// Failure modes of [`crate::automaton::Automaton::from_signature`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature must have exactly 3 '|'-separated parts, found {0}")]
    WrongPartCount(usize),
    #[error("signature part {0:?} must not be empty")]
    EmptyPart(&'static str),
    #[error("transition table length {actual} is not a multiple of state_count * alphabet_len ({expected_unit})")]
    MalformedTransitions { actual: usize, expected_unit: usize },
    #[error("malformed base62 digit {0:?}")]
    MalformedDigit(char),
    #[error("finality string length {finals} does not match alphabet-derived state count {states}")]
    StateCountMismatch { finals: usize, states: usize },
}

/// Argument-invariant violations: negative lengths, mismatched permutation sizes, etc.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("length bound must be non-negative, got {0}")]
    NegativeLength(i64),
    #[error("numberOfSymbols must be positive, got {0}")]
    NonPositiveSymbolCount(i64),
    #[error("permutation length {given} does not match state count {expected}")]
    PermutationLengthMismatch { given: usize, expected: usize },
    #[error("permutation is not a bijection over 0..{0}")]
    PermutationNotBijective(usize),
}

/// Raised by state-graph operations (DFS renaming, signature) that require a start state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateGraphError {
    #[error("automaton has no start state")]
    NoStartState,
    #[error("signature is only defined for deterministic automata")]
    NotDeterministic,
}
