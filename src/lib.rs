//! Finite automata and regular expressions over finite alphabets of single-character
//! symbols: NFA/DFA construction, closure under the regular operations, determinization,
//! minimization (Hopcroft and Brzozowski), automaton<->regex conversion, equivalence and
//! isomorphism testing, and canonical-signature serialization.
//!
//! The crate is organized leaf-first, mirroring the component table in the design
//! document: [`alphabet`] and [`state_set`] are small, dependency-free helpers; the
//! [`automaton`] module is the algorithmic core; [`regex`] and [`parser`] form the
//! regex front-end; [`generalized`] converts automata back to regexes; [`ext_regex`]
//! and [`sample`] sit on top as façade conveniences; [`error`] collects the error
//! taxonomy for every fallible entry point.

pub mod alphabet;
pub mod automaton;
pub mod dot;
pub mod error;
pub mod ext_regex;
pub mod generalized;
pub mod parser;
pub mod regex;
pub mod sample;
pub mod state_set;

pub use alphabet::Alphabet;
pub use automaton::{Automaton, EdgeId, StateId};
pub use error::{ArgumentError, ParseError, SignatureError, StateGraphError};
pub use ext_regex::ExtRegularExpression;
pub use generalized::GeneralizedAutomaton;
pub use regex::RegularExpression;
pub use state_set::StateSet;
