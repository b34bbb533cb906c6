//! Extended regex operations: intersection and complement of two regexes, computed via a
//! round-trip through the automaton core rather than directly on the regex tree
//! (spec.md §4/§6). Grounded on `pgimalac-rustomaton`'s De-Morgan-style composition of
//! `negate`/`unite`/`intersect` on its `DFA` type (`other_examples/...pgimalac-rustomaton...
//! src-dfa.rs`), adapted here to operate on [`RegularExpression`] trees plus the
//! [`GeneralizedAutomaton`] elimination procedure instead of raw DFAs.

use crate::alphabet::Alphabet;
use crate::automaton::Automaton;
use crate::error::ParseError;
use crate::generalized::GeneralizedAutomaton;
use crate::parser;
use crate::regex::RegularExpression;

/// A regex enriched with the intersection/complement operations spec.md §6 lists as part
/// of the public façade. These do not fit on [`RegularExpression`] itself since they
/// require a full automaton round-trip (minimize/complement/state-elimination) rather
/// than a local tree transformation.
pub struct ExtRegularExpression {
    regex: RegularExpression,
}

impl ExtRegularExpression {
    pub fn from_regex(regex: RegularExpression) -> Self {
        ExtRegularExpression { regex }
    }

    pub fn regex(&self) -> &RegularExpression {
        &self.regex
    }

    pub fn into_regex(self) -> RegularExpression {
        self.regex
    }

    /// Parses `input` against `alphabet` and wraps the result.
    pub fn parse(input: &str, alphabet: &Alphabet) -> Result<Self, ParseError> {
        parser::parse(input, alphabet).map(Self::from_regex)
    }

    pub fn accepts(&self, word: &str) -> bool {
        self.regex.accepts(word)
    }

    /// Converts an automaton back into a regex via generalized-automaton state
    /// elimination (spec.md §4.7); this is the `Automaton -> RegularExpression` direction
    /// of the two data-flow loops described in spec.md §2.
    pub fn from_automaton(automaton: &Automaton) -> RegularExpression {
        GeneralizedAutomaton::copy_of(automaton).equivalent_regex()
    }

    /// `a ∩ b`: product-construct the two regexes' cached automata, minimize, and convert
    /// the result back to a regex (spec.md §4/§8.7).
    pub fn intersect(a: &RegularExpression, b: &RegularExpression) -> RegularExpression {
        let product = a.equivalent_automaton().intersect(b.equivalent_automaton()).minimize();
        Self::from_automaton(&product)
    }

    /// `¬r`: complement the cached automaton and convert back to a regex.
    pub fn complement(r: &RegularExpression) -> RegularExpression {
        let complement = r.equivalent_automaton().complement();
        Self::from_automaton(&complement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Alphabet {
        Alphabet::new(['a', 'b'])
    }

    #[test]
    fn intersect_matches_logical_and() {
        let a = parser::parse("a(a+b)*", &ab()).unwrap();
        let b = parser::parse("(a+b)*a", &ab()).unwrap();
        let inter = ExtRegularExpression::intersect(&a, &b);
        for w in ab().words().take(60) {
            assert_eq!(inter.accepts(&w), a.accepts(&w) && b.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn intersect_of_a_prefix_and_a_suffix_is_equivalent_to_known_regex() {
        let a = parser::parse("a(a+b)*", &ab()).unwrap();
        let b = parser::parse("(a+b)*a", &ab()).unwrap();
        let inter = ExtRegularExpression::intersect(&a, &b);
        let expected = parser::parse("a+a(a+b)*a", &ab()).unwrap();
        assert!(inter.similar(&expected));
    }

    #[test]
    fn complement_matches_logical_not() {
        let a = parser::parse("a(a+b)*", &ab()).unwrap();
        let not_a = ExtRegularExpression::complement(&a);
        for w in ab().words().take(60) {
            assert_eq!(not_a.accepts(&w), !a.accepts(&w), "word {:?}", w);
        }
    }
}
