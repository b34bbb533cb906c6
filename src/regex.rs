//! Regular expression syntax tree with a construction-time cached equivalent automaton.
//!
//! spec.md §3/§4.8 requires each node to *own* its equivalent automaton rather than share
//! a flat, externally-interned arena the way the teacher's `Op`/`Handle`/`Cached` scheme in
//! `HeroicKatora-automata/src/regex.rs` does. `Rc` gives cheap structural sharing of
//! subtrees (so building `Sum(r, r)` doesn't duplicate `r`'s automaton) while keeping each
//! node's `equivalent_automaton` computed eagerly at construction, matching "cached at
//! construction" in spec.md §4.8.

use std::fmt;
use std::rc::Rc;

use rand::Rng;

use crate::alphabet::Alphabet;
use crate::automaton::Automaton;
use crate::error::ArgumentError;

/// A regular expression: `∅`, a single (possibly empty) word, or one of the three closure
/// operations over child expressions (spec.md §3).
#[derive(Clone)]
pub struct RegularExpression {
    inner: Rc<Node>,
}

enum Node {
    Empty { alphabet: Alphabet, automaton: Automaton },
    Word { word: String, automaton: Automaton },
    Star { inner: RegularExpression, automaton: Automaton },
    Sum { left: RegularExpression, right: RegularExpression, automaton: Automaton },
    Concat { left: RegularExpression, right: RegularExpression, automaton: Automaton },
}

impl RegularExpression {
    /// The language `∅`.
    pub fn empty(alphabet: &Alphabet) -> Self {
        RegularExpression {
            inner: Rc::new(Node::Empty {
                alphabet: alphabet.clone(),
                automaton: Automaton::empty_language(alphabet),
            }),
        }
    }

    /// A single literal word (possibly empty — the empty word denotes the epsilon
    /// language, spec.md §3).
    pub fn word(alphabet: &Alphabet, word: impl Into<String>) -> Self {
        let word = word.into();
        let automaton = Automaton::single_word(alphabet, &word);
        RegularExpression { inner: Rc::new(Node::Word { word, automaton }) }
    }

    pub fn epsilon(alphabet: &Alphabet) -> Self {
        Self::word(alphabet, "")
    }

    pub fn star(self) -> Self {
        let automaton = self
            .equivalent_automaton()
            .star()
            .minimize()
            .rename_states_dfs()
            .unwrap_or_else(|_| self.equivalent_automaton().star().minimize());
        RegularExpression { inner: Rc::new(Node::Star { inner: self, automaton }) }
    }

    pub fn sum(self, other: Self) -> Self {
        let automaton = self
            .equivalent_automaton()
            .union(other.equivalent_automaton())
            .minimize()
            .rename_states_dfs()
            .unwrap_or_else(|_| self.equivalent_automaton().union(other.equivalent_automaton()).minimize());
        RegularExpression { inner: Rc::new(Node::Sum { left: self, right: other, automaton }) }
    }

    /// Concatenation. Concatenating with the epsilon word returns the other operand
    /// untouched — an algebraic simplification required by spec.md §3/§4.8, not merely
    /// an automaton-level optimization.
    pub fn concat(self, other: Self) -> Self {
        if self.is_epsilon_word() {
            return other;
        }
        if other.is_epsilon_word() {
            return self;
        }
        let automaton = self
            .equivalent_automaton()
            .concat(other.equivalent_automaton())
            .minimize()
            .rename_states_dfs()
            .unwrap_or_else(|_| self.equivalent_automaton().concat(other.equivalent_automaton()).minimize());
        RegularExpression { inner: Rc::new(Node::Concat { left: self, right: other, automaton }) }
    }

    fn is_epsilon_word(&self) -> bool {
        matches!(&*self.inner, Node::Word { word, .. } if word.is_empty())
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.equivalent_automaton().alphabet()
    }

    /// The automaton cached at this node's construction (spec.md §4.8).
    pub fn equivalent_automaton(&self) -> &Automaton {
        match &*self.inner {
            Node::Empty { automaton, .. } => automaton,
            Node::Word { automaton, .. } => automaton,
            Node::Star { automaton, .. } => automaton,
            Node::Sum { automaton, .. } => automaton,
            Node::Concat { automaton, .. } => automaton,
        }
    }

    pub fn accepts(&self, word: &str) -> bool {
        self.equivalent_automaton().accepts(word)
    }

    /// Two regexes are similar iff their cached automata accept the same language
    /// (spec.md §4.8).
    pub fn similar(&self, other: &RegularExpression) -> bool {
        self.equivalent_automaton().equivalent(other.equivalent_automaton())
    }

    fn is_sum(&self) -> bool {
        matches!(&*self.inner, Node::Sum { .. })
    }

    /// A restartable generator of random regexes over `alphabet`, each built by randomly
    /// combining `number_of_symbols` leaf words with `sum`/`concat`/`star` (spec.md §9
    /// "Generator functions", `RegularExpression.generate`). Produces a lazy, effectively
    /// infinite sequence; each call to `next` draws a fresh random regex rather than
    /// replaying a fixed list.
    ///
    /// # Errors
    /// [`ArgumentError::NonPositiveSymbolCount`] if `number_of_symbols <= 0` (spec.md §7's
    /// argument-invariant class).
    pub fn generate(alphabet: &Alphabet, number_of_symbols: i64) -> Result<Generate, ArgumentError> {
        if number_of_symbols <= 0 {
            return Err(ArgumentError::NonPositiveSymbolCount(number_of_symbols));
        }
        Ok(Generate { alphabet: alphabet.clone(), number_of_symbols: number_of_symbols as usize })
    }
}

/// Iterator returned by [`RegularExpression::generate`]; see its documentation.
pub struct Generate {
    alphabet: Alphabet,
    number_of_symbols: usize,
}

impl Iterator for Generate {
    type Item = RegularExpression;

    fn next(&mut self) -> Option<RegularExpression> {
        Some(random_regex(&self.alphabet, self.number_of_symbols))
    }
}

/// Builds one random regex out of `number_of_symbols` random leaf words, folded together
/// pairwise with a randomly chosen `sum`/`concat`/`concat-then-star` combinator.
fn random_regex(alphabet: &Alphabet, number_of_symbols: usize) -> RegularExpression {
    let mut rng = rand::thread_rng();
    let mut terms: Vec<RegularExpression> = (0..number_of_symbols)
        .map(|_| RegularExpression::word(alphabet, alphabet.random_word(0, 2)))
        .collect();
    if terms.is_empty() {
        return RegularExpression::epsilon(alphabet);
    }
    while terms.len() > 1 {
        let i = rng.gen_range(0..terms.len());
        let left = terms.remove(i);
        let j = rng.gen_range(0..terms.len());
        let right = terms.remove(j);
        let combined = match rng.gen_range(0..3) {
            0 => left.sum(right),
            1 => left.concat(right),
            _ => left.concat(right).star(),
        };
        terms.push(combined);
    }
    terms.pop().expect("loop invariant: terms is non-empty until the final pop")
}

impl fmt::Display for RegularExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner {
            Node::Empty { .. } => write!(f, "0"),
            Node::Word { word, .. } if word.is_empty() => write!(f, "E"),
            Node::Word { word, .. } => write!(f, "{}", word),
            Node::Star { inner, .. } => {
                if matches!(&*inner.inner, Node::Word { word, .. } if word.chars().count() == 1) {
                    write!(f, "{}*", inner)
                } else {
                    write!(f, "({})*", inner)
                }
            }
            Node::Sum { left, right, .. } => write!(f, "{}+{}", left, right),
            Node::Concat { left, right, .. } => {
                if left.is_sum() {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                if right.is_sum() {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
        }
    }
}

impl fmt::Debug for RegularExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegularExpression({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Alphabet {
        Alphabet::new(['a', 'b'])
    }

    #[test]
    fn word_accepts_exactly_itself() {
        let r = RegularExpression::word(&ab(), "ab");
        assert!(r.accepts("ab"));
        assert!(!r.accepts("a"));
        assert!(!r.accepts(""));
    }

    #[test]
    fn epsilon_accepts_only_empty() {
        let r = RegularExpression::epsilon(&ab());
        assert!(r.accepts(""));
        assert!(!r.accepts("a"));
    }

    #[test]
    fn empty_accepts_nothing() {
        let r = RegularExpression::empty(&ab());
        assert!(!r.accepts(""));
        assert!(!r.accepts("a"));
    }

    #[test]
    fn sum_is_union_of_languages() {
        let a = RegularExpression::word(&ab(), "a");
        let b = RegularExpression::word(&ab(), "b");
        let sum = a.sum(b);
        assert!(sum.accepts("a"));
        assert!(sum.accepts("b"));
        assert!(!sum.accepts("ab"));
    }

    #[test]
    fn concat_with_epsilon_is_identity() {
        let a = RegularExpression::word(&ab(), "a");
        let eps = RegularExpression::epsilon(&ab());
        let lhs = a.clone().concat(eps.clone());
        let rhs = eps.concat(a);
        assert!(lhs.accepts("a"));
        assert!(rhs.accepts("a"));
    }

    #[test]
    fn star_accepts_repeats_and_empty() {
        let a = RegularExpression::word(&ab(), "a");
        let star = a.star();
        assert!(star.accepts(""));
        assert!(star.accepts("aaaa"));
        assert!(!star.accepts("ab"));
    }

    #[test]
    fn to_string_matches_concrete_syntax() {
        let ab_alpha = ab();
        let a = RegularExpression::word(&ab_alpha, "a");
        let b = RegularExpression::word(&ab_alpha, "b");
        let star = a.clone().star();
        assert_eq!(star.to_string(), "a*");
        let sum = a.clone().sum(b.clone());
        assert_eq!(sum.to_string(), "a+b");
        let concat_of_sum = sum.clone().concat(a.clone());
        assert_eq!(concat_of_sum.to_string(), "(a+b)a");
        assert_eq!(RegularExpression::empty(&ab_alpha).to_string(), "0");
        assert_eq!(RegularExpression::epsilon(&ab_alpha).to_string(), "E");
    }

    #[test]
    fn similar_regexes_share_equivalent_automata() {
        let a = RegularExpression::word(&ab(), "a");
        let b = RegularExpression::word(&ab(), "b");
        let left = a.clone().sum(b.clone());
        let right = b.sum(a);
        assert!(left.similar(&right));
    }

    #[test]
    fn generate_rejects_non_positive_symbol_count() {
        assert_eq!(
            RegularExpression::generate(&ab(), 0).unwrap_err(),
            ArgumentError::NonPositiveSymbolCount(0)
        );
        assert_eq!(
            RegularExpression::generate(&ab(), -3).unwrap_err(),
            ArgumentError::NonPositiveSymbolCount(-3)
        );
    }

    #[test]
    fn generate_produces_regexes_over_the_given_alphabet() {
        let alphabet = ab();
        let mut gen = RegularExpression::generate(&alphabet, 4).unwrap();
        for _ in 0..20 {
            let r = gen.next().expect("generator is an infinite sequence");
            // Every generated regex only ever accepts words drawn from the alphabet.
            for w in alphabet.words().take(30) {
                let _ = r.accepts(&w);
            }
        }
    }
}
