//! Canonical example automata used by tests and demos (spec.md §6's `Sample`
//! constructor list). Each constructor builds the automaton from the primitives in
//! [`crate::automaton`] and, per the design note in spec.md §9 ("Closure over enclosing
//! automaton (`inLanguage`)"), returns it paired with an oracle predicate rather than
//! attaching a mutable field to the graph itself.

use crate::alphabet::Alphabet;
use crate::automaton::{Automaton, Tag};

/// An automaton plus the independently-computed predicate it is supposed to implement,
/// so tests can cross-check `automaton.accepts(w) == in_language(w)` without re-deriving
/// the oracle from the automaton under test.
pub struct Sample {
    pub automaton: Automaton,
    pub in_language: Box<dyn Fn(&str) -> bool>,
}

/// Words containing `suffix` as a trailing subword.
pub fn ends_with(alphabet: &Alphabet, suffix: &str) -> Sample {
    let automaton = Automaton::all_words(alphabet).concat(&Automaton::single_word(alphabet, suffix));
    let suffix = suffix.to_string();
    Sample { automaton, in_language: Box::new(move |w: &str| w.ends_with(&suffix)) }
}

/// Words containing `prefix` as a leading subword.
pub fn starts_with(alphabet: &Alphabet, prefix: &str) -> Sample {
    let automaton = Automaton::single_word(alphabet, prefix).concat(&Automaton::all_words(alphabet));
    let prefix = prefix.to_string();
    Sample { automaton, in_language: Box::new(move |w: &str| w.starts_with(&prefix)) }
}

/// Words containing `needle` anywhere as a contiguous subword.
pub fn subword(alphabet: &Alphabet, needle: &str) -> Sample {
    let automaton = Automaton::all_words(alphabet)
        .concat(&Automaton::single_word(alphabet, needle))
        .concat(&Automaton::all_words(alphabet));
    let needle = needle.to_string();
    Sample { automaton, in_language: Box::new(move |w: &str| w.contains(&needle)) }
}

/// Words containing exactly `n` occurrences of `symbol`.
pub fn number_of_symbols(alphabet: &Alphabet, symbol: char, n: usize) -> Sample {
    let mut automaton = Automaton::new(format!("count({},{})", symbol, n), alphabet.clone());
    let states: Vec<_> = (0..=n)
        .map(|i| automaton.add_state(&i.to_string(), i == 0, i == n, Tag::None, false))
        .collect();
    for i in 0..n {
        for &c in alphabet.symbols() {
            if c == symbol {
                automaton.add_edge(states[i], states[i + 1], c);
            } else {
                automaton.add_edge(states[i], states[i], c);
            }
        }
    }
    for &c in alphabet.symbols() {
        if c != symbol {
            automaton.add_edge(states[n], states[n], c);
        }
    }
    Sample {
        automaton,
        in_language: Box::new(move |w: &str| w.chars().filter(|&c| c == symbol).count() == n),
    }
}

/// Words whose length is congruent to `remainder` modulo `modulus`.
///
/// # Panics
/// Panics if `modulus == 0`.
pub fn mod_length(alphabet: &Alphabet, modulus: usize, remainder: usize) -> Sample {
    assert!(modulus > 0, "modLength requires a positive modulus");
    let remainder = remainder % modulus;
    let mut automaton = Automaton::new(format!("modlen({},{})", modulus, remainder), alphabet.clone());
    let states: Vec<_> = (0..modulus)
        .map(|i| automaton.add_state(&i.to_string(), i == 0, i == remainder, Tag::None, false))
        .collect();
    for i in 0..modulus {
        let next = (i + 1) % modulus;
        for &c in alphabet.symbols() {
            automaton.add_edge(states[i], states[next], c);
        }
    }
    Sample {
        automaton,
        in_language: Box::new(move |w: &str| w.chars().count() % modulus == remainder),
    }
}

/// The language containing only `word`.
pub fn only_word(alphabet: &Alphabet, word: &str) -> Sample {
    let automaton = Automaton::single_word(alphabet, word);
    let word = word.to_string();
    Sample { automaton, in_language: Box::new(move |w: &str| w == word) }
}

/// The language containing only the empty word.
pub fn only_empty_word(alphabet: &Alphabet) -> Sample {
    Sample { automaton: Automaton::only_empty_word(alphabet), in_language: Box::new(|w: &str| w.is_empty()) }
}

/// Every word over the alphabet.
pub fn all_words(alphabet: &Alphabet) -> Sample {
    Sample { automaton: Automaton::all_words(alphabet), in_language: Box::new(|_: &str| true) }
}

/// No words at all.
pub fn no_words(alphabet: &Alphabet) -> Sample {
    Sample { automaton: Automaton::no_words(alphabet), in_language: Box::new(|_: &str| false) }
}

/// Words of length in `[min, max]` inclusive.
///
/// # Panics
/// Panics if `min > max`.
pub fn length_range(alphabet: &Alphabet, min: usize, max: usize) -> Sample {
    assert!(min <= max, "lengthRange requires min <= max");
    let mut automaton = Automaton::new(format!("lenrange({},{})", min, max), alphabet.clone());
    let states: Vec<_> = (0..=max + 1)
        .map(|i| automaton.add_state(&i.to_string(), i == 0, i >= min && i <= max, Tag::None, false))
        .collect();
    for i in 0..=max {
        for &c in alphabet.symbols() {
            automaton.add_edge(states[i], states[i + 1], c);
        }
    }
    let sink = states[max + 1];
    for &c in alphabet.symbols() {
        automaton.add_edge(sink, sink, c);
    }
    Sample {
        automaton,
        in_language: Box::new(move |w: &str| {
            let len = w.chars().count();
            len >= min && len <= max
        }),
    }
}

/// Words of length at least `min`.
pub fn min_length(alphabet: &Alphabet, min: usize) -> Sample {
    let mut automaton = Automaton::new(format!("minlen({})", min), alphabet.clone());
    let states: Vec<_> = (0..=min)
        .map(|i| automaton.add_state(&i.to_string(), i == 0, i == min, Tag::None, false))
        .collect();
    for i in 0..min {
        for &c in alphabet.symbols() {
            automaton.add_edge(states[i], states[i + 1], c);
        }
    }
    for &c in alphabet.symbols() {
        automaton.add_edge(states[min], states[min], c);
    }
    Sample { automaton, in_language: Box::new(move |w: &str| w.chars().count() >= min) }
}

/// Words of length at most `max`.
pub fn max_length(alphabet: &Alphabet, max: usize) -> Sample {
    let mut automaton = Automaton::new(format!("maxlen({})", max), alphabet.clone());
    let states: Vec<_> = (0..=max + 1)
        .map(|i| automaton.add_state(&i.to_string(), i == 0, i <= max, Tag::None, false))
        .collect();
    for i in 0..=max {
        for &c in alphabet.symbols() {
            automaton.add_edge(states[i], states[i + 1], c);
        }
    }
    let sink = states[max + 1];
    for &c in alphabet.symbols() {
        automaton.add_edge(sink, sink, c);
    }
    Sample { automaton, in_language: Box::new(move |w: &str| w.chars().count() <= max) }
}

/// An automaton with `n` states unreachable from any start state, built by unioning
/// [`Automaton::all_words`] with `n` fresh, disconnected, non-start states.
///
/// Illustrative only, per spec.md §9(d): the source's `notReachable` chains unions in a
/// way that does not obviously enforce the stated count of unreachable states, so this
/// constructor is documented as producing *an* automaton with unreachable states rather
/// than a precisely-specified one.
pub fn not_reachable(alphabet: &Alphabet, n: usize) -> Sample {
    let base = Automaton::all_words(alphabet);
    let mut extra = Automaton::new("unreachable", alphabet.clone());
    for i in 0..n {
        extra.add_state(&format!("dead{}", i), false, false, Tag::None, true);
    }
    let automaton = base.union(&extra);
    Sample { automaton, in_language: Box::new(|_: &str| true) }
}

/// A deliberately non-canonical automaton — built by unioning two independently
/// constructed copies of the same language — used to exercise normalization
/// (`reduce`/`make_deterministic`/`minimize`) against a known target language.
pub fn test_normalize(alphabet: &Alphabet) -> Sample {
    let suffix = alphabet.symbols().first().map(|c| c.to_string()).unwrap_or_default();
    let left = ends_with(alphabet, &suffix).automaton;
    let right = ends_with(alphabet, &suffix).automaton;
    let automaton = left.union(&right);
    Sample { automaton, in_language: Box::new(move |w: &str| w.ends_with(&suffix)) }
}

/// A non-minimal automaton (union of two differently-built copies of the same language)
/// whose minimization is exercised directly by tests.
pub fn minimize1(alphabet: &Alphabet) -> Sample {
    let a = subword(alphabet, "ab").automaton;
    let b = subword(alphabet, "ab").automaton;
    let automaton = a.union(&b);
    Sample { automaton, in_language: Box::new(move |w: &str| w.contains("ab")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Alphabet {
        Alphabet::new(['a', 'b'])
    }

    fn check(sample: &Sample, words: impl IntoIterator<Item = String>) {
        for w in words {
            assert_eq!(
                sample.automaton.accepts(&w),
                (sample.in_language)(&w),
                "mismatch on {:?}",
                w
            );
        }
    }

    #[test]
    fn ends_with_matches_oracle() {
        let sample = ends_with(&ab(), "ab");
        assert!(sample.automaton.accepts("ab"));
        assert!(sample.automaton.accepts("aab"));
        assert!(sample.automaton.accepts("bab"));
        assert!(!sample.automaton.accepts("a"));
        assert!(!sample.automaton.accepts("ba"));
        assert!(!sample.automaton.accepts(""));
        check(&sample, ab().words().take(80));
    }

    #[test]
    fn starts_with_matches_oracle() {
        check(&starts_with(&ab(), "ab"), ab().words().take(80));
    }

    #[test]
    fn subword_matches_oracle() {
        check(&subword(&ab(), "abb"), ab().words().take(200));
    }

    #[test]
    fn number_of_symbols_matches_oracle() {
        check(&number_of_symbols(&ab(), 'a', 2), ab().words().take(200));
    }

    #[test]
    fn mod_length_matches_oracle() {
        check(&mod_length(&ab(), 3, 1), ab().words().take(100));
    }

    #[test]
    fn length_bounds_match_oracle() {
        check(&length_range(&ab(), 2, 4), ab().words().take(100));
        check(&min_length(&ab(), 3), ab().words().take(100));
        check(&max_length(&ab(), 3), ab().words().take(100));
    }

    #[test]
    fn only_word_and_empty_word_match_oracle() {
        check(&only_word(&ab(), "aba"), ab().words().take(50));
        check(&only_empty_word(&ab()), ab().words().take(50));
    }

    #[test]
    fn all_and_no_words_match_oracle() {
        check(&all_words(&ab()), ab().words().take(50));
        check(&no_words(&ab()), ab().words().take(50));
    }

    #[test]
    fn subword_ab_matches_parsed_regex() {
        let parsed = crate::parser::parse("(a+b)*abb(a+b)*", &ab()).unwrap();
        let sample = subword(&ab(), "abb").automaton.minimize();
        assert!(parsed.equivalent_automaton().minimize().equivalent(&sample));
    }

    #[test]
    fn minimize1_and_test_normalize_match_oracle() {
        check(&minimize1(&ab()), ab().words().take(100));
        check(&test_normalize(&ab()), ab().words().take(100));
    }

    #[test]
    fn not_reachable_has_unreachable_states() {
        let sample = not_reachable(&ab(), 3);
        let reduced = sample.automaton.reduce();
        assert!(reduced.state_count() < sample.automaton.state_count());
    }
}
