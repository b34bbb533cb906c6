//! Finite ordered alphabet of single-character symbols.
//!
//! Mirrors the spirit of the teacher's generic `Alphabet` trait in `lib.rs` but pins the
//! symbol type down to `char`, as spec.md §1 restricts alphabets to single printable
//! characters rather than an arbitrary `Hash + Eq + Ord` type.

use rand::Rng;
use rand::seq::SliceRandom;

/// An ordered, deduplicated sequence of distinct alphabet symbols.
///
/// Immutable after construction; two alphabets compare equal iff their declared orders
/// match exactly, since DFS renaming and signatures depend on iteration order (spec.md §5).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from an explicit symbol order. Duplicate symbols are an error
    /// condition upstream callers should not trigger; this constructor simply dedupes
    /// while preserving first-seen order, matching `Deterministic::new`'s sort-then-dedup
    /// approach in the teacher but keeping the caller's declared order instead of sorting it.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Self {
        let mut seen = Vec::new();
        for c in symbols {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        Alphabet { symbols: seen }
    }

    /// The default alphabet used throughout the library and its parser: `a`, `b`.
    pub fn default_ab() -> Self {
        Alphabet::new(['a', 'b'])
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    /// Position of a symbol in the declared order, used for fixed per-symbol iteration
    /// order in DFS renaming and signatures.
    pub fn index_of(&self, c: char) -> Option<usize> {
        self.symbols.iter().position(|&s| s == c)
    }

    /// The alphabet's symbols concatenated in declared order (the `Σ` component of a
    /// signature, spec.md §6).
    pub fn as_string(&self) -> String {
        self.symbols.iter().collect()
    }

    /// Restartable iterator over every word over this alphabet, in length-lexicographic
    /// order (shortest first, ties broken by the alphabet's declared order) — spec.md §8.10.
    pub fn words(&self) -> Words {
        Words { alphabet: self.symbols.clone(), length: 0, indices: vec![], done: false }
    }

    /// A uniformly random word with length drawn uniformly from `[min_len, max_len]`
    /// (inclusive), each symbol drawn uniformly from the alphabet.
    ///
    /// # Panics
    /// Panics if the alphabet is empty and a non-empty word is requested, or if
    /// `min_len > max_len`.
    pub fn random_word(&self, min_len: usize, max_len: usize) -> String {
        assert!(min_len <= max_len, "min_len must not exceed max_len");
        let mut rng = rand::thread_rng();
        let len = rng.gen_range(min_len..=max_len);
        if len > 0 {
            assert!(!self.symbols.is_empty(), "cannot draw symbols from an empty alphabet");
        }
        (0..len)
            .map(|_| *self.symbols.choose(&mut rng).expect("checked non-empty above"))
            .collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::default_ab()
    }
}

/// Restartable, length-lexicographic enumeration of every word over an alphabet.
///
/// Modeled as a plain iterator per spec.md §9's "generator functions" design note, rather
/// than as a field mutated on the alphabet itself.
pub struct Words {
    alphabet: Vec<char>,
    length: usize,
    /// Current word, as indices into `alphabet`, for the in-progress `length`.
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for Words {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        if self.length == 0 {
            // Emit the empty word once, then start enumerating length 1. An empty
            // alphabet has no non-empty words at all, so the enumeration stops here.
            self.length = 1;
            self.indices = vec![0; 1];
            if self.alphabet.is_empty() {
                self.done = true;
            }
            return Some(String::new());
        }

        let word: String = self.indices.iter().map(|&i| self.alphabet[i]).collect();

        // Advance to the next word of this length, odometer-style (last index fastest).
        let base = self.alphabet.len();
        let mut i = self.indices.len();
        loop {
            if i == 0 {
                // Overflowed: move to the next length.
                self.length += 1;
                self.indices = vec![0; self.length];
                break;
            }
            i -= 1;
            self.indices[i] += 1;
            if self.indices[i] < base {
                break;
            }
            self.indices[i] = 0;
        }

        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_length_lex_order() {
        let alphabet = Alphabet::new(['a', 'b']);
        let words: Vec<_> = alphabet.words().take(15).collect();
        assert_eq!(
            words,
            vec![
                "", "a", "b", "aa", "ab", "ba", "bb", "aaa", "aab", "aba", "abb", "baa", "bab",
                "bba", "bbb"
            ]
        );
    }

    #[test]
    fn random_word_has_exact_length() {
        let alphabet = Alphabet::new(['a', 'b']);
        let word = alphabet.random_word(60, 60);
        assert_eq!(word.len(), 60);
        assert!(word.chars().all(|c| alphabet.contains(c)));
    }

    #[test]
    fn dedupes_preserving_order() {
        let alphabet = Alphabet::new(['b', 'a', 'b']);
        assert_eq!(alphabet.symbols(), &['b', 'a']);
    }

    #[test]
    fn empty_alphabet_yields_only_the_empty_word() {
        let alphabet = Alphabet::new([]);
        let words: Vec<_> = alphabet.words().collect();
        assert_eq!(words, vec!["".to_string()]);
    }
}
