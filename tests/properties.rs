//! Property-based tests for the universally quantified invariants in spec.md §8,
//! exercised on pseudo-random regexes/automata via `proptest` rather than the fixed word
//! lists the unit tests in each module already use. Placed under `tests/` (an integration
//! test crate) rather than inline `#[cfg(test)]` modules since these tests cut across
//! `regex`, `automaton`, `generalized`, and `ext_regex` instead of belonging to any one of
//! them.

use proptest::prelude::*;

use automata::alphabet::Alphabet;
use automata::automaton::Automaton;
use automata::ext_regex::ExtRegularExpression;
use automata::generalized::GeneralizedAutomaton;
use automata::regex::RegularExpression;

fn ab() -> Alphabet {
    Alphabet::new(['a', 'b'])
}

/// A small syntax tree mirroring [`RegularExpression`]'s own variants, used purely as a
/// `proptest` strategy target (`RegularExpression` itself has no `Arbitrary` impl and
/// doesn't need one outside of tests).
#[derive(Clone, Debug)]
enum ReExpr {
    Empty,
    Word(String),
    Star(Box<ReExpr>),
    Sum(Box<ReExpr>, Box<ReExpr>),
    Concat(Box<ReExpr>, Box<ReExpr>),
}

fn re_expr_strategy() -> impl Strategy<Value = ReExpr> {
    let leaf = prop_oneof![
        Just(ReExpr::Empty),
        "[ab]{0,3}".prop_map(ReExpr::Word),
    ];
    leaf.prop_recursive(4, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| ReExpr::Star(Box::new(e))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| ReExpr::Sum(Box::new(l), Box::new(r))),
            (inner.clone(), inner).prop_map(|(l, r)| ReExpr::Concat(Box::new(l), Box::new(r))),
        ]
    })
}

fn build(expr: &ReExpr, alphabet: &Alphabet) -> RegularExpression {
    match expr {
        ReExpr::Empty => RegularExpression::empty(alphabet),
        ReExpr::Word(w) => RegularExpression::word(alphabet, w.clone()),
        ReExpr::Star(inner) => build(inner, alphabet).star(),
        ReExpr::Sum(l, r) => build(l, alphabet).sum(build(r, alphabet)),
        ReExpr::Concat(l, r) => build(l, alphabet).concat(build(r, alphabet)),
    }
}

/// Words used to probe language membership; small but covers both symbols and several
/// lengths including the boundary empty word.
fn sample_words(alphabet: &Alphabet) -> Vec<String> {
    alphabet.words().take(60).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property 1: determinization preserves language.
    #[test]
    fn determinization_preserves_language(expr in re_expr_strategy()) {
        let alphabet = ab();
        let a = build(&expr, &alphabet).equivalent_automaton().clone();
        let deterministic = a.make_deterministic();
        for w in sample_words(&alphabet) {
            prop_assert_eq!(deterministic.accepts(&w), a.accepts(&w));
        }
    }

    /// Property 2: minimization preserves language.
    #[test]
    fn minimization_preserves_language(expr in re_expr_strategy()) {
        let alphabet = ab();
        let a = build(&expr, &alphabet).equivalent_automaton().clone();
        let minimized = a.minimize();
        for w in sample_words(&alphabet) {
            prop_assert_eq!(minimized.accepts(&w), a.accepts(&w));
        }
    }

    /// Property 3: Hopcroft and Brzozowski minimization agree up to equivalence.
    #[test]
    fn hopcroft_agrees_with_brzozowski(expr in re_expr_strategy()) {
        let alphabet = ab();
        let a = build(&expr, &alphabet).equivalent_automaton().clone();
        prop_assert!(a.minimize_hopcroft().equivalent(&a.minimize_brzozowski()));
    }

    /// Property 4: signature round-trip and the two signature methods agree, for
    /// deterministic minimal automata.
    #[test]
    fn signature_round_trips(expr in re_expr_strategy()) {
        let alphabet = ab();
        let minimized = build(&expr, &alphabet).equivalent_automaton().clone().minimize();
        let sig = minimized.signature_dfs().unwrap();
        let rebuilt = Automaton::from_signature(&sig).unwrap();
        prop_assert_eq!(rebuilt.signature_dfs().unwrap(), sig.clone());
        prop_assert_eq!(minimized.signature_numbered_dfs().unwrap(), sig);
    }

    /// Property 5: closure operations agree with their logical counterparts.
    #[test]
    fn closure_operations_match_logic(expr_a in re_expr_strategy(), expr_b in re_expr_strategy()) {
        let alphabet = ab();
        let a = build(&expr_a, &alphabet).equivalent_automaton().clone();
        let b = build(&expr_b, &alphabet).equivalent_automaton().clone();
        let union = a.union(&b);
        let inter = a.intersect(&b);
        let diff = a.difference(&b);
        let comp = a.complement();
        for w in sample_words(&alphabet) {
            let (aw, bw) = (a.accepts(&w), b.accepts(&w));
            prop_assert_eq!(union.accepts(&w), aw || bw, "union mismatch on {:?}", w);
            prop_assert_eq!(inter.accepts(&w), aw && bw, "intersect mismatch on {:?}", w);
            prop_assert_eq!(diff.accepts(&w), aw && !bw, "difference mismatch on {:?}", w);
            prop_assert_eq!(comp.accepts(&w), !aw, "complement mismatch on {:?}", w);
        }
    }

    /// Property 6 (second clause): converting an automaton to a generalized automaton and
    /// back via state elimination yields an equivalent automaton.
    #[test]
    fn generalized_round_trip_preserves_language(expr in re_expr_strategy()) {
        let alphabet = ab();
        let a = build(&expr, &alphabet).equivalent_automaton().clone();
        let re = GeneralizedAutomaton::copy_of(&a).equivalent_regex();
        prop_assert!(re.equivalent_automaton().equivalent(&a));
    }

    /// Property 7: extended-regex intersection matches logical conjunction.
    #[test]
    fn ext_regex_intersect_matches_logic(expr_a in re_expr_strategy(), expr_b in re_expr_strategy()) {
        let alphabet = ab();
        let a = build(&expr_a, &alphabet);
        let b = build(&expr_b, &alphabet);
        let inter = ExtRegularExpression::intersect(&a, &b);
        for w in sample_words(&alphabet) {
            prop_assert_eq!(inter.accepts(&w), a.accepts(&w) && b.accepts(&w), "word {:?}", w);
        }
    }

    /// Property 8: reduction (reachability pruning) preserves language.
    #[test]
    fn reduction_preserves_language(expr in re_expr_strategy()) {
        let alphabet = ab();
        let a = build(&expr, &alphabet).equivalent_automaton().clone();
        prop_assert!(a.reduce().equivalent(&a));
    }

    /// Property 9: an automaton is isomorphic to a copy of itself with states renamed
    /// under an arbitrary permutation.
    #[test]
    fn isomorphic_under_renaming(expr in re_expr_strategy(), seed in 0u64..10_000) {
        let alphabet = ab();
        let a = build(&expr, &alphabet).equivalent_automaton().clone().minimize();
        let permutation = fisher_yates_permutation(a.state_count(), seed);
        let renamed = a.rename_states(&permutation).unwrap();
        prop_assert!(a.isomorphic(&renamed));
    }
}

/// Builds a deterministic Fisher-Yates permutation of `0..n`, keyed off `seed`, to drive
/// [`Automaton::rename_states`] with an actual bijection (spec.md §8.9's "for any
/// permutation `p`").
fn fisher_yates_permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    let mut state = seed.wrapping_mul(2_685_821_657_736_338_717).wrapping_add(1);
    for i in (1..n).rev() {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        let j = (state >> 33) as usize % (i + 1);
        perm.swap(i, j);
    }
    perm
}
