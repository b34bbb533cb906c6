//! Generalized automaton and state elimination (spec.md §4.7): an automaton whose edges
//! carry regex labels, converted to a single equivalent regex by repeatedly removing an
//! internal state and folding its in/loop/out edges into a single new edge.
//!
//! The algorithm and its complexity are sketched, but never implemented, as doc comments
//! on `HeroicKatora-automata/src/nfa.rs::Nfa::to_regex` (the ASCII-art "remove a single
//! state" diagram); this module is the from-scratch implementation of exactly that
//! picture, generalized from the teacher's unimplemented stub into working code operating
//! on the new arena-based [`crate::automaton::Automaton`].

use std::collections::BTreeMap;

use crate::alphabet::Alphabet;
use crate::automaton::Automaton;
use crate::regex::RegularExpression;

/// Handle to a state in a [`GeneralizedAutomaton`]'s own small arena — distinct from
/// [`crate::automaton::StateId`] since a generalized automaton is a separate graph with
/// its own boundary-state invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GStateId(usize);

struct GState {
    name: String,
}

/// An automaton whose edges are labelled with regexes instead of single symbols, with a
/// unique boundary `start` (start, not final) and `final` (final, not start) state
/// (spec.md §3/§4.7). At most one edge exists between any ordered pair of states: adding
/// a second edge between the same endpoints sums its regex into the existing label.
pub struct GeneralizedAutomaton {
    alphabet: Alphabet,
    states: Vec<Option<GState>>,
    start: GStateId,
    final_state: GStateId,
    edges: BTreeMap<(GStateId, GStateId), RegularExpression>,
}

impl GeneralizedAutomaton {
    /// Builds a generalized automaton equivalent to `automaton`: one internal state per
    /// live state of `automaton`, epsilon edges from the fresh boundary `start` to every
    /// original start state and from every original final state to the fresh boundary
    /// `final`, and one regex-labelled edge per original transition (spec.md §4.7).
    pub fn copy_of(automaton: &Automaton) -> Self {
        let alphabet = automaton.alphabet().clone();
        let mut result = GeneralizedAutomaton {
            alphabet: alphabet.clone(),
            states: Vec::new(),
            start: GStateId(0),
            final_state: GStateId(0),
            edges: BTreeMap::new(),
        };
        result.start = result.push_state("start");
        result.final_state = result.push_state("final");

        let mut map = std::collections::HashMap::new();
        for id in automaton.live_state_ids() {
            let s = automaton.state(id);
            map.insert(id, result.push_state(&s.name));
        }
        for id in automaton.live_state_ids() {
            let s = automaton.state(id);
            let gid = map[&id];
            if s.start {
                result.add_edge(result.start, gid, RegularExpression::epsilon(&alphabet));
            }
            if s.is_final {
                result.add_edge(gid, result.final_state, RegularExpression::epsilon(&alphabet));
            }
        }
        for eid in automaton.live_edge_ids() {
            let e = automaton.edge(eid);
            let label = RegularExpression::word(&alphabet, e.symbol.to_string());
            result.add_edge(map[&e.source], map[&e.sink], label);
        }
        result
    }

    fn push_state(&mut self, name: &str) -> GStateId {
        let id = GStateId(self.states.len());
        self.states.push(Some(GState { name: name.to_string() }));
        id
    }

    /// Adds a generalized edge, summing into an already-present label between the same
    /// endpoints (spec.md §4.7, "Parallel edges").
    fn add_edge(&mut self, from: GStateId, to: GStateId, re: RegularExpression) {
        self.edges
            .entry((from, to))
            .and_modify(|existing| *existing = existing.clone().sum(re.clone()))
            .or_insert(re);
    }

    fn live_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_some()).count()
    }

    fn internal_states(&self) -> Vec<GStateId> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| GStateId(i)))
            .filter(|&id| id != self.start && id != self.final_state)
            .collect()
    }

    fn remove_state(&mut self, id: GStateId) {
        self.states[id.0] = None;
        self.edges.retain(|&(u, v), _| u != id && v != id);
    }

    /// Reduces `self` to a single equivalent regex by eliminating internal states one at
    /// a time until only the two boundary states remain (spec.md §4.7). Always
    /// terminates: each iteration strictly decreases the live state count.
    pub fn equivalent_regex(mut self) -> RegularExpression {
        while self.live_count() > 2 {
            let q = self.internal_states()[0];
            let loop_re = self.edges.get(&(q, q)).cloned();

            let in_edges: Vec<(GStateId, RegularExpression)> = self
                .edges
                .iter()
                .filter(|&(&(u, v), _)| v == q && u != q)
                .map(|(&(u, _), re)| (u, re.clone()))
                .collect();
            let out_edges: Vec<(GStateId, RegularExpression)> = self
                .edges
                .iter()
                .filter(|&(&(u, v), _)| u == q && v != q)
                .map(|(&(_, v), re)| (v, re.clone()))
                .collect();

            for (u, r_in) in &in_edges {
                for (v, r_out) in &out_edges {
                    let combined = match &loop_re {
                        Some(lp) => r_in.clone().concat(lp.clone().star()).concat(r_out.clone()),
                        None => r_in.clone().concat(r_out.clone()),
                    };
                    self.add_edge(*u, *v, combined);
                }
            }

            self.remove_state(q);
        }

        match self.edges.get(&(self.start, self.final_state)) {
            Some(re) => re.clone(),
            None => RegularExpression::empty(&self.alphabet),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Automaton;

    fn ab() -> Alphabet {
        Alphabet::new(['a', 'b'])
    }

    #[test]
    fn single_word_round_trips_through_state_elimination() {
        let a = Automaton::single_word(&ab(), "ab");
        let re = GeneralizedAutomaton::copy_of(&a).equivalent_regex();
        assert!(re.equivalent_automaton().equivalent(&a));
    }

    #[test]
    fn star_round_trips_through_state_elimination() {
        let a = Automaton::single_word(&ab(), "a").star();
        let re = GeneralizedAutomaton::copy_of(&a).equivalent_regex();
        assert!(re.equivalent_automaton().equivalent(&a));
    }

    #[test]
    fn empty_language_yields_empty_regex() {
        let a = Automaton::empty_language(&ab());
        let re = GeneralizedAutomaton::copy_of(&a).equivalent_regex();
        assert!(!re.accepts(""));
        assert!(a.equivalent(re.equivalent_automaton()));
    }

    #[test]
    fn complement_round_trips_through_state_elimination() {
        let subword_ab = Automaton::single_word(&ab(), "a")
            .concat(&Automaton::all_words(&ab()))
            .concat(&Automaton::single_word(&ab(), "b"))
            .concat(&Automaton::all_words(&ab()));
        let complement = subword_ab.complement();
        let re = GeneralizedAutomaton::copy_of(&complement).equivalent_regex();
        assert!(re.equivalent_automaton().equivalent(&complement));
    }
}
