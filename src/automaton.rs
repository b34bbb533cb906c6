//! The automaton core: arena-owned states and edges, the regular operations, determinization,
//! minimization, DFS renaming, canonical signatures, equivalence and isomorphism.
//!
//! States and edges live in per-automaton arenas addressed by index, per the design note in
//! spec.md §9 ("A faithful re-implementation should own all states and edges through arena
//! storage... identified by index"), generalizing the teacher's `Node(pub usize)` handles in
//! `HeroicKatora-automata/src/dfa.rs` from a DFA-only sketch to the full NFA/DFA core.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::alphabet::Alphabet;
use crate::error::{ArgumentError, SignatureError, StateGraphError};
use crate::state_set::StateSet;

/// Handle to a state in its owning automaton's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

/// Handle to an edge in its owning automaton's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(usize);

/// Auxiliary per-construction payload attached to a state.
///
/// Modeled as a tagged variant rather than a dynamically-typed field, per spec.md §9's design
/// note on the source's "dynamic tag field on states".
#[derive(Clone, Debug, Default)]
pub enum Tag {
    #[default]
    None,
    /// The originating subset of NFA states, set during subset construction (spec.md §4.3).
    Subset(StateSet),
}

#[derive(Clone, Debug)]
pub struct State {
    pub name: String,
    pub start: bool,
    pub is_final: bool,
    pub tag: Tag,
    pub(crate) edges_out: BTreeSet<EdgeId>,
    pub(crate) edges_in: BTreeSet<EdgeId>,
}

#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub source: StateId,
    pub sink: StateId,
    pub symbol: char,
}

/// A non-deterministic (or deterministic) finite automaton over a fixed [`Alphabet`].
#[derive(Clone, Debug)]
pub struct Automaton {
    pub name: String,
    alphabet: Alphabet,
    states: Vec<Option<State>>,
    edges: Vec<Option<Edge>>,
    state_name_map: HashMap<String, StateId>,
    delta_map: HashMap<char, HashMap<StateId, BTreeSet<StateId>>>,
}

const BASE62_DIGITS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encodes `k` as a Base62 string using the digits `0-9A-Za-z` (spec.md §6).
pub fn to_base62(mut k: usize) -> String {
    if k == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while k > 0 {
        digits.push(BASE62_DIGITS[k % 62]);
        k /= 62;
    }
    digits.reverse();
    String::from_utf8(digits).expect("BASE62_DIGITS is ASCII")
}

/// Decodes a Base62 string produced by [`to_base62`] (possibly zero-padded).
pub fn from_base62(s: &str) -> Result<usize, SignatureError> {
    if s.is_empty() {
        return Err(SignatureError::MalformedDigit('\0'));
    }
    let mut v: usize = 0;
    for c in s.chars() {
        let d = BASE62_DIGITS
            .iter()
            .position(|&b| b as char == c)
            .ok_or(SignatureError::MalformedDigit(c))?;
        v = v * 62 + d;
    }
    Ok(v)
}

fn base62_width(state_count: usize) -> usize {
    // ceil(log62(n)) + 1, with base62_width(0) == base62_width(1) == 1.
    let n = state_count.max(1);
    let mut cap = 1usize;
    let mut digits = 0usize;
    while cap < n {
        cap *= 62;
        digits += 1;
    }
    digits + 1
}

fn to_base62_fixed(k: usize, width: usize) -> String {
    let raw = to_base62(k);
    if raw.len() >= width {
        raw
    } else {
        format!("{}{}", "0".repeat(width - raw.len()), raw)
    }
}

impl Automaton {
    pub fn new(name: impl Into<String>, alphabet: Alphabet) -> Self {
        Automaton {
            name: name.into(),
            alphabet,
            states: Vec::new(),
            edges: Vec::new(),
            state_name_map: HashMap::new(),
            delta_map: HashMap::new(),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    // -- Arena access -----------------------------------------------------------------

    pub fn state(&self, id: StateId) -> &State {
        self.states[id.0].as_ref().expect("StateId refers to a deleted state")
    }

    fn state_mut(&mut self, id: StateId) -> &mut State {
        self.states[id.0].as_mut().expect("StateId refers to a deleted state")
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges[id.0].as_ref().expect("EdgeId refers to a deleted edge")
    }

    pub fn live_state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| StateId(i)))
    }

    pub fn live_edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|_| EdgeId(i)))
    }

    pub fn state_count(&self) -> usize {
        self.live_state_ids().count()
    }

    pub fn find_state_by_name(&self, name: &str) -> Option<StateId> {
        self.state_name_map.get(name).copied()
    }

    // -- Mutation -----------------------------------------------------------------------

    /// Adds (or looks up) a state. Returns the existing state of that name unless
    /// `force_new` requests a uniquified name (spec.md §4.1).
    pub fn add_state(
        &mut self,
        name: &str,
        start: bool,
        is_final: bool,
        tag: Tag,
        force_new: bool,
    ) -> StateId {
        let name = if name.is_empty() { "empty".to_string() } else { name.to_string() };

        if !force_new {
            if let Some(&existing) = self.state_name_map.get(&name) {
                let s = self.state_mut(existing);
                s.start = s.start || start;
                s.is_final = s.is_final || is_final;
                return existing;
            }
        }

        let mut unique_name = name;
        while self.state_name_map.contains_key(&unique_name) {
            unique_name.push('x');
        }

        let id = StateId(self.states.len());
        self.states.push(Some(State {
            name: unique_name.clone(),
            start,
            is_final,
            tag,
            edges_out: BTreeSet::new(),
            edges_in: BTreeSet::new(),
        }));
        self.state_name_map.insert(unique_name, id);
        id
    }

    /// Deletes a state after deleting all of its incident edges.
    pub fn delete_state(&mut self, id: StateId) {
        let incident: Vec<EdgeId> = {
            let s = self.state(id);
            s.edges_out.iter().chain(s.edges_in.iter()).copied().collect()
        };
        for e in incident {
            self.delete_edge(e);
        }
        let name = self.state(id).name.clone();
        self.state_name_map.remove(&name);
        self.states[id.0] = None;
    }

    fn delete_edge(&mut self, id: EdgeId) {
        let Edge { source, sink, symbol } = *self.edge(id);
        self.state_mut(source).edges_out.remove(&id);
        self.state_mut(sink).edges_in.remove(&id);
        if let Some(per_source) = self.delta_map.get_mut(&symbol) {
            if let Some(sinks) = per_source.get_mut(&source) {
                sinks.remove(&sink);
            }
        }
        self.edges[id.0] = None;
    }

    /// Adds (or looks up) an edge; dedupes against an existing `(from, to, symbol)` triple.
    pub fn add_edge(&mut self, from: StateId, to: StateId, symbol: char) -> EdgeId {
        if let Some(existing) = self.get_edge(from, to, symbol) {
            return existing;
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge { source: from, sink: to, symbol }));
        self.state_mut(from).edges_out.insert(id);
        self.state_mut(to).edges_in.insert(id);
        self.delta_map
            .entry(symbol)
            .or_default()
            .entry(from)
            .or_default()
            .insert(to);
        id
    }

    pub fn get_edge(&self, from: StateId, to: StateId, symbol: char) -> Option<EdgeId> {
        self.state(from).edges_out.iter().copied().find(|&eid| {
            let e = self.edge(eid);
            e.sink == to && e.symbol == symbol
        })
    }

    pub fn out_edges(&self, id: StateId) -> impl Iterator<Item = EdgeId> + '_ {
        self.state(id).edges_out.iter().copied()
    }

    pub fn in_edges(&self, id: StateId) -> impl Iterator<Item = EdgeId> + '_ {
        self.state(id).edges_in.iter().copied()
    }

    // -- Queries ------------------------------------------------------------------------

    pub fn start_states(&self) -> StateSet {
        StateSet::from_iter(self.live_state_ids().filter(|&id| self.state(id).start))
    }

    pub fn final_states(&self) -> StateSet {
        StateSet::from_iter(self.live_state_ids().filter(|&id| self.state(id).is_final))
    }

    /// Image of a single state under the transition relation. With `symbol = None`, the
    /// union over every alphabet symbol (spec.md §4.1).
    pub fn delta(&self, state: StateId, symbol: Option<char>) -> StateSet {
        match symbol {
            Some(c) => self
                .delta_map
                .get(&c)
                .and_then(|m| m.get(&state))
                .map(|set| StateSet::from_iter(set.iter().copied()))
                .unwrap_or_default(),
            None => {
                let mut out = StateSet::new();
                for &c in self.alphabet.symbols() {
                    out = out.union(&self.delta(state, Some(c)));
                }
                out
            }
        }
    }

    /// Image of a set of states under the transition relation.
    pub fn delta_set(&self, states: &StateSet, symbol: Option<char>) -> StateSet {
        let mut out = StateSet::new();
        for s in states.iter() {
            out = out.union(&self.delta(s, symbol));
        }
        out
    }

    /// The unique successor of `state` on `symbol`, assuming the automaton is deterministic.
    pub fn delta_unique(&self, state: StateId, symbol: char) -> Option<StateId> {
        let set = self.delta(state, Some(symbol));
        debug_assert!(set.len() <= 1, "delta_unique called on a non-deterministic automaton");
        set.iter().next()
    }

    /// Iterates `delta` over a word; returns the empty set as soon as the frontier empties.
    pub fn delta_star(&self, states: &StateSet, word: &str) -> StateSet {
        let mut frontier = states.clone();
        for c in word.chars() {
            if frontier.is_empty() {
                return frontier;
            }
            frontier = self.delta_set(&frontier, Some(c));
        }
        frontier
    }

    /// `false` on an empty automaton; otherwise true iff some reached state is final.
    pub fn accepts(&self, word: &str) -> bool {
        if self.state_count() == 0 {
            return false;
        }
        let frontier = self.delta_star(&self.start_states(), word);
        frontier.iter().any(|id| self.state(id).is_final)
    }

    /// Restartable, length-lexicographic iterator over every word accepted by `self`, up
    /// to `max_length` (spec.md §9 "Generator functions", `acceptedWords`).
    pub fn accepted_words(&self, max_length: usize) -> impl Iterator<Item = String> + '_ {
        self.alphabet
            .words()
            .take_while(move |w| w.chars().count() <= max_length)
            .filter(move |w| self.accepts(w))
    }

    /// The first word (in length-lexicographic order) the automaton accepts, up to
    /// `max_length`, or `None`. Implements spec.md §9(d): returns the word itself, not an
    /// iterator result object.
    pub fn first_accepted_word(&self, max_length: usize) -> Option<String> {
        self.accepted_words(max_length).next()
    }

    /// Exactly one start state, and at most one successor per (state, symbol).
    pub fn is_deterministic(&self) -> bool {
        if self.start_states().len() != 1 {
            return false;
        }
        for id in self.live_state_ids() {
            for &c in self.alphabet.symbols() {
                if self.delta(id, Some(c)).len() > 1 {
                    return false;
                }
            }
        }
        true
    }

    // -- Structural operations (spec.md §4.2) --------------------------------------------

    /// Copies every live state and edge of `other` into `self`, prefixing state names with
    /// `prefix` + `:`, and applies `adjust` to each imported state's `start`/`is_final`
    /// flags. Returns the state-id mapping from `other` to `self`.
    fn import(
        &mut self,
        other: &Automaton,
        prefix: &str,
        adjust: impl Fn(bool, bool) -> (bool, bool),
    ) -> HashMap<StateId, StateId> {
        let mut map = HashMap::new();
        for id in other.live_state_ids() {
            let s = other.state(id);
            let (start, is_final) = adjust(s.start, s.is_final);
            let name = format!("{}:{}", prefix, s.name);
            let new_id = self.add_state(&name, start, is_final, Tag::None, true);
            map.insert(id, new_id);
        }
        for eid in other.live_edge_ids() {
            let e = other.edge(eid);
            self.add_edge(map[&e.source], map[&e.sink], e.symbol);
        }
        map
    }

    /// Disjoint union, preserving start/final flags on both halves.
    pub fn union(&self, other: &Automaton) -> Automaton {
        let mut result = Automaton::new(format!("{}+{}", self.name, other.name), self.alphabet.clone());
        result.import(self, &self.name, |start, is_final| (start, is_final));
        result.import(other, &other.name, |start, is_final| (start, is_final));
        result
    }

    /// Concatenation (spec.md §4.2). Handles nullable operands by unioning in extra copies
    /// instead of introducing epsilon edges.
    pub fn concat(&self, other: &Automaton) -> Automaton {
        let mut result = Automaton::new(format!("{}.{}", self.name, other.name), self.alphabet.clone());
        let map1 = result.import(self, &self.name, |start, _is_final| (start, false));
        let map2 = result.import(other, &other.name, |_start, is_final| (false, is_final));

        for f1 in self.final_states().iter() {
            for s2 in other.start_states().iter() {
                for eid in other.out_edges(s2) {
                    let e = other.edge(eid);
                    result.add_edge(map1[&f1], map2[&e.sink], e.symbol);
                }
            }
        }

        let self_nullable = self.accepts("");
        let other_nullable = other.accepts("");
        if self_nullable {
            result = result.union(other);
        }
        if other_nullable {
            result = result.union(self);
        }
        if self_nullable && other_nullable {
            result = result.union(&Automaton::only_empty_word(&self.alphabet));
        }
        result
    }

    /// Reverses every edge and swaps `start`/`is_final` on every state.
    pub fn reverse(&self) -> Automaton {
        let mut result = Automaton::new(format!("rev({})", self.name), self.alphabet.clone());
        let mut map = HashMap::new();
        for id in self.live_state_ids() {
            let s = self.state(id);
            let new_id = result.add_state(&s.name, s.is_final, s.start, Tag::None, false);
            map.insert(id, new_id);
        }
        for eid in self.live_edge_ids() {
            let e = self.edge(eid);
            result.add_edge(map[&e.sink], map[&e.source], e.symbol);
        }
        result
    }

    /// Keeps only states reachable from a start state AND co-reachable from a final state.
    pub fn reduce(&self) -> Automaton {
        let forward = self.reachable_from(&self.start_states(), true);
        let backward = self.reachable_from(&self.final_states(), false);
        let keep: BTreeSet<StateId> = forward.iter().filter(|id| backward.contains(*id)).collect();

        let mut result = Automaton::new(format!("reduce({})", self.name), self.alphabet.clone());
        let mut map = HashMap::new();
        for &id in &keep {
            let s = self.state(id);
            let new_id = result.add_state(&s.name, s.start, s.is_final, Tag::None, false);
            map.insert(id, new_id);
        }
        for eid in self.live_edge_ids() {
            let e = self.edge(eid);
            if keep.contains(&e.source) && keep.contains(&e.sink) {
                result.add_edge(map[&e.source], map[&e.sink], e.symbol);
            }
        }
        result
    }

    fn reachable_from(&self, seeds: &StateSet, forward: bool) -> BTreeSet<StateId> {
        let mut visited: BTreeSet<StateId> = BTreeSet::new();
        let mut queue: VecDeque<StateId> = VecDeque::new();
        for s in seeds.iter() {
            if visited.insert(s) {
                queue.push_back(s);
            }
        }
        while let Some(id) = queue.pop_front() {
            let edges: Vec<EdgeId> = if forward {
                self.out_edges(id).collect()
            } else {
                self.in_edges(id).collect()
            };
            for eid in edges {
                let e = self.edge(eid);
                let next = if forward { e.sink } else { e.source };
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited
    }

    /// Kleene star: a fresh `startfinal` state absorbs the old boundary, then the result is
    /// reduced (spec.md §4.2).
    ///
    /// Edges are relocated, not duplicated: an edge whose source is an old start state has
    /// its source moved to the hub; an edge whose sink is an old final state has its sink
    /// moved to the hub. An edge that is both (a direct start-to-final transition) collapses
    /// into a single `hub --c--> hub` loop, which is what lets the hub accept repetitions.
    pub fn star(&self) -> Automaton {
        let mut result = Automaton::new(format!("star({})", self.name), self.alphabet.clone());
        let starts = self.start_states();
        let finals = self.final_states();

        let mut map = HashMap::new();
        for id in self.live_state_ids() {
            let s = self.state(id);
            let name = format!("{}:{}", self.name, s.name);
            let new_id = result.add_state(&name, false, false, Tag::None, true);
            map.insert(id, new_id);
        }
        let hub = result.add_state("startfinal", true, true, Tag::None, true);

        for eid in self.live_edge_ids() {
            let e = self.edge(eid);
            let new_source = if starts.contains(e.source) { hub } else { map[&e.source] };
            let new_sink = if finals.contains(e.sink) { hub } else { map[&e.sink] };
            result.add_edge(new_source, new_sink, e.symbol);
        }

        result.reduce()
    }

    /// Ensures every `(state, symbol)` pair has at least one successor, after reducing.
    pub fn complete(&self) -> Automaton {
        let mut result = self.reduce();
        if result.state_count() == 0 {
            let sink = result.add_state("start", true, false, Tag::None, false);
            for &c in result.alphabet.symbols().to_vec().iter() {
                result.add_edge(sink, sink, c);
            }
            return result;
        }

        let ids: Vec<StateId> = result.live_state_ids().collect();
        let missing: Vec<(StateId, char)> = ids
            .iter()
            .flat_map(|&id| {
                result
                    .alphabet
                    .symbols()
                    .iter()
                    .filter(move |&&c| result.delta(id, Some(c)).is_empty())
                    .map(move |&c| (id, c))
            })
            .collect();

        if missing.is_empty() {
            return result;
        }

        let error_state = result.add_state("error", false, false, Tag::None, true);
        for &c in result.alphabet.symbols().to_vec().iter() {
            result.add_edge(error_state, error_state, c);
        }
        for (id, c) in missing {
            result.add_edge(id, error_state, c);
        }
        result
    }

    /// Minimize-then-flip: the complement of `self` over the same alphabet.
    pub fn complement(&self) -> Automaton {
        let mut dfa = self.minimize().complete();
        for id in dfa.live_state_ids().collect::<Vec<_>>() {
            let is_final = dfa.state(id).is_final;
            dfa.state_mut(id).is_final = !is_final;
        }
        dfa.name = format!("!{}", self.name);
        dfa
    }

    pub fn difference(&self, other: &Automaton) -> Automaton {
        self.intersect(&other.complement())
    }

    /// Product construction; no reduction is performed (spec.md §4.2).
    pub fn intersect(&self, other: &Automaton) -> Automaton {
        let mut result = Automaton::new(format!("{}&{}", self.name, other.name), self.alphabet.clone());
        let a_ids: Vec<StateId> = self.live_state_ids().collect();
        let b_ids: Vec<StateId> = other.live_state_ids().collect();

        let mut pair_id = HashMap::new();
        for &a in &a_ids {
            for &b in &b_ids {
                let sa = self.state(a);
                let sb = other.state(b);
                let name = format!("({},{})", sa.name, sb.name);
                let id = result.add_state(&name, sa.start && sb.start, sa.is_final && sb.is_final, Tag::None, true);
                pair_id.insert((a, b), id);
            }
        }

        for &a in &a_ids {
            for &b in &b_ids {
                for &c in self.alphabet.symbols() {
                    for ta in self.delta(a, Some(c)).iter() {
                        for tb in other.delta(b, Some(c)).iter() {
                            result.add_edge(pair_id[&(a, b)], pair_id[&(ta, tb)], c);
                        }
                    }
                }
            }
        }

        result
    }

    // -- Determinization (spec.md §4.3) --------------------------------------------------

    pub fn make_deterministic(&self) -> Automaton {
        if self.is_deterministic() {
            return self.clone();
        }

        let _span = tracing::debug_span!("make_deterministic", states = self.state_count()).entered();
        let reduced = self.reduce();
        let mut result = Automaton::new(format!("det({})", self.name), reduced.alphabet.clone());

        let start_set = reduced.start_states();
        let mut dfa_state_of: HashMap<StateSet, StateId> = HashMap::new();
        let mut frontier: VecDeque<StateSet> = VecDeque::new();

        let start_name = start_set.canonical_name(|id| reduced.state(id).name.clone());
        let start_final = start_set.iter().any(|id| reduced.state(id).is_final);
        let start_id = result.add_state(&start_name, true, start_final, Tag::Subset(start_set.clone()), false);
        dfa_state_of.insert(start_set.clone(), start_id);
        frontier.push_back(start_set);

        while let Some(current) = frontier.pop_front() {
            let current_id = dfa_state_of[&current];
            for &c in reduced.alphabet.symbols().to_vec().iter() {
                let target_set = reduced.delta_set(&current, Some(c));
                if target_set.is_empty() {
                    continue;
                }
                let target_id = match dfa_state_of.get(&target_set) {
                    Some(&id) => id,
                    None => {
                        let name = target_set.canonical_name(|id| reduced.state(id).name.clone());
                        let is_final = target_set.iter().any(|id| reduced.state(id).is_final);
                        let new_id =
                            result.add_state(&name, false, is_final, Tag::Subset(target_set.clone()), false);
                        dfa_state_of.insert(target_set.clone(), new_id);
                        frontier.push_back(target_set.clone());
                        new_id
                    }
                };
                result.add_edge(current_id, target_id, c);
            }
        }

        result
    }

    // -- Minimization (spec.md §4.4) ------------------------------------------------------

    /// Default minimization strategy (Hopcroft).
    pub fn minimize(&self) -> Automaton {
        self.minimize_hopcroft()
    }

    pub fn minimize_hopcroft(&self) -> Automaton {
        let _span = tracing::debug_span!("minimize_hopcroft").entered();
        let renamed = self
            .reduce()
            .make_deterministic()
            .rename_states_dfs()
            .unwrap_or_else(|_| self.reduce().make_deterministic());
        let dfa = renamed.complete();

        let state_ids: Vec<StateId> = dfa.live_state_ids().collect();
        if state_ids.len() < 2 {
            return dfa;
        }

        let mut preds: HashMap<char, HashMap<StateId, Vec<StateId>>> = HashMap::new();
        for &c in dfa.alphabet.symbols() {
            let mut m: HashMap<StateId, Vec<StateId>> = HashMap::new();
            for &s in &state_ids {
                if let Some(t) = dfa.delta_unique(s, c) {
                    m.entry(t).or_default().push(s);
                }
            }
            preds.insert(c, m);
        }

        let finals: BTreeSet<StateId> = state_ids.iter().copied().filter(|&s| dfa.state(s).is_final).collect();
        let non_finals: BTreeSet<StateId> =
            state_ids.iter().copied().filter(|&s| !dfa.state(s).is_final).collect();

        let mut partition: Vec<BTreeSet<StateId>> = Vec::new();
        if !finals.is_empty() {
            partition.push(finals.clone());
        }
        if !non_finals.is_empty() {
            partition.push(non_finals.clone());
        }

        let smaller = if finals.is_empty() {
            non_finals.clone()
        } else if non_finals.is_empty() {
            finals.clone()
        } else if finals.len() <= non_finals.len() {
            finals.clone()
        } else {
            non_finals.clone()
        };

        let mut waiting: Vec<(char, BTreeSet<StateId>)> = Vec::new();
        if !smaller.is_empty() {
            for &c in dfa.alphabet.symbols() {
                waiting.push((c, smaller.clone()));
            }
        }

        while let Some((c, splitter)) = waiting.pop() {
            let mut x: BTreeSet<StateId> = BTreeSet::new();
            if let Some(m) = preds.get(&c) {
                for s in &splitter {
                    if let Some(ps) = m.get(s) {
                        x.extend(ps.iter().copied());
                    }
                }
            }
            if x.is_empty() {
                continue;
            }

            let mut new_partition = Vec::with_capacity(partition.len());
            for b in partition.drain(..) {
                let b_prime: BTreeSet<StateId> = b.intersection(&x).copied().collect();
                let b_double_prime: BTreeSet<StateId> = b.difference(&x).copied().collect();

                if !b_prime.is_empty() && !b_double_prime.is_empty() {
                    for &c2 in dfa.alphabet.symbols() {
                        if let Some(pos) = waiting.iter().position(|(wc, wb)| *wc == c2 && *wb == b) {
                            waiting.remove(pos);
                            waiting.push((c2, b_prime.clone()));
                            waiting.push((c2, b_double_prime.clone()));
                        } else {
                            let smaller = if b_prime.len() <= b_double_prime.len() {
                                b_prime.clone()
                            } else {
                                b_double_prime.clone()
                            };
                            waiting.push((c2, smaller));
                        }
                    }
                    new_partition.push(b_prime);
                    new_partition.push(b_double_prime);
                } else {
                    new_partition.push(b);
                }
            }
            partition = new_partition;
        }

        let mut result = Automaton::new(format!("min({})", self.name), dfa.alphabet.clone());
        let mut class_of: HashMap<StateId, usize> = HashMap::new();
        let mut rep_of_class: Vec<StateId> = Vec::new();
        let mut class_state: Vec<StateId> = Vec::new();

        for (class_idx, block) in partition.iter().enumerate() {
            let rep = *block.iter().next().expect("partition blocks are never empty");
            rep_of_class.push(rep);
            let start = block.iter().any(|&s| dfa.state(s).start);
            let is_final = block.iter().any(|&s| dfa.state(s).is_final);
            let id = result.add_state(&dfa.state(rep).name, start, is_final, Tag::None, true);
            class_state.push(id);
            for &s in block {
                class_of.insert(s, class_idx);
            }
        }

        for (class_idx, &rep) in rep_of_class.iter().enumerate() {
            for &c in dfa.alphabet.symbols() {
                if let Some(target) = dfa.delta_unique(rep, c) {
                    let target_class = class_of[&target];
                    result.add_edge(class_state[class_idx], class_state[target_class], c);
                }
            }
        }

        result.complete()
    }

    /// `reverse -> determinize -> reverse -> determinize -> complete`. Slower but simpler;
    /// used as a cross-check against [`Automaton::minimize_hopcroft`] (spec.md §4.4).
    pub fn minimize_brzozowski(&self) -> Automaton {
        let _span = tracing::debug_span!("minimize_brzozowski").entered();
        self.reverse().make_deterministic().reverse().make_deterministic().complete()
    }

    // -- DFS renaming and signatures (spec.md §4.5) --------------------------------------

    /// DFS renaming from the start state(s), visiting out-edges in ascending symbol order.
    pub fn rename_states_dfs(&self) -> Result<Automaton, StateGraphError> {
        let mut roots: Vec<StateId> = self.live_state_ids().filter(|&id| self.state(id).start).collect();
        if roots.is_empty() {
            return Err(StateGraphError::NoStartState);
        }
        roots.sort();

        let mut visited: BTreeSet<StateId> = BTreeSet::new();
        let mut order: Vec<StateId> = Vec::new();
        for root in roots {
            self.dfs_visit(root, &mut visited, &mut order);
        }
        // Defensive: any state not reached from a start (should not occur on a reduced
        // automaton) is still renamed, appended after the DFS order, so renaming is total.
        for id in self.live_state_ids() {
            if !visited.contains(&id) {
                visited.insert(id);
                order.push(id);
            }
        }

        let width = base62_width(order.len());
        let mut result = Automaton::new(format!("renamed({})", self.name), self.alphabet.clone());
        let mut map = HashMap::new();
        for (i, &id) in order.iter().enumerate() {
            let name = to_base62_fixed(i, width);
            let s = self.state(id);
            let new_id = result.add_state(&name, s.start, s.is_final, Tag::None, true);
            map.insert(id, new_id);
        }
        for eid in self.live_edge_ids() {
            let e = self.edge(eid);
            result.add_edge(map[&e.source], map[&e.sink], e.symbol);
        }
        Ok(result)
    }

    /// Renames every live state according to an explicit `permutation`: the state at
    /// position `i` in [`Automaton::live_state_ids`] order is renamed to `permutation[i]`
    /// (stringified), with structure (edges, `start`/`is_final` flags) unchanged. Used by
    /// callers constructing an isomorphic copy under a known permutation (spec.md §8.9's
    /// `a.copy().renameStates(p)`), as opposed to [`Automaton::rename_states_dfs`]'s
    /// canonical DFS order.
    ///
    /// # Errors
    /// [`ArgumentError::PermutationLengthMismatch`] if `permutation.len() != state_count()`;
    /// [`ArgumentError::PermutationNotBijective`] if `permutation` does not visit every
    /// index in `0..state_count()` exactly once (spec.md §7's argument-invariant class).
    pub fn rename_states(&self, permutation: &[usize]) -> Result<Automaton, ArgumentError> {
        let n = self.state_count();
        if permutation.len() != n {
            return Err(ArgumentError::PermutationLengthMismatch { given: permutation.len(), expected: n });
        }
        let mut seen = vec![false; n];
        for &p in permutation {
            if p >= n || std::mem::replace(&mut seen[p], true) {
                return Err(ArgumentError::PermutationNotBijective(n));
            }
        }

        let order: Vec<StateId> = self.live_state_ids().collect();
        let width = base62_width(n);
        let mut result = Automaton::new(format!("renamed({})", self.name), self.alphabet.clone());
        let mut map = HashMap::new();
        for (i, &id) in order.iter().enumerate() {
            let name = to_base62_fixed(permutation[i], width);
            let s = self.state(id);
            let new_id = result.add_state(&name, s.start, s.is_final, Tag::None, true);
            map.insert(id, new_id);
        }
        for eid in self.live_edge_ids() {
            let e = self.edge(eid);
            result.add_edge(map[&e.source], map[&e.sink], e.symbol);
        }
        Ok(result)
    }

    fn dfs_visit(&self, id: StateId, visited: &mut BTreeSet<StateId>, order: &mut Vec<StateId>) {
        if !visited.insert(id) {
            return;
        }
        order.push(id);
        let mut outs: Vec<(char, StateId)> = self
            .out_edges(id)
            .map(|eid| {
                let e = self.edge(eid);
                (e.symbol, e.sink)
            })
            .collect();
        outs.sort_by_key(|&(c, _)| c);
        for (_, target) in outs {
            self.dfs_visit(target, visited, order);
        }
    }

    /// `T|F|Σ`, defined only for deterministic automata (spec.md §4.5/§6).
    pub fn signature_dfs(&self) -> Result<String, StateGraphError> {
        if !self.is_deterministic() {
            return Err(StateGraphError::NotDeterministic);
        }
        let renamed = self.rename_states_dfs()?;
        let width = base62_width(renamed.state_count());

        let mut ids: Vec<StateId> = renamed.live_state_ids().collect();
        ids.sort_by_key(|&id| from_base62(&renamed.state(id).name).unwrap_or(usize::MAX));

        let mut t = String::new();
        let mut f = String::new();
        for &id in &ids {
            for &c in renamed.alphabet.symbols() {
                match renamed.delta_unique(id, c) {
                    Some(target) => {
                        let name = &renamed.state(target).name;
                        debug_assert_eq!(name.len(), width);
                        t.push_str(name);
                    }
                    None => t.push('-'),
                }
            }
            f.push(if renamed.state(id).is_final { '1' } else { '0' });
        }

        Ok(format!("{}|{}|{}", t, f, renamed.alphabet.as_string()))
    }

    /// `signatureNumberedDFS` from spec.md §8.4: a second, independently derived encoding
    /// of the same deterministic automaton, used as a cross-check against
    /// [`Automaton::signature_dfs`] (property 4 requires the two to agree).
    ///
    /// Unlike `signature_dfs`, this never builds an intermediate renamed [`Automaton`] or
    /// round-trips state identity through Base62 names: it numbers states directly by DFS
    /// visit order in a plain index map and reads transitions off `self` through that map.
    pub fn signature_numbered_dfs(&self) -> Result<String, StateGraphError> {
        if !self.is_deterministic() {
            return Err(StateGraphError::NotDeterministic);
        }
        let mut roots: Vec<StateId> = self.live_state_ids().filter(|&id| self.state(id).start).collect();
        if roots.is_empty() {
            return Err(StateGraphError::NoStartState);
        }
        roots.sort();

        let mut visited: BTreeSet<StateId> = BTreeSet::new();
        let mut order: Vec<StateId> = Vec::new();
        for root in roots {
            self.dfs_visit(root, &mut visited, &mut order);
        }
        for id in self.live_state_ids() {
            if !visited.contains(&id) {
                visited.insert(id);
                order.push(id);
            }
        }

        let index_of: HashMap<StateId, usize> =
            order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let width = base62_width(order.len());

        let mut t = String::new();
        let mut f = String::new();
        for &id in &order {
            for &c in self.alphabet.symbols() {
                match self.delta_unique(id, c) {
                    Some(target) => t.push_str(&to_base62_fixed(index_of[&target], width)),
                    None => t.push('-'),
                }
            }
            f.push(if self.state(id).is_final { '1' } else { '0' });
        }

        Ok(format!("{}|{}|{}", t, f, self.alphabet.as_string()))
    }

    /// Parses `T|F|Σ` (spec.md §6). The alphabet is derived from the `Σ` component.
    pub fn from_signature(sig: &str) -> Result<Automaton, SignatureError> {
        let parts: Vec<&str> = sig.split('|').collect();
        if parts.len() != 3 {
            return Err(SignatureError::WrongPartCount(parts.len()));
        }
        let (t, f, sigma) = (parts[0], parts[1], parts[2]);
        if t.is_empty() {
            return Err(SignatureError::EmptyPart("T"));
        }
        if f.is_empty() {
            return Err(SignatureError::EmptyPart("F"));
        }
        if sigma.is_empty() {
            return Err(SignatureError::EmptyPart("Sigma"));
        }

        let alphabet = Alphabet::new(sigma.chars());
        let state_count = f.chars().count();
        let alphabet_len = alphabet.len();
        let width = base62_width(state_count);
        let expected_unit = state_count * alphabet_len;

        if !t.contains('-') && t.chars().count() != expected_unit * width {
            return Err(SignatureError::MalformedTransitions {
                actual: t.chars().count(),
                expected_unit,
            });
        }

        let chars: Vec<char> = t.chars().collect();
        let mut pos = 0;
        let mut rows: Vec<Vec<Option<usize>>> = Vec::with_capacity(state_count);
        for _ in 0..state_count {
            let mut row = Vec::with_capacity(alphabet_len);
            for _ in 0..alphabet_len {
                if pos >= chars.len() {
                    return Err(SignatureError::MalformedTransitions { actual: chars.len(), expected_unit });
                }
                if chars[pos] == '-' {
                    row.push(None);
                    pos += 1;
                } else {
                    if pos + width > chars.len() {
                        return Err(SignatureError::MalformedTransitions { actual: chars.len(), expected_unit });
                    }
                    let token: String = chars[pos..pos + width].iter().collect();
                    let value = from_base62(&token)?;
                    row.push(Some(value));
                    pos += width;
                }
            }
            rows.push(row);
        }
        if pos != chars.len() {
            return Err(SignatureError::MalformedTransitions { actual: chars.len(), expected_unit });
        }

        let finals: Vec<bool> = f.chars().map(|c| c == '1').collect();
        if finals.len() != state_count {
            return Err(SignatureError::StateCountMismatch { finals: finals.len(), states: state_count });
        }

        let mut result = Automaton::new("from_signature", alphabet.clone());
        let names: Vec<String> = (0..state_count).map(|i| to_base62_fixed(i, width)).collect();
        let mut ids = Vec::with_capacity(state_count);
        for (i, name) in names.iter().enumerate() {
            ids.push(result.add_state(name, i == 0, finals[i], Tag::None, true));
        }
        for (i, row) in rows.iter().enumerate() {
            for (j, target) in row.iter().enumerate() {
                if let Some(t) = target {
                    if *t >= state_count {
                        return Err(SignatureError::MalformedTransitions { actual: chars.len(), expected_unit });
                    }
                    let sym = alphabet.symbols()[j];
                    result.add_edge(ids[i], ids[*t], sym);
                }
            }
        }
        Ok(result)
    }

    /// `a.minimize().signatureDFS() == b.minimize().signatureDFS()` (spec.md §4.5).
    pub fn equivalent(&self, other: &Automaton) -> bool {
        let sig_a = self.minimize().signature_dfs().expect("minimized automaton is deterministic with a start state");
        let sig_b = other.minimize().signature_dfs().expect("minimized automaton is deterministic with a start state");
        sig_a == sig_b
    }

    // -- Isomorphism (spec.md §4.6) -------------------------------------------------------

    /// Exact, exponential-fallback isomorphism test intended for small graphs.
    pub fn isomorphic(&self, other: &Automaton) -> bool {
        let _span = tracing::debug_span!("isomorphic", a_states = self.state_count(), b_states = other.state_count())
            .entered();

        let a_states: Vec<StateId> = self.live_state_ids().collect();
        let b_states: Vec<StateId> = other.live_state_ids().collect();
        if a_states.len() != b_states.len() {
            return false;
        }
        let a_edge_count = self.live_edge_ids().count();
        let b_edge_count = other.live_edge_ids().count();
        if a_edge_count != b_edge_count {
            return false;
        }
        if self.start_states().len() != other.start_states().len() {
            return false;
        }
        if self.final_states().len() != other.final_states().len() {
            return false;
        }
        if self.alphabet != other.alphabet {
            return false;
        }

        let n = a_states.len();
        let index_of_a: HashMap<StateId, usize> = a_states.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        let index_of_b: HashMap<StateId, usize> = b_states.iter().enumerate().map(|(i, &s)| (s, i)).collect();

        let a_edges: BTreeSet<(usize, char, usize)> = self
            .live_edge_ids()
            .map(|eid| {
                let e = self.edge(eid);
                (index_of_a[&e.source], e.symbol, index_of_a[&e.sink])
            })
            .collect();
        let b_edges: BTreeSet<(usize, char, usize)> = other
            .live_edge_ids()
            .map(|eid| {
                let e = other.edge(eid);
                (index_of_b[&e.source], e.symbol, index_of_b[&e.sink])
            })
            .collect();

        for perm in Permutations::new(n) {
            let flags_match = (0..n).all(|i| {
                let a = self.state(a_states[i]);
                let b = other.state(b_states[perm[i]]);
                a.start == b.start && a.is_final == b.is_final
            });
            if !flags_match {
                continue;
            }
            let edges_match = a_edges.iter().all(|&(u, c, v)| b_edges.contains(&(perm[u], c, perm[v])));
            if edges_match {
                return true;
            }
        }
        false
    }

    // -- Construction helpers shared with regex.rs and sample.rs -------------------------

    /// The one-state automaton accepting only the empty word.
    pub fn only_empty_word(alphabet: &Alphabet) -> Automaton {
        let mut a = Automaton::new("epsilon", alphabet.clone());
        a.add_state("q0", true, true, Tag::None, false);
        a
    }

    /// The empty-language automaton with no states.
    pub fn empty_language(alphabet: &Alphabet) -> Automaton {
        Automaton::new("empty", alphabet.clone())
    }

    /// The straight-line automaton accepting exactly `word` (empty or not).
    pub fn single_word(alphabet: &Alphabet, word: &str) -> Automaton {
        if word.is_empty() {
            return Automaton::only_empty_word(alphabet);
        }
        let mut a = Automaton::new(format!("word({})", word), alphabet.clone());
        let mut prev = a.add_state("q0", true, false, Tag::None, false);
        for (i, c) in word.chars().enumerate() {
            let is_final = i + 1 == word.chars().count();
            let next = a.add_state(&format!("q{}", i + 1), false, is_final, Tag::None, false);
            a.add_edge(prev, next, c);
            prev = next;
        }
        a
    }

    /// The single-state automaton accepting every word over the alphabet.
    pub fn all_words(alphabet: &Alphabet) -> Automaton {
        let mut a = Automaton::new("all", alphabet.clone());
        let q = a.add_state("q0", true, true, Tag::None, false);
        for &c in alphabet.symbols() {
            a.add_edge(q, q, c);
        }
        a
    }

    /// The single-state, non-final automaton accepting nothing.
    pub fn no_words(alphabet: &Alphabet) -> Automaton {
        let mut a = Automaton::new("none", alphabet.clone());
        let q = a.add_state("q0", true, false, Tag::None, false);
        for &c in alphabet.symbols() {
            a.add_edge(q, q, c);
        }
        a
    }
}

/// Lazy, iterative permutation generator (Heap's algorithm) so isomorphism search can
/// short-circuit on the first match (spec.md §5, §9).
struct Permutations {
    n: usize,
    a: Vec<usize>,
    c: Vec<usize>,
    i: usize,
    started: bool,
}

impl Permutations {
    fn new(n: usize) -> Self {
        Permutations { n, a: (0..n).collect(), c: vec![0; n], i: 0, started: false }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.n == 0 {
            if self.started {
                return None;
            }
            self.started = true;
            return Some(Vec::new());
        }
        if !self.started {
            self.started = true;
            return Some(self.a.clone());
        }
        while self.i < self.n {
            if self.c[self.i] < self.i {
                if self.i % 2 == 0 {
                    self.a.swap(0, self.i);
                } else {
                    self.a.swap(self.c[self.i], self.i);
                }
                self.c[self.i] += 1;
                self.i = 0;
                return Some(self.a.clone());
            } else {
                self.c[self.i] = 0;
                self.i += 1;
            }
        }
        None
    }
}

pub fn length_argument_check(len: i64) -> Result<usize, ArgumentError> {
    if len < 0 {
        Err(ArgumentError::NegativeLength(len))
    } else {
        Ok(len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Alphabet {
        Alphabet::new(['a', 'b'])
    }

    #[test]
    fn base62_roundtrip() {
        let mut k = 70usize;
        while k < 10000 {
            assert_eq!(from_base62(&to_base62(k)).unwrap(), k);
            k += 109;
        }
    }

    #[test]
    fn accepts_straight_line_word() {
        let a = Automaton::single_word(&ab(), "ab");
        assert!(a.accepts("ab"));
        assert!(!a.accepts("a"));
        assert!(!a.accepts(""));
    }

    #[test]
    fn union_accepts_either_language() {
        let a = Automaton::single_word(&ab(), "a");
        let b = Automaton::single_word(&ab(), "b");
        let u = a.union(&b);
        assert!(u.accepts("a"));
        assert!(u.accepts("b"));
        assert!(!u.accepts("ab"));
    }

    #[test]
    fn concat_accepts_split_words() {
        let a = Automaton::single_word(&ab(), "a");
        let b = Automaton::single_word(&ab(), "b");
        let c = a.concat(&b);
        assert!(c.accepts("ab"));
        assert!(!c.accepts("a"));
        assert!(!c.accepts("ba"));
    }

    #[test]
    fn star_accepts_empty_and_repeats() {
        let a = Automaton::single_word(&ab(), "a");
        let s = a.star();
        assert!(s.accepts(""));
        assert!(s.accepts("a"));
        assert!(s.accepts("aaaa"));
        assert!(!s.accepts("ab"));
    }

    #[test]
    fn complement_flips_language_over_all_words() {
        let a = Automaton::single_word(&ab(), "a");
        let not_a = a.complement();
        assert!(!not_a.accepts("a"));
        assert!(not_a.accepts("b"));
        assert!(not_a.accepts(""));
    }

    #[test]
    fn determinization_preserves_language() {
        let a = Automaton::single_word(&ab(), "a").union(&Automaton::single_word(&ab(), "a"));
        let det = a.make_deterministic();
        assert!(det.is_deterministic());
        for w in ab().words().take(20) {
            assert_eq!(det.accepts(&w), a.accepts(&w));
        }
    }

    #[test]
    fn minimization_preserves_language() {
        let a = Automaton::all_words(&ab()).concat(&Automaton::single_word(&ab(), "ab"));
        let min_h = a.minimize_hopcroft();
        let min_b = a.minimize_brzozowski();
        for w in ab().words().take(50) {
            assert_eq!(min_h.accepts(&w), a.accepts(&w));
            assert_eq!(min_b.accepts(&w), a.accepts(&w));
        }
        assert!(min_h.equivalent(&min_b));
    }

    #[test]
    fn reduce_preserves_language() {
        let mut a = Automaton::single_word(&ab(), "a");
        // Add an unreachable, non-coreachable state to make reduction non-trivial.
        a.add_state("dead", false, false, Tag::None, false);
        let reduced = a.reduce();
        assert!(reduced.equivalent(&a));
        assert_eq!(reduced.state_count(), 2);
    }

    #[test]
    fn signature_roundtrip() {
        let a = Automaton::all_words(&ab()).concat(&Automaton::single_word(&ab(), "ab")).minimize();
        let sig = a.signature_dfs().unwrap();
        let rebuilt = Automaton::from_signature(&sig).unwrap();
        assert_eq!(rebuilt.signature_dfs().unwrap(), sig);
        assert_eq!(a.signature_dfs().unwrap(), a.signature_numbered_dfs().unwrap());
    }

    #[test]
    fn isomorphic_under_renaming() {
        let a = Automaton::all_words(&ab()).concat(&Automaton::single_word(&ab(), "ab")).minimize();
        let renamed = a.rename_states_dfs().unwrap();
        assert!(a.isomorphic(&renamed));
    }

    #[test]
    fn rename_states_accepts_a_valid_permutation() {
        let a = Automaton::single_word(&ab(), "ab").minimize();
        let n = a.state_count();
        let reversed: Vec<usize> = (0..n).rev().collect();
        let renamed = a.rename_states(&reversed).unwrap();
        assert!(a.isomorphic(&renamed));
        for w in ab().words().take(30) {
            assert_eq!(a.accepts(&w), renamed.accepts(&w));
        }
    }

    #[test]
    fn rename_states_rejects_wrong_length() {
        let a = Automaton::single_word(&ab(), "ab");
        let err = a.rename_states(&[0]).unwrap_err();
        assert_eq!(err, ArgumentError::PermutationLengthMismatch { given: 1, expected: a.state_count() });
    }

    #[test]
    fn rename_states_rejects_non_bijective_permutation() {
        let a = Automaton::single_word(&ab(), "ab");
        let n = a.state_count();
        let mut bad = vec![0usize; n];
        bad[n - 1] = 0; // duplicate index 0, never visits n - 1
        let err = a.rename_states(&bad).unwrap_err();
        assert_eq!(err, ArgumentError::PermutationNotBijective(n));
    }

    #[test]
    fn accepted_words_matches_first_accepted_word() {
        let a = Automaton::single_word(&ab(), "a").union(&Automaton::single_word(&ab(), "b"));
        let all: Vec<String> = a.accepted_words(3).collect();
        assert_eq!(all, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(a.first_accepted_word(3), Some("a".to_string()));
    }
}
