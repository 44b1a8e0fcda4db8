/*
    DFA minimization by partition refinement
*/

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use super::{Automaton, State};
use crate::symbol::Symbol;

impl Automaton {
    /// Builds the smallest deterministic automaton for the same language.
    /// Nondeterministic input goes through [`Automaton::to_dfa`] first.
    /// Unreachable and dead states are dropped, then states that no input
    /// can tell apart are merged; each merged state keeps the name of its
    /// smallest member.
    pub fn minimize(&self) -> Automaton {
        if !self.is_deterministic() {
            return self.to_dfa().minimize();
        }

        let useful: HashSet<&State> = self
            .reachable_states()
            .intersection(&self.live_states())
            .copied()
            .collect();

        if !useful.contains(&self.start_state) {
            debug!("Start state `{}` accepts nothing", self.start_state);
            let mut empty = Automaton::new(self.start_state.clone());
            empty.alphabet = self.alphabet.clone();
            return empty;
        }

        let states: Vec<&State> = self.states.iter().filter(|state| useful.contains(state)).collect();

        // Blocks start as accepting versus rejecting, then split on where
        // each symbol leads until a round splits nothing
        let mut block: HashMap<&State, usize> = states
            .iter()
            .map(|&state| (state, usize::from(self.is_final(state))))
            .collect();
        let mut count = block.values().collect::<HashSet<_>>().len();

        loop {
            let mut signatures: HashMap<(usize, Vec<Option<usize>>), usize> = HashMap::new();
            let mut refined = HashMap::with_capacity(states.len());

            for &state in &states {
                let moves = self
                    .alphabet
                    .iter()
                    .map(|symbol| {
                        self.successor(state, symbol)
                            .filter(|target| useful.contains(target))
                            .map(|target| block[target])
                    })
                    .collect();
                let next = signatures.len();
                let id = *signatures.entry((block[state], moves)).or_insert(next);
                refined.insert(state, id);
            }

            block = refined;
            if signatures.len() == count {
                break;
            }
            count = signatures.len();
        }

        let mut names: HashMap<usize, &State> = HashMap::new();
        for &state in &states {
            let name = names.entry(block[state]).or_insert(state);
            if state < *name {
                *name = state;
            }
        }
        let rename = |state: &State| names[&block[state]].clone();

        let mut minimal = Automaton::new(rename(&self.start_state));
        minimal.alphabet = self.alphabet.clone();
        for &state in &states {
            let from = rename(state);
            minimal.add_state(from.clone());
            if self.is_final(state) {
                minimal.add_final_state(from.clone());
            }
            for symbol in &self.alphabet {
                if let Some(target) = self.successor(state, symbol).filter(|target| useful.contains(target)) {
                    minimal.add_transition(from.clone(), symbol, rename(target));
                }
            }
        }

        debug!("Minimized {} states to {}", self.states.len(), minimal.states.len());
        minimal
    }

    fn successor(&self, state: &str, symbol: &str) -> Option<&State> {
        self.targets(state, &Symbol::terminal(symbol))
            .and_then(|targets| targets.iter().next())
    }

    fn reachable_states(&self) -> HashSet<&State> {
        let mut reached = HashSet::from([&self.start_state]);
        let mut queue = VecDeque::from([&self.start_state]);

        while let Some(state) = queue.pop_front() {
            let successors = self
                .transitions
                .iter()
                .filter(|((from, _), _)| from == state)
                .flat_map(|(_, targets)| targets);
            for target in successors {
                if reached.insert(target) {
                    queue.push_back(target);
                }
            }
        }

        reached
    }

    // States from which some accepting state can be reached
    fn live_states(&self) -> HashSet<&State> {
        let mut live: HashSet<&State> = self.final_states.iter().collect();

        loop {
            let before = live.len();
            for ((from, _), targets) in &self.transitions {
                if targets.iter().any(|target| live.contains(target)) {
                    live.insert(from);
                }
            }
            if live.len() == before {
                return live;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn words(max_len: usize) -> Vec<Vec<&'static str>> {
        let mut words = vec![vec![]];
        for length in 1..=max_len {
            words.extend((0..length).map(|_| ["a", "b"]).multi_cartesian_product());
        }
        words
    }

    // Strings over {a, b} ending in b, with redundant states
    fn redundant() -> Automaton {
        Automaton::from_table(
            &["p", "q", "r", "s", "u"],
            &["a", "b"],
            &[
                ("p", "a", "q"),
                ("p", "b", "r"),
                ("q", "a", "q"),
                ("q", "b", "s"),
                ("r", "a", "q"),
                ("r", "b", "s"),
                ("s", "a", "p"),
                ("s", "b", "r"),
                ("u", "a", "p"),
            ],
            "p",
            &["r", "s"],
        )
        .unwrap()
    }

    #[test]
    fn merge_equivalent_states() {
        let automaton = redundant();
        let minimal = automaton.minimize();

        assert!(minimal.is_deterministic());
        assert_eq!(minimal.states().len(), 2);
        assert_eq!(minimal.start_state(), "p");
        assert_eq!(minimal.final_states().iter().collect::<Vec<_>>(), vec!["r"]);
        assert!(!minimal.states().contains("u"));

        for word in words(6) {
            assert_eq!(automaton.accepts(&word), minimal.accepts(&word), "disagree on {:?}", word);
        }
    }

    #[test]
    fn dead_states_are_dropped() {
        let mut automaton = Automaton::new("s");
        automaton.add_transition("s", "a", "t");
        automaton.add_transition("s", "b", "trap");
        automaton.add_transition("trap", "a", "trap");
        automaton.add_final_state("t");

        let minimal = automaton.minimize();
        assert_eq!(minimal.states().len(), 2);
        assert!(!minimal.states().contains("trap"));
        assert!(minimal.accepts_str("a"));
        assert!(!minimal.accepts_str("b"));
    }

    #[test]
    fn empty_language() {
        let mut automaton = Automaton::new("s");
        automaton.add_transition("s", "a", "t");

        let minimal = automaton.minimize();
        assert_eq!(minimal.states().len(), 1);
        assert!(minimal.final_states().is_empty());
        assert_eq!(minimal.transitions().count(), 0);
        assert!(minimal.alphabet().contains("a"));
    }

    #[test]
    fn nondeterministic_input_is_determinized() {
        let mut automaton = Automaton::new("q0");
        automaton.add_transition("q0", "a", "q0");
        automaton.add_transition("q0", "a", "q1");
        automaton.add_transition("q0", "b", "q0");
        automaton.add_epsilon_transition("q1", "q2");
        automaton.add_final_state("q2");

        let minimal = automaton.minimize();
        assert!(minimal.is_deterministic());
        assert_eq!(minimal.states().len(), 2);
        for word in words(5) {
            assert_eq!(automaton.accepts(&word), minimal.accepts(&word), "disagree on {:?}", word);
        }
    }

    #[test]
    fn minimal_stays_minimal() {
        let once = redundant().minimize();
        assert_eq!(once.minimize(), once);
    }
}
