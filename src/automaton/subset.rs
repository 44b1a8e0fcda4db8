/*
    Subset construction: every DFA state stands for the epsilon closure of a
    set of NFA states
*/

use std::collections::VecDeque;

use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;

use super::{Automaton, State, StateSet};
use crate::grammar::names::NameAllocator;

/// Names a DFA state after the NFA states it stands for, e.g. `{q0,q1}`.
/// State names may contain commas, so two sets can render the same way;
/// `to_dfa` suffixes the later one.
pub(crate) fn subset_name(states: &StateSet) -> State {
    format!("{{{}}}", states.iter().join(","))
}

impl Automaton {
    /// Builds an equivalent deterministic automaton. Only subsets reachable
    /// from the start are created, and a symbol that leads nowhere gets no
    /// transition instead of a sink state.
    pub fn to_dfa(&self) -> Automaton {
        let initial = self.epsilon_closure([&self.start_state]);

        let mut allocator = NameAllocator::default();
        let mut dfa = Automaton::new(allocator.suffixed(&subset_name(&initial)));
        dfa.alphabet = self.alphabet.clone();

        let mut names: IndexMap<StateSet, State> = IndexMap::new();
        let mut worklist = VecDeque::new();

        names.insert(initial.clone(), dfa.start_state.clone());
        worklist.push_back(initial);

        while let Some(current) = worklist.pop_front() {
            let from = names[&current].clone();
            if current.iter().any(|state| self.is_final(state)) {
                dfa.add_final_state(from.clone());
            }

            for symbol in &self.alphabet {
                let next = self.epsilon_closure(&self.move_on(&current, symbol));
                if next.is_empty() {
                    continue;
                }

                let to = match names.get(&next) {
                    Some(name) => name.clone(),
                    None => {
                        let name = allocator.suffixed(&subset_name(&next));
                        names.insert(next.clone(), name.clone());
                        worklist.push_back(next);
                        name
                    }
                };

                dfa.add_transition(from.clone(), symbol, to);
            }
        }

        debug!("Subset construction built {} states from {}", dfa.states.len(), self.states.len());
        dfa
    }
}
