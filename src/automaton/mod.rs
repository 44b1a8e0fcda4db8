/*
    This module is for storing and running finite automata
*/

mod minimize;
mod subset;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use indexmap::IndexSet;
use itertools::Itertools;
use thiserror::Error;

use crate::symbol::{decompose_terminals, Symbol, EPSILON};

pub type State = String;
pub type StateSet = BTreeSet<State>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("State `{0}` is not declared")]
    UnknownState(String),

    #[error("Symbol `{0}` is not in the alphabet")]
    UnknownSymbol(String),

    #[error("`{}` is reserved for epsilon transitions", EPSILON)]
    ReservedEpsilon,
}

/// A finite automaton, deterministic or not. Transitions map a state and a
/// symbol, possibly [`Symbol::Epsilon`], to a set of target states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    states: IndexSet<State>,
    alphabet: IndexSet<String>,
    transitions: BTreeMap<(State, Symbol), StateSet>,
    start_state: State,
    final_states: IndexSet<State>,
}

impl Automaton {
    /// Creates an automaton with a single, non-accepting start state.
    pub fn new<S: Into<State>>(start_state: S) -> Self {
        let start_state = start_state.into();
        Automaton {
            states: IndexSet::from([start_state.clone()]),
            alphabet: IndexSet::new(),
            transitions: BTreeMap::new(),
            start_state,
            final_states: IndexSet::new(),
        }
    }

    /// Builds an automaton from declared parts, checking that every
    /// transition stays inside the declared states and alphabet. The label
    /// `ε` marks an epsilon transition.
    pub fn from_table(
        states: &[&str],
        alphabet: &[&str],
        transitions: &[(&str, &str, &str)],
        start_state: &str,
        final_states: &[&str],
    ) -> Result<Self, AutomatonError> {
        if alphabet.contains(&EPSILON) || alphabet.contains(&"") {
            return Err(AutomatonError::ReservedEpsilon);
        }

        let known = |state: &str| {
            if states.contains(&state) {
                Ok(())
            } else {
                Err(AutomatonError::UnknownState(state.to_string()))
            }
        };

        known(start_state)?;
        let mut automaton = Automaton::new(start_state);
        automaton.states.extend(states.iter().map(|s| s.to_string()));
        automaton.alphabet.extend(alphabet.iter().map(|s| s.to_string()));

        for &(from, label, to) in transitions {
            known(from)?;
            known(to)?;
            let symbol = Symbol::label(label);
            if let Symbol::Terminal(name) = &symbol {
                if !automaton.alphabet.contains(name) {
                    return Err(AutomatonError::UnknownSymbol(name.clone()));
                }
            }
            automaton.insert_transition(from.to_string(), symbol, to.to_string());
        }

        for &state in final_states {
            known(state)?;
            automaton.add_final_state(state);
        }

        Ok(automaton)
    }

    pub fn add_state<S: Into<State>>(&mut self, state: S) {
        self.states.insert(state.into());
    }

    /// Declares an input symbol that no transition needs to use yet.
    pub fn add_symbol(&mut self, symbol: &str) {
        if let Symbol::Terminal(name) = Symbol::label(symbol) {
            self.alphabet.insert(name);
        }
    }

    pub fn add_final_state<S: Into<State>>(&mut self, state: S) {
        let state = state.into();
        self.states.insert(state.clone());
        self.final_states.insert(state);
    }

    /// Adds `from --label--> to`, declaring the states and the symbol as
    /// needed. An empty label or `ε` adds an epsilon transition.
    pub fn add_transition(&mut self, from: impl Into<State>, label: &str, to: impl Into<State>) {
        self.insert_transition(from.into(), Symbol::label(label), to.into());
    }

    pub fn add_epsilon_transition(&mut self, from: impl Into<State>, to: impl Into<State>) {
        self.insert_transition(from.into(), Symbol::Epsilon, to.into());
    }

    fn insert_transition(&mut self, from: State, symbol: Symbol, to: State) {
        if let Symbol::Terminal(name) = &symbol {
            self.alphabet.insert(name.clone());
        }
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.transitions.entry((from, symbol)).or_default().insert(to);
    }

    pub fn states(&self) -> &IndexSet<State> {
        &self.states
    }

    /// The input symbols, epsilon excluded.
    pub fn alphabet(&self) -> &IndexSet<String> {
        &self.alphabet
    }

    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    pub fn final_states(&self) -> &IndexSet<State> {
        &self.final_states
    }

    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.contains(state)
    }

    /// Every transition as `(from, symbol, to)`, ordered by source state,
    /// then symbol, then target.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &Symbol, &str)> + '_ {
        self.transitions
            .iter()
            .flat_map(|((from, symbol), targets)| targets.iter().map(move |to| (from.as_str(), symbol, to.as_str())))
    }

    /// The targets of `state` on `symbol`, without any epsilon closure.
    pub fn targets(&self, state: &str, symbol: &Symbol) -> Option<&StateSet> {
        self.transitions.get(&(state.to_string(), symbol.clone()))
    }

    /// False on any epsilon transition or on any state and symbol with more
    /// than one target.
    pub fn is_deterministic(&self) -> bool {
        self.transitions
            .iter()
            .all(|((_, symbol), targets)| !symbol.is_epsilon() && targets.len() <= 1)
    }

    /// States reachable from `seed` using only epsilon transitions, the seed
    /// included.
    pub fn epsilon_closure<'a>(&self, seed: impl IntoIterator<Item = &'a State>) -> StateSet {
        let mut closure = StateSet::new();
        let mut stack: Vec<&State> = seed.into_iter().collect();

        while let Some(state) = stack.pop() {
            if !closure.insert(state.clone()) {
                continue;
            }

            if let Some(targets) = self.targets(state, &Symbol::Epsilon) {
                stack.extend(targets.iter().filter(|target| !closure.contains(*target)));
            }
        }

        closure
    }

    /// Union of the `symbol` targets of every state in `states`.
    pub fn move_on(&self, states: &StateSet, symbol: &str) -> StateSet {
        let symbol = Symbol::terminal(symbol);
        states
            .iter()
            .filter_map(|state| self.targets(state, &symbol))
            .flatten()
            .cloned()
            .collect()
    }

    /// Runs the automaton on a sequence of alphabet symbols. Epsilon
    /// transitions are followed before the first symbol and after each one.
    pub fn accepts<S: AsRef<str>>(&self, input: &[S]) -> bool {
        let mut current = self.epsilon_closure([&self.start_state]);

        for symbol in input {
            current = self.epsilon_closure(&self.move_on(&current, symbol.as_ref()));
            if current.is_empty() {
                return false;
            }
        }

        current.iter().any(|state| self.is_final(state))
    }

    /// Like [`Automaton::accepts`], splitting `text` into alphabet symbols
    /// first. Text that does not split is rejected.
    pub fn accepts_str(&self, text: &str) -> bool {
        match decompose_terminals(text, &self.alphabet) {
            Ok(input) => self.accepts(&input),
            Err(_) => false,
        }
    }
}

// Writes the automaton in the same format the automaton files use
impl Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "start = {}", self.start_state)?;
        if !self.final_states.is_empty() {
            writeln!(f, "final = {}", self.final_states.iter().join(" "))?;
        }

        for ((from, symbol), targets) in &self.transitions {
            let label = match symbol {
                Symbol::Epsilon => "",
                other => other.name(),
            };
            writeln!(f, "{} \"{}\" = {}", from, label, targets.iter().join(" "))?;
        }

        Ok(())
    }
}
