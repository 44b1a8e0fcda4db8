/*
    Conversions between regular grammars and finite automata
*/

use indexmap::IndexMap;
use log::warn;
use thiserror::Error;

use crate::automaton::Automaton;
use crate::grammar::names::NameAllocator;
use crate::grammar::{format_alternative, Alternative, Grammar, GrammarError, Rewrite, Symbol};

/// The accepting state added when a grammar becomes an automaton, renamed
/// with trailing zeroes if a nonterminal already uses it.
pub const ACCEPTING_STATE: &str = "X";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Production `{lhs} = {production}` is not right-linear")]
    NonRegularProduction { lhs: String, production: String },

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

impl Grammar {
    /// Builds an automaton with a state per nonterminal plus one accepting
    /// state. Alternatives other than `ε`, `a` and `a B` are logged and
    /// skipped, so the automaton may accept less than the grammar does.
    pub fn to_automaton(&self) -> Automaton {
        let mut skipped = Vec::new();
        let automaton = self.build_automaton(|lhs, alternative| {
            skipped.push((lhs.to_string(), format_alternative(alternative)));
        });

        for (lhs, production) in skipped {
            warn!("Skipping production `{} = {}`, it is not right-linear", lhs, production);
        }
        automaton
    }

    /// Like [`Grammar::to_automaton`], but refuses grammars that are not
    /// right-linear.
    pub fn to_automaton_strict(&self) -> Result<Automaton, BridgeError> {
        if let Some((lhs, alternative)) = self.productions().find(|(_, alternative)| !is_transition(alternative)) {
            return Err(BridgeError::NonRegularProduction {
                lhs: lhs.to_string(),
                production: format_alternative(alternative),
            });
        }

        Ok(self.build_automaton(|_, _| {}))
    }

    fn build_automaton(&self, mut reject: impl FnMut(&str, &Alternative)) -> Automaton {
        let mut names = NameAllocator::new(self.nonterminals());
        let accepting = names.suffixed(ACCEPTING_STATE);

        let mut automaton = Automaton::new(self.start_symbol());
        for nonterminal in self.nonterminals() {
            automaton.add_state(nonterminal.as_str());
        }
        for terminal in self.terminals() {
            automaton.add_symbol(terminal);
        }
        automaton.add_final_state(accepting.as_str());

        for (lhs, alternative) in self.productions() {
            match alternative.as_slice() {
                [] => automaton.add_epsilon_transition(lhs, &accepting),
                [Symbol::Terminal(a)] => automaton.add_transition(lhs, a, &accepting),
                [Symbol::Terminal(a), Symbol::Nonterminal(b)] => automaton.add_transition(lhs, a, b),
                _ => reject(lhs, alternative),
            }
        }

        automaton
    }
}

fn is_transition(alternative: &Alternative) -> bool {
    matches!(
        alternative.as_slice(),
        [] | [Symbol::Terminal(_)] | [Symbol::Terminal(_), Symbol::Nonterminal(_)]
    )
}

impl Automaton {
    /// Builds a right-linear grammar with a nonterminal per state. Fails when
    /// a state shares its name with an input symbol.
    pub fn to_grammar(&self) -> Result<Grammar, BridgeError> {
        let mut rules: IndexMap<String, Rewrite> = self
            .states()
            .iter()
            .map(|state| (state.clone(), Rewrite::new()))
            .collect();

        let mut add = |lhs: &str, alternative: Alternative| {
            let rewrite = rules.entry(lhs.to_string()).or_default();
            if !rewrite.contains(&alternative) {
                rewrite.push(alternative);
            }
        };

        for (from, symbol, to) in self.transitions() {
            match symbol {
                Symbol::Epsilon => add(from, vec![Symbol::nonterminal(to)]),
                _ => {
                    add(from, vec![symbol.clone(), Symbol::nonterminal(to)]);
                    if self.is_final(to) {
                        add(from, vec![symbol.clone()]);
                    }
                }
            }
        }

        for state in self.final_states() {
            add(state.as_str(), Alternative::new());
        }

        let grammar = Grammar::new(self.states(), self.alphabet(), self.start_state(), rules)?;
        Ok(grammar)
    }
}
