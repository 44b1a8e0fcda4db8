/*
    This module is for storing and manipulating grammars
*/

mod analysis;
mod classify;
mod cyk;
pub(crate) mod names;
mod normal_form;

#[cfg(test)]
pub(crate) mod test_utils;

use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use thiserror::Error;

pub use crate::symbol::Symbol;
use crate::symbol::{decompose, SymbolError, EPSILON};
pub use classify::GrammarType;

// The symbols in a single alternative, empty for epsilon
pub type Alternative = Vec<Symbol>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("`{0}` is declared both as a terminal and as a nonterminal")]
    OverlappingSymbol(String),

    #[error("`{}` is reserved for the empty string", EPSILON)]
    ReservedEpsilon,

    #[error("Start symbol `{0}` is not a declared nonterminal")]
    InvalidStart(String),

    #[error("Rule for `{0}`, which is not a declared nonterminal")]
    UndeclaredNonterminal(String),

    #[error("Production of `{lhs}` uses undeclared symbol {symbol}")]
    UndeclaredSymbol { lhs: String, symbol: Symbol },

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

/// A context-free grammar: every rule rewrites a single nonterminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    nonterminals: IndexSet<String>,
    terminals: IndexSet<String>,
    start_symbol: String,
    rules: IndexMap<String, Rewrite>,
}

impl Grammar {
    /// Builds a grammar, rejecting anything that breaks the symbol
    /// invariants. Epsilon symbols inside alternatives are dropped since they
    /// are the identity of concatenation.
    pub fn new<N, T, S>(
        nonterminals: N,
        terminals: T,
        start_symbol: S,
        rules: IndexMap<String, Rewrite>,
    ) -> Result<Self, GrammarError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
        S: Into<String>,
    {
        let nonterminals: IndexSet<String> = nonterminals.into_iter().map(Into::into).collect();
        let terminals: IndexSet<String> = terminals.into_iter().map(Into::into).collect();
        let start_symbol = start_symbol.into();

        if nonterminals.contains(EPSILON) || terminals.contains(EPSILON) {
            return Err(GrammarError::ReservedEpsilon);
        }

        if let Some(shared) = nonterminals.intersection(&terminals).next() {
            return Err(GrammarError::OverlappingSymbol(shared.clone()));
        }

        if !nonterminals.contains(&start_symbol) {
            return Err(GrammarError::InvalidStart(start_symbol));
        }

        let mut checked = IndexMap::with_capacity(rules.len());
        for (lhs, rewrite) in rules {
            if !nonterminals.contains(&lhs) {
                return Err(GrammarError::UndeclaredNonterminal(lhs));
            }

            let mut alternatives = Rewrite::with_capacity(rewrite.len());
            for alternative in rewrite {
                let alternative: Alternative =
                    alternative.into_iter().filter(|symbol| !symbol.is_epsilon()).collect();

                let undeclared = alternative.iter().find(|symbol| match symbol {
                    Symbol::Terminal(name) => !terminals.contains(name),
                    Symbol::Nonterminal(name) => !nonterminals.contains(name),
                    Symbol::Epsilon => false,
                });
                if let Some(symbol) = undeclared {
                    return Err(GrammarError::UndeclaredSymbol {
                        lhs,
                        symbol: symbol.clone(),
                    });
                }

                alternatives.push(alternative);
            }

            checked
                .entry(lhs)
                .or_insert_with(Rewrite::new)
                .extend(alternatives);
        }

        Ok(Grammar {
            nonterminals,
            terminals,
            start_symbol,
            rules: checked,
        })
    }

    /// Builds a grammar from productions written as concatenated symbol
    /// names, e.g. `("S", &["bA", "AC"])`. Each right-hand side is split by
    /// longest match against the declared names; `ε` is the empty string.
    pub fn from_productions(
        nonterminals: &[&str],
        terminals: &[&str],
        start_symbol: &str,
        productions: &[(&str, &[&str])],
    ) -> Result<Self, GrammarError> {
        let nonterminal_set: IndexSet<String> = nonterminals.iter().map(|s| s.to_string()).collect();
        let terminal_set: IndexSet<String> = terminals.iter().map(|s| s.to_string()).collect();

        let mut rules = IndexMap::<String, Rewrite>::new();
        for (lhs, right_sides) in productions {
            let rewrite = right_sides
                .iter()
                .map(|text| decompose(text, &nonterminal_set, &terminal_set))
                .collect::<Result<Rewrite, _>>()?;
            rules.entry(lhs.to_string()).or_default().extend(rewrite);
        }

        Grammar::new(nonterminal_set, terminal_set, start_symbol, rules)
    }

    pub fn nonterminals(&self) -> &IndexSet<String> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &IndexSet<String> {
        &self.terminals
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn rules(&self) -> &IndexMap<String, Rewrite> {
        &self.rules
    }

    /// The alternatives of `nonterminal`, empty if it has no rule.
    pub fn alternatives(&self, nonterminal: &str) -> &[Alternative] {
        self.rules.get(nonterminal).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every production as a `(lhs, alternative)` pair, in rule order.
    pub fn productions(&self) -> impl Iterator<Item = (&str, &Alternative)> + '_ {
        self.rules
            .iter()
            .flat_map(|(lhs, rewrite)| rewrite.iter().map(move |alternative| (lhs.as_str(), alternative)))
    }

    /// Returns a copy of this grammar that starts from `start_symbol`.
    pub fn with_start_symbol(&self, start_symbol: &str) -> Result<Self, GrammarError> {
        if !self.nonterminals.contains(start_symbol) {
            return Err(GrammarError::InvalidStart(start_symbol.to_string()));
        }

        Ok(Grammar {
            start_symbol: start_symbol.to_string(),
            ..self.clone()
        })
    }
}

pub(crate) fn format_alternative(alternative: &Alternative) -> String {
    if alternative.is_empty() {
        "\"\"".to_string()
    } else {
        alternative.iter().join(" ")
    }
}

// Writes the grammar in the same format the grammar files use, start rule
// first, so the output can be read back in
impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start = self.rules.get_key_value(&self.start_symbol);
        let others = self.rules.iter().filter(|(lhs, _)| **lhs != self.start_symbol);

        for (lhs, rewrite) in start.into_iter().chain(others) {
            if rewrite.is_empty() {
                continue;
            }
            writeln!(f, "{} = {}", lhs, rewrite.iter().map(format_alternative).join(" | "))?;
        }

        Ok(())
    }
}
