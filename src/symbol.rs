/*
    The vocabulary shared by grammars and automata
*/

use std::cmp::Reverse;
use std::fmt::Display;

use indexmap::IndexSet;
use thiserror::Error;

/// The reserved name of the empty string.
pub const EPSILON: &str = "ε";

// The base unit of both a grammar rule and an automaton transition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
    Epsilon,
}

impl Symbol {
    pub fn terminal<S: Into<String>>(name: S) -> Self {
        Symbol::Terminal(name.into())
    }

    pub fn nonterminal<S: Into<String>>(name: S) -> Self {
        Symbol::Nonterminal(name.into())
    }

    /// Reads a transition label, mapping the reserved name (or an empty
    /// label) to [`Symbol::Epsilon`].
    pub fn label(name: &str) -> Self {
        if name.is_empty() || name == EPSILON {
            Symbol::Epsilon
        } else {
            Symbol::Terminal(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::Nonterminal(name) => name,
            Symbol::Epsilon => EPSILON,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_))
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(name) => write!(f, "\"{}\"", name),
            Symbol::Nonterminal(name) => write!(f, "{}", name),
            Symbol::Epsilon => write!(f, "{}", EPSILON),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("`{text}` has no known symbol at offset {offset}")]
    Unrecognized { text: String, offset: usize },
}

/// Splits `text` into symbols from the known names. At each offset the
/// longest name whose remainder still splits wins, so a shorter name is used
/// only when the longer one leads nowhere. `""` and `ε` decompose to the
/// empty sequence.
pub fn decompose(
    text: &str,
    nonterminals: &IndexSet<String>,
    terminals: &IndexSet<String>,
) -> Result<Vec<Symbol>, SymbolError> {
    if text == EPSILON {
        return Ok(Vec::new());
    }

    let mut candidates: Vec<Symbol> = nonterminals
        .iter()
        .map(|n| Symbol::Nonterminal(n.clone()))
        .chain(terminals.iter().map(|t| Symbol::Terminal(t.clone())))
        .filter(|symbol| !symbol.name().is_empty())
        .collect();
    candidates.sort_by_key(|symbol| Reverse(symbol.name().len()));

    // splits[i] is the symbol to take at offset i when text[i..] splits
    let mut splits: Vec<Option<&Symbol>> = vec![None; text.len() + 1];
    for offset in (0..text.len()).rev().filter(|&offset| text.is_char_boundary(offset)) {
        let rest = &text[offset..];
        let found = candidates.iter().find(|symbol| {
            let end = offset + symbol.name().len();
            rest.starts_with(symbol.name()) && (end == text.len() || splits[end].is_some())
        });
        splits[offset] = found;
    }

    if !text.is_empty() && splits[0].is_none() {
        return Err(SymbolError::Unrecognized {
            text: text.to_string(),
            offset: furthest_prefix(text, &candidates),
        });
    }

    let mut symbols = Vec::new();
    let mut offset = 0;
    while let Some(symbol) = splits.get(offset).copied().flatten() {
        offset += symbol.name().len();
        symbols.push(symbol.clone());
    }

    Ok(symbols)
}

// The furthest offset any sequence of known names reaches from the start
fn furthest_prefix(text: &str, candidates: &[Symbol]) -> usize {
    let mut reached = vec![false; text.len() + 1];
    reached[0] = true;
    let mut furthest = 0;

    for offset in 0..text.len() {
        if !reached[offset] {
            continue;
        }
        furthest = offset;
        for symbol in candidates.iter().filter(|symbol| text[offset..].starts_with(symbol.name())) {
            reached[offset + symbol.name().len()] = true;
        }
    }

    furthest
}

/// Splits `text` into alphabet symbols, ignoring the non-terminal vocabulary.
pub fn decompose_terminals(text: &str, alphabet: &IndexSet<String>) -> Result<Vec<String>, SymbolError> {
    let symbols = decompose(text, &IndexSet::new(), alphabet)?;
    Ok(symbols.into_iter().map(|symbol| symbol.name().to_string()).collect())
}
