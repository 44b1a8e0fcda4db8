use std::fmt::Display;

use super::{Alternative, Grammar, Symbol};

/// Position in the Chomsky hierarchy. Every rule of a [`Grammar`] rewrites a
/// single nonterminal, so nothing above context-free can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarType {
    Regular,
    ContextFree,
}

impl Display for GrammarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarType::Regular => write!(f, "Type 3 (regular)"),
            GrammarType::ContextFree => write!(f, "Type 2 (context-free)"),
        }
    }
}

// Alternatives allowed in both linear forms
fn is_base(alternative: &Alternative) -> bool {
    matches!(alternative.as_slice(), [] | [Symbol::Terminal(_)])
}

fn is_right_linear(alternative: &Alternative) -> bool {
    is_base(alternative)
        || matches!(alternative.as_slice(), [Symbol::Terminal(_), Symbol::Nonterminal(_)])
}

fn is_left_linear(alternative: &Alternative) -> bool {
    is_base(alternative)
        || matches!(alternative.as_slice(), [Symbol::Nonterminal(_), Symbol::Terminal(_)])
}

impl Grammar {
    /// Every alternative is `ε`, `a`, or `a B`.
    pub fn is_right_linear(&self) -> bool {
        self.productions().all(|(_, alternative)| is_right_linear(alternative))
    }

    /// Every alternative is `ε`, `a`, or `B a`.
    pub fn is_left_linear(&self) -> bool {
        self.productions().all(|(_, alternative)| is_left_linear(alternative))
    }

    pub fn classify(&self) -> GrammarType {
        if self.is_right_linear() || self.is_left_linear() {
            GrammarType::Regular
        } else {
            GrammarType::ContextFree
        }
    }
}
