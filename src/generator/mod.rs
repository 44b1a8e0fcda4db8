/*
    This module generates sentences by random leftmost derivation
*/

pub mod pattern;

use rand::prelude::*;
use thiserror::Error;

use crate::grammar::*;

/// Rewrites allowed in a single derivation before giving up.
pub const STEP_LIMIT: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    // The start override names something that is not a nonterminal
    #[error("No nonterminal named `{0}`")]
    UndefinedNonterminal(String),

    #[error("Nonterminal `{0}` has no productions")]
    MissingProduction(String),

    #[error("Derivation did not finish within {0} steps")]
    StepLimit(usize),
}

pub type GenResult = Result<Vec<String>, GenerateError>;

/// Generates a sentence of the grammar, as a sequence of terminals.
pub fn generate<R: Rng + ?Sized>(grammar: &Grammar, rng: &mut R) -> GenResult {
    derive(grammar, grammar.start_symbol(), rng, STEP_LIMIT)
}

// Generates a sentence in the given grammar starting with the given symbol
pub fn generate_with_override<R: Rng + ?Sized>(grammar: &Grammar, start: &str, rng: &mut R) -> GenResult {
    if !grammar.nonterminals().contains(start) {
        return Err(GenerateError::UndefinedNonterminal(start.to_string()));
    }
    derive(grammar, start, rng, STEP_LIMIT)
}

// Always rewrites the leftmost nonterminal, picking one of its alternatives
// uniformly
fn derive<R: Rng + ?Sized>(grammar: &Grammar, start: &str, rng: &mut R, limit: usize) -> GenResult {
    let mut form = vec![Symbol::nonterminal(start)];

    for _ in 0..limit {
        let Some(position) = form.iter().position(Symbol::is_nonterminal) else {
            return Ok(form.iter().map(|symbol| symbol.name().to_string()).collect());
        };

        let nonterminal = form[position].name();
        let alternative = grammar
            .alternatives(nonterminal)
            .choose(rng)
            .ok_or_else(|| GenerateError::MissingProduction(nonterminal.to_string()))?
            .clone();

        form.splice(position..=position, alternative);
    }

    if form.iter().any(Symbol::is_nonterminal) {
        Err(GenerateError::StepLimit(limit))
    } else {
        Ok(form.iter().map(|symbol| symbol.name().to_string()).collect())
    }
}
