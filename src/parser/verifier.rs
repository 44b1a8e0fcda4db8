use std::collections::HashSet;

use super::CompileErrorType::UndefinedNonterminal;
use super::{CompileError, CompileErrors, FileResult, Rule};
use crate::grammar::Symbol::Nonterminal;

fn get_rule_undefined_symbols(rule: &Rule, defined: &HashSet<&str>) -> CompileErrors {
    // Filter out everything but nonterminals and unwrap the text from the
    // nonterminals. Then filter out all the defined nonterminals.
    rule.rewrite
        .iter()
        .flatten()
        .filter_map(|symbol| match symbol {
            Nonterminal(symbol) => Some(symbol),
            _ => None,
        })
        .filter(|symbol| !defined.contains(symbol.as_str()))
        .map(|symbol_text| CompileError {
            location: rule.location.clone(),
            error: UndefinedNonterminal(symbol_text.to_owned()),
        })
        .collect()
}

// Reports every use of a nonterminal that no rule defines, in file order
pub fn verify_rules(rules: &[Rule]) -> FileResult<()> {
    let defined: HashSet<&str> = rules.iter().map(|rule| rule.symbol.as_str()).collect();

    let errors: CompileErrors = rules
        .iter()
        .flat_map(|rule| get_rule_undefined_symbols(rule, &defined))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
