/*
    Fixed-point analyses over a production map. Every loop grows a set
    monotonically and stops after a pass that adds nothing.
*/

use std::collections::{HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};

use super::{Alternative, Rewrite, Symbol};

/// A unit production rewrites to exactly one nonterminal.
pub(crate) fn unit_target(alternative: &Alternative) -> Option<&str> {
    match alternative.as_slice() {
        [Symbol::Nonterminal(name)] => Some(name),
        _ => None,
    }
}

/// Nonterminals that can derive the empty string.
pub(crate) fn nullable(rules: &IndexMap<String, Rewrite>) -> HashSet<String> {
    let mut nullable = HashSet::new();

    loop {
        let before = nullable.len();

        for (lhs, rewrite) in rules {
            if nullable.contains(lhs) {
                continue;
            }

            // The empty alternative is vacuously all-nullable
            let derives_empty = rewrite.iter().any(|alternative| {
                alternative
                    .iter()
                    .all(|symbol| matches!(symbol, Symbol::Nonterminal(name) if nullable.contains(name)))
            });
            if derives_empty {
                nullable.insert(lhs.clone());
            }
        }

        if nullable.len() == before {
            return nullable;
        }
    }
}

/// For every nonterminal, the nonterminals it reaches through chains of unit
/// productions, itself included.
pub(crate) fn unit_pairs(
    nonterminals: &IndexSet<String>,
    rules: &IndexMap<String, Rewrite>,
) -> IndexMap<String, IndexSet<String>> {
    let mut pairs: IndexMap<String, IndexSet<String>> = nonterminals
        .iter()
        .map(|a| (a.clone(), IndexSet::from([a.clone()])))
        .collect();

    loop {
        let mut changed = false;

        for reachable in pairs.values_mut() {
            let targets: Vec<String> = reachable
                .iter()
                .flat_map(|b| rules.get(b).into_iter().flatten())
                .filter_map(unit_target)
                .map(str::to_string)
                .collect();

            for target in targets {
                changed |= reachable.insert(target);
            }
        }

        if !changed {
            return pairs;
        }
    }
}

/// Symbols, terminals included, reachable from `start` by breadth-first
/// search over the production graph.
pub(crate) fn accessible(start: &str, rules: &IndexMap<String, Rewrite>) -> HashSet<Symbol> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(Symbol::nonterminal(start));
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for symbol in rules.get(current).into_iter().flatten().flatten() {
            if visited.insert(symbol.clone()) {
                if let Symbol::Nonterminal(name) = symbol {
                    queue.push_back(name);
                }
            }
        }
    }

    visited
}

/// Nonterminals that derive at least one string of terminals.
pub(crate) fn productive(rules: &IndexMap<String, Rewrite>) -> HashSet<String> {
    let mut productive = HashSet::new();

    loop {
        let before = productive.len();

        for (lhs, rewrite) in rules {
            if productive.contains(lhs) {
                continue;
            }

            let terminates = rewrite
                .iter()
                .any(|alternative| alternative.iter().all(|symbol| is_productive(symbol, &productive)));
            if terminates {
                productive.insert(lhs.clone());
            }
        }

        if productive.len() == before {
            return productive;
        }
    }
}

pub(crate) fn is_productive(symbol: &Symbol, productive: &HashSet<String>) -> bool {
    match symbol {
        Symbol::Terminal(_) | Symbol::Epsilon => true,
        Symbol::Nonterminal(name) => productive.contains(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn set(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nullable_through_chains() {
        let grammar = Grammar::from_productions(
            &["S", "A", "B", "C"],
            &["a"],
            "S",
            &[("S", &["AB", "a"]), ("A", &["B"]), ("B", &["ε", "a"]), ("C", &["aC"])],
        )
        .unwrap();

        assert_eq!(nullable(grammar.rules()), set(&["S", "A", "B"]));
    }

    #[test]
    fn unit_pairs_are_transitive() {
        let grammar = Grammar::from_productions(
            &["S", "A", "B"],
            &["a"],
            "S",
            &[("S", &["A"]), ("A", &["B", "a"]), ("B", &["a", "S"])],
        )
        .unwrap();

        let pairs = unit_pairs(grammar.nonterminals(), grammar.rules());
        for nonterminal in ["S", "A", "B"] {
            let reachable: HashSet<String> = pairs[nonterminal].iter().cloned().collect();
            assert_eq!(reachable, set(&["S", "A", "B"]));
        }
    }

    #[test]
    fn accessible_from_start() {
        let grammar = Grammar::from_productions(
            &["S", "A", "D"],
            &["a", "b", "c"],
            "S",
            &[("S", &["aA"]), ("A", &["b"]), ("D", &["c"])],
        )
        .unwrap();

        let reached = accessible("S", grammar.rules());
        assert!(reached.contains(&Symbol::nonterminal("A")));
        assert!(reached.contains(&Symbol::terminal("b")));
        assert!(!reached.contains(&Symbol::nonterminal("D")));
        assert!(!reached.contains(&Symbol::terminal("c")));
    }

    #[test]
    fn productive_needs_terminating_alternative() {
        let grammar = Grammar::from_productions(
            &["S", "A", "B"],
            &["a"],
            "S",
            &[("S", &["A", "B"]), ("A", &["aA"]), ("B", &["a"])],
        )
        .unwrap();

        assert_eq!(productive(grammar.rules()), set(&["S", "B"]));
    }
}
