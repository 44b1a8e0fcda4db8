/*
    Conversion to Chomsky Normal Form
*/

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::debug;

use super::analysis::{self, unit_target};
use super::names::NameAllocator;
use super::{Alternative, Grammar, Rewrite, Symbol};

impl Grammar {
    /// Returns an equivalent grammar in Chomsky Normal Form. Every
    /// alternative of the result is a single terminal or two nonterminals,
    /// except an empty alternative on a start symbol that appears on no
    /// right-hand side.
    pub fn to_chomsky_normal_form(&self) -> Grammar {
        let mut pipeline = Pipeline::new(self);

        pipeline.isolate_start();
        pipeline.eliminate_epsilon();
        pipeline.eliminate_units();
        pipeline.eliminate_inaccessible();
        pipeline.eliminate_nonproductive();
        pipeline.isolate_terminals();
        pipeline.binarize();

        pipeline.into_grammar()
    }

    pub fn is_in_chomsky_normal_form(&self) -> bool {
        let start_on_right = self
            .productions()
            .any(|(_, alternative)| alternative.contains(&Symbol::nonterminal(self.start_symbol.as_str())));

        self.productions().all(|(lhs, alternative)| match alternative.as_slice() {
            [] => lhs == self.start_symbol && !start_on_right,
            [Symbol::Terminal(_)] => true,
            [Symbol::Nonterminal(_), Symbol::Nonterminal(_)] => true,
            _ => false,
        })
    }
}

// The working copy a single conversion rewrites in place
struct Pipeline {
    nonterminals: IndexSet<String>,
    terminals: IndexSet<String>,
    start: String,
    rules: IndexMap<String, Rewrite>,
    names: NameAllocator,
}

impl Pipeline {
    fn new(grammar: &Grammar) -> Self {
        Pipeline {
            nonterminals: grammar.nonterminals.clone(),
            terminals: grammar.terminals.clone(),
            start: grammar.start_symbol.clone(),
            rules: grammar.rules.clone(),
            names: NameAllocator::new(grammar.nonterminals.iter().chain(grammar.terminals.iter())),
        }
    }

    fn into_grammar(self) -> Grammar {
        Grammar {
            nonterminals: self.nonterminals,
            terminals: self.terminals,
            start_symbol: self.start,
            rules: self.rules,
        }
    }

    fn add_rule(&mut self, lhs: String, alternative: Alternative) {
        self.nonterminals.insert(lhs.clone());
        self.rules.entry(lhs).or_default().push(alternative);
    }

    // Step 1: the start symbol must not appear on a right-hand side before
    // epsilon productions are removed
    fn isolate_start(&mut self) {
        let start = Symbol::nonterminal(self.start.as_str());
        let on_right = self.rules.values().flatten().any(|alternative| alternative.contains(&start));
        let nullable = analysis::nullable(&self.rules).contains(&self.start);

        if !on_right && !nullable {
            return;
        }

        let new_start = self.names.suffixed("S0");
        debug!("new start symbol {} -> {}", new_start, self.start);

        self.nonterminals.insert(new_start.clone());
        let mut rules = IndexMap::with_capacity(self.rules.len() + 1);
        rules.insert(new_start.clone(), vec![vec![start]]);
        rules.extend(self.rules.drain(..));
        self.rules = rules;
        self.start = new_start;
    }

    // Step 2
    fn eliminate_epsilon(&mut self) {
        let nullable = analysis::nullable(&self.rules);
        debug!("nullable symbols: {{{}}}", nullable.iter().sorted().join(", "));

        for rewrite in self.rules.values_mut() {
            *rewrite = rewrite
                .iter()
                .flat_map(|alternative| without_nullables(alternative, &nullable))
                .filter(|alternative| !alternative.is_empty())
                .unique()
                .collect();
        }

        // Only the start symbol may still derive the empty string, and step 1
        // made sure it never appears on a right-hand side
        if nullable.contains(&self.start) {
            let start = self.start.clone();
            self.add_rule(start, Alternative::new());
        }
    }

    // Step 3
    fn eliminate_units(&mut self) {
        let pairs = analysis::unit_pairs(&self.nonterminals, &self.rules);
        debug!(
            "unit pairs: {}",
            pairs
                .iter()
                .map(|(a, reachable)| format!("{} => {{{}}}", a, reachable.iter().join(", ")))
                .join("; ")
        );

        let rules: IndexMap<String, Rewrite> = pairs
            .iter()
            .map(|(a, reachable)| {
                let rewrite = reachable
                    .iter()
                    .flat_map(|b| self.rules.get(b).into_iter().flatten())
                    .filter(|alternative| unit_target(alternative).is_none())
                    .cloned()
                    .unique()
                    .collect();
                (a.clone(), rewrite)
            })
            .collect();

        self.rules = rules;
    }

    // Step 4
    fn eliminate_inaccessible(&mut self) {
        let accessible = analysis::accessible(&self.start, &self.rules);
        debug!("accessible symbols: {{{}}}", accessible.iter().map(Symbol::name).sorted().join(", "));
        self.retain_accessible(&accessible);
    }

    fn retain_accessible(&mut self, accessible: &HashSet<Symbol>) {
        self.nonterminals
            .retain(|name| accessible.contains(&Symbol::nonterminal(name.as_str())));
        self.terminals
            .retain(|name| accessible.contains(&Symbol::terminal(name.as_str())));
        self.rules
            .retain(|lhs, _| accessible.contains(&Symbol::nonterminal(lhs.as_str())));
    }

    // Step 5
    fn eliminate_nonproductive(&mut self) {
        let mut productive = analysis::productive(&self.rules);
        debug!("productive symbols: {{{}}}", productive.iter().sorted().join(", "));

        loop {
            self.rules.retain(|lhs, _| productive.contains(lhs));
            for rewrite in self.rules.values_mut() {
                rewrite.retain(|alternative| {
                    alternative
                        .iter()
                        .all(|symbol| analysis::is_productive(symbol, &productive))
                });
            }

            let emptied: HashSet<String> = self
                .rules
                .iter()
                .filter(|(_, rewrite)| rewrite.is_empty())
                .map(|(lhs, _)| lhs.clone())
                .collect();
            if emptied.is_empty() {
                break;
            }
            productive.retain(|name| !emptied.contains(name));
        }

        // The start symbol stays declared even when its language is empty
        let start = self.start.clone();
        self.nonterminals
            .retain(|name| productive.contains(name) || *name == start);

        // Dropped alternatives can strand symbols that step 4 kept
        let accessible = analysis::accessible(&self.start, &self.rules);
        self.retain_accessible(&accessible);
    }

    // Step 6
    fn isolate_terminals(&mut self) {
        let mut isolated: IndexMap<String, String> = IndexMap::new();

        for rewrite in self.rules.values_mut() {
            for alternative in rewrite.iter_mut().filter(|alternative| alternative.len() > 1) {
                for symbol in alternative.iter_mut() {
                    if let Symbol::Terminal(terminal) = symbol {
                        let names = &mut self.names;
                        let replacement = isolated
                            .entry(terminal.clone())
                            .or_insert_with(|| names.numbered("T"))
                            .clone();
                        *symbol = Symbol::Nonterminal(replacement);
                    }
                }
            }
        }

        for (terminal, nonterminal) in isolated {
            debug!("isolated terminal {} -> {}", nonterminal, terminal);
            self.add_rule(nonterminal, vec![Symbol::Terminal(terminal)]);
        }
    }

    // Step 7
    fn binarize(&mut self) {
        let mut chained: Vec<(String, Alternative)> = Vec::new();

        for rewrite in self.rules.values_mut() {
            for alternative in rewrite.iter_mut().filter(|alternative| alternative.len() > 2) {
                let long = std::mem::take(alternative);
                let last = long.len() - 2;

                let mut current = self.names.numbered("V");
                *alternative = vec![long[0].clone(), Symbol::Nonterminal(current.clone())];

                for symbol in &long[1..last] {
                    let next = self.names.numbered("V");
                    chained.push((current, vec![symbol.clone(), Symbol::Nonterminal(next.clone())]));
                    current = next;
                }
                chained.push((current, long[last..].to_vec()));
            }
        }

        for (lhs, alternative) in chained {
            self.add_rule(lhs, alternative);
        }
    }
}

/// Every variant of `alternative` obtained by deleting some subset of its
/// nullable occurrences, the unchanged alternative first.
fn without_nullables(alternative: &Alternative, nullable: &HashSet<String>) -> Vec<Alternative> {
    let positions: Vec<usize> = alternative
        .iter()
        .positions(|symbol| matches!(symbol, Symbol::Nonterminal(name) if nullable.contains(name)))
        .collect();

    (0..1usize << positions.len())
        .map(|mask| {
            alternative
                .iter()
                .enumerate()
                .filter(|(i, _)| match positions.iter().position(|p| p == i) {
                    Some(bit) => mask & (1 << bit) == 0,
                    None => true,
                })
                .map(|(_, symbol)| symbol.clone())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::grammar::test_utils::{bounded_language, rule_set};

    fn scenario_grammar() -> Grammar {
        Grammar::from_productions(
            &["S", "A", "B", "C"],
            &["a", "b"],
            "S",
            &[
                ("S", &["bA", "AC"]),
                ("A", &["AbAa", "bS", "BC"]),
                ("B", &["BbaA", "a", "bSa"]),
                ("C", &["ε"]),
            ],
        )
        .unwrap()
    }

    fn s_nonterminal(text: &str) -> Symbol {
        Symbol::nonterminal(text)
    }

    fn s_terminal(text: &str) -> Symbol {
        Symbol::terminal(text)
    }

    #[test]
    fn nullable_variants() {
        let nullable: HashSet<String> = ["A".to_string()].into();
        let alternative = vec![s_nonterminal("A"), s_terminal("b"), s_nonterminal("A")];

        let variants: BTreeSet<Alternative> = without_nullables(&alternative, &nullable).into_iter().collect();
        let answer: BTreeSet<Alternative> = [
            vec![s_nonterminal("A"), s_terminal("b"), s_nonterminal("A")],
            vec![s_terminal("b"), s_nonterminal("A")],
            vec![s_nonterminal("A"), s_terminal("b")],
            vec![s_terminal("b")],
        ]
        .into();

        assert_eq!(variants, answer);
    }

    #[test]
    fn scenario_shape() {
        let grammar = scenario_grammar();
        let cnf = grammar.to_chomsky_normal_form();

        assert!(cnf.is_in_chomsky_normal_form());
        assert!(!grammar.is_in_chomsky_normal_form());

        // S appears on right-hand sides, so a fresh start is introduced
        assert_eq!(cnf.start_symbol(), "S0");

        // C only ever derived the empty string; it is gone entirely
        assert!(!cnf.nonterminals().contains("C"));
        assert!(cnf.productions().all(|(_, alternative)| !alternative.is_empty()));
        assert!(cnf.productions().all(|(_, alternative)| alternative.len() <= 2));
    }

    #[test]
    fn scenario_language_is_preserved() {
        let grammar = scenario_grammar();
        let cnf = grammar.to_chomsky_normal_form();

        let original = bounded_language(&grammar, 6);
        assert!(!original.is_empty());
        assert_eq!(original, bounded_language(&cnf, 6));
    }

    #[test]
    fn original_is_untouched() {
        let grammar = scenario_grammar();
        let copy = grammar.clone();
        let _ = grammar.to_chomsky_normal_form();

        assert_eq!(grammar, copy);
    }

    #[test]
    fn nullable_start_keeps_empty_word() {
        // S -> a S b | ε
        let grammar =
            Grammar::from_productions(&["S"], &["a", "b"], "S", &[("S", &["aSb", "ε"])]).unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert!(cnf.is_in_chomsky_normal_form());
        assert!(cnf.alternatives(cnf.start_symbol()).contains(&vec![]));
        assert_eq!(bounded_language(&grammar, 6), bounded_language(&cnf, 6));
        assert!(bounded_language(&cnf, 0).contains(&Vec::<String>::new()));
    }

    #[test]
    fn nullable_start_not_on_right_side() {
        // The start is nullable but never used on a right-hand side
        let grammar = Grammar::from_productions(
            &["S", "A"],
            &["a"],
            "S",
            &[("S", &["AA"]), ("A", &["a", "ε"])],
        )
        .unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert!(cnf.is_in_chomsky_normal_form());
        assert_ne!(cnf.start_symbol(), "S");
        assert_eq!(bounded_language(&grammar, 4), bounded_language(&cnf, 4));
    }

    #[test]
    fn fresh_start_avoids_collisions() {
        let grammar = Grammar::from_productions(
            &["S", "S0"],
            &["a"],
            "S",
            &[("S", &["aS", "S0"]), ("S0", &["a"])],
        )
        .unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert_eq!(cnf.start_symbol(), "S00");
        assert!(cnf.is_in_chomsky_normal_form());
    }

    #[test]
    fn unit_productions_are_replaced() {
        let grammar = Grammar::from_productions(
            &["S", "A", "B"],
            &["a", "b"],
            "S",
            &[("S", &["A"]), ("A", &["B", "a"]), ("B", &["b"])],
        )
        .unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert_eq!(
            rule_set(&cnf, "S"),
            [vec![s_terminal("a")], vec![s_terminal("b")]].into()
        );
        // A and B are no longer reachable from S
        assert_eq!(cnf.nonterminals().len(), 1);
    }

    #[test]
    fn nonproductive_symbols_are_removed() {
        let grammar = Grammar::from_productions(
            &["S", "A", "B"],
            &["a", "b"],
            "S",
            &[("S", &["a", "AB"]), ("A", &["aA"]), ("B", &["b"])],
        )
        .unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert!(!cnf.nonterminals().contains("A"));
        assert_eq!(rule_set(&cnf, "S"), [vec![s_terminal("a")]].into());

        // B was only reachable through the dropped S -> AB
        assert!(!cnf.nonterminals().contains("B"));
        assert!(cnf.alternatives("B").is_empty());
        assert_eq!(cnf.terminals().iter().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn empty_language_keeps_start() {
        let grammar = Grammar::from_productions(&["S"], &["a"], "S", &[("S", &["aS"])]).unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert!(cnf.nonterminals().contains(cnf.start_symbol()));
        assert_eq!(cnf.productions().count(), 0);
    }

    #[test]
    fn terminals_are_isolated_once() {
        let grammar =
            Grammar::from_productions(&["S"], &["a", "b"], "S", &[("S", &["ab", "ba"])]).unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert_eq!(rule_set(&cnf, "T1"), [vec![s_terminal("a")]].into());
        assert_eq!(rule_set(&cnf, "T2"), [vec![s_terminal("b")]].into());
        assert_eq!(
            rule_set(&cnf, "S"),
            [
                vec![s_nonterminal("T1"), s_nonterminal("T2")],
                vec![s_nonterminal("T2"), s_nonterminal("T1")]
            ]
            .into()
        );
    }

    #[test]
    fn long_alternatives_become_chains() {
        let grammar = Grammar::from_productions(
            &["S", "A", "B", "C", "D"],
            &["a", "b", "c", "d"],
            "S",
            &[("S", &["ABCD"]), ("A", &["a"]), ("B", &["b"]), ("C", &["c"]), ("D", &["d"])],
        )
        .unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert_eq!(rule_set(&cnf, "S"), [vec![s_nonterminal("A"), s_nonterminal("V1")]].into());
        assert_eq!(rule_set(&cnf, "V1"), [vec![s_nonterminal("B"), s_nonterminal("V2")]].into());
        assert_eq!(rule_set(&cnf, "V2"), [vec![s_nonterminal("C"), s_nonterminal("D")]].into());
        assert_eq!(bounded_language(&grammar, 4), bounded_language(&cnf, 4));
    }

    #[test]
    fn fresh_names_skip_declared_symbols() {
        let grammar = Grammar::from_productions(
            &["S", "T1", "V1"],
            &["a", "b"],
            "S",
            &[("S", &["aT1V1b"]), ("T1", &["a"]), ("V1", &["b"])],
        )
        .unwrap();
        let cnf = grammar.to_chomsky_normal_form();

        assert!(cnf.is_in_chomsky_normal_form());
        assert_eq!(rule_set(&cnf, "T1"), [vec![s_terminal("a")]].into());
        assert_eq!(rule_set(&cnf, "T2"), [vec![s_terminal("a")]].into());
        assert_eq!(rule_set(&cnf, "T3"), [vec![s_terminal("b")]].into());
        assert!(cnf.nonterminals().contains("V2") && cnf.nonterminals().contains("V3"));
        assert_eq!(bounded_language(&grammar, 4), bounded_language(&cnf, 4));
    }

    #[test]
    fn normal_form_twice_is_still_normal() {
        let cnf = scenario_grammar().to_chomsky_normal_form();
        let again = cnf.to_chomsky_normal_form();

        assert!(again.is_in_chomsky_normal_form());
        assert_eq!(bounded_language(&cnf, 5), bounded_language(&again, 5));
    }
}
