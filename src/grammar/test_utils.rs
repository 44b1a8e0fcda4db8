use std::collections::{BTreeSet, HashSet, VecDeque};

use super::{Alternative, Grammar, Symbol};

/// Every terminal string of at most `max_len` symbols the grammar derives,
/// found by leftmost derivation. Sentential forms longer than
/// `2 * max_len + 4` are cut off, which is plenty for the small grammars
/// used in tests.
pub(crate) fn bounded_language(grammar: &Grammar, max_len: usize) -> BTreeSet<Vec<String>> {
    let max_form = 2 * max_len + 4;
    let mut words = BTreeSet::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();

    let start = vec![Symbol::nonterminal(grammar.start_symbol())];
    seen.insert(start.clone());
    queue.push_back(start);

    while let Some(form) = queue.pop_front() {
        let Some(position) = form.iter().position(Symbol::is_nonterminal) else {
            words.insert(form.iter().map(|symbol| symbol.name().to_string()).collect());
            continue;
        };

        for alternative in grammar.alternatives(form[position].name()) {
            let mut next = form[..position].to_vec();
            next.extend(alternative.iter().cloned());
            next.extend(form[position + 1..].iter().cloned());

            if next.len() > max_form || next.iter().filter(|symbol| symbol.is_terminal()).count() > max_len {
                continue;
            }
            if seen.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }

    words
}

/// The alternatives of `nonterminal`, ignoring their order.
pub(crate) fn rule_set(grammar: &Grammar, nonterminal: &str) -> BTreeSet<Alternative> {
    grammar.alternatives(nonterminal).iter().cloned().collect()
}
