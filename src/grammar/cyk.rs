use std::collections::HashSet;

use super::{Grammar, Symbol};

impl Grammar {
    /// Decides whether the grammar derives `word` by running CYK on its
    /// Chomsky Normal Form.
    pub fn derives<S: AsRef<str>>(&self, word: &[S]) -> bool {
        self.to_chomsky_normal_form().cyk(word)
    }

    // Assumes the receiver is in Chomsky Normal Form
    fn cyk<S: AsRef<str>>(&self, word: &[S]) -> bool {
        let n = word.len();
        if n == 0 {
            return self.alternatives(&self.start_symbol).iter().any(Vec::is_empty);
        }

        // table[length - 1][i]: nonterminals deriving word[i..i + length]
        let mut table: Vec<Vec<HashSet<&str>>> = vec![vec![HashSet::new(); n]; n];

        for (i, terminal) in word.iter().enumerate() {
            for (lhs, alternative) in self.productions() {
                if let [Symbol::Terminal(name)] = alternative.as_slice() {
                    if name == terminal.as_ref() {
                        table[0][i].insert(lhs);
                    }
                }
            }
        }

        for length in 2..=n {
            for i in 0..=n - length {
                for split in 1..length {
                    for (lhs, alternative) in self.productions() {
                        if let [Symbol::Nonterminal(left), Symbol::Nonterminal(right)] = alternative.as_slice() {
                            if table[split - 1][i].contains(left.as_str())
                                && table[length - split - 1][i + split].contains(right.as_str())
                            {
                                table[length - 1][i].insert(lhs);
                            }
                        }
                    }
                }
            }
        }

        table[n - 1][0].contains(self.start_symbol.as_str())
    }
}
