use std::collections::{HashMap, HashSet};

/// Hands out nonterminal names that collide with nothing taken so far.
/// Owned by a single conversion, so separate runs never share counters.
#[derive(Debug, Default)]
pub(crate) struct NameAllocator {
    taken: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl NameAllocator {
    pub(crate) fn new<'a>(taken: impl IntoIterator<Item = &'a String>) -> Self {
        NameAllocator {
            taken: taken.into_iter().cloned().collect(),
            counters: HashMap::new(),
        }
    }

    /// `base` itself if free, otherwise `base` with zeroes appended.
    pub(crate) fn suffixed(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        while !self.taken.insert(name.clone()) {
            name.push('0');
        }
        name
    }

    /// The next free `prefix1`, `prefix2`, ...
    pub(crate) fn numbered(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(1);
        loop {
            let name = format!("{}{}", prefix, counter);
            *counter += 1;
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_until_free() {
        let taken = vec!["S0".to_string(), "S00".to_string()];
        let mut names = NameAllocator::new(&taken);

        assert_eq!(names.suffixed("S0"), "S000");
        assert_eq!(names.suffixed("X"), "X");
        assert_eq!(names.suffixed("X"), "X0");
    }

    #[test]
    fn numbered_names_skip_taken() {
        let taken = vec!["T1".to_string(), "T3".to_string()];
        let mut names = NameAllocator::new(&taken);

        assert_eq!(names.numbered("T"), "T2");
        assert_eq!(names.numbered("T"), "T4");
        assert_eq!(names.numbered("V"), "V1");
    }
}
