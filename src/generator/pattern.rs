/*
    Sampling strings from small regular expressions. Only groups of
    alternatives and a handful of quantifiers are understood:

        (X|Y)^n   n picks from the group
        (X|Y)*    zero to MAX_KLEENE_REPETITIONS picks from the group
        X*        zero to MAX_KLEENE_REPETITIONS copies of one character
        X?        one character or group, kept or dropped
        (X|Y)     one pick from the group

    Each round rewrites the forms in that order, innermost group first, and
    rounds repeat until the text stops changing. Anything else is copied
    through as literal text.
*/

use log::debug;
use rand::prelude::*;
use regex::{Captures, Regex};
use thiserror::Error;

/// Upper bound on the repetitions picked for a `*`.
pub const MAX_KLEENE_REPETITIONS: usize = 5;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Repetition count `{0}` is too large")]
    Repetitions(String),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub struct PatternSampler {
    repeated_group: Regex,
    starred_group: Regex,
    starred_symbol: Regex,
    optional: Regex,
    group: Regex,
}

impl PatternSampler {
    pub fn new() -> Result<Self, PatternError> {
        Ok(PatternSampler {
            repeated_group: Regex::new(r"\(([^()]+)\)\^([0-9]+)")?,
            starred_group: Regex::new(r"\(([^()]+)\)\*")?,
            starred_symbol: Regex::new(r"([^()*])\*")?,
            optional: Regex::new(r"(\([^()]+\)|[^()?])\?")?,
            group: Regex::new(r"\(([^()]+)\)([\^*?]?)")?,
        })
    }

    /// Returns one random string described by `pattern`.
    pub fn sample<R: Rng + ?Sized>(&self, pattern: &str, rng: &mut R) -> Result<String, PatternError> {
        debug!("Sampling {}", pattern);
        let mut text = pattern.to_string();

        loop {
            let before = text.clone();

            while let Some(expanded) = self.expand_repeated_group(&text, rng)? {
                text = expanded;
            }
            while let Some(expanded) = self.expand_starred(&text, rng) {
                text = expanded;
            }
            while let Some(expanded) = self.expand_optional(&text, rng) {
                text = expanded;
            }
            while let Some(expanded) = self.expand_group(&text, rng) {
                text = expanded;
            }

            if text == before {
                return Ok(text);
            }
        }
    }

    fn expand_repeated_group<R: Rng + ?Sized>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> Result<Option<String>, PatternError> {
        let Some(captures) = self.repeated_group.captures(text) else {
            return Ok(None);
        };

        let count: usize = captures[2]
            .parse()
            .map_err(|_| PatternError::Repetitions(captures[2].to_string()))?;
        let expanded = splice(text, &captures, &pick_many(&captures[1], count, rng));
        debug!("({})^{} -> {}", &captures[1], count, expanded);
        Ok(Some(expanded))
    }

    fn expand_starred<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Option<String> {
        if let Some(captures) = self.starred_group.captures(text) {
            let count = rng.gen_range(0..=MAX_KLEENE_REPETITIONS);
            let expanded = splice(text, &captures, &pick_many(&captures[1], count, rng));
            debug!("({})* repeated {} times -> {}", &captures[1], count, expanded);
            return Some(expanded);
        }

        let captures = self.starred_symbol.captures(text)?;
        let count = rng.gen_range(0..=MAX_KLEENE_REPETITIONS);
        let expanded = splice(text, &captures, &captures[1].repeat(count));
        debug!("{}* repeated {} times -> {}", &captures[1], count, expanded);
        Some(expanded)
    }

    // A kept group stays in parentheses for the group pass to resolve
    fn expand_optional<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Option<String> {
        let captures = self.optional.captures(text)?;
        let keep: bool = rng.gen();

        let expanded = splice(text, &captures, if keep { &captures[1] } else { "" });
        debug!("{}? {} -> {}", &captures[1], if keep { "kept" } else { "dropped" }, expanded);
        Some(expanded)
    }

    // A group still followed by a quantifier had a malformed count and is
    // left as written
    fn expand_group<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Option<String> {
        let captures = self
            .group
            .captures_iter(text)
            .find(|captures| captures[2].is_empty())?;

        let expanded = splice(text, &captures, &pick_many(&captures[1], 1, rng));
        debug!("({}) -> {}", &captures[1], expanded);
        Some(expanded)
    }
}

// Concatenates `count` uniform picks among the `|`-separated alternatives.
// An empty alternative, as in `(a|)`, stands for the empty string
fn pick_many<R: Rng + ?Sized>(group: &str, count: usize, rng: &mut R) -> String {
    let alternatives: Vec<&str> = group.split('|').collect();
    (0..count)
        .map(|_| alternatives.choose(rng).copied().unwrap_or_default())
        .collect()
}

// Replaces the whole match with `replacement`
fn splice(text: &str, captures: &Captures, replacement: &str) -> String {
    let Some(matched) = captures.get(0) else {
        return text.to_string();
    };
    format!("{}{}{}", &text[..matched.start()], replacement, &text[matched.end()..])
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use rand::rngs::StdRng;

    use super::*;

    fn samples(pattern: &str, amount: u64) -> Vec<String> {
        let sampler = PatternSampler::new().unwrap();
        (0..amount)
            .map(|seed| sampler.sample(pattern, &mut StdRng::seed_from_u64(seed)).unwrap())
            .collect()
    }

    #[test]
    fn samples_match_the_pattern() {
        let patterns = vec!["abc", "(a|b)^3", "x(ab|c)*y", "a*b", "ab?c", "(x|yz)w", "((a|b)|c)^2", "(ab|c)?d"];
        let languages = vec![
            "^abc$",
            "^(a|b){3}$",
            "^x(ab|c){0,5}y$",
            "^a{0,5}b$",
            "^ab?c$",
            "^(x|yz)w$",
            "^(a|b|c){2}$",
            "^(ab|c)?d$",
        ];

        for (pattern, language) in zip(patterns, languages) {
            let language = Regex::new(language).unwrap();
            for sample in samples(pattern, 50) {
                assert!(language.is_match(&sample), "{:?} gave {:?}", pattern, sample);
            }
        }
    }

    #[test]
    fn choices_vary_across_seeds() {
        let optional = samples("ab?c", 50);
        assert!(optional.contains(&"abc".to_string()));
        assert!(optional.contains(&"ac".to_string()));

        let starred = samples("a*", 100);
        assert!(starred.contains(&String::new()));
        assert!(starred.contains(&"aaaaa".to_string()));
        assert!(starred.iter().all(|sample| sample.len() <= MAX_KLEENE_REPETITIONS));
    }

    #[test]
    fn same_seed_same_string() {
        let sampler = PatternSampler::new().unwrap();
        let pattern = "(a|b|c)^4(d|e)*f?";

        let first = sampler.sample(pattern, &mut StdRng::seed_from_u64(7)).unwrap();
        let second = sampler.sample(pattern, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_alternative() {
        for sample in samples("(a|)^2", 30) {
            assert!(["", "a", "aa"].contains(&sample.as_str()), "gave {:?}", sample);
        }
    }

    #[test]
    fn huge_repetition_count() {
        let sampler = PatternSampler::new().unwrap();
        let error = sampler
            .sample("(a)^99999999999999999999999", &mut StdRng::seed_from_u64(0))
            .unwrap_err();

        assert!(matches!(error, PatternError::Repetitions(count) if count == "99999999999999999999999"));
    }
}
