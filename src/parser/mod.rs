/*
    This module parses grammar and automaton files
*/

mod automaton;
mod lexer;
mod verifier;

use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use thiserror::Error;

use crate::error_handling::*;
use crate::grammar::*;
use crate::symbol::EPSILON;
pub use automaton::{parse_automaton_file, parse_automaton_source};
use lexer::*;
use verifier::verify_rules;

#[derive(Debug, Error)]
pub enum CompileErrorType {
    // A line which should contain a rule does not
    #[error("Expected `=` after the rule name")]
    MissingEquals,
    // A rule has multiple equals signs
    #[error("Unexpected `=` encountered")]
    UnexpectedEquals,
    // The user starts a rule line with something other than a nonterminal
    #[error("Tried to define something other than a nonterminal")]
    MissingNonterminal,
    // There is an unclosed quote
    #[error("Unmatched quotes")]
    UnmatchedQuote,
    // An undefined token was used
    #[error("Could not find definition for `{0}`")]
    UndefinedNonterminal(String),
    // The file has no rules at all
    #[error("No rules found")]
    NoRules,
    // Somehow a full rewrite was parsed as a base alternative
    #[error("Rewrite was not fully split")]
    UnsplitRewrite,
    // A blank line got too deep into the parser
    #[error("Blank line encountered in rule parser")]
    UnexpectedBlankLine,
    // An automaton line that is neither `start`, `final` nor a transition
    #[error("Expected `start = q`, `final = q ...` or `q \"a\" = q ...`")]
    MalformedTransition,
    // An automaton file declares its start state twice, or never
    #[error("Expected exactly one `start = q` line")]
    StartState,
    // The rules parse but do not form a valid grammar
    #[error("Invalid grammar: {0}")]
    InvalidGrammar(#[from] GrammarError),
    // There was an issue with reading a file
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        use CompileErrorType::*;

        match (self, other) {
            (FileError(a), FileError(b)) => a.kind() == b.kind(),
            (UndefinedNonterminal(a), UndefinedNonterminal(b)) => a == b,
            (InvalidGrammar(a), InvalidGrammar(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: &Path) -> CompileError {
    CompileError {
        location: Location::file(file),
        error: CompileErrorType::FileError(error),
    }
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    rewrite: Rewrite,
    location: Location,
}

// `""`, `"ε"` and a bare `ε` all stand for the empty string
fn is_epsilon(token: &Token) -> bool {
    match token {
        Token::Terminal(s) => s.is_empty() || s == EPSILON,
        Token::Nonterminal(s) => s == EPSILON,
        _ => false,
    }
}

fn parse_alternative(tokens: &[Token]) -> Result<Alternative> {
    tokens
        .iter()
        .filter(|t| !is_epsilon(t))
        .map(|t| match t {
            Token::Equals => Err(CompileErrorType::UnexpectedEquals),
            Token::Or => Err(CompileErrorType::UnsplitRewrite),
            Token::Nonterminal(s) => Ok(Symbol::Nonterminal(s.clone())),
            Token::Terminal(s) => Ok(Symbol::Terminal(s.clone())),
        })
        .collect()
}

fn parse_rewrite(tokens: &[Token]) -> Result<Rewrite> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    // Try to get the token the rule is for. The match returns a result which
    // is then unwrapped with the ? operator
    let symbol = match tokens.first() {
        Some(Token::Nonterminal(s)) if s != EPSILON => Ok(s.clone()),
        Some(_) => Err(CompileErrorType::MissingNonterminal),
        None => Err(CompileErrorType::UnexpectedBlankLine),
    }?;

    if tokens.get(1) != Some(&Token::Equals) {
        return Err(CompileErrorType::MissingEquals);
    }

    let rewrite = parse_rewrite(&tokens[2..])?;

    Ok(Rule {
        symbol,
        rewrite,
        location,
    })
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| CompileError { location, error })
}

fn is_content_line(line: &String) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';')
}

// Numbers the lines from one and drops blank and comment lines, keeping
// read errors so they get reported
fn numbered_lines(
    lines: impl Iterator<Item = LineResult<String>>,
) -> impl Iterator<Item = (usize, LineResult<String>)> {
    lines
        .enumerate()
        .filter(|(_, line)| line.as_ref().map_or(true, is_content_line))
        .map(|(num, line)| (num + 1, line))
}

// Returns the lines of a file, with the io errors wrapped in CompileError and
// numbered
fn file_lines(path: &Path) -> FileResult<impl Iterator<Item = (usize, LineResult<String>)> + '_> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;
    let lines = std::io::BufReader::new(file)
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path)));

    Ok(numbered_lines(lines))
}

fn source_lines(text: &str) -> impl Iterator<Item = (usize, LineResult<String>)> + '_ {
    numbered_lines(text.lines().map(|line| Ok(line.to_string())))
}

// Runs `parse` on every line, keeping either every parsed value or every error
fn parse_all<T>(
    lines: impl Iterator<Item = (usize, LineResult<String>)>,
    path: &Path,
    parse: impl Fn(&str, Location) -> LineResult<T>,
) -> FileResult<Vec<T>> {
    let parsed_lines = lines.map(|(num, line_res)| line_res.and_then(|line| parse(&line, Location::line(path, num))));

    let (parsed, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(parsed)
}

fn grammar_from_rules(rule_list: Vec<Rule>, path: &Path) -> FileResult<Grammar> {
    let whole_file = |error: CompileErrorType| vec![CompileError { location: Location::file(path), error }];

    let Some(start_symbol) = rule_list.first().map(|rule| rule.symbol.clone()) else {
        return Err(whole_file(CompileErrorType::NoRules));
    };

    verify_rules(&rule_list)?;

    let nonterminals: IndexSet<String> = rule_list.iter().map(|rule| rule.symbol.clone()).collect();
    let terminals: IndexSet<String> = rule_list
        .iter()
        .flat_map(|rule| rule.rewrite.iter().flatten())
        .filter(|symbol| symbol.is_terminal())
        .map(|symbol| symbol.name().to_string())
        .collect();

    // Repeated rules for one nonterminal add to its alternatives
    let mut rules = IndexMap::<String, Rewrite>::with_capacity(nonterminals.len());
    for rule in rule_list {
        rules.entry(rule.symbol).or_default().extend(rule.rewrite);
    }

    Grammar::new(nonterminals, terminals, start_symbol, rules).map_err(|e| whole_file(e.into()))
}

/// Parses grammar text. `path` only labels the error locations.
pub fn parse_source(text: &str, path: &Path) -> FileResult<Grammar> {
    let rules = parse_all(source_lines(text), path, parse_lex_line)?;
    grammar_from_rules(rules, path)
}

pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let rules = parse_all(file_lines(path)?, path, parse_lex_line)?;
    grammar_from_rules(rules, path)
}
