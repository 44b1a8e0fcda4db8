use std::path::Path;

use super::lexer::{lex_line, Token};
use super::{file_lines, parse_all, source_lines, CompileError, CompileErrorType, FileResult, LineResult, Result};
use crate::automaton::Automaton;
use crate::error_handling::Location;

#[derive(Debug, PartialEq)]
enum Line {
    Start(String),
    Final(Vec<String>),
    Transition {
        from: String,
        label: String,
        targets: Vec<String>,
    },
}

fn states(tokens: &[Token]) -> Result<Vec<String>> {
    tokens
        .iter()
        .map(|token| match token {
            Token::Nonterminal(state) => Ok(state.clone()),
            Token::Equals => Err(CompileErrorType::UnexpectedEquals),
            _ => Err(CompileErrorType::MalformedTransition),
        })
        .collect()
}

fn parse_line(tokens: &[Token]) -> Result<Line> {
    if !tokens.contains(&Token::Equals) {
        return Err(if tokens.is_empty() {
            CompileErrorType::UnexpectedBlankLine
        } else {
            CompileErrorType::MissingEquals
        });
    }

    match tokens {
        [Token::Nonterminal(keyword), Token::Equals, Token::Nonterminal(state)] if keyword == "start" => {
            Ok(Line::Start(state.clone()))
        }
        [Token::Nonterminal(keyword), Token::Equals, rest @ ..] if keyword == "final" => Ok(Line::Final(states(rest)?)),
        [Token::Nonterminal(from), Token::Terminal(label), Token::Equals, rest @ ..] if !rest.is_empty() => {
            Ok(Line::Transition {
                from: from.clone(),
                label: label.clone(),
                targets: states(rest)?,
            })
        }
        _ => Err(CompileErrorType::MalformedTransition),
    }
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Line> {
    lex_line(line)
        .and_then(|tokens| parse_line(&tokens))
        .map_err(|error| CompileError { location, error })
}

fn automaton_from_lines(lines: Vec<Line>, path: &Path) -> FileResult<Automaton> {
    let starts: Vec<&String> = lines
        .iter()
        .filter_map(|line| match line {
            Line::Start(state) => Some(state),
            _ => None,
        })
        .collect();

    let [start] = starts.as_slice() else {
        return Err(vec![CompileError {
            location: Location::file(path),
            error: CompileErrorType::StartState,
        }]);
    };

    let mut automaton = Automaton::new(start.as_str());
    for line in &lines {
        match line {
            Line::Start(_) => {}
            Line::Final(states) => {
                for state in states {
                    automaton.add_final_state(state.as_str());
                }
            }
            Line::Transition { from, label, targets } => {
                for target in targets {
                    automaton.add_transition(from.as_str(), label, target.as_str());
                }
            }
        }
    }

    Ok(automaton)
}

/// Parses automaton text. `path` only labels the error locations.
pub fn parse_automaton_source(text: &str, path: &Path) -> FileResult<Automaton> {
    let lines = parse_all(source_lines(text), path, parse_lex_line)?;
    automaton_from_lines(lines, path)
}

pub fn parse_automaton_file(path: &Path) -> FileResult<Automaton> {
    let lines = parse_all(file_lines(path)?, path, parse_lex_line)?;
    automaton_from_lines(lines, path)
}
