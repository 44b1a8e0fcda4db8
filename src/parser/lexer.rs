use itertools::{Itertools, PeekingNext};

use super::{CompileErrorType, Result};

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    Equals,
    Or,
    // A bare word: a nonterminal in grammars, a state or keyword in automata
    Nonterminal(String),
    // A quoted word: a terminal in grammars, a transition label in automata
    Terminal(String),
}

fn ends_word(c: char) -> bool {
    c.is_whitespace() || matches!(c, '=' | '|' | '"' | ';')
}

pub fn lex_terminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    line.next(); // Consume open quote
    let token_text = line.peeking_take_while(|&c| c != '"').collect();

    // Check if there is a close quote and consume it if there is
    if line.next() != Some('"') {
        return Err(CompileErrorType::UnmatchedQuote);
    }

    Ok(Token::Terminal(token_text))
}

pub fn lex_nonterminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    Ok(Token::Nonterminal(line.peeking_take_while(|&c| !ends_word(c)).collect()))
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(&c) = line_chars.peek() {
        match c {
            // The rest of the line is a comment
            ';' => break,
            '=' => {
                line_chars.next();
                tokens.push(Token::Equals);
            }
            '|' => {
                line_chars.next();
                tokens.push(Token::Or);
            }
            '"' => tokens.push(lex_terminal(&mut line_chars)?),
            c if c.is_whitespace() => {
                line_chars.next();
            }
            _ => tokens.push(lex_nonterminal(&mut line_chars)?),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    #[test]
    fn lex_normal_terminal() {
        let lines = vec!["\"a\" B C", "\"b\"", "\"x\"\"y\"\"z\"", "\"\" rest"];
        // (result from the function, rest of the iterator)
        let answers = vec![
            (Token::Terminal("a".to_string()), " B C"),
            (Token::Terminal("b".to_string()), ""),
            (Token::Terminal("x".to_string()), "\"y\"\"z\""),
            (Token::Terminal("".to_string()), " rest"),
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_terminal(&mut chars).unwrap(), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_mismatched_terminal() {
        let lines = vec!["\"welcome", "\"a B C"];

        for line in lines {
            let mut chars = line.chars().peekable();

            assert_eq!(lex_terminal(&mut chars).unwrap_err(), CompileErrorType::UnmatchedQuote);
        }
    }

    #[test]
    fn lex_normal_nonterminal() {
        let lines = vec!["S0 A B", "q1", "A|B", "V1=x"];
        // (result from the function, rest of the iterator)
        let answers = vec![
            (Token::Nonterminal("S0".to_string()), " A B"),
            (Token::Nonterminal("q1".to_string()), ""),
            (Token::Nonterminal("A".to_string()), "|B"),
            (Token::Nonterminal("V1".to_string()), "=x"),
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_nonterminal(&mut chars).unwrap(), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_normal_line() {
        let lines = vec![
            "S = \"b\" A | A C",
            "C = \"\" ; nullable",
            "q0 \"a\" = q0 q1",
        ];
        let answers = vec![
            vec![
                Token::Nonterminal("S".to_string()),
                Token::Equals,
                Token::Terminal("b".to_string()),
                Token::Nonterminal("A".to_string()),
                Token::Or,
                Token::Nonterminal("A".to_string()),
                Token::Nonterminal("C".to_string()),
            ],
            vec![
                Token::Nonterminal("C".to_string()),
                Token::Equals,
                Token::Terminal("".to_string()),
            ],
            vec![
                Token::Nonterminal("q0".to_string()),
                Token::Terminal("a".to_string()),
                Token::Equals,
                Token::Nonterminal("q0".to_string()),
                Token::Nonterminal("q1".to_string()),
            ],
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(lex_line(line).unwrap(), answer)
        }
    }

    #[test]
    fn quoted_semicolon_is_not_a_comment() {
        assert_eq!(
            lex_line("S = \";\"").unwrap(),
            vec![
                Token::Nonterminal("S".to_string()),
                Token::Equals,
                Token::Terminal(";".to_string())
            ]
        );
    }
}
