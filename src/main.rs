mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use itertools::Itertools;
use log::{info, LevelFilter};
use rand::prelude::*;
use thiserror::Error;

use chomsky::bridge::BridgeError;
use chomsky::generator::pattern::{PatternError, PatternSampler};
use chomsky::generator::{self, GenerateError};
use chomsky::parser::{self, CompileErrors};
use chomsky::symbol::{decompose_terminals, SymbolError};
use chomsky::{Grammar, GrammarError};
use cli::{Cli, Command};

#[derive(Debug, Error)]
enum RunError {
    #[error("{}", .0.iter().join("\n"))]
    Compile(CompileErrors),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl From<CompileErrors> for RunError {
    fn from(errors: CompileErrors) -> Self {
        RunError::Compile(errors)
    }
}

fn load_grammar(file: &Path, start: Option<&str>) -> Result<Grammar, RunError> {
    let grammar = parser::parse_file(file)?;
    info!("Loaded {} productions from {}", grammar.productions().count(), file.display());

    match start {
        Some(start) => Ok(grammar.with_start_symbol(start)?),
        None => Ok(grammar),
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn verdict(yes: bool) -> &'static str {
    if yes {
        "yes"
    } else {
        "no"
    }
}

fn run(command: Command) -> Result<(), RunError> {
    match command {
        Command::Cnf { file, start } => {
            let grammar = load_grammar(&file, start.as_deref())?;
            print!("{}", grammar.to_chomsky_normal_form());
        }
        Command::Classify { file } => {
            let grammar = load_grammar(&file, None)?;
            println!("{}", grammar.classify());
        }
        Command::Generate { file, start, amount, seed } => {
            let grammar = load_grammar(&file, None)?;
            let mut rng = seeded_rng(seed);

            for _ in 0..amount {
                let sentence = match &start {
                    Some(start) => generator::generate_with_override(&grammar, start, &mut rng)?,
                    None => generator::generate(&grammar, &mut rng)?,
                };
                println!("{}", sentence.concat());
            }
        }
        Command::Sample { patterns, amount, seed } => {
            let sampler = PatternSampler::new()?;
            let mut rng = seeded_rng(seed);

            for pattern in &patterns {
                for _ in 0..amount {
                    println!("{}: {}", pattern, sampler.sample(pattern, &mut rng)?);
                }
            }
        }
        Command::Derives { file, words, start } => {
            let grammar = load_grammar(&file, start.as_deref())?;
            for word in words {
                let symbols = decompose_terminals(&word, grammar.terminals())?;
                println!("{:?}: {}", word, verdict(grammar.derives(&symbols)));
            }
        }
        Command::ToAutomaton { file, strict } => {
            let grammar = load_grammar(&file, None)?;
            let automaton = if strict {
                grammar.to_automaton_strict()?
            } else {
                grammar.to_automaton()
            };
            print!("{}", automaton);
        }
        Command::Determinize { file, minimize } => {
            let automaton = parser::parse_automaton_file(&file)?;
            let dfa = if minimize { automaton.minimize() } else { automaton.to_dfa() };
            info!("{} states became {}", automaton.states().len(), dfa.states().len());
            print!("{}", dfa);
        }
        Command::ToGrammar { file } => {
            let automaton = parser::parse_automaton_file(&file)?;
            print!("{}", automaton.to_grammar()?);
        }
        Command::Accepts { file, words } => {
            let automaton = parser::parse_automaton_file(&file)?;
            for word in words {
                println!("{:?}: {}", word, verdict(automaton.accepts_str(&word)));
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}
