use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Log more details (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the grammar in Chomsky Normal Form
    Cnf {
        /// File containing the grammar
        file: PathBuf,

        /// Start symbol (default: first in the file)
        #[arg(short, long, value_name = "SYMBOL")]
        start: Option<String>,
    },

    /// Print where the grammar sits in the Chomsky hierarchy
    Classify {
        /// File containing the grammar
        file: PathBuf,
    },

    /// Generate random sentences from the grammar
    Generate {
        /// File containing the grammar
        file: PathBuf,

        /// Start symbol (default: first in the file)
        #[arg(short, long, value_name = "SYMBOL")]
        start: Option<String>,

        /// Amount to generate
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32,

        /// Seed for reproducible output (default: random)
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },

    /// Generate random strings from small regular expressions
    Sample {
        /// Patterns using `(X|Y)`, `(X|Y)^n`, `(X|Y)*`, `X*` and `X?`
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Amount to generate per pattern
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32,

        /// Seed for reproducible output (default: random)
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },

    /// Check whether the grammar derives each word
    Derives {
        /// File containing the grammar
        file: PathBuf,

        /// Words, written as concatenated terminals
        #[arg(required = true)]
        words: Vec<String>,

        /// Start symbol (default: first in the file)
        #[arg(short, long, value_name = "SYMBOL")]
        start: Option<String>,
    },

    /// Print the automaton of a right-linear grammar
    ToAutomaton {
        /// File containing the grammar
        file: PathBuf,

        /// Fail on productions that are not right-linear instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Print the deterministic automaton equivalent to an automaton file
    Determinize {
        /// File containing the automaton
        file: PathBuf,

        /// Also merge equivalent states
        #[arg(short, long)]
        minimize: bool,
    },

    /// Print the right-linear grammar of an automaton file
    ToGrammar {
        /// File containing the automaton
        file: PathBuf,
    },

    /// Check whether the automaton accepts each word
    Accepts {
        /// File containing the automaton
        file: PathBuf,

        /// Words, written as concatenated alphabet symbols
        #[arg(required = true)]
        words: Vec<String>,
    },
}
