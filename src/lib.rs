/*
    Context-free grammars, Chomsky Normal Form, and finite automata
*/

pub mod automaton;
pub mod bridge;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod parser;
pub mod symbol;

pub use automaton::Automaton;
pub use bridge::BridgeError;
pub use grammar::{Grammar, GrammarError, GrammarType};
pub use symbol::Symbol;
