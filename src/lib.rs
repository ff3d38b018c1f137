//! `monkey` library crate.
//!
//! A tree-walking interpreter for the Monkey scripting language, run as
//! three phases: `lexer` turns source text into tokens, `parser` climbs them
//! into the shared AST (`ast`) with Pratt precedence handling, and
//! `evaluator` walks the AST against a lexically scoped environment. `repl`
//! wires the phases into an interactive loop.
pub mod ast;
pub mod evaluator;
pub mod fixtures;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod token;
