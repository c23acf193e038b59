//! Discli CLI library module.
//!
//! Loads a command tree from a TOML file and drives it from the terminal:
//! printing the tree, printing usage, dispatching single commands and a
//! line-oriented REPL. Every executable command echoes its parsed
//! parameters as JSON.

pub mod cli;
