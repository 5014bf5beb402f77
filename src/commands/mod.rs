// src/commands/mod.rs
//! Command handlers for the debwrap CLI

mod generate;

pub use generate::cmd_gen;
