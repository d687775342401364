//! Command-line interface
//!
//! Argument definitions live in [`args`]; [`commands`] dispatches them.

pub mod args;
pub mod commands;
