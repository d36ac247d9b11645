//! taskdeck - query, batch-edit and review Trello cards from the terminal.
//!
//! The binary in `main.rs` parses [`Cli`], sets up logging and hands the
//! command to [`commands::run`]. Everything that talks to the board lives in
//! the `taskdeck-cards` crate; this crate only adds configuration, output
//! rendering and the terminal side of interactive sessions.

pub mod banner;
pub mod cli;
pub mod commands;
pub mod config;
pub mod render;
pub mod terminal;

pub use cli::{
    AddKind, BatchKind, Cli, Commands, DeleteKind, FilterArgs, GrepArgs, OutputArgs, ShowKind,
};
pub use config::{Overrides, Settings};
