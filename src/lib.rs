//! smash: a small interactive shell with job control.
//!
//! Lines are turned into a [`Command`](command::Command) by the factory in
//! `command`, external commands are forked by `launcher`, and background or
//! stopped processes live in the [`JobList`](jobs::JobList) owned by the
//! [`ShellContext`](shell::ShellContext). Signals only raise flags; the read
//! loop applies them between commands and while waiting on the foreground.

pub mod builtins;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod job_control;
pub mod jobs;
pub mod launcher;
pub mod parse;
pub mod shell;
pub mod signal;

#[cfg(test)]
mod test_util;

pub use cli::Cli;
pub use command::{Command, Control};
pub use config::Config;
pub use error::{Result, ShellError};
pub use jobs::{JobList, JobState};
pub use shell::ShellContext;
