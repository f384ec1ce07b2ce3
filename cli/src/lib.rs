//! Library side of the `permit` binary, kept separate so the commands can
//! be driven from tests.

pub mod commands;
pub mod config;
pub mod state;

pub use commands::{execute, Command, Context};
pub use config::CliConfig;
