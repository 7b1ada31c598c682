//! Sonora command-line player
//!
//! Interactive front end for `sonora-playback` and `sonora-files`: a command
//! registry, the REPL session wiring both libraries together, a console
//! observer, and layered configuration.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod observer;

pub use app::{resolve_track, SonoraApp};
pub use commands::{CommandHandler, CommandOutcome};
pub use config::{AppConfig, BackendKind};
pub use error::{CliError, Result};
pub use observer::ConsoleObserver;
