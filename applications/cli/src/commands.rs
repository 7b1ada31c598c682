//! Named command registry
//!
//! A command line is split on whitespace; the first word selects the
//! command and the rest become its arguments.

use crate::error::{CliError, Result};
use std::collections::BTreeMap;
use std::io::Write;

/// What the REPL should do after a command ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

/// Command callback: arguments after the command name, and the output sink
pub type CommandCallback = Box<dyn Fn(&[String], &mut dyn Write) -> Result<CommandOutcome> + Send>;

struct Command {
    help: String,
    callback: CommandCallback,
}

/// Registry of named commands, listed alphabetically by `help`
pub struct CommandHandler {
    commands: BTreeMap<String, Command>,
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler {
    /// Create a handler with the built-in `exit` and `quit` commands
    ///
    /// `help` is answered by the handler itself.
    pub fn new() -> Self {
        let mut handler = Self {
            commands: BTreeMap::new(),
        };
        handler.register("exit", "Exit the application", |_, _| {
            Ok(CommandOutcome::Exit)
        });
        handler.register("quit", "Exit the application", |_, _| {
            Ok(CommandOutcome::Exit)
        });
        handler
    }

    /// Register (or replace) a command
    pub fn register<F>(&mut self, name: &str, help: &str, callback: F)
    where
        F: Fn(&[String], &mut dyn Write) -> Result<CommandOutcome> + Send + 'static,
    {
        self.commands.insert(
            name.to_string(),
            Command {
                help: help.to_string(),
                callback: Box::new(callback),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        name == "help" || self.commands.contains_key(name)
    }

    /// Run one line of input
    ///
    /// Blank lines do nothing.
    pub fn execute(&self, line: &str, out: &mut dyn Write) -> Result<CommandOutcome> {
        let mut args = parse_command_line(line);
        if args.is_empty() {
            return Ok(CommandOutcome::Continue);
        }

        let name = args.remove(0);
        if name == "help" {
            self.print_help(out)?;
            return Ok(CommandOutcome::Continue);
        }

        let command = self
            .commands
            .get(&name)
            .ok_or_else(|| CliError::UnknownCommand(name.clone()))?;

        tracing::debug!("Executing '{}' with {:?}", name, args);
        (command.callback)(&args, out)
    }

    /// Print every command with its help text
    pub fn print_help(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Available commands:")?;
        writeln!(out, "  {:<15}Display available commands", "help")?;
        for (name, command) in &self.commands {
            writeln!(out, "  {:<15}{}", name, command.help)?;
        }
        Ok(())
    }
}

/// Split a line into whitespace-separated words
pub fn parse_command_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}
