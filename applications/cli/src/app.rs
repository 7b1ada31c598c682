//! Interactive player session
//!
//! Wires the playback controller and the library provider into a
//! [`CommandHandler`] and runs the read-eval-print loop.

use crate::commands::{CommandHandler, CommandOutcome};
use crate::config::{AppConfig, BackendKind};
use crate::error::{CliError, Result};
use crate::observer::ConsoleObserver;
use sonora_files::{FileProvider, LocalFileProvider};
use sonora_playback::{
    PlaybackState, Player, ProbeBackend, RenderBackend, RepeatMode, SimulatedBackend,
};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Prompt printed before each line of input
pub const PROMPT: &str = "sonora> ";

/// One player session
pub struct SonoraApp {
    handler: CommandHandler,
    player: Arc<Player>,
    provider: LocalFileProvider,
}

impl SonoraApp {
    /// Build a session from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let backend: Arc<dyn RenderBackend> = match config.backend {
            BackendKind::Probe => Arc::new(ProbeBackend::new()),
            BackendKind::Simulated => Arc::new(SimulatedBackend::new()),
        };
        let player = Arc::new(Player::new(config.playback.clone(), backend)?);
        let provider = LocalFileProvider::new(&config.library.path);

        tracing::info!(
            "Library at {} using {} backend",
            config.library.path.display(),
            config.backend
        );

        Ok(Self::with_parts(player, provider, config.clone()))
    }

    /// Build a session around an existing player
    pub fn with_parts(player: Arc<Player>, provider: LocalFileProvider, config: AppConfig) -> Self {
        let mut handler = CommandHandler::new();
        register_commands(&mut handler, &player, &provider, config);
        Self {
            handler,
            player,
            provider,
        }
    }

    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    pub fn provider(&self) -> &LocalFileProvider {
        &self.provider
    }

    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    /// Print track and state changes to stdout
    pub fn attach_console(&self) {
        self.player.add_observer(Arc::new(ConsoleObserver::stdout()));
    }

    /// Scan the library and report what was found
    pub fn scan_library(&self, out: &mut dyn Write) -> Result<usize> {
        writeln!(out, "Scanning library at: {}", self.provider.root().display())?;
        let files = self.provider.scan_audio_files("")?;
        writeln!(out, "Found {} audio files", files.len())?;
        Ok(files.len())
    }

    /// Execute one command line
    pub fn execute(&self, line: &str, out: &mut dyn Write) -> Result<CommandOutcome> {
        self.handler.execute(line, out)
    }

    /// Read commands until `exit`/`quit` or end of input
    ///
    /// Command errors are printed and the loop continues.
    pub fn run(&self, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Sonora Music Player")?;
        writeln!(out, "Type 'help' for available commands")?;

        let mut line = String::new();
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            match self.handler.execute(&line, out) {
                Ok(CommandOutcome::Continue) => {}
                Ok(CommandOutcome::Exit) => break,
                Err(e) => {
                    tracing::debug!("Command failed: {}", e);
                    writeln!(out, "{}", e)?;
                }
            }
        }

        self.player.stop();
        Ok(())
    }
}

/// Player path for a track argument
///
/// Library files resolve to their full path; anything else is passed
/// through unchanged.
pub fn resolve_track(provider: &LocalFileProvider, arg: &str) -> String {
    provider
        .locate(arg)
        .map_or_else(|| arg.to_string(), |path| path.display().to_string())
}

fn required<'a>(args: &'a [String], usage: &str) -> Result<&'a str> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| CliError::MissingArgument {
            usage: usage.to_string(),
        })
}

fn parse_shuffle(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn register_commands(
    handler: &mut CommandHandler,
    player: &Arc<Player>,
    provider: &LocalFileProvider,
    config: AppConfig,
) {
    // Music control commands
    {
        let player = Arc::clone(player);
        let provider = provider.clone();
        handler.register("play", "Play a file (play <file>)", move |args, out| {
            let arg = required(args, "play <file>")?;
            player.play(resolve_track(&provider, arg));
            writeln!(out, "Playing: {}", arg)?;
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("pause", "Pause playback", move |_, out| {
            player.pause();
            writeln!(out, "Playback paused")?;
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("resume", "Resume playback", move |_, out| {
            player.resume();
            writeln!(out, "Playback resumed")?;
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("stop", "Stop playback", move |_, out| {
            player.stop();
            writeln!(out, "Playback stopped")?;
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("next", "Play next track", move |_, out| {
            player.next();
            match player.current_track() {
                Some(track) => writeln!(out, "Playing next track: {}", track)?,
                None => writeln!(out, "End of queue")?,
            }
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("previous", "Restart the current track", move |_, out| {
            player.previous();
            match player.current_track() {
                Some(track) => writeln!(out, "Restarting: {}", track)?,
                None => writeln!(out, "Nothing is playing")?,
            }
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("seek", "Seek to a position (seek <seconds>)", move |args, out| {
            let usage = "seek <seconds>";
            let arg = required(args, usage)?;
            let seconds: f64 = arg
                .parse()
                .ok()
                .filter(|s: &f64| s.is_finite())
                .ok_or_else(|| CliError::InvalidArgument {
                    value: arg.to_string(),
                    reason: "expected a number of seconds".to_string(),
                    usage: usage.to_string(),
                })?;
            player.seek(seconds);
            writeln!(out, "Position: {:.1}s", player.current_position())?;
            Ok(CommandOutcome::Continue)
        });
    }

    // Queue management
    {
        let player = Arc::clone(player);
        let provider = provider.clone();
        handler.register("enqueue", "Add file to playback queue (enqueue <file>)", move |args, out| {
            let arg = required(args, "enqueue <file>")?;
            player.enqueue(resolve_track(&provider, arg));
            writeln!(out, "Added to queue: {}", arg)?;
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("clearqueue", "Clear playback queue", move |_, out| {
            player.clear_queue();
            writeln!(out, "Queue cleared")?;
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("queue", "Show the playback queue", move |_, out| {
            let queue = player.queue();
            if queue.is_empty() {
                writeln!(out, "Queue is empty")?;
                return Ok(CommandOutcome::Continue);
            }

            let playing = player.state() != PlaybackState::Stopped;
            for (index, track) in queue.iter().enumerate() {
                let marker = if index == 0 && playing { " (now playing)" } else { "" };
                writeln!(out, "  {}. {}{}", index + 1, track, marker)?;
            }
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("status", "Show playback status", move |_, out| {
            let status = player.status();
            writeln!(out, "State:    {}", status.state)?;
            writeln!(
                out,
                "Track:    {}",
                status.current_track.as_deref().unwrap_or("-")
            )?;
            writeln!(
                out,
                "Position: {:.1}s / {:.1}s",
                status.position, status.duration
            )?;
            writeln!(out, "Repeat:   {}", status.repeat)?;
            writeln!(out, "Shuffle:  {}", on_off(status.shuffle))?;
            writeln!(out, "Queue:    {} tracks", status.queue_len)?;
            Ok(CommandOutcome::Continue)
        });
    }

    // Player settings
    {
        let player = Arc::clone(player);
        handler.register("repeat", "Set repeat mode (none|single|all)", move |args, out| {
            let usage = "repeat <none|single|all>";
            let arg = required(args, usage)?;
            let mode = arg.parse::<RepeatMode>().map_err(|e| CliError::InvalidArgument {
                value: arg.to_string(),
                reason: e.to_string(),
                usage: usage.to_string(),
            })?;
            player.set_repeat_mode(mode);
            writeln!(out, "Repeat mode set to: {}", mode)?;
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let player = Arc::clone(player);
        handler.register("shuffle", "Set shuffle mode (on|off)", move |args, out| {
            let usage = "shuffle <on|off>";
            let arg = required(args, usage)?;
            let enabled = parse_shuffle(arg).ok_or_else(|| CliError::InvalidArgument {
                value: arg.to_string(),
                reason: "expected on or off".to_string(),
                usage: usage.to_string(),
            })?;
            player.set_shuffle_mode(enabled);
            writeln!(out, "Shuffle mode: {}", on_off(enabled))?;
            Ok(CommandOutcome::Continue)
        });
    }

    // File system commands
    {
        let provider = provider.clone();
        handler.register("ls", "List files in directory (ls [dir])", move |args, out| {
            let dir = args.first().map_or("", String::as_str);
            let files = provider.list_files(dir)?;

            let label = if dir.is_empty() { "root directory" } else { dir };
            writeln!(out, "Contents of {}:", label)?;
            for file in &files {
                let prefix = if file.is_directory { "[DIR] " } else { "      " };
                writeln!(out, "{}{}", prefix, file.name)?;
            }
            if files.is_empty() {
                writeln!(out, "  (empty directory)")?;
            }
            Ok(CommandOutcome::Continue)
        });
    }

    {
        let provider = provider.clone();
        handler.register("scan", "Find audio files (scan [dir])", move |args, out| {
            let dir = args.first().map_or("", String::as_str);
            let files = provider.scan_audio_files(dir)?;
            for file in &files {
                let shown = file.strip_prefix(provider.root()).unwrap_or(file.as_path());
                writeln!(out, "  {}", shown.display())?;
            }
            writeln!(out, "Found {} audio files", files.len())?;
            Ok(CommandOutcome::Continue)
        });
    }

    handler.register("config", "Show the effective configuration", move |_, out| {
        write!(out, "{}", config.to_toml()?)?;
        Ok(CommandOutcome::Continue)
    });
}
