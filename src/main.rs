//! Host binary: runs the built-in components against a headless screen.
//!
//! Operator input is read line by line from stdin (`tap 40 60`, `q`, `pin 12`,
//! `quit`; see [`parse_command`]) and fed to the loop through a channel. End of
//! input quits.

use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use tickbus::input::{parse_command, ChannelInput, Environment, InputSender, InputSignal};
use tickbus::observability::init_tracing;
use tickbus::ui::HeadlessSurface;
use tickbus::{builtin, initialize, Config};

/// Tick-driven app runtime.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tracing filter, overriding the configuration file.
    #[arg(long)]
    trace_level: Option<String>,

    /// Log to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,
}

impl Args {
    fn load_config(&self) -> tickbus::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if self.trace_level.is_some() {
            config.trace_level.clone_from(&self.trace_level);
        }
        if self.log_file.is_some() {
            config.log_file.clone_from(&self.log_file);
        }
        Ok(config)
    }
}

fn spawn_stdin_reader(sender: InputSender) {
    let spawned = std::thread::Builder::new()
        .name("stdin input".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                for signal in parse_command(&line) {
                    sender.send(signal);
                }
            }
            tracing::debug!("stdin closed");
            sender.send(InputSignal::Quit);
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "stdin input unavailable");
    }
}

fn main() -> std::process::ExitCode {
    let args = Args::parse();
    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tickbus: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    let (input, sender) = ChannelInput::channel();
    spawn_stdin_reader(sender);

    let environment = Environment::new(config.bindings.clone()).with_source(input);
    let surface = HeadlessSurface::new(config.screen);

    match initialize(&config, &builtin::modules(), environment, surface) {
        Ok(mut runtime) => {
            let ticks = runtime.run(args.ticks);
            tracing::info!(ticks, "exiting");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("tickbus: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
