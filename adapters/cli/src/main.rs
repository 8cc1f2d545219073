#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that plays a scripted Iceman level in the terminal.

mod replay_transfer;
mod script;
mod session_file;

use std::{collections::VecDeque, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use iceman_core::{Level, LevelStatus, PlayerAction, Sound, StatusLine};
use iceman_system_session::{Host, LevelSession};
use tracing_subscriber::EnvFilter;

use crate::{replay_transfer::SessionReplay, session_file::SessionFile};

const DEFAULT_LIVES: u32 = 3;
const DEFAULT_TICKS: u64 = 600;

#[derive(Debug, Parser)]
#[command(name = "iceman", about = "Plays a scripted Iceman level", version)]
struct CliArgs {
    /// Zero-based level to play.
    #[arg(long)]
    level: Option<u32>,
    /// Seed for the world and spawning random sources.
    #[arg(long)]
    seed: Option<u64>,
    /// Lives shown on the status line.
    #[arg(long)]
    lives: Option<u32>,
    /// Maximum number of ticks to run.
    #[arg(long)]
    ticks: Option<u64>,
    /// Comma-separated actions, for example `down*12,spray,left*3`.
    #[arg(long)]
    script: Option<String>,
    /// TOML file providing defaults for the options above.
    #[arg(long, value_name = "FILE")]
    session: Option<PathBuf>,
    /// Replay string produced by `--emit-replay`.
    #[arg(long, value_name = "CODE")]
    replay: Option<String>,
    /// Print the replay string of the run once it ends.
    #[arg(long)]
    emit_replay: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Settings {
    level: u32,
    seed: u64,
    lives: u32,
    ticks: u64,
    actions: Vec<PlayerAction>,
}

impl Settings {
    fn resolve(args: &CliArgs) -> Result<Self> {
        let file = match &args.session {
            Some(path) => SessionFile::load(path)?,
            None => SessionFile::default(),
        };

        let script = args.script.as_deref().or(file.script.as_deref());
        let actions = match script {
            Some(script) => script::parse_script(script).context("failed to parse the script")?,
            None => Vec::new(),
        };
        let ticks = args.ticks.or(file.ticks).unwrap_or_else(|| {
            if actions.is_empty() {
                DEFAULT_TICKS
            } else {
                u64::try_from(actions.len()).unwrap_or(u64::MAX)
            }
        });

        let mut settings = Self {
            level: args.level.or(file.level).unwrap_or_default(),
            seed: args.seed.or(file.seed).unwrap_or_default(),
            lives: args.lives.or(file.lives).unwrap_or(DEFAULT_LIVES),
            ticks,
            actions,
        };

        if let Some(code) = &args.replay {
            let replay = SessionReplay::decode(code).context("failed to decode the replay")?;
            settings.level = replay.level;
            settings.seed = replay.seed;
            settings.ticks = replay.ticks;
            settings.actions = replay.actions;
        }

        Ok(settings)
    }
}

#[derive(Debug)]
struct ConsoleHost {
    script: VecDeque<PlayerAction>,
    played: Vec<PlayerAction>,
    lives: u32,
    score: u32,
    last_status: Option<String>,
}

impl ConsoleHost {
    fn new(actions: Vec<PlayerAction>, lives: u32) -> Self {
        Self {
            script: actions.into(),
            played: Vec::new(),
            lives,
            score: 0,
            last_status: None,
        }
    }
}

impl Host for ConsoleHost {
    fn action(&mut self) -> PlayerAction {
        let action = self.script.pop_front().unwrap_or_default();
        self.played.push(action);
        action
    }

    fn lives(&self) -> u32 {
        self.lives
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn show_status(&mut self, status: &StatusLine) {
        let line = status.to_string();
        if self.last_status.as_deref() != Some(line.as_str()) {
            println!("{line}");
            self.last_status = Some(line);
        }
    }

    fn play_sound(&mut self, sound: Sound) {
        println!("  sound: {}", sound.identifier());
    }

    fn award_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Entry point for the Iceman command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let settings = Settings::resolve(&args)?;
    tracing::info!(
        level = settings.level,
        seed = settings.seed,
        ticks = settings.ticks,
        scripted = settings.actions.len(),
        "session resolved"
    );

    let mut host = ConsoleHost::new(settings.actions.clone(), settings.lives);
    let mut session = LevelSession::new(Level::new(settings.level), settings.seed);
    let mut status = session.init(&mut host);
    let mut ticks_run = 0;
    while status == LevelStatus::Continue && ticks_run < settings.ticks {
        status = session.tick(&mut host);
        ticks_run += 1;
    }
    session.teardown();

    let outcome = match status {
        LevelStatus::Continue => "still in progress",
        LevelStatus::LevelFinished => "finished",
        LevelStatus::PlayerDied => "lost",
    };
    println!(
        "level {} {outcome} after {ticks_run} ticks with score {}",
        settings.level, host.score
    );

    if args.emit_replay {
        let replay = SessionReplay {
            level: settings.level,
            seed: settings.seed,
            ticks: ticks_run,
            actions: host.played,
        };
        println!(
            "{}",
            replay.encode().context("failed to encode the replay")?
        );
    }

    Ok(())
}
