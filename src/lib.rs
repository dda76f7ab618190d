pub mod audio;
pub mod commands;
pub mod settings;
pub mod timer;
mod utils;

use anyhow::{Context, Result};
use audio::{AudioBackend, AudioSession, AudioSnapshot, RodioBackend, Selection};
use commands::Command;
use log::{error, warn};
use serde::Serialize;
use settings::SettingsStore;
use timer::{
    SessionController, TickScheduler, TimerSnapshot, TokioTickScheduler, TICK_INTERVAL,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    runtime::Handle,
    sync::mpsc,
};

/// Everything the host exposes after each command or tick.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub timer: TimerSnapshot,
    pub audio: AudioSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

pub(crate) struct AppState<S: TickScheduler, B: AudioBackend> {
    timer: SessionController<S>,
    audio: AudioSession<B>,
    settings: SettingsStore,
}

impl<S: TickScheduler, B: AudioBackend> AppState<S, B> {
    fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            timer: self.timer.snapshot(),
            audio: self.audio.snapshot(),
        }
    }

    fn apply(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Toggle => self.timer.toggle(),
            Command::Start => self.timer.start(),
            Command::Pause => self.timer.pause(),
            Command::Reset(Some(mode)) => self.timer.reset(mode),
            Command::Reset(None) => self.timer.reset_current(),
            Command::Switch => self.timer.switch_mode(),
            Command::SetMode(mode) => self.timer.set_mode(mode),
            Command::Sound(id) => {
                if self.audio.select_by_id(&id)? == Selection::Stopped {
                    log::info!("{} toggled off", id);
                }
            }
            Command::StopSound => self.audio.stop(),
            Command::Volume(volume) => {
                let applied = self.audio.set_volume(volume);
                if let Err(err) = self.settings.update_volume(applied) {
                    warn!("Failed to persist volume: {:#}", err);
                }
            }
            Command::Status | Command::Sounds => {}
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

async fn serve(settings: SettingsStore) -> Result<()> {
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let timer = SessionController::new(
        TokioTickScheduler::new(Handle::current()),
        tick_tx,
        TICK_INTERVAL,
    );
    let audio = AudioSession::new(RodioBackend::new(), settings.tracks(), settings.volume());
    let mut app = AppState {
        timer,
        audio,
        settings,
    };

    emit(&app.status())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read command")? else {
                    break;
                };
                let command = match Command::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(err) => {
                        emit(&serde_json::json!({ "error": err.to_string() }))?;
                        continue;
                    }
                };

                let listing = command == Command::Sounds;
                match app.apply(command) {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) if listing => emit(&app.audio.catalog())?,
                    Ok(Flow::Continue) => emit(&app.status())?,
                    Err(err) => {
                        error!("{:#}", err);
                        emit(&serde_json::json!({ "error": format!("{:#}", err) }))?;
                    }
                }
            }
            Some(event) = tick_rx.recv() => {
                if app.timer.on_tick(event).is_some() {
                    emit(&app.status())?;
                }
            }
        }
    }

    app.audio.shutdown();
    Ok(())
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("focusloop starting up...");

    let settings = SettingsStore::from_env()?;

    // Single-threaded: ticks and commands share one event loop
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    runtime.block_on(serve(settings))
}
