pub mod brown_noise;
#[cfg(test)]
pub(crate) mod fake;
pub mod output;
pub mod rain;
pub mod waves;

pub use output::{Locator, RodioBackend, SynthKind};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{log_error, log_info, log_warn};

const ENABLE_LOGS: bool = true;

pub const DEFAULT_VOLUME: f32 = 0.5;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("failed to start playback of '{track}': {reason}")]
    PlaybackStart { track: String, reason: String },

    #[error("unsupported sound locator: {0}")]
    UnsupportedLocator(String),

    #[error("audio output error: {0}")]
    Output(String),

    #[error("{0}")]
    Decode(String),

    #[error("no sound named '{0}'")]
    UnknownTrack(String),

    #[error("sound '{0}' appears more than once in the catalog")]
    DuplicateTrack(String),
}

/// One entry of the sound catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SoundTrack {
    pub id: String,
    pub locator: String,
    /// Opaque token for whatever renders the catalog.
    pub glyph: String,
}

impl SoundTrack {
    pub fn new(id: &str, locator: &str, glyph: &str) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
            glyph: glyph.into(),
        }
    }
}

pub fn default_catalog() -> Vec<SoundTrack> {
    vec![
        SoundTrack::new("Rain", "synth:rain", "cloud"),
        SoundTrack::new("Cafe", "synth:brown-noise", "coffee"),
        SoundTrack::new("Waves", "synth:waves", "waves"),
    ]
}

/// Ids are matched ignoring ASCII case, so they must be unique that way.
pub fn validate_catalog(tracks: &[SoundTrack]) -> Result<(), AudioError> {
    for (i, track) in tracks.iter().enumerate() {
        if tracks[..i]
            .iter()
            .any(|earlier| earlier.id.eq_ignore_ascii_case(&track.id))
        {
            return Err(AudioError::DuplicateTrack(track.id.clone()));
        }
    }
    Ok(())
}

/// Produces playback handles for track locators.
pub trait AudioBackend {
    type Handle: PlaybackHandle;

    /// Rejects locators that can never play, without touching any output.
    fn validate(&self, _locator: &str) -> Result<(), AudioError> {
        Ok(())
    }

    fn create_handle(&mut self, locator: &str) -> Result<Self::Handle, AudioError>;
}

/// A single playing (or ready to play) track. Dropping it releases it.
pub trait PlaybackHandle {
    fn set_loop(&mut self, looping: bool);
    fn set_volume(&mut self, volume: f32);
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
}

/// What a call to [`AudioSession::select`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Started,
    Stopped,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioSnapshot {
    pub active_track: Option<String>,
    pub volume: f32,
}

struct ActivePlayback<H> {
    track: SoundTrack,
    handle: H,
}

/// Owns the single looping background track and the volume applied to it.
///
/// The live handle is only reachable through this type. Re-selecting,
/// stopping or dropping the session releases it, and a previous handle is
/// always released before a new one is acquired.
pub struct AudioSession<B: AudioBackend> {
    backend: B,
    catalog: Vec<SoundTrack>,
    active: Option<ActivePlayback<B::Handle>>,
    volume: f32,
}

impl<B: AudioBackend> AudioSession<B> {
    pub fn new(backend: B, catalog: Vec<SoundTrack>, volume: f32) -> Self {
        Self {
            backend,
            catalog,
            active: None,
            volume: clamp_volume(volume).unwrap_or(DEFAULT_VOLUME),
        }
    }

    pub fn catalog(&self) -> &[SoundTrack] {
        &self.catalog
    }

    pub fn active_track(&self) -> Option<&SoundTrack> {
        self.active.as_ref().map(|active| &active.track)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn snapshot(&self) -> AudioSnapshot {
        AudioSnapshot {
            active_track: self.active_track().map(|track| track.id.clone()),
            volume: self.volume,
        }
    }

    pub fn find_track(&self, id: &str) -> Option<&SoundTrack> {
        self.catalog
            .iter()
            .find(|track| track.id.eq_ignore_ascii_case(id))
    }

    /// Looks up a catalog entry by id and selects it.
    pub fn select_by_id(&mut self, id: &str) -> Result<Selection, AudioError> {
        let track = self
            .find_track(id)
            .cloned()
            .ok_or_else(|| AudioError::UnknownTrack(id.to_string()))?;
        self.select(&track)
    }

    /// Starts `track` looping, or stops it if it is already the active one.
    ///
    /// A locator the backend rejects up front leaves the current track
    /// playing. Any later failure happens after the current track was
    /// released, and leaves no track active.
    pub fn select(&mut self, track: &SoundTrack) -> Result<Selection, AudioError> {
        if self.active_track().map(|active| active.id == track.id) == Some(true) {
            self.stop();
            return Ok(Selection::Stopped);
        }

        self.backend
            .validate(&track.locator)
            .map_err(|err| playback_start_failure(track, err))?;

        self.stop();

        let handle = self
            .acquire(track)
            .map_err(|err| playback_start_failure(track, err))?;

        log_info!("Playing {} ({})", track.id, track.locator);
        self.active = Some(ActivePlayback {
            track: track.clone(),
            handle,
        });
        Ok(Selection::Started)
    }

    fn acquire(&mut self, track: &SoundTrack) -> Result<B::Handle, AudioError> {
        let mut handle = self.backend.create_handle(&track.locator)?;
        handle.set_loop(true);
        handle.set_volume(self.volume);
        // A handle that failed to play is dropped here and never recorded
        handle.play()?;
        Ok(handle)
    }

    pub fn stop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.handle.pause();
            log_info!("Stopped {}", active.track.id);
        }
    }

    /// Stores `volume` clamped into `[0.0, 1.0]` and applies it to the live
    /// track, if any. NaN is ignored. Returns the volume now in effect.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let Some(clamped) = clamp_volume(volume) else {
            log_warn!("Ignoring non-numeric volume {}", volume);
            return self.volume;
        };
        if clamped != volume {
            log_warn!("Volume {} clamped to {}", volume, clamped);
        }

        self.volume = clamped;
        if let Some(active) = self.active.as_mut() {
            active.handle.set_volume(clamped);
        }
        clamped
    }

    /// Releases the live track. Also happens on drop.
    pub fn shutdown(&mut self) {
        self.stop();
    }
}

impl<B: AudioBackend> Drop for AudioSession<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn playback_start_failure(track: &SoundTrack, err: AudioError) -> AudioError {
    log_error!("Failed to start {}: {}", track.id, err);
    AudioError::PlaybackStart {
        track: track.id.clone(),
        reason: err.to_string(),
    }
}

fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}
