use std::{fs::File, io::BufReader, path::PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{
    brown_noise::BrownNoise, rain::RainSound, waves::WavesSound, AudioBackend, AudioError,
    PlaybackHandle,
};
use crate::log_info;

const ENABLE_LOGS: bool = true;

const SYNTH_PREFIX: &str = "synth:";

type BoxedSource = Box<dyn Source<Item = f32> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthKind {
    Rain,
    BrownNoise,
    Waves,
}

/// Where a track's audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// `synth:<name>`, generated in process
    Synth(SynthKind),
    /// A local file rodio can decode
    File(PathBuf),
}

impl Locator {
    pub fn parse(raw: &str) -> Result<Self, AudioError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AudioError::UnsupportedLocator(raw.to_string()));
        }

        if let Some(name) = raw.strip_prefix(SYNTH_PREFIX) {
            let kind = match name.to_lowercase().as_str() {
                "rain" => SynthKind::Rain,
                "brown-noise" | "brown" => SynthKind::BrownNoise,
                "waves" => SynthKind::Waves,
                _ => return Err(AudioError::UnsupportedLocator(raw.to_string())),
            };
            return Ok(Locator::Synth(kind));
        }

        if raw.contains("://") {
            return Err(AudioError::UnsupportedLocator(raw.to_string()));
        }

        Ok(Locator::File(PathBuf::from(raw)))
    }

    /// Builds a fresh source. Generated sources never end, so `looping` only
    /// matters for files.
    fn open(&self, looping: bool) -> Result<BoxedSource, AudioError> {
        match self {
            Locator::Synth(SynthKind::Rain) => Ok(Box::new(RainSound::new())),
            Locator::Synth(SynthKind::BrownNoise) => Ok(Box::new(BrownNoise::new())),
            Locator::Synth(SynthKind::Waves) => Ok(Box::new(WavesSound::new())),
            Locator::File(path) => {
                let file = File::open(path).map_err(|e| {
                    AudioError::Decode(format!("failed to open {}: {}", path.display(), e))
                })?;
                let decoder = Decoder::new(BufReader::new(file)).map_err(|e| {
                    AudioError::Decode(format!("failed to decode {}: {}", path.display(), e))
                })?;
                if looping {
                    Ok(Box::new(decoder.repeat_infinite().convert_samples::<f32>()))
                } else {
                    Ok(Box::new(decoder.convert_samples::<f32>()))
                }
            }
        }
    }
}

/// Plays tracks through the default output device.
///
/// The output stream is opened on first use and kept for the lifetime of the
/// backend; every handle gets its own sink on that stream.
pub struct RodioBackend {
    stream: Option<(OutputStream, OutputStreamHandle)>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self { stream: None }
    }

    fn ensure_stream(&mut self) -> Result<&OutputStreamHandle, AudioError> {
        if self.stream.is_none() {
            let opened = OutputStream::try_default().map_err(|e| {
                AudioError::Output(format!("failed to create audio output stream: {}", e))
            })?;
            log_info!("Opened default audio output stream");
            self.stream = Some(opened);
        }
        match &self.stream {
            Some((_, handle)) => Ok(handle),
            None => Err(AudioError::Output("audio output stream unavailable".into())),
        }
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioBackend {
    type Handle = RodioHandle;

    fn validate(&self, locator: &str) -> Result<(), AudioError> {
        Locator::parse(locator).map(|_| ())
    }

    fn create_handle(&mut self, locator: &str) -> Result<RodioHandle, AudioError> {
        let locator = Locator::parse(locator)?;
        let stream = self.ensure_stream()?;
        let sink = Sink::try_new(stream)
            .map_err(|e| AudioError::Output(format!("failed to create audio sink: {}", e)))?;
        // Nothing should sound until play()
        sink.pause();

        Ok(RodioHandle {
            sink,
            locator,
            looping: false,
            loaded: false,
        })
    }
}

/// One sink playing one track. Dropping the handle stops its sink.
pub struct RodioHandle {
    sink: Sink,
    locator: Locator,
    looping: bool,
    loaded: bool,
}

impl PlaybackHandle for RodioHandle {
    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if !self.loaded {
            let source = self.locator.open(self.looping)?;
            self.sink.append(source);
            self.loaded = true;
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
