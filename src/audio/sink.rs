//! rodio-backed engine.
//!
//! `AudioOutput` owns the device stream and must stay on the thread that
//! opened it; `RodioEngine` only holds a handle to the stream's mixer plus the
//! current `Sink`, so it can be shared with the poller thread.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::{PlayerError, Result};

use super::engine::AudioEngine;

/// The opened default output device.
pub struct AudioOutput {
    stream: OutputStream,
}

impl AudioOutput {
    pub fn open() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::EngineUnavailable(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which would land on
        // top of the terminal UI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }

    /// Create an engine that plays through this output.
    pub fn engine(&self) -> RodioEngine {
        RodioEngine::new(self.stream.mixer().clone())
    }
}

pub struct RodioEngine {
    mixer: Mixer,
    sink: Mutex<Option<Sink>>,
    volume: Mutex<f32>,
}

impl RodioEngine {
    fn new(mixer: Mixer) -> Self {
        Self {
            mixer,
            sink: Mutex::new(None),
            volume: Mutex::new(1.0),
        }
    }

    fn sink(&self) -> MutexGuard<'_, Option<Sink>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn volume(&self) -> f32 {
        *self.volume.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn open_decoder(path: &Path) -> std::result::Result<Decoder<BufReader<File>>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())
}

impl AudioEngine for RodioEngine {
    fn load(&self, path: &Path) -> Result<()> {
        let source = open_decoder(path).map_err(|reason| PlayerError::Load {
            path: path.to_path_buf(),
            reason,
        })?;

        let sink = Sink::connect_new(&self.mixer);
        sink.set_volume(self.volume());
        sink.append(source);
        sink.pause();

        if let Some(old) = self.sink().replace(sink) {
            old.stop();
        }
        Ok(())
    }

    fn play(&self) -> Result<()> {
        match self.sink().as_ref() {
            Some(s) => {
                s.play();
                Ok(())
            }
            None => Err(PlayerError::EngineUnavailable("no track loaded".into())),
        }
    }

    fn pause(&self) {
        if let Some(s) = self.sink().as_ref() {
            s.pause();
        }
    }

    fn resume(&self) {
        if let Some(s) = self.sink().as_ref() {
            s.play();
        }
    }

    fn stop(&self) {
        if let Some(s) = self.sink().take() {
            s.stop();
        }
    }

    fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        if let Ok(mut v) = self.volume.lock() {
            *v = volume;
        }
        if let Some(s) = self.sink().as_ref() {
            s.set_volume(volume);
        }
    }

    fn set_position(&self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(PlayerError::Seek(format!("invalid position {seconds}")));
        }
        let guard = self.sink();
        let Some(s) = guard.as_ref() else {
            return Err(PlayerError::Seek("no track loaded".into()));
        };
        s.try_seek(Duration::from_secs_f64(seconds))
            .map_err(|e| PlayerError::Seek(e.to_string()))
    }

    fn position(&self) -> Result<f64> {
        match self.sink().as_ref() {
            Some(s) => Ok(s.get_pos().as_secs_f64()),
            None => Err(PlayerError::EngineUnavailable("no track loaded".into())),
        }
    }

    fn is_busy(&self) -> bool {
        self.sink().as_ref().is_some_and(|s| !s.empty())
    }

    fn duration(&self, path: &Path) -> Result<f64> {
        probe_duration(path)
    }
}

/// Read the total length of `path`: container properties first, then the
/// decoder's own estimate.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let decode_err = |reason: String| PlayerError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    if let Ok(tagged) = lofty::read_from_path(path) {
        let d = tagged.properties().duration();
        if !d.is_zero() {
            return Ok(d.as_secs_f64());
        }
    }

    let decoder = open_decoder(path).map_err(decode_err)?;
    decoder
        .total_duration()
        .map(|d| d.as_secs_f64())
        .ok_or_else(|| decode_err("length unknown".into()))
}
