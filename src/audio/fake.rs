//! Scriptable in-memory engine for controller and poller tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{PlayerError, Result};

use super::engine::AudioEngine;

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub loaded: Option<PathBuf>,
    pub playing: bool,
    pub position: f64,
    pub volume: f32,
    /// Set by tests to simulate the track reaching its end.
    pub finished: bool,
    pub durations: HashMap<PathBuf, f64>,
    pub unloadable: HashSet<PathBuf>,
    pub seek_fails: bool,
    pub position_fails: bool,
    pub probes: usize,
    pub seeks: Vec<f64>,
    pub stops: usize,
}

#[derive(Debug, Default)]
pub(crate) struct FakeEngine {
    state: Mutex<FakeState>,
}

impl FakeEngine {
    pub fn with_durations(durations: &[(&str, f64)]) -> Self {
        let engine = Self::default();
        {
            let mut s = engine.state();
            s.volume = 1.0;
            for (p, d) in durations {
                s.durations.insert(PathBuf::from(p), *d);
            }
        }
        engine
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl AudioEngine for FakeEngine {
    fn load(&self, path: &Path) -> Result<()> {
        let mut s = self.state();
        if s.unloadable.contains(path) {
            return Err(PlayerError::Load {
                path: path.to_path_buf(),
                reason: "unsupported format".into(),
            });
        }
        s.loaded = Some(path.to_path_buf());
        s.playing = false;
        s.position = 0.0;
        s.finished = false;
        Ok(())
    }

    fn play(&self) -> Result<()> {
        let mut s = self.state();
        if s.loaded.is_none() {
            return Err(PlayerError::EngineUnavailable("no track loaded".into()));
        }
        s.playing = true;
        Ok(())
    }

    fn pause(&self) {
        self.state().playing = false;
    }

    fn resume(&self) {
        let mut s = self.state();
        if s.loaded.is_some() {
            s.playing = true;
        }
    }

    fn stop(&self) {
        let mut s = self.state();
        s.loaded = None;
        s.playing = false;
        s.position = 0.0;
        s.stops += 1;
    }

    fn set_volume(&self, volume: f32) {
        self.state().volume = volume;
    }

    fn set_position(&self, seconds: f64) -> Result<()> {
        let mut s = self.state();
        if s.seek_fails || s.loaded.is_none() {
            return Err(PlayerError::Seek("engine busy".into()));
        }
        s.position = seconds;
        s.seeks.push(seconds);
        Ok(())
    }

    fn position(&self) -> Result<f64> {
        let s = self.state();
        if s.position_fails {
            return Err(PlayerError::EngineUnavailable("device lost".into()));
        }
        Ok(s.position)
    }

    fn is_busy(&self) -> bool {
        let s = self.state();
        s.loaded.is_some() && !s.finished
    }

    fn duration(&self, path: &Path) -> Result<f64> {
        let mut s = self.state();
        s.probes += 1;
        s.durations
            .get(path)
            .copied()
            .ok_or_else(|| PlayerError::Decode {
                path: path.to_path_buf(),
                reason: "no duration".into(),
            })
    }
}
