//! MPRIS (`org.mpris.MediaPlayer2`) service so desktop media keys and
//! `playerctl` can drive the player.
//!
//! The D-Bus side runs on its own thread and never touches the controller:
//! method calls become `ControlCmd`s on a channel drained by the UI thread,
//! and properties are served from a snapshot the UI thread keeps current.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use log::{info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::audio::PlaybackState;
use crate::library::Track;

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    SetVolume(f64),
}

#[derive(Debug)]
struct SharedState {
    playback: PlaybackState,
    volume: f64,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<ObjectPath<'static>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            playback: PlaybackState::Stopped,
            volume: 1.0,
            title: None,
            artist: Vec::new(),
            album: None,
            url: None,
            length_micros: None,
            track_id: None,
        }
    }
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    pub fn set_volume(&self, volume: f32) {
        if let Ok(mut s) = self.state.lock() {
            s.volume = f64::from(volume);
        }
    }

    /// Publish the current track. `length` is the probed duration in seconds.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>, length: Option<f64>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match (index, track) {
            (Some(i), Some(t)) => {
                s.title = Some(t.title.clone());
                s.artist = t.artist.iter().cloned().collect();
                s.album = t.album.clone();
                s.url = Some(format!("file://{}", t.path.display()));
                s.length_micros = length
                    .or_else(|| t.duration.map(|d| d.as_secs_f64()))
                    .map(|secs| (secs * 1_000_000.0) as i64);
                s.track_id = ObjectPath::try_from(format!("/org/mpris/MediaPlayer2/track/{i}"))
                    .ok()
                    .map(|p| p.into_owned());
            }
            _ => {
                s.title = None;
                s.artist.clear();
                s.album = None;
                s.url = None;
                s.length_micros = None;
                s.track_id = None;
            }
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No window to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "spindle"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec!["audio/mpeg".to_string(), "audio/wav".to_string()]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn owned(v: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(v).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume).unwrap_or(1.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, volume: f64) {
        let _ = self.tx.send(ControlCmd::SetVolume(volume.clamp(0.0, 1.0)));
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(id) = s.track_id.clone() {
            if let Some(v) = owned(Value::from(id)) {
                map.insert("mpris:trackid".to_string(), v);
            }
        }
        if let Some(v) = owned(Value::from(s.title.clone().unwrap_or_default())) {
            map.insert("xesam:title".to_string(), v);
        }
        if !s.artist.is_empty() {
            if let Some(v) = owned(Value::from(s.artist.clone())) {
                map.insert("xesam:artist".to_string(), v);
            }
        }
        if let Some(album) = s.album.clone() {
            if let Some(v) = owned(Value::from(album)) {
                map.insert("xesam:album".to_string(), v);
            }
        }
        if let Some(url) = s.url.clone() {
            if let Some(v) = owned(Value::from(url)) {
                map.insert("xesam:url".to_string(), v);
            }
        }
        if let Some(len) = s.length_micros {
            if let Some(v) = owned(Value::from(len)) {
                map.insert("mpris:length".to_string(), v);
            }
        }
        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("mpris".into())
        .spawn(move || {
            block_on(async move {
                let path = "/org/mpris/MediaPlayer2";

                let connection = match Connection::session().await {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("MPRIS: failed to connect to session bus: {e}");
                        return;
                    }
                };

                if let Err(e) = connection
                    .request_name("org.mpris.MediaPlayer2.spindle")
                    .await
                {
                    warn!("MPRIS: failed to acquire name: {e}");
                    return;
                }

                let object_server = connection.object_server();

                if let Err(e) = object_server.at(path, RootIface { tx: tx.clone() }).await {
                    warn!("MPRIS: failed to register root iface: {e}");
                    return;
                }

                if let Err(e) = object_server
                    .at(
                        path,
                        PlayerIface {
                            tx,
                            state: state_for_thread,
                        },
                    )
                    .await
                {
                    warn!("MPRIS: failed to register player iface: {e}");
                    return;
                }

                info!("MPRIS: service registered");
                // Keep the service alive.
                loop {
                    Timer::after(std::time::Duration::from_secs(3600)).await;
                }
            });
        });
    if let Err(e) = spawned {
        warn!("MPRIS: cannot spawn service thread: {e}");
    }

    MprisHandle { state }
}
