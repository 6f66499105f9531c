//! Background progress sampling.
//!
//! One poller runs per playing track. It only reads from the engine and
//! reports through the event channel; the UI thread applies the results.
//! Dropping or stopping the poller closes its cancel channel, which wakes the
//! loop immediately, and joins the thread so the engine is never touched
//! after `stop` returns.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use crate::audio::{AudioEngine, PlayerEvent, ProgressSnapshot};

pub struct ProgressPoller {
    cancel: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ProgressPoller {
    /// Start sampling `engine` every `interval`. `total` is the cached length
    /// of the loaded track in seconds.
    pub fn spawn(
        engine: Arc<dyn AudioEngine>,
        total: f64,
        interval: Duration,
        generation: u64,
        events: Sender<PlayerEvent>,
    ) -> Self {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name("progress-poller".into())
            .spawn(move || run(engine.as_ref(), total, interval, generation, &events, &cancel_rx))
            .map_err(|e| log::warn!("cannot spawn progress poller: {e}"))
            .ok();

        Self {
            cancel: Some(cancel_tx),
            join,
        }
    }

    /// Cancel the loop and wait for the thread to exit.
    pub fn stop(&mut self) {
        drop(self.cancel.take());
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    engine: &dyn AudioEngine,
    total: f64,
    interval: Duration,
    generation: u64,
    events: &Sender<PlayerEvent>,
    cancel: &Receiver<()>,
) {
    debug!("poller {generation} started (total {total:.1}s)");
    loop {
        if !engine.is_busy() {
            let _ = events.send(PlayerEvent::Finished { generation });
            break;
        }

        let elapsed = match engine.position() {
            Ok(p) => p,
            Err(e) => {
                let _ = events.send(PlayerEvent::Failed {
                    generation,
                    reason: e.to_string(),
                });
                break;
            }
        };

        let snapshot = ProgressSnapshot::new(elapsed, total);
        if events
            .send(PlayerEvent::Progress {
                generation,
                snapshot,
            })
            .is_err()
        {
            // Nobody is listening any more.
            break;
        }

        match cancel.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("poller {generation} stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::FakeEngine;
    use std::path::Path;
    use std::time::Instant;

    const TICK: Duration = Duration::from_millis(10);
    const WAIT: Duration = Duration::from_secs(2);

    fn playing_engine(path: &str, total: f64) -> Arc<FakeEngine> {
        let engine = Arc::new(FakeEngine::with_durations(&[(path, total)]));
        engine.load(Path::new(path)).unwrap();
        engine.play().unwrap();
        engine
    }

    #[test]
    fn publishes_snapshots_while_busy() {
        let engine = playing_engine("a.mp3", 200.0);
        engine.state().position = 50.0;
        let (tx, rx) = mpsc::channel();
        let mut poller = ProgressPoller::spawn(engine.clone(), 200.0, TICK, 7, tx);

        match rx.recv_timeout(WAIT).unwrap() {
            PlayerEvent::Progress {
                generation,
                snapshot,
            } => {
                assert_eq!(generation, 7);
                assert_eq!(snapshot, ProgressSnapshot::new(50.0, 200.0));
                assert!((snapshot.fraction() - 0.25).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        poller.stop();
        assert!(!poller.is_running());
    }

    #[test]
    fn zero_total_yields_zero_fraction() {
        let engine = playing_engine("a.mp3", 0.0);
        engine.state().position = 3.0;
        let (tx, rx) = mpsc::channel();
        let _poller = ProgressPoller::spawn(engine, 0.0, TICK, 1, tx);

        match rx.recv_timeout(WAIT).unwrap() {
            PlayerEvent::Progress { snapshot, .. } => assert_eq!(snapshot.fraction(), 0.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reports_finished_and_exits_when_engine_goes_idle() {
        let engine = playing_engine("a.mp3", 10.0);
        let (tx, rx) = mpsc::channel();
        let mut poller = ProgressPoller::spawn(engine.clone(), 10.0, TICK, 2, tx);

        engine.state().finished = true;
        let finished = std::iter::from_fn(|| rx.recv_timeout(WAIT).ok())
            .find(|e| matches!(e, PlayerEvent::Finished { .. }));
        assert_eq!(finished, Some(PlayerEvent::Finished { generation: 2 }));

        poller.stop();
    }

    #[test]
    fn read_failure_ends_loop_quietly() {
        let engine = playing_engine("a.mp3", 10.0);
        engine.state().position_fails = true;
        let (tx, rx) = mpsc::channel();
        let mut poller = ProgressPoller::spawn(engine, 10.0, TICK, 4, tx);

        match rx.recv_timeout(WAIT).unwrap() {
            PlayerEvent::Failed { generation, reason } => {
                assert_eq!(generation, 4);
                assert!(reason.contains("device lost"));
            }
            other => panic!("unexpected {other:?}"),
        }
        poller.stop();
        // The sender was dropped with the thread, so the channel drains empty.
        assert!(rx.recv_timeout(WAIT).is_err());
    }

    #[test]
    fn stop_interrupts_a_long_sleep() {
        let engine = playing_engine("a.mp3", 10.0);
        let (tx, rx) = mpsc::channel();
        let mut poller = ProgressPoller::spawn(engine, 10.0, Duration::from_secs(30), 1, tx);
        rx.recv_timeout(WAIT).unwrap();

        let started = Instant::now();
        poller.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!poller.is_running());
    }
}
