//! Applies configuration-channel events to a pipeline's [`ConfigState`].

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tape_vision_pipeline::ConfigState;

use crate::runner::StopSignal;

/// How often a blocked listener re-checks the stop signal.
pub const LISTENER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One `(key, value)` update as delivered by the configuration channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigEvent {
    pub key: String,
    pub value: f64,
}

impl ConfigEvent {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[derive(Debug)]
pub struct ConfigListener {
    name: String,
    events: Receiver<ConfigEvent>,
    state: Arc<ConfigState>,
}

impl ConfigListener {
    pub fn new(
        name: impl Into<String>,
        events: Receiver<ConfigEvent>,
        state: Arc<ConfigState>,
    ) -> Self {
        Self {
            name: name.into(),
            events,
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply every event already queued, without blocking.
    ///
    /// Returns the number of recognized keys applied.
    pub fn drain(&self) -> u64 {
        let mut applied = 0;
        for event in self.events.try_iter() {
            applied += u64::from(self.apply(&event));
        }
        applied
    }

    /// Consume events until the channel disconnects or `stop` is raised.
    ///
    /// Returns the number of recognized keys applied.
    pub fn run(self, stop: &StopSignal) -> u64 {
        let mut applied = 0;
        while !stop.is_raised() {
            match self.events.recv_timeout(LISTENER_POLL_INTERVAL) {
                Ok(event) => applied += u64::from(self.apply(&event)),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    log::debug!("[{}] config channel closed", self.name);
                    break;
                }
            }
        }
        applied
    }

    fn apply(&self, event: &ConfigEvent) -> bool {
        let known = self.state.update(&event.key, event.value);
        if known {
            log::info!("[{}] {} = {}", self.name, event.key, event.value);
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::thread;

    #[test]
    fn drain_applies_known_and_skips_unknown_keys() {
        let (tx, rx) = unbounded();
        let state = Arc::new(ConfigState::default());
        let listener = ConfigListener::new("cam", rx, Arc::clone(&state));

        tx.send(ConfigEvent::new("hueMin", 12.0)).unwrap();
        tx.send(ConfigEvent::new("exposure", 3.0)).unwrap();
        tx.send(ConfigEvent::new("minArea", 75.0)).unwrap();

        assert_eq!(listener.drain(), 2);
        let cfg = state.snapshot();
        assert_eq!(cfg.threshold.hue.min, 12.0);
        assert_eq!(cfg.filter.min_area, 75.0);
        assert_eq!(listener.drain(), 0);
    }

    #[test]
    fn run_exits_when_the_channel_disconnects() {
        let (tx, rx) = unbounded();
        let state = Arc::new(ConfigState::default());
        let listener = ConfigListener::new("cam", rx, Arc::clone(&state));
        let handle = thread::spawn(move || listener.run(&StopSignal::new()));

        tx.send(ConfigEvent::new("lumMax", 180.0)).unwrap();
        drop(tx);
        assert_eq!(handle.join().unwrap(), 1);
        assert_eq!(state.snapshot().threshold.luminance.max, 180.0);
    }

    #[test]
    fn run_exits_on_stop_signal() {
        let (_tx, rx) = unbounded::<ConfigEvent>();
        let listener = ConfigListener::new("cam", rx, Arc::new(ConfigState::default()));
        let stop = StopSignal::new();
        let handle = {
            let stop = stop.clone();
            thread::spawn(move || listener.run(&stop))
        };
        stop.raise();
        assert_eq!(handle.join().unwrap(), 0);
    }
}
