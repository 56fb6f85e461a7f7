//! One OS thread per camera runner and per config listener.

use std::io;
use std::thread::{self, JoinHandle};

use crate::listener::ConfigListener;
use crate::runner::{PipelineRunner, RunnerReport, StopSignal};

/// Report of a runner that was joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedReport {
    pub name: String,
    /// `None` when the runner thread panicked.
    pub report: Option<RunnerReport>,
}

/// Owns the threads of every runner and listener sharing one stop signal.
#[derive(Debug, Default)]
pub struct Orchestrator {
    stop: StopSignal,
    runners: Vec<(String, JoinHandle<RunnerReport>)>,
    listeners: Vec<(String, JoinHandle<u64>)>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal observed by every spawned thread.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Start `runner` on a thread named `vision-<name>`.
    pub fn spawn_runner(&mut self, runner: PipelineRunner) -> io::Result<()> {
        let name = runner.name().to_owned();
        let stop = self.stop.clone();
        let handle = thread::Builder::new()
            .name(format!("vision-{name}"))
            .spawn(move || runner.run(&stop))?;
        log::info!("started runner {name}");
        self.runners.push((name, handle));
        Ok(())
    }

    /// Start `listener` on a thread named `config-<name>`.
    pub fn spawn_listener(&mut self, listener: ConfigListener) -> io::Result<()> {
        let name = listener.name().to_owned();
        let stop = self.stop.clone();
        let handle = thread::Builder::new()
            .name(format!("config-{name}"))
            .spawn(move || listener.run(&stop))?;
        self.listeners.push((name, handle));
        Ok(())
    }

    pub fn runner_count(&self) -> usize {
        self.runners.len()
    }

    /// Wait for every runner to finish on its own, then stop the listeners.
    pub fn join(mut self) -> Vec<NamedReport> {
        self.join_all()
    }

    /// Raise the stop signal and join every thread.
    pub fn shutdown(mut self) -> Vec<NamedReport> {
        log::info!("shutting down {} runner(s)", self.runners.len());
        self.stop.raise();
        self.join_all()
    }

    fn join_all(&mut self) -> Vec<NamedReport> {
        let mut reports = Vec::with_capacity(self.runners.len());
        for (name, handle) in self.runners.drain(..) {
            let report = match handle.join() {
                Ok(report) => Some(report),
                Err(_) => {
                    log::error!("runner {name} panicked");
                    None
                }
            };
            reports.push(NamedReport { name, report });
        }

        self.stop.raise();
        for (name, handle) in self.listeners.drain(..) {
            match handle.join() {
                Ok(applied) => log::debug!("listener {name} applied {applied} update(s)"),
                Err(_) => log::error!("listener {name} panicked"),
            }
        }
        reports
    }
}

/// Threads still owned here are stopped and joined, so every runner
/// releases its resources even when the owner bails out early.
impl Drop for Orchestrator {
    fn drop(&mut self) {
        if self.runners.is_empty() && self.listeners.is_empty() {
            return;
        }
        log::info!("shutting down {} runner(s)", self.runners.len());
        self.stop.raise();
        self.join_all();
    }
}
