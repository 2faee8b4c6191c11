//! Many independent sessions stepped together.
//!
//! Sessions share no mutable state, so a step is embarrassingly parallel.
//! With the `parallel` feature each session's turn runs on the rayon pool.
//! A failing session only fails its own slot in the step result.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::error::{LatticeError, Result};
use crate::session::{Session, TurnOutput};
use crate::stimulus::Stimulus;

#[derive(Debug, Default)]
pub struct Swarm {
    sessions: Vec<Session>,
}

/// Counts over one step's per-session results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub completed: usize,
    pub crises: usize,
    pub failed: usize,
}

impl StepSummary {
    pub fn from_results(results: &[Result<TurnOutput>]) -> Self {
        let mut summary = Self::default();
        for r in results {
            match r {
                Ok(out) => {
                    summary.completed += 1;
                    if out.routing.is_crisis() {
                        summary.crises += 1;
                    }
                }
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

impl Swarm {
    pub fn new(count: usize, config: &PipelineConfig) -> Result<Self> {
        let sessions = (0..count)
            .map(|_| Session::new(config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sessions })
    }

    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn faulted(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_faulted()).count()
    }

    /// One turn per session; `stimuli[i]` feeds session `i`.
    pub fn step(&mut self, stimuli: &[Stimulus]) -> Result<Vec<Result<TurnOutput>>> {
        if stimuli.len() != self.sessions.len() {
            return Err(LatticeError::Configuration(format!(
                "swarm has {} sessions but got {} stimuli",
                self.sessions.len(),
                stimuli.len()
            )));
        }

        Ok(self.run_logged(stimuli))
    }

    /// Feed the same stimulus to every session.
    pub fn broadcast(&mut self, stimulus: &Stimulus) -> Vec<Result<TurnOutput>> {
        let stimuli = vec![*stimulus; self.sessions.len()];
        self.run_logged(&stimuli)
    }

    fn run_logged(&mut self, stimuli: &[Stimulus]) -> Vec<Result<TurnOutput>> {
        let results = self.run(stimuli);
        for (session, result) in self.sessions.iter().zip(&results) {
            if let Err(e) = result {
                tracing::debug!(session = %session.id(), error = %e, "session turn failed");
            }
        }
        results
    }

    #[cfg(feature = "parallel")]
    fn run(&mut self, stimuli: &[Stimulus]) -> Vec<Result<TurnOutput>> {
        self.sessions
            .par_iter_mut()
            .zip(stimuli.par_iter())
            .map(|(session, stimulus)| session.turn(stimulus))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run(&mut self, stimuli: &[Stimulus]) -> Vec<Result<TurnOutput>> {
        self.sessions
            .iter_mut()
            .zip(stimuli)
            .map(|(session, stimulus)| session.turn(stimulus))
            .collect()
    }
}
