//! Stimulus → trajectory state. Pure, no side effects.
//!
//! `n_total` and `k500` follow the closed-form definitions. Classification is
//! an ordered rule table evaluated top to bottom; the default table knows only
//! the ascent/descent split at `X4`. Integration and expansion have no
//! threshold of their own and are reached only through rules a caller adds
//! with [`TrajectoryCalculator::with_rule`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bitfield::StateCode;
use crate::constants::{EPSILON, K500_GAIN, N_BASE, N_STEP, X4};
use crate::error::{LatticeError, Result};
use crate::stimulus::Stimulus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trajectory {
    Ascent,
    Descent,
    Integration,
    Expansion,
}

impl Trajectory {
    /// Mask the gate shifter ORs into every band on a turn with this trajectory.
    pub fn shift_mask(self) -> StateCode {
        match self {
            Trajectory::Ascent => StateCode::new(0b0001),
            Trajectory::Descent => StateCode::new(0b0010),
            Trajectory::Integration => StateCode::new(0b0100),
            Trajectory::Expansion => StateCode::new(0b1000),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trajectory::Ascent => "ASCENT",
            Trajectory::Descent => "DESCENT",
            Trajectory::Integration => "INTEGRATION",
            Trajectory::Expansion => "EXPANSION",
        }
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-turn scalar fields shared by the downstream stages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryState {
    pub n_total: i64,
    pub k500: f64,
    pub k4: f64,
    pub trajectory: Trajectory,
}

/// One row of the classification table.
#[derive(Clone, Copy, Debug)]
pub struct ClassificationRule {
    pub predicate: fn(f64) -> bool,
    pub label: Trajectory,
}

impl ClassificationRule {
    pub const fn new(predicate: fn(f64) -> bool, label: Trajectory) -> Self {
        Self { predicate, label }
    }
}

/// Derivation of `k4` from `k500`.
pub type K4Derivation = fn(f64) -> f64;

/// Placeholder k4: k500 as a ratio of the ascent threshold.
pub fn placeholder_k4(k500: f64) -> f64 {
    k500 / X4
}

fn is_ascent(k500: f64) -> bool {
    k500 > X4
}

fn always(_: f64) -> bool {
    true
}

/// `n_total = 60 + 3 * i_weight`, or None on overflow.
pub fn n_total(i_weight: i64) -> Option<i64> {
    i_weight.checked_mul(N_STEP)?.checked_add(N_BASE)
}

/// `k500 = intensity * 125 / cos(theta)`, 0 when cos(theta) vanishes.
pub fn k500(intensity: f64, theta: f64) -> f64 {
    let c = theta.cos();
    if c.abs() < EPSILON {
        return 0.0;
    }
    intensity * K500_GAIN / c
}

#[derive(Clone, Debug)]
pub struct TrajectoryCalculator {
    rules: Vec<ClassificationRule>,
    k4: K4Derivation,
}

impl Default for TrajectoryCalculator {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassificationRule::new(is_ascent, Trajectory::Ascent),
                ClassificationRule::new(always, Trajectory::Descent),
            ],
            k4: placeholder_k4,
        }
    }
}

impl TrajectoryCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule ahead of the existing table.
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    pub fn with_k4(mut self, derivation: K4Derivation) -> Self {
        self.k4 = derivation;
        self
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// First matching rule wins. An exhausted table means descent.
    pub fn classify(&self, k500: f64) -> Trajectory {
        self.rules
            .iter()
            .find(|r| (r.predicate)(k500))
            .map(|r| r.label)
            .unwrap_or(Trajectory::Descent)
    }

    pub fn compute(&self, stimulus: &Stimulus) -> Result<TrajectoryState> {
        stimulus.validate()?;

        let n_total = n_total(stimulus.i_weight).ok_or_else(|| {
            LatticeError::InvalidStimulus(format!(
                "i_weight {} overflows n_total",
                stimulus.i_weight
            ))
        })?;

        let k500 = k500(stimulus.intensity, stimulus.theta);
        if !k500.is_finite() {
            return Err(LatticeError::InvalidStimulus(format!(
                "k500 is not finite for intensity {} and theta {}",
                stimulus.intensity, stimulus.theta
            )));
        }

        let k4 = (self.k4)(k500);
        if !k4.is_finite() {
            return Err(LatticeError::InvalidStimulus(format!(
                "k4 is not finite for k500 {k500}"
            )));
        }

        Ok(TrajectoryState {
            n_total,
            k500,
            k4,
            trajectory: self.classify(k500),
        })
    }
}
