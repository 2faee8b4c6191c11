//! Decaying crisis override applied to a band sub-range.
//!
//! Lifecycle: installed (nothing applied yet) → decaying (cursor advancing
//! through the curve) → cleared (curve exhausted, or every remaining value
//! below `NEGLIGIBLE_EFFECT`). A cleared override is dropped by its owner.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::band::Band;
use crate::constants::{
    BAND_COUNT, CRISIS_BAND_END, CRISIS_BAND_START, CRISIS_SEEDS, DEFAULT_DECAY_RATE,
    DEFAULT_DECAY_STEPS, MAX_DECAY_STEPS, NEGLIGIBLE_EFFECT,
};
use crate::error::{LatticeError, Result};

/// Parameters for the override installed on crisis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrisisConfig {
    pub band_start: usize,
    /// Inclusive.
    pub band_end: usize,
    /// One amplitude per covered band.
    pub seeds: Vec<f64>,
    pub amplitude: f64,
    pub decay_rate: f64,
    pub steps: usize,
}

impl Default for CrisisConfig {
    fn default() -> Self {
        Self {
            band_start: CRISIS_BAND_START,
            band_end: CRISIS_BAND_END,
            seeds: CRISIS_SEEDS.to_vec(),
            amplitude: 1.0,
            decay_rate: DEFAULT_DECAY_RATE,
            steps: DEFAULT_DECAY_STEPS,
        }
    }
}

impl CrisisConfig {
    /// `amplitude * e^(-rate * t)` for `t` in `0..steps`, cut off once the
    /// largest seed scaled by it falls below `NEGLIGIBLE_EFFECT`.
    pub fn decay_curve(&self) -> Vec<f64> {
        let peak = self.seeds.iter().fold(0.0f64, |m, s| m.max(s.abs()));
        exponential_decay(self.amplitude, self.decay_rate, self.steps.min(MAX_DECAY_STEPS))
            .take_while(|v| (v * peak).abs() >= NEGLIGIBLE_EFFECT)
            .collect()
    }

    pub fn build_override(&self) -> Result<CrisisOverride> {
        if self.decay_rate.is_nan() || self.decay_rate <= 0.0 {
            return Err(LatticeError::Configuration(format!(
                "decay rate must be positive, got {}",
                self.decay_rate
            )));
        }
        if self.steps > MAX_DECAY_STEPS {
            return Err(LatticeError::Configuration(format!(
                "decay steps must be at most {MAX_DECAY_STEPS}, got {}",
                self.steps
            )));
        }
        CrisisOverride::new(
            self.band_start..=self.band_end,
            self.seeds.clone(),
            self.decay_curve(),
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.build_override().map(|_| ())
    }
}

pub fn exponential_decay(
    amplitude: f64,
    rate: f64,
    steps: usize,
) -> impl Iterator<Item = f64> {
    (0..steps).map(move |t| amplitude * (-rate * t as f64).exp())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverridePhase {
    Installed,
    Decaying,
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrisisOverride {
    band_start: usize,
    band_end: usize,
    seeds: Vec<f64>,
    decay_curve: Vec<f64>,
    cursor: usize,
}

impl CrisisOverride {
    pub fn new(
        band_range: RangeInclusive<usize>,
        seeds: Vec<f64>,
        decay_curve: Vec<f64>,
    ) -> Result<Self> {
        let (start, end) = band_range.into_inner();
        if start > end {
            return Err(LatticeError::Configuration(format!(
                "override band range {start}..={end} is inverted"
            )));
        }
        if end >= BAND_COUNT {
            return Err(LatticeError::Configuration(format!(
                "override band {end} is outside 0..{BAND_COUNT}"
            )));
        }
        let width = end - start + 1;
        if seeds.len() != width {
            return Err(LatticeError::Configuration(format!(
                "override covers {width} bands but has {} seeds",
                seeds.len()
            )));
        }
        if let Some(s) = seeds.iter().find(|s| !s.is_finite() || **s == 0.0) {
            return Err(LatticeError::Configuration(format!(
                "override seeds must be finite and non-zero, got {s}"
            )));
        }
        if decay_curve.is_empty() {
            return Err(LatticeError::Configuration(
                "override decay curve is empty".to_string(),
            ));
        }
        if let Some(v) = decay_curve.iter().find(|v| !v.is_finite()) {
            return Err(LatticeError::Configuration(format!(
                "override decay curve holds non-finite value {v}"
            )));
        }
        if decay_curve.first().is_some_and(|v| *v == 0.0) {
            return Err(LatticeError::Configuration(
                "override decay curve starts at zero".to_string(),
            ));
        }
        if let Some(w) = decay_curve
            .windows(2)
            .find(|w| w[1].abs() >= w[0].abs())
        {
            return Err(LatticeError::Configuration(format!(
                "override decay curve must strictly shrink, got {} then {}",
                w[0], w[1]
            )));
        }

        Ok(Self {
            band_start: start,
            band_end: end,
            seeds,
            decay_curve,
            cursor: 0,
        })
    }

    pub fn band_range(&self) -> RangeInclusive<usize> {
        self.band_start..=self.band_end
    }

    pub fn decay_curve(&self) -> &[f64] {
        &self.decay_curve
    }

    pub fn seeds(&self) -> &[f64] {
        &self.seeds
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> OverridePhase {
        if self.is_cleared() {
            OverridePhase::Cleared
        } else if self.cursor == 0 {
            OverridePhase::Installed
        } else {
            OverridePhase::Decaying
        }
    }

    /// Values the next `apply` would add, one per covered band.
    pub fn pending_values(&self) -> Option<Vec<f64>> {
        let factor = *self.decay_curve.get(self.cursor)?;
        Some(self.seeds.iter().map(|s| s * factor).collect())
    }

    pub fn is_cleared(&self) -> bool {
        match self.pending_values() {
            None => true,
            Some(values) => values.iter().all(|v| v.abs() < NEGLIGIBLE_EFFECT),
        }
    }

    /// Add the current step to the covered bands and advance the cursor.
    /// Returns the values applied, or None once cleared.
    pub fn apply(&mut self, bands: &mut [Band; BAND_COUNT]) -> Option<Vec<f64>> {
        if self.is_cleared() {
            return None;
        }
        let values = self.pending_values()?;
        for (band, v) in bands[self.band_start..=self.band_end].iter_mut().zip(&values) {
            band.magnitude += v;
        }
        self.cursor += 1;
        Some(values)
    }
}
