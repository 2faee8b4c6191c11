//! Elementwise mantissa modulation of band magnitudes.
//!
//! `shaped[i] = m[i] * (1 + mantissa * sin(mod_rate * i))`. No state is kept
//! between calls and index 0 always passes through unchanged.

use serde::{Deserialize, Serialize};

use crate::band::Band;
use crate::constants::{BAND_COUNT, DEFAULT_MANTISSA, DEFAULT_MOD_RATE};
use crate::error::{LatticeError, Result};
use crate::trajectory::TrajectoryState;

/// Where a turn's mantissa comes from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum MantissaSource {
    Fixed(f64),
    /// Fractional part of `|k4|`.
    FractionalK4,
}

impl Default for MantissaSource {
    fn default() -> Self {
        MantissaSource::Fixed(DEFAULT_MANTISSA)
    }
}

impl MantissaSource {
    pub fn resolve(self, state: &TrajectoryState) -> f64 {
        match self {
            MantissaSource::Fixed(m) => m,
            MantissaSource::FractionalK4 => fractal_mantissa(state.k4),
        }
    }
}

/// Fractional part of `|x|`, in `[0, 1)`.
pub fn fractal_mantissa(x: f64) -> f64 {
    x.abs().fract()
}

pub fn shape(magnitudes: &[f64], mantissa: f64, mod_rate: f64) -> Vec<f64> {
    magnitudes
        .iter()
        .enumerate()
        .map(|(i, m)| modulate(*m, i, mantissa, mod_rate))
        .collect()
}

fn modulate(magnitude: f64, index: usize, mantissa: f64, mod_rate: f64) -> f64 {
    magnitude * (1.0 + mantissa * (mod_rate * index as f64).sin())
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DspConfig {
    pub mod_rate: f64,
    pub mantissa: MantissaSource,
}

impl Default for DspConfig {
    fn default() -> Self {
        Self {
            mod_rate: DEFAULT_MOD_RATE,
            mantissa: MantissaSource::default(),
        }
    }
}

impl DspConfig {
    /// Non-finite parameters would turn every band past index 0 into NaN.
    pub fn validate(&self) -> Result<()> {
        if !self.mod_rate.is_finite() {
            return Err(LatticeError::Configuration(format!(
                "dsp mod_rate must be finite, got {}",
                self.mod_rate
            )));
        }
        if let MantissaSource::Fixed(m) = self.mantissa
            && !m.is_finite()
        {
            return Err(LatticeError::Configuration(format!(
                "dsp mantissa must be finite, got {m}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DspModulator {
    config: DspConfig,
}

impl DspModulator {
    pub fn new(config: DspConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DspConfig {
        &self.config
    }

    /// Shape a lattice's post-routing magnitudes for output.
    pub fn shape_bands(
        &self,
        bands: &[Band; BAND_COUNT],
        state: &TrajectoryState,
    ) -> [f64; BAND_COUNT] {
        let mantissa = self.config.mantissa.resolve(state);
        std::array::from_fn(|i| modulate(bands[i].magnitude, i, mantissa, self.config.mod_rate))
    }
}
