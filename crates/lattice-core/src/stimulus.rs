use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};

/// One turn's input triple. Supplied fresh every turn, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stimulus {
    pub i_weight: i64,
    /// Angle in radians.
    pub theta: f64,
    pub intensity: f64,
}

impl Stimulus {
    pub fn new(i_weight: i64, theta: f64, intensity: f64) -> Self {
        Self {
            i_weight,
            theta,
            intensity,
        }
    }

    /// Reject NaN/Infinity before anything downstream sees them.
    pub fn validate(&self) -> Result<()> {
        if !self.theta.is_finite() {
            return Err(LatticeError::InvalidStimulus(format!(
                "theta must be finite, got {}",
                self.theta
            )));
        }
        if !self.intensity.is_finite() {
            return Err(LatticeError::InvalidStimulus(format!(
                "intensity must be finite, got {}",
                self.intensity
            )));
        }
        Ok(())
    }
}
