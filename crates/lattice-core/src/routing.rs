use std::fmt;

use serde::{Deserialize, Serialize};

use crate::band::Band;
use crate::bitfield::GateMask;
use crate::constants::{BAND_COUNT, CRISIS_THRESHOLD};
use crate::crisis::{CrisisConfig, CrisisOverride};
use crate::error::Result;
use crate::trajectory::TrajectoryState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingStatus {
    None,
    Crisis,
}

/// Queue tier the calling middleware should hand the turn to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueTier {
    Standard,
    Transcendent,
}

impl fmt::Display for QueueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueTier::Standard => f.write_str("standard"),
            QueueTier::Transcendent => f.write_str("transcendent"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub routing_key: i64,
    pub gate_mask: GateMask,
    pub status: RoutingStatus,
}

impl RoutingDecision {
    pub fn tier(&self) -> QueueTier {
        match self.status {
            RoutingStatus::Crisis => QueueTier::Transcendent,
            RoutingStatus::None => QueueTier::Standard,
        }
    }

    pub fn is_crisis(&self) -> bool {
        self.status == RoutingStatus::Crisis
    }
}

/// Routing key derivation from the turn's trajectory state.
pub type RoutingKeyFn = fn(&TrajectoryState) -> i64;

/// Default key: the turn's `n_total`.
pub fn n_total_key(state: &TrajectoryState) -> i64 {
    state.n_total
}

/// Crisis gate. Stateless routing plus ownership of the session's override.
#[derive(Clone, Debug)]
pub struct CrisisRouter {
    key: RoutingKeyFn,
    crisis: CrisisConfig,
    active: Option<CrisisOverride>,
}

impl Default for CrisisRouter {
    fn default() -> Self {
        Self::new(CrisisConfig::default())
    }
}

impl CrisisRouter {
    pub fn new(crisis: CrisisConfig) -> Self {
        Self {
            key: n_total_key,
            crisis,
            active: None,
        }
    }

    pub fn with_key(mut self, key: RoutingKeyFn) -> Self {
        self.key = key;
        self
    }

    /// Inclusive threshold: 270 and above is a crisis.
    pub fn route(routing_key: i64) -> RoutingDecision {
        if routing_key >= CRISIS_THRESHOLD {
            RoutingDecision {
                routing_key,
                gate_mask: GateMask::CRISIS,
                status: RoutingStatus::Crisis,
            }
        } else {
            RoutingDecision {
                routing_key,
                gate_mask: GateMask::NONE,
                status: RoutingStatus::None,
            }
        }
    }

    pub fn routing_key(&self, state: &TrajectoryState) -> i64 {
        (self.key)(state)
    }

    /// Route the turn and install an override on crisis if none is running.
    ///
    /// On error the router is left exactly as it was.
    pub fn evaluate(&mut self, state: &TrajectoryState) -> Result<RoutingDecision> {
        let decision = Self::route(self.routing_key(state));
        if decision.is_crisis() {
            tracing::info!(
                routing_key = decision.routing_key,
                tier = %decision.tier(),
                "crisis routed"
            );
            if self.active.is_none() {
                let ov = self.crisis.build_override()?;
                tracing::debug!(
                    bands = ?ov.band_range(),
                    steps = ov.decay_curve().len(),
                    "crisis override installed"
                );
                self.active = Some(ov);
            }
        }
        Ok(decision)
    }

    /// Apply the active override's next step, dropping it once cleared.
    pub fn apply_override(&mut self, bands: &mut [Band; BAND_COUNT]) -> Option<Vec<f64>> {
        let ov = self.active.as_mut()?;
        let applied = ov.apply(bands);
        if ov.is_cleared() {
            tracing::debug!(steps = ov.cursor(), "crisis override cleared");
            self.active = None;
        }
        applied
    }

    pub fn active_override(&self) -> Option<&CrisisOverride> {
        self.active.as_ref()
    }

    pub fn crisis_config(&self) -> &CrisisConfig {
        &self.crisis
    }
}
