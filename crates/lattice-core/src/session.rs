//! One processing session: a lattice plus the five pipeline stages.
//!
//! A turn runs against a copy of the lattice and is committed only when every
//! stage succeeds, so a failed turn leaves the session exactly as it was.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::constants::BAND_COUNT;
use crate::dsp::DspModulator;
use crate::error::{LatticeError, Result};
use crate::gate::BitwiseGateShifter;
use crate::lattice::{Lattice, LatticeBandProcessor};
use crate::routing::{CrisisRouter, RoutingDecision};
use crate::stimulus::Stimulus;
use crate::trajectory::{TrajectoryCalculator, TrajectoryState};

/// Everything a turn hands back to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnOutput {
    pub turn: u64,
    pub state: TrajectoryState,
    /// Band magnitudes after gate shift, override and DSP shaping.
    pub magnitudes: [f64; BAND_COUNT],
    pub routing: RoutingDecision,
    /// Override values added to the covered bands this turn, if any.
    pub override_applied: Option<Vec<f64>>,
    /// Whether an override is still running after this turn.
    pub override_active: bool,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    lattice: Lattice,
    calculator: TrajectoryCalculator,
    processor: LatticeBandProcessor,
    shifter: BitwiseGateShifter,
    router: CrisisRouter,
    modulator: DspModulator,
    fault: Option<LatticeError>,
}

impl Session {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.dsp.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            lattice: Lattice::new(config.wave_layout()?),
            calculator: TrajectoryCalculator::default(),
            processor: LatticeBandProcessor::default(),
            shifter: BitwiseGateShifter::default(),
            router: CrisisRouter::new(config.crisis.clone()),
            modulator: DspModulator::new(config.dsp),
            fault: None,
        })
    }

    pub fn with_calculator(mut self, calculator: TrajectoryCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_processor(mut self, processor: LatticeBandProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_shifter(mut self, shifter: BitwiseGateShifter) -> Self {
        self.shifter = shifter;
        self
    }

    pub fn with_router(mut self, router: CrisisRouter) -> Self {
        self.router = router;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn router(&self) -> &CrisisRouter {
        &self.router
    }

    /// The configuration error that halted this session, if any.
    pub fn fault(&self) -> Option<&LatticeError> {
        self.fault.as_ref()
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// Run one full pipeline turn.
    ///
    /// A rejected stimulus fails only this turn. A configuration error also
    /// halts the session: every later turn returns the same error.
    pub fn turn(&mut self, stimulus: &Stimulus) -> Result<TurnOutput> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        match self.run_turn(stimulus) {
            Err(e @ LatticeError::Configuration(_)) => {
                tracing::warn!(session = %self.id, error = %e, "session halted");
                self.fault = Some(e.clone());
                Err(e)
            }
            other => other,
        }
    }

    fn run_turn(&mut self, stimulus: &Stimulus) -> Result<TurnOutput> {
        let state = self.calculator.compute(stimulus)?;

        let mut next = self.lattice.clone();
        self.processor.update(&mut next, &state);
        self.shifter
            .shift(next.bands_mut(), state.trajectory.shift_mask());

        let routing = self.router.evaluate(&state)?;
        let override_applied = self.router.apply_override(next.bands_mut());
        let magnitudes = self.modulator.shape_bands(next.bands(), &state);

        self.lattice = next;
        tracing::trace!(
            session = %self.id,
            turn = self.lattice.turn(),
            trajectory = %state.trajectory,
            routing_key = routing.routing_key,
            "turn complete"
        );

        Ok(TurnOutput {
            turn: self.lattice.turn(),
            state,
            magnitudes,
            routing,
            override_applied,
            override_active: self.router.active_override().is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::WaveType;
    use crate::crisis::CrisisConfig;
    use crate::dsp::{DspConfig, MantissaSource};
    use crate::routing::RoutingStatus;
    use crate::trajectory::Trajectory;
    use std::f64::consts::FRAC_PI_4;

    fn session() -> Session {
        Session::new(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_ascent_turn_outputs() {
        let mut s = session();
        let out = s.turn(&Stimulus::new(5, FRAC_PI_4, 10.0)).unwrap();
        assert_eq!(out.turn, 1);
        assert_eq!(out.state.trajectory, Trajectory::Ascent);
        assert_eq!(out.routing.status, RoutingStatus::None);
        assert!(out.override_applied.is_none());

        // Ascent ORs 0001: Peak (10) and Quantum (11) bands reach code 3
        for band in s.lattice().bands() {
            let expected = matches!(band.wave_type, WaveType::Peak | WaveType::Quantum);
            assert_eq!(band.state_code.bits() == 3, expected, "band {}", band.index());
        }
        assert_eq!(out.magnitudes[0], 0.0);
        assert!(out.magnitudes[2] > 0.6, "band 2 is boosted by the sine term");
    }

    #[test]
    fn test_descent_turn_selects_harmonic_bands() {
        let mut s = session();
        s.turn(&Stimulus::new(0, 0.0, 1.0)).unwrap();
        let lit: Vec<WaveType> = s
            .lattice()
            .bands()
            .iter()
            .filter(|b| b.magnitude > 0.0)
            .map(|b| b.wave_type)
            .collect();
        assert!(lit.iter().all(|w| matches!(w, WaveType::Harmonic | WaveType::Quantum)));
        assert_eq!(lit.len(), 8);
    }

    #[test]
    fn test_crisis_turn_applies_override() {
        let mut s = session();
        let out = s.turn(&Stimulus::new(70, 0.0, 1.0)).unwrap();
        assert_eq!(out.routing.routing_key, 270);
        assert!(out.routing.is_crisis());
        assert_eq!(out.override_applied.as_deref().map(|v| v.len()), Some(6));
        assert!(out.override_active);
    }

    #[test]
    fn test_invalid_stimulus_leaves_session_untouched() {
        let mut s = session();
        s.turn(&Stimulus::new(1, 0.3, 2.0)).unwrap();
        let before = s.lattice().clone();
        assert!(s.turn(&Stimulus::new(1, f64::NAN, 2.0)).is_err());
        assert_eq!(s.lattice(), &before);
        assert!(!s.is_faulted());
        assert!(s.turn(&Stimulus::new(1, 0.3, 2.0)).is_ok());
    }

    #[test]
    fn test_configuration_error_halts_session() {
        let config = PipelineConfig {
            crisis: CrisisConfig {
                steps: 0,
                ..CrisisConfig::default()
            },
            ..PipelineConfig::default()
        };
        let mut s = Session::new(&config).unwrap();
        // Non-crisis turns never touch the override config
        s.turn(&Stimulus::new(0, 0.0, 1.0)).unwrap();
        let before = s.lattice().clone();

        let err = s.turn(&Stimulus::new(100, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, LatticeError::Configuration(_)));
        assert!(s.is_faulted());
        assert_eq!(s.lattice(), &before);
        assert!(s.turn(&Stimulus::new(0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_bad_layout_rejected_at_creation() {
        let config = PipelineConfig {
            layout: vec![WaveType::Flat; 4],
            ..PipelineConfig::default()
        };
        assert!(Session::new(&config).is_err());
    }

    #[test]
    fn test_nan_mantissa_rejected_at_creation() {
        let config = PipelineConfig {
            dsp: DspConfig {
                mantissa: MantissaSource::Fixed(f64::NAN),
                ..DspConfig::default()
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            Session::new(&config),
            Err(LatticeError::Configuration(_))
        ));
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        assert_ne!(session().id(), session().id());
    }
}
