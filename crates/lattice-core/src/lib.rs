//! Deterministic emotional-trajectory lattice engine.
//!
//! Maps a numeric stimulus to a classified trajectory, reclassifies a fixed
//! 16-band lattice through an OR-gate, routes crisis escalation with a
//! decaying band override, and shapes the output with mantissa modulation.
//! Closed-form throughout: no learned parameters, no randomness.
//!
//! Zero I/O. Callers own transport, logging setup and any retention.

pub mod band;
pub mod bitfield;
pub mod config;
pub mod constants;
pub mod crisis;
pub mod dsp;
pub mod error;
pub mod gate;
pub mod lattice;
pub mod report;
pub mod routing;
pub mod session;
pub mod stimulus;
pub mod swarm;
pub mod trajectory;

pub use band::{Band, WaveType};
pub use bitfield::{GateMask, StateCode};
pub use config::PipelineConfig;
pub use constants::{BAND_COUNT, CRISIS_THRESHOLD, EPSILON, X4};
pub use crisis::{CrisisConfig, CrisisOverride, OverridePhase};
pub use dsp::{DspConfig, DspModulator, MantissaSource, shape};
pub use error::{LatticeError, Result};
pub use gate::{BitwiseGateShifter, MagnitudeMap, PlaceholderMagnitude};
pub use lattice::{BandUpdate, Lattice, LatticeBandProcessor, SeedFromWaveType};
pub use report::{TurnReport, parse_stimulus_script};
pub use routing::{CrisisRouter, QueueTier, RoutingDecision, RoutingStatus};
pub use session::{Session, TurnOutput};
pub use stimulus::Stimulus;
pub use swarm::{StepSummary, Swarm};
pub use trajectory::{ClassificationRule, Trajectory, TrajectoryCalculator, TrajectoryState};
