/// Number of bands in every lattice.
pub const BAND_COUNT: usize = 16;

/// Ascent threshold for k500.
pub const X4: f64 = 500.0;

/// Base of the affine n_total formula.
pub const N_BASE: i64 = 60;

/// Per-unit step of i_weight in n_total.
pub const N_STEP: i64 = 3;

/// Intensity gain in the k500 numerator.
pub const K500_GAIN: f64 = 125.0;

/// Routing keys at or above this value escalate to crisis (inclusive).
pub const CRISIS_THRESHOLD: i64 = 270;

/// Gate mask raised on crisis: 0b1111_0000_0000_0000
pub const CRISIS_GATE_MASK: u16 = 0xF000;

/// Width in bits of a band state code.
pub const STATE_CODE_WIDTH: u32 = 4;

/// Output magnitude the placeholder map assigns to state code 3.
pub const PLACEHOLDER_MAGNITUDE: f64 = 0.6;

/// Numerical epsilon for near-zero comparisons (cosine guard).
pub const EPSILON: f64 = 1e-10;

/// Override values below this are treated as having no effect.
pub const NEGLIGIBLE_EFFECT: f64 = 1e-4;

/// First band covered by the default crisis override.
pub const CRISIS_BAND_START: usize = 10;

/// Last band covered by the default crisis override (inclusive).
pub const CRISIS_BAND_END: usize = 15;

/// Reference override amplitudes for bands 10..=15.
pub const CRISIS_SEEDS: [f64; 6] = [0.0694, -0.172, -0.1396, 0.0372, 0.0292, -0.0677];

/// Default exponential decay rate per turn.
pub const DEFAULT_DECAY_RATE: f64 = 0.5;

/// Default number of turns an override lasts at most.
pub const DEFAULT_DECAY_STEPS: usize = 12;

/// Upper bound on the configured override length.
pub const MAX_DECAY_STEPS: usize = 1 << 16;

/// Default DSP mantissa.
pub const DEFAULT_MANTISSA: f64 = 0.5;

/// Default DSP modulation rate (radians per band index).
pub const DEFAULT_MOD_RATE: f64 = 0.1;
