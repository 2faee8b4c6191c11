use serde::{Deserialize, Serialize};

use crate::bitfield::StateCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveType {
    Flat,
    Harmonic,
    Peak,
    Quantum,
}

impl WaveType {
    pub const ALL: [WaveType; 4] = [
        WaveType::Flat,
        WaveType::Harmonic,
        WaveType::Peak,
        WaveType::Quantum,
    ];

    /// State code a band of this wave type starts each turn from.
    pub fn seed_code(self) -> StateCode {
        match self {
            WaveType::Flat => StateCode::new(0b00),
            WaveType::Harmonic => StateCode::new(0b01),
            WaveType::Peak => StateCode::new(0b10),
            WaveType::Quantum => StateCode::new(0b11),
        }
    }
}

/// One wave-bearing slot of a lattice. Mutated in place across turns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    index: usize,
    pub magnitude: f64,
    pub wave_type: WaveType,
    pub state_code: StateCode,
    /// Pre-shift level written by the band processor.
    pub carrier: f64,
}

impl Band {
    pub fn new(index: usize, wave_type: WaveType) -> Self {
        Self {
            index,
            magnitude: 0.0,
            wave_type,
            state_code: wave_type.seed_code(),
            carrier: 0.0,
        }
    }

    /// Build a band with an explicit state code (used by tests and tools).
    pub fn with_code(index: usize, wave_type: WaveType, state_code: StateCode) -> Self {
        Self {
            state_code,
            ..Self::new(index, wave_type)
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
