//! Fixed-width bit-fields used by the gate shifter and the crisis router.
//!
//! Both types own their width: anything wider is truncated on construction,
//! so OR-accumulation across turns can never spill into undeclared bits.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::constants::{CRISIS_GATE_MASK, STATE_CODE_WIDTH};

/// A band's discrete state code, `STATE_CODE_WIDTH` bits wide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct StateCode(u8);

impl StateCode {
    pub const WIDTH: u32 = STATE_CODE_WIDTH;
    pub const FIELD_MASK: u8 = ((1u16 << STATE_CODE_WIDTH) - 1) as u8;
    pub const ZERO: Self = Self(0);

    /// Build a code from raw bits, dropping everything above the field width.
    pub const fn new(bits: u32) -> Self {
        Self((bits & Self::FIELD_MASK as u32) as u8)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn or(self, mask: Self) -> Self {
        Self(self.0 | mask.0)
    }
}

impl From<u8> for StateCode {
    fn from(bits: u8) -> Self {
        Self::new(bits as u32)
    }
}

impl From<StateCode> for u8 {
    fn from(code: StateCode) -> Self {
        code.0
    }
}

impl BitOr for StateCode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl BitOrAssign for StateCode {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.or(rhs);
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

/// 16-bit escalation field. Non-zero only under crisis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GateMask(u16);

impl GateMask {
    pub const NONE: Self = Self(0);
    pub const CRISIS: Self = Self(CRISIS_GATE_MASK);

    /// Build a mask from a wider integer, keeping only the low 16 bits.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self((bits & 0xFFFF) as u16)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_raised(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for GateMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}
