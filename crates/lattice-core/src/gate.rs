//! Bitwise OR-gate reclassification of band state codes.
//!
//! The OR step and the output mapping are kept apart: the map reads only the
//! resulting code and the band's carrier, never the previous magnitude, so a
//! repeated shift with the same mask is always a no-op.

use crate::band::Band;
use crate::bitfield::StateCode;
use crate::constants::PLACEHOLDER_MAGNITUDE;

/// Output magnitude for a band after its code has been shifted.
pub trait MagnitudeMap {
    fn magnitude(&self, code: StateCode, carrier: f64) -> f64;
}

impl<F> MagnitudeMap for F
where
    F: Fn(StateCode, f64) -> f64,
{
    fn magnitude(&self, code: StateCode, carrier: f64) -> f64 {
        self(code, carrier)
    }
}

/// 0.6 for code 3, silence otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderMagnitude;

impl MagnitudeMap for PlaceholderMagnitude {
    fn magnitude(&self, code: StateCode, _carrier: f64) -> f64 {
        if code.bits() == 3 {
            PLACEHOLDER_MAGNITUDE
        } else {
            0.0
        }
    }
}

pub struct BitwiseGateShifter {
    map: Box<dyn MagnitudeMap + Send + Sync>,
}

impl Default for BitwiseGateShifter {
    fn default() -> Self {
        Self::new(PlaceholderMagnitude)
    }
}

impl BitwiseGateShifter {
    pub fn new(map: impl MagnitudeMap + Send + Sync + 'static) -> Self {
        Self { map: Box::new(map) }
    }

    /// `code |= mask` on every band, then rederive each magnitude.
    pub fn shift(&self, bands: &mut [Band], mask: StateCode) {
        for band in bands.iter_mut() {
            band.state_code |= mask;
            band.magnitude = self.map.magnitude(band.state_code, band.carrier);
        }
    }
}

impl std::fmt::Debug for BitwiseGateShifter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitwiseGateShifter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::WaveType;
    use proptest::prelude::*;

    fn bands_with_code(code: u32) -> Vec<Band> {
        (0..16)
            .map(|i| Band::with_code(i, WaveType::Flat, StateCode::new(code)))
            .collect()
    }

    #[test]
    fn test_all_threes_stay_three() {
        let mut bands = bands_with_code(3);
        BitwiseGateShifter::default().shift(&mut bands, StateCode::new(0x3));
        for b in &bands {
            assert_eq!(b.state_code.bits(), 3);
            assert_eq!(b.magnitude, 0.6);
        }
    }

    #[test]
    fn test_or_completes_code_three() {
        let mut bands = vec![
            Band::with_code(0, WaveType::Harmonic, StateCode::new(0b01)),
            Band::with_code(1, WaveType::Peak, StateCode::new(0b10)),
            Band::with_code(2, WaveType::Flat, StateCode::new(0b00)),
        ];
        BitwiseGateShifter::default().shift(&mut bands, StateCode::new(0b10));
        let mags: Vec<f64> = bands.iter().map(|b| b.magnitude).collect();
        assert_eq!(mags, vec![0.6, 0.0, 0.0]);
    }

    #[test]
    fn test_wide_mask_is_truncated() {
        let mut bands = bands_with_code(0);
        BitwiseGateShifter::default().shift(&mut bands, StateCode::new(0xFFF3));
        assert!(bands.iter().all(|b| b.state_code.bits() == 3));
    }

    #[test]
    fn test_custom_map_reads_carrier() {
        let shifter = BitwiseGateShifter::new(|code: StateCode, carrier: f64| {
            code.bits() as f64 * carrier
        });
        let mut bands = bands_with_code(1);
        for b in bands.iter_mut() {
            b.carrier = 0.5;
        }
        shifter.shift(&mut bands, StateCode::new(0b10));
        assert!(bands.iter().all(|b| b.magnitude == 1.5));
    }

    proptest! {
        #[test]
        fn prop_shift_idempotent(a in 0u32..16, m in any::<u32>(), carrier in -10.0f64..10.0) {
            let shifters = [
                BitwiseGateShifter::default(),
                BitwiseGateShifter::new(|c: StateCode, x: f64| c.bits() as f64 * x + 1.0),
            ];
            for shifter in &shifters {
                let mut once = vec![Band::with_code(0, WaveType::Quantum, StateCode::new(a))];
                once[0].carrier = carrier;
                shifter.shift(&mut once, StateCode::new(m));

                let mut twice = once.clone();
                shifter.shift(&mut twice, StateCode::new(m));
                prop_assert_eq!(&once, &twice);
            }
        }
    }
}
