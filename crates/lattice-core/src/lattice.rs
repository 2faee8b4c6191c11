//! Per-session band lattice and the per-turn band processor.

use serde::{Deserialize, Serialize};

use crate::band::{Band, WaveType};
use crate::constants::BAND_COUNT;
use crate::trajectory::TrajectoryState;

/// Sixteen bands plus a turn counter. Band `i` always sits at position `i`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    bands: [Band; BAND_COUNT],
    turn: u64,
}

impl Default for Lattice {
    fn default() -> Self {
        Self::new(default_layout())
    }
}

/// Flat, Harmonic, Peak, Quantum repeated across the sixteen bands.
pub fn default_layout() -> [WaveType; BAND_COUNT] {
    std::array::from_fn(|i| WaveType::ALL[i % WaveType::ALL.len()])
}

impl Lattice {
    pub fn new(layout: [WaveType; BAND_COUNT]) -> Self {
        Self {
            bands: std::array::from_fn(|i| Band::new(i, layout[i])),
            turn: 0,
        }
    }

    pub fn bands(&self) -> &[Band; BAND_COUNT] {
        &self.bands
    }

    /// Mutable access to band contents. The array length is fixed by type.
    pub fn bands_mut(&mut self) -> &mut [Band; BAND_COUNT] {
        &mut self.bands
    }

    pub fn band(&self, index: usize) -> Option<&Band> {
        self.bands.get(index)
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn magnitudes(&self) -> [f64; BAND_COUNT] {
        std::array::from_fn(|i| self.bands[i].magnitude)
    }
}

/// Per-band update driven by the turn's shared scalar fields.
pub trait BandUpdate {
    fn apply(&self, band: &mut Band, state: &TrajectoryState);
}

impl<F> BandUpdate for F
where
    F: Fn(&mut Band, &TrajectoryState),
{
    fn apply(&self, band: &mut Band, state: &TrajectoryState) {
        self(band, state)
    }
}

/// Default update: restart the code from the wave type's seed and carry k4.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeedFromWaveType;

impl BandUpdate for SeedFromWaveType {
    fn apply(&self, band: &mut Band, state: &TrajectoryState) {
        band.state_code = band.wave_type.seed_code();
        band.carrier = state.k4;
    }
}

pub struct LatticeBandProcessor {
    update: Box<dyn BandUpdate + Send + Sync>,
}

impl Default for LatticeBandProcessor {
    fn default() -> Self {
        Self::new(SeedFromWaveType)
    }
}

impl LatticeBandProcessor {
    pub fn new(update: impl BandUpdate + Send + Sync + 'static) -> Self {
        Self {
            update: Box::new(update),
        }
    }

    /// Apply the turn's fields to every band in index order and advance the turn.
    pub fn update(&self, lattice: &mut Lattice, state: &TrajectoryState) {
        for band in lattice.bands.iter_mut() {
            self.update.apply(band, state);
        }
        lattice.turn += 1;
    }
}

impl std::fmt::Debug for LatticeBandProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatticeBandProcessor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitfield::StateCode;
    use crate::trajectory::Trajectory;

    fn state(k4: f64) -> TrajectoryState {
        TrajectoryState {
            n_total: 60,
            k500: k4 * 500.0,
            k4,
            trajectory: Trajectory::Descent,
        }
    }

    #[test]
    fn test_default_layout_cycles() {
        let lattice = Lattice::default();
        assert_eq!(lattice.bands().len(), BAND_COUNT);
        assert_eq!(lattice.bands()[0].wave_type, WaveType::Flat);
        assert_eq!(lattice.bands()[5].wave_type, WaveType::Harmonic);
        assert_eq!(lattice.bands()[15].wave_type, WaveType::Quantum);
    }

    #[test]
    fn test_indices_are_positions() {
        let lattice = Lattice::default();
        for (i, band) in lattice.bands().iter().enumerate() {
            assert_eq!(band.index(), i);
        }
    }

    #[test]
    fn test_update_reseeds_and_counts_turns() {
        let mut lattice = Lattice::default();
        lattice.bands_mut()[2].state_code = StateCode::new(0b1111);

        let processor = LatticeBandProcessor::default();
        processor.update(&mut lattice, &state(1.5));
        processor.update(&mut lattice, &state(2.5));

        assert_eq!(lattice.turn(), 2);
        assert_eq!(lattice.bands()[2].state_code, WaveType::Peak.seed_code());
        assert!(lattice.bands().iter().all(|b| b.carrier == 2.5));
        for (i, band) in lattice.bands().iter().enumerate() {
            assert_eq!(band.index(), i, "update must not reorder bands");
        }
    }

    #[test]
    fn test_custom_update_closure() {
        let processor = LatticeBandProcessor::new(|band: &mut Band, s: &TrajectoryState| {
            band.carrier = s.k500 + band.index() as f64;
        });
        let mut lattice = Lattice::default();
        processor.update(&mut lattice, &state(1.0));
        assert_eq!(lattice.bands()[3].carrier, 503.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut lattice = Lattice::default();
        LatticeBandProcessor::default().update(&mut lattice, &state(0.3));
        let json = serde_json::to_string(&lattice).unwrap();
        let back: Lattice = serde_json::from_str(&json).unwrap();
        assert_eq!(lattice, back);
    }
}
