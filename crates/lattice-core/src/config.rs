//! Pipeline configuration, parsed from TOML.
//!
//! Every section defaults independently, so a file only names what it changes:
//!
//! ```toml
//! [crisis]
//! decay_rate = 0.8
//!
//! [dsp]
//! mod_rate = 0.25
//! ```

use serde::{Deserialize, Serialize};

use crate::band::WaveType;
use crate::constants::BAND_COUNT;
use crate::crisis::CrisisConfig;
use crate::dsp::DspConfig;
use crate::error::{LatticeError, Result};
use crate::lattice::default_layout;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Initial wave type of each band, in index order.
    pub layout: Vec<WaveType>,
    pub crisis: CrisisConfig,
    pub dsp: DspConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            layout: default_layout().to_vec(),
            crisis: CrisisConfig::default(),
            dsp: DspConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn wave_layout(&self) -> Result<[WaveType; BAND_COUNT]> {
        <[WaveType; BAND_COUNT]>::try_from(self.layout.as_slice()).map_err(|_| {
            LatticeError::Configuration(format!(
                "layout must name {BAND_COUNT} wave types, got {}",
                self.layout.len()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.wave_layout()?;
        self.crisis.validate()?;
        self.dsp.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::MantissaSource;

    #[test]
    fn test_empty_file_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config = PipelineConfig::from_toml_str(
            "[crisis]\ndecay_rate = 0.8\n\n[dsp]\nmod_rate = 0.25\n",
        )
        .unwrap();
        assert_eq!(config.crisis.decay_rate, 0.8);
        assert_eq!(config.crisis.band_start, 10);
        assert_eq!(config.dsp.mod_rate, 0.25);
        assert_eq!(config.dsp.mantissa, MantissaSource::default());
    }

    #[test]
    fn test_mantissa_source_from_toml() {
        let config =
            PipelineConfig::from_toml_str("[dsp.mantissa]\nkind = \"fractional-k4\"\n").unwrap();
        assert_eq!(config.dsp.mantissa, MantissaSource::FractionalK4);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_short_layout_rejected() {
        let config = PipelineConfig::from_toml_str("layout = [\"Flat\", \"Peak\"]\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(LatticeError::Configuration(_))
        ));
    }

    #[test]
    fn test_bad_crisis_range_rejected() {
        let config = PipelineConfig::from_toml_str("[crisis]\nband_end = 20\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_mantissa_rejected() {
        let config = PipelineConfig::from_toml_str(
            "[dsp.mantissa]\nkind = \"fixed\"\nvalue = nan\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(LatticeError::Configuration(_))
        ));
    }

    #[test]
    fn test_huge_steps_rejected_without_panic() {
        let config =
            PipelineConfig::from_toml_str("[crisis]\nsteps = 4000000000000000000\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(LatticeError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = PipelineConfig::from_toml_str("[crisis\n").unwrap_err();
        assert!(matches!(err, LatticeError::Configuration(_)));
    }
}
