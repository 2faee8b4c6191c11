//! JSON wire format for turn output and stimulus scripts.
//!
//! Field names are camelCase. The gate mask travels as a `0xF000`-style hex
//! string; enums travel as their upper-case labels. Stimulus scripts are
//! JSON Lines, one `{"iWeight", "theta", "intensity"}` object per line, with
//! blank lines and `#` comments ignored.

use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::routing::RoutingStatus;
use crate::session::TurnOutput;
use crate::stimulus::Stimulus;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurnReport {
    pub turn: u64,
    pub n_total: i64,
    pub k500: f64,
    pub k4: f64,
    pub trajectory: String,
    pub magnitudes: Vec<f64>,
    pub routing_key: i64,
    pub gate_mask: String,
    pub status: String,
    pub tier: String,
    pub override_active: bool,
}

impl From<&TurnOutput> for TurnReport {
    fn from(out: &TurnOutput) -> Self {
        Self {
            turn: out.turn,
            n_total: out.state.n_total,
            k500: out.state.k500,
            k4: out.state.k4,
            trajectory: out.state.trajectory.to_string(),
            magnitudes: out.magnitudes.to_vec(),
            routing_key: out.routing.routing_key,
            gate_mask: out.routing.gate_mask.to_string(),
            status: match out.routing.status {
                RoutingStatus::None => "NONE".to_string(),
                RoutingStatus::Crisis => "CRISIS".to_string(),
            },
            tier: out.routing.tier().to_string(),
            override_active: out.override_active,
        }
    }
}

impl TurnReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Parse a JSON Lines stimulus script. Errors name the 1-based line.
pub fn parse_stimulus_script(content: &str) -> Result<Vec<Stimulus>> {
    let mut stimuli = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let stimulus: Stimulus = serde_json::from_str(trimmed).map_err(|e| {
            LatticeError::InvalidStimulus(format!("line {}: {e}", i + 1))
        })?;
        stimuli.push(stimulus);
    }
    Ok(stimuli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::session::Session;

    #[test]
    fn test_crisis_report_fields() {
        let mut session = Session::new(&PipelineConfig::default()).unwrap();
        let out = session.turn(&Stimulus::new(70, 0.0, 1.0)).unwrap();
        let report = TurnReport::from(&out);
        assert_eq!(report.gate_mask, "0xF000");
        assert_eq!(report.status, "CRISIS");
        assert_eq!(report.tier, "transcendent");
        assert_eq!(report.magnitudes.len(), 16);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"routingKey\":270"));
        assert!(json.contains("\"overrideActive\":true"));
        assert!(json.contains("\"nTotal\":270"));
    }

    #[test]
    fn test_parse_script() {
        let script = "\
# warmup
{\"iWeight\": 0, \"theta\": 0.0, \"intensity\": 1.0}

{\"iWeight\": 5, \"theta\": 0.785, \"intensity\": 10.0}
";
        let stimuli = parse_stimulus_script(script).unwrap();
        assert_eq!(stimuli.len(), 2);
        assert_eq!(stimuli[1].i_weight, 5);
    }

    #[test]
    fn test_parse_script_names_bad_line() {
        let script = "{\"iWeight\": 0, \"theta\": 0.0, \"intensity\": 1.0}\nnot json\n";
        let err = parse_stimulus_script(script).unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }
}
