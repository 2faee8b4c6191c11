//! Plain-text rendering for terminal output.

use std::time::Duration;

use lattice_core::{StepSummary, TurnOutput};

pub fn turn_text(out: &TurnOutput) -> String {
    let bands: Vec<String> = out.magnitudes.iter().map(|m| format!("{m:.4}")).collect();
    let mut text = String::new();
    text.push_str(&format!("turn:       {}\n", out.turn));
    text.push_str(&format!("n_total:    {}\n", out.state.n_total));
    text.push_str(&format!("k500:       {:.2}\n", out.state.k500));
    text.push_str(&format!("k4:         {:.4}\n", out.state.k4));
    text.push_str(&format!("trajectory: {}\n", out.state.trajectory));
    text.push_str(&format!(
        "routing:    key={} mask={} tier={}\n",
        out.routing.routing_key,
        out.routing.gate_mask,
        out.routing.tier()
    ));
    text.push_str(&format!("override:   {}\n", if out.override_active { "active" } else { "none" }));
    text.push_str(&format!("bands:      {}\n", bands.join(" ")));
    text
}

pub fn swarm_text(
    sessions: usize,
    turns: usize,
    total: &StepSummary,
    faulted: usize,
    elapsed: Duration,
) -> String {
    let secs = elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        total.completed as f64 / secs
    } else {
        0.0
    };
    let mut text = String::new();
    text.push_str(&format!("sessions:   {sessions}\n"));
    text.push_str(&format!("turns:      {turns}\n"));
    text.push_str(&format!("completed:  {}\n", total.completed));
    text.push_str(&format!("crises:     {}\n", total.crises));
    text.push_str(&format!("failed:     {}\n", total.failed));
    text.push_str(&format!("faulted:    {faulted}\n"));
    text.push_str(&format!("elapsed:    {:.1}ms\n", secs * 1000.0));
    text.push_str(&format!("throughput: {throughput:.0} turns/s\n"));
    text
}
