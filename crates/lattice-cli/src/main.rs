mod render;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lattice_core::{
    PipelineConfig, Session, StepSummary, Stimulus, Swarm, TurnReport, parse_stimulus_script,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Parser)]
#[command(name = "lattice", about = "Deterministic trajectory lattice engine CLI")]
struct Cli {
    /// Pipeline configuration file (TOML). Falls back to LATTICE_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single turn on a fresh session
    Turn {
        #[arg(long, allow_negative_numbers = true)]
        i_weight: i64,

        /// Angle in radians
        #[arg(long, allow_negative_numbers = true)]
        theta: f64,

        #[arg(long, allow_negative_numbers = true)]
        intensity: f64,

        /// Print the turn report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a JSON Lines stimulus script through one session
    Run {
        /// Script path, one stimulus object per line
        script: PathBuf,
    },

    /// Step many independent sessions with seeded random stimuli
    Swarm {
        #[arg(long, default_value_t = 64)]
        sessions: usize,

        #[arg(long, default_value_t = 100)]
        turns: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("LATTICE_CONFIG").ok().map(PathBuf::from));

    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config = PipelineConfig::from_toml_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            tracing::info!("loaded config from {}", path.display());
            config
        }
        None => PipelineConfig::default(),
    };

    config.validate().context("invalid pipeline configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Turn {
            i_weight,
            theta,
            intensity,
            json,
        } => cmd_turn(&cli, Stimulus::new(*i_weight, *theta, *intensity), *json),
        Commands::Run { script } => cmd_run(&cli, script),
        Commands::Swarm {
            sessions,
            turns,
            seed,
        } => cmd_swarm(&cli, *sessions, *turns, *seed),
        Commands::Config => cmd_config(&cli),
    }
}

fn cmd_turn(cli: &Cli, stimulus: Stimulus, json: bool) -> Result<()> {
    let config = load_config(cli)?;
    let mut session = Session::new(&config).context("failed to create session")?;
    let out = session.turn(&stimulus).context("turn failed")?;

    if json {
        let report = TurnReport::from(&out);
        println!("{}", report.to_json().context("failed to serialize report")?);
    } else {
        print!("{}", render::turn_text(&out));
    }
    Ok(())
}

fn cmd_run(cli: &Cli, script: &Path) -> Result<()> {
    let config = load_config(cli)?;
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read {}", script.display()))?;
    let stimuli = parse_stimulus_script(&content)
        .with_context(|| format!("failed to parse {}", script.display()))?;

    let mut session = Session::new(&config).context("failed to create session")?;
    tracing::debug!(session = %session.id(), turns = stimuli.len(), "running script");

    for (i, stimulus) in stimuli.iter().enumerate() {
        let out = session
            .turn(stimulus)
            .with_context(|| format!("turn {} failed", i + 1))?;
        let report = TurnReport::from(&out);
        println!("{}", report.to_json().context("failed to serialize report")?);
    }
    Ok(())
}

fn cmd_swarm(cli: &Cli, sessions: usize, turns: usize, seed: u64) -> Result<()> {
    if sessions == 0 {
        bail!("--sessions must be at least 1");
    }
    let config = load_config(cli)?;
    let mut swarm = Swarm::new(sessions, &config).context("failed to create swarm")?;
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut total = StepSummary::default();
    let start = Instant::now();
    for _ in 0..turns {
        let stimuli: Vec<Stimulus> = (0..sessions).map(|_| random_stimulus(&mut rng)).collect();
        let results = swarm.step(&stimuli).context("swarm step failed")?;
        let step = StepSummary::from_results(&results);
        total.completed += step.completed;
        total.crises += step.crises;
        total.failed += step.failed;
    }
    let elapsed = start.elapsed();

    print!(
        "{}",
        render::swarm_text(sessions, turns, &total, swarm.faulted(), elapsed)
    );
    Ok(())
}

/// Stimuli spread across both sides of the ascent and crisis thresholds.
fn random_stimulus(rng: &mut SmallRng) -> Stimulus {
    Stimulus::new(
        rng.random_range(0..90),
        rng.random_range(-1.5..1.5),
        rng.random_range(0.0..8.0),
    )
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let text = config
        .to_toml_string()
        .context("failed to serialize configuration")?;
    print!("{text}");
    Ok(())
}
