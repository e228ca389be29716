use anyhow::Context;
use clap::{Parser, Subcommand};
use sgate_core::{to_real, InferenceEngine, SpectralGate, BATTERY_NOMINAL_MV, DEFAULT_MODEL};
use sgate_node::scenario::{render_table, run_demo, write_csv, DEMO_READINGS};
use sgate_node::{MockHal, ModelFile, NodeConfig, SensorNode, VibrationPattern};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "sgate")]
#[command(about = "Energy-adaptive vibration anomaly detection for battery-powered sensor nodes")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the morning / evening / damage scenario
    Demo {
        /// Also write the table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Run the duty cycle against the simulated board
    Run {
        #[arg(long, default_value_t = 10)]
        cycles: u64,
        #[arg(long, value_enum, default_value = "anomaly")]
        pattern: VibrationPattern,
        #[arg(long, default_value_t = BATTERY_NOMINAL_MV)]
        battery_mv: u16,
        /// Signal amplitude in raw counts
        #[arg(long, default_value_t = 27000)]
        amplitude: i16,
        /// Tone frequency for the sinusoid pattern
        #[arg(long, default_value_t = 100.0)]
        frequency: f64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Write the baked model as JSON
    ExportModel {
        /// Output JSON file path
        path: PathBuf,
    },
}

fn init_logging(json: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(tracing::Level::INFO);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<NodeConfig> {
    match path {
        Some(path) => {
            let config =
                NodeConfig::load(path).with_context(|| format!("Loading config {}", path.display()))?;
            info!(path = %path.display(), "Configuration loaded");
            Ok(config)
        }
        None => Ok(NodeConfig::default()),
    }
}

fn demo(config: &NodeConfig, csv_path: Option<&Path>) -> anyhow::Result<()> {
    let thresholds = config.threshold_config();
    let mut hal = MockHal::new();
    let summary = run_demo(&mut hal, &DEMO_READINGS, &thresholds);

    println!();
    println!("SPECTRAL-GATE Energy-Adaptive Demo");
    println!(
        "Base Threshold: {:.0}% | Low Battery Multiplier: {:.1}x | Critical Multiplier: {:.1}x",
        to_real(thresholds.base_confidence_threshold) * 100.0,
        to_real(thresholds.low_battery_multiplier),
        to_real(thresholds.critical_battery_multiplier),
    );
    println!("Battery Levels: CRITICAL < 3000mV | LOW < 3300mV | NOMINAL >= 3700mV");
    println!();
    print!("{}", render_table(&summary.rows));
    println!();
    println!("  Phase 1 (High Battery): TX_UNCERTAIN decisions = {}", summary.tx_uncertain);
    println!("  Phase 2 (Low Battery):  SLEEP decisions = {}", summary.sleeps);
    println!("  Phase 3 (Critical):     TX_ALERT decisions = {}", summary.tx_alert);
    println!("  Total Transmissions:    {}", hal.transmit_count());
    println!("  Total Sleep Time:       {} ms", hal.total_sleep_ms());

    if let Some(path) = csv_path {
        let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
        write_csv(&summary.rows, file)?;
        info!(path = %path.display(), rows = summary.rows.len(), "CSV written");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run(
    config: &NodeConfig,
    cycles: u64,
    pattern: VibrationPattern,
    battery_mv: u16,
    amplitude: i16,
    frequency: f64,
    seed: u64,
) -> anyhow::Result<()> {
    let model_file = match &config.model.path {
        Some(path) => Some(ModelFile::load(path)?),
        None => None,
    };
    let engine = match &model_file {
        Some(file) => file.engine()?,
        None => InferenceEngine::with_default_model(),
    };
    let gate = SpectralGate::new(config.spectral_processor(), engine, config.threshold_config())
        .context("Model does not fit the spectral front end")?;

    let mut hal = MockHal::with_seed(seed).with_pattern(pattern).with_battery(battery_mv);
    hal.set_signal_amplitude(amplitude);
    hal.set_signal_frequency(frequency);

    info!(cycles, ?pattern, battery_mv, amplitude, "Starting duty cycle");
    let mut node = SensorNode::new(hal, gate, config.node_settings());
    for report in node.run(cycles) {
        info!(
            tick_ms = report.tick_ms,
            battery_mv = report.battery_mv,
            decision = %report.decision(),
            class = report.analysis.inference.predicted_class,
            confidence = to_real(report.analysis.inference.confidence),
            threshold = to_real(report.analysis.effective_threshold),
            "Cycle complete"
        );
    }

    let stats = node.stats();
    println!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

fn export_model(path: &Path) -> anyhow::Result<()> {
    ModelFile::from_model(&DEFAULT_MODEL).save(path)?;
    info!(path = %path.display(), "Default model exported");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.json_logs) {
        eprintln!("Logging setup failed: {e}");
    }

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Demo { csv } => demo(&config, csv.as_deref()),
        Commands::Run {
            cycles,
            pattern,
            battery_mv,
            amplitude,
            frequency,
            seed,
        } => run(&config, cycles, pattern, battery_mv, amplitude, frequency, seed),
        Commands::ExportModel { path } => export_model(&path),
    });

    if let Err(e) = result {
        error!(error = ?e, "Fatal Error");
        std::process::exit(1);
    }
}
