//! # VCU Control Unit
//!
//! Runs the driving-input cycle against a simulated accelerator pedal and
//! traces every frame it would put on the motor control unit bus.
//!
//! The pedal sweeps 0% → 100% → 0% over `--pedal-period` cycles. With
//! `--inject-fault-at`, pedal channel 1 is cut for `--inject-fault-len`
//! cycles, which exercises fault confirmation and recovery.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use vcu_common::prelude::*;
use vcu_common::consts::DEFAULT_CONFIG_PATH;
use vcu_control_unit::cycle::{ControlCycle, CycleError, CycleRunner};
use vcu_control_unit::io::sim::{AdcBuffer, LogTransport, MonotonicClock, PedalSimulator};

/// VCU Control Unit: accelerator pedal validation and MCU command loop
#[derive(Parser, Debug)]
#[command(name = "vcu_control_unit")]
#[command(version)]
#[command(about = "Driving-input cycle for a vehicle control unit (simulated pedal)")]
struct Args {
    /// Path to the VCU configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many cycles (default: run until Ctrl-C).
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Cycles for one full pedal sweep.
    #[arg(long, default_value_t = 400)]
    pedal_period: u32,

    /// Cut pedal channel 1 starting at this cycle.
    #[arg(long, value_name = "N")]
    inject_fault_at: Option<u64>,

    /// Length of the injected fault [cycles].
    #[arg(long, value_name = "M", default_value_t = 20, requires = "inject_fault_at")]
    inject_fault_len: u64,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // The default log level comes from the file, so it is read before any
    // subscriber exists and `ConfigLoader`'s debug line is not recorded. The
    // outcome is logged once tracing is up.
    let config = load(&args);
    setup_tracing(&args, log_directive(&args, config.as_ref().ok()));

    info!("VCU Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config.map_err(CycleError::from).and_then(|config| {
        debug!(path = %args.config.display(), "configuration loaded");
        run(&args, &config)
    });
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("VCU Control Unit shutdown complete");
}

fn load(args: &Args) -> Result<VcuConfig, ConfigError> {
    let config = VcuConfig::load(&args.config)?;
    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: &VcuConfig) -> Result<(), CycleError> {
    info!(
        "Config OK: service={}, cycle_time={}µs, threshold={}ms",
        config.shared.service_name, config.cycle.cycle_time_us, config.fault.implausible_threshold_ms,
    );

    let adc = AdcBuffer::new(usize::from(config.adc.buffer_length))?;
    let mut pedal = PedalSimulator::new(
        config.sensor.calibration().map_err(ConfigError::from)?,
        [config.adc.throttle_channel0, config.adc.throttle_channel1],
        args.pedal_period,
    );
    if let Some(start) = args.inject_fault_at {
        info!(start, length = args.inject_fault_len, "injecting pedal channel 1 fault");
        pedal.inject_fault(start, args.inject_fault_len);
    }

    let cycle = ControlCycle::new(config, &adc, LogTransport::new(), MonotonicClock)?;
    let mut runner = CycleRunner::new(cycle, config).with_max_cycles(args.cycles);

    let running = runner.running();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    }) {
        error!("Failed to install signal handler: {e}");
    }

    runner.run(|_| Ok(pedal.tick(&adc)?))
}

/// Default filter directive: `--verbose`, else the configured level.
fn log_directive(args: &Args, config: Option<&VcuConfig>) -> &'static str {
    if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        config
            .map_or(LogLevel::default(), |c| c.shared.log_level)
            .as_directive()
    }
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
