//! # IIO Sensor HAL Binary
//!
//! Discovers the IIO sensors of the machine, enables them and streams their
//! events to stdout as JSON lines until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # All discovered sensors at 10 Hz
//! iio_hal
//!
//! # Accelerometer and ambient light at 50 Hz, verbose logs
//! iio_hal --sensor accel --sensor illuminance --rate-hz 50 -v
//!
//! # Custom configuration, JSON logs on stderr
//! iio_hal --config hal.toml --json
//! ```

use clap::Parser;
use iio_common::config::{ConfigError, ConfigLoader, HalConfig};
use iio_common::consts::{DEFAULT_CONFIG_PATH, HAL_SERVICE_NAME};
use iio_hal::{SensorEvent, SensorHal, SensorId};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// IIO Sensor HAL - multiplexes IIO sensors into one event stream
#[derive(Parser, Debug)]
#[command(name = "iio_hal")]
#[command(version)]
#[command(about = "IIO sensor multiplexing HAL")]
#[command(long_about = None)]
struct Args {
    /// Path to the HAL configuration file (hal.toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Sensor to enable, by tag or name (can be specified multiple times;
    /// default: all discovered sensors)
    #[arg(short, long = "sensor", action = clap::ArgAction::Append)]
    sensors: Vec<String>,

    /// Sampling rate in Hz
    #[arg(short, long, default_value_t = 10)]
    rate_hz: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("HAL startup failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = HalConfig::load(&args.config);
    let level = match &loaded {
        Ok(config) if !args.verbose => config
            .shared
            .log_level
            .as_directive()
            .parse()
            .unwrap_or(Level::INFO),
        _ if args.verbose => Level::DEBUG,
        _ => Level::INFO,
    };
    setup_tracing(&args, level);

    info!("IIO Sensor HAL v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => {
            info!("Loaded configuration from {:?}", args.config);
            config
        }
        Err(ConfigError::FileNotFound) => {
            warn!("No configuration at {:?}, using defaults", args.config);
            HalConfig::with_service_name(HAL_SERVICE_NAME)
        }
        Err(e) => return Err(e.into()),
    };

    if args.rate_hz == 0 {
        return Err("--rate-hz must be > 0".into());
    }

    let mut hal = SensorHal::new(config)?;
    if hal.sensor_count() == 0 {
        warn!("No IIO sensor found");
    }

    let selected = select_sensors(&hal, &args.sensors);
    let period_ns = 1_000_000_000 / i64::from(args.rate_hz);

    for &s in &selected {
        if let Err(e) = hal.set_sample_rate(s, period_ns) {
            warn!("Cannot set rate of sensor {}: {}", s, e);
        }
        if let Err(e) = hal.activate(s, true) {
            error!("Cannot enable sensor {}: {}", s, e);
        }
    }

    // Setup signal handler.
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let waker = hal.waker();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
        waker.wake();
    })?;

    let stdout = std::io::stdout();
    let mut out = [SensorEvent::default()];
    let mut delivered: u64 = 0;

    while running.load(Ordering::SeqCst) {
        match hal.poll_with(&mut out, || !running.load(Ordering::SeqCst)) {
            Ok(0) => break,
            Ok(_) => {
                let line = serde_json::to_string(&out[0])?;
                let mut lock = stdout.lock();
                if writeln!(lock, "{line}").is_err() {
                    // Reader went away.
                    break;
                }
                delivered += 1;
            }
            Err(e) => {
                error!("Poll failed: {}", e);
                break;
            }
        }
    }

    hal.shutdown();
    info!("IIO Sensor HAL stopped after {} events", delivered);
    Ok(())
}

/// Resolve `--sensor` arguments to handles; all sensors when none given.
fn select_sensors(hal: &SensorHal, wanted: &[String]) -> Vec<SensorId> {
    if wanted.is_empty() {
        return (0..hal.sensor_count()).collect();
    }

    let mut selected = Vec::new();
    for name in wanted {
        let matches = hal.lookup(name);
        if matches.is_empty() {
            warn!("No discovered sensor matches {:?}", name);
        }
        for id in matches {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
    }
    selected
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
