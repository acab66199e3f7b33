//! Proximity Guard CLI
//!
//! Screen-distance protection driven by face-area observations.

use chrono::Utc;
use clap::{Parser, Subcommand};
use proximity_guard::{
    config::Config,
    engine::{create_shared_baseline, Intent, ProximityEngine},
    source::{SimulatedSource, SimulatedSourceConfig},
    stats::{create_shared_log_with_persistence, SharedProtectionLog},
    PRIVACY_DECLARATION, VERSION,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "proximity-guard")]
#[command(version = VERSION)]
#[command(about = "Screen-distance protection from face-area observations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a protection session against the simulated observation source
    Start {
        /// Milliseconds between synthetic frames
        #[arg(long, default_value = "100")]
        interval_ms: u64,

        /// Stop automatically after this many seconds
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// Pause protection
    Pause,

    /// Resume protection
    Resume,

    /// Show current configuration and cumulative statistics
    Status,

    /// Record the calibrated baseline face area
    Calibrate {
        /// Normalized face area at a comfortable distance (0..1)
        #[arg(long)]
        area: f64,
    },

    /// Display privacy declaration
    Privacy,

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            interval_ms,
            duration_secs,
        } => cmd_start(interval_ms, duration_secs),
        Commands::Pause => cmd_pause(),
        Commands::Resume => cmd_resume(),
        Commands::Status => cmd_status(),
        Commands::Calibrate { area } => cmd_calibrate(area),
        Commands::Privacy => cmd_privacy(),
        Commands::Config => cmd_config(),
    }
}

fn cmd_start(interval_ms: u64, duration_secs: Option<u64>) {
    println!("Proximity Guard v{VERSION}");
    println!();

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        eprintln!("Fix the configuration and try again (see `proximity-guard config`).");
        std::process::exit(1);
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    if config.protection.baseline_area == 0.0 {
        println!("Note: baseline is uncalibrated; any detected face will trip the");
        println!("threshold. Run `proximity-guard calibrate --area <value>` first.");
        println!();
    }

    println!("Starting protection...");
    println!("  Baseline area: {}", config.protection.baseline_area);
    println!("  Threshold factor: {}", config.protection.threshold_factor);
    println!("  Hysteresis gap: {}", config.protection.hysteresis_gap);
    println!("  Warning time: {}s", config.protection.warning_time_secs);
    println!("  Smoothing window: {}", config.smoothing_window);
    println!(
        "  Haptics: {}",
        if config.protection.haptics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Statistics sink
    let log = create_shared_log_with_persistence(config.data_path.join("protection_stats.json"));
    println!("Session ID: {}", log.session_id());

    // Shared baseline cell: state machine reads, corrector writes
    let baseline = create_shared_baseline(config.protection.baseline_area);

    let mut engine = ProximityEngine::new(
        &config.protection,
        &config.sampling,
        config.smoothing_window,
        baseline,
        Instant::now(),
    );

    // Simulated source; a real deployment plugs camera + detector in here
    let mut source = SimulatedSource::new(SimulatedSourceConfig {
        frame_interval_ms: interval_ms,
        baseline_area: if config.protection.baseline_area > 0.0 {
            config.protection.baseline_area
        } else {
            0.1
        },
        detection_threshold: config.protection.detection_threshold,
        ..Default::default()
    });

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    // Support pause/resume from another process by polling the config file.
    let mut paused = config.paused;
    let mut last_config_check = Instant::now();

    if paused {
        println!("Protection is currently paused.");
        println!("Run `proximity-guard resume` to start monitoring.");
        println!();
    } else if let Err(e) = source.start() {
        eprintln!("Error starting observation source: {e}");
        std::process::exit(1);
    }

    let session_started = Instant::now();
    let mut block_entered: Option<Instant> = None;
    let mut last_face_detected = false;
    let receiver = source.receiver().clone();

    while running.load(Ordering::SeqCst) {
        if let Some(limit) = duration_secs {
            if session_started.elapsed() >= Duration::from_secs(limit) {
                break;
            }
        }

        // Reload config once a second so `proximity-guard pause/resume` can
        // control a running session.
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if cfg.paused != paused {
                    paused = cfg.paused;

                    if paused {
                        println!();
                        println!("Pausing protection...");
                        source.stop();
                        while receiver.try_recv().is_ok() {}
                    } else {
                        println!();
                        println!("Resuming protection...");
                        if let Err(e) = source.start() {
                            eprintln!("Error resuming observation source: {e}");
                            std::process::exit(1);
                        }
                    }
                }
            }
            last_config_check = Instant::now();
        }

        if paused {
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(observation) => {
                log.record_observation_received();
                last_face_detected = observation.face_detected;

                let accepted_before = engine.frames_accepted();
                let intents = engine.process(&observation, Instant::now());
                if engine.frames_accepted() > accepted_before {
                    log.record_observation_accepted();
                }

                dispatch_intents(&intents, &log, &mut block_entered);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                // Source idle; nothing to decide on.
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                eprintln!("Observation source disconnected unexpectedly");
                break;
            }
        }
    }

    // Stop and settle any open block episode
    println!();
    println!("Stopping protection...");
    source.stop();

    if let Some(entered) = block_entered.take() {
        log.record_blocked_seconds(entered.elapsed().as_secs());
    }

    if let Err(e) = log.save() {
        eprintln!("Warning: Could not save protection stats: {e}");
    }

    println!();
    println!("Final state: {}", engine.status_line(last_face_detected));
    println!(
        "Frames seen: {} ({} accepted, {} dropped at source)",
        engine.frames_seen(),
        engine.frames_accepted(),
        source.dropped_frames()
    );
    println!();
    println!("{}", log.summary());
}

/// Hand the cycle's intents to their external collaborators. Overlay and
/// haptics rendering live outside this binary; here they surface as log
/// lines.
fn dispatch_intents(
    intents: &[Intent],
    log: &SharedProtectionLog,
    block_entered: &mut Option<Instant>,
) {
    for intent in intents {
        match intent {
            Intent::ShowOverlay => {
                println!("[overlay] shown - screen blocked");
            }
            Intent::HideOverlay => {
                println!("[overlay] hidden - screen released");
                if let Some(entered) = block_entered.take() {
                    log.record_blocked_seconds(entered.elapsed().as_secs());
                }
            }
            Intent::TriggerHapticFeedback => {
                println!("[haptic] pulse");
            }
            Intent::RecordWarningEvent => {
                log.record_warning_event();
            }
            Intent::RecordBlockEvent => {
                log.record_block_event();
                *block_entered = Some(Instant::now());
            }
            Intent::UpdateStatusMessage(message) => {
                println!("[{}] {}", Utc::now().format("%H:%M:%S"), message);
            }
            Intent::PersistBaseline(value) => {
                log.record_baseline_correction();
                println!(
                    "[{}] Baseline corrected to {:.4}",
                    Utc::now().format("%H:%M:%S"),
                    value
                );
                persist_baseline(*value);
            }
        }
    }
}

/// Write a corrected baseline back into the saved configuration.
fn persist_baseline(value: f64) {
    match Config::load() {
        Ok(mut config) => {
            config.protection.baseline_area = value;
            if let Err(e) = config.save() {
                eprintln!("Warning: Could not persist corrected baseline: {e}");
            }
        }
        Err(e) => {
            eprintln!("Warning: Could not load config to persist baseline: {e}");
        }
    }
}

fn cmd_pause() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = true;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Protection paused. Use 'proximity-guard resume' to continue.");
}

fn cmd_resume() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = false;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Protection resumed.");
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Proximity Guard Status");
    println!("======================");
    println!();

    println!("Configuration:");
    println!(
        "  Baseline area: {}{}",
        config.protection.baseline_area,
        if config.protection.baseline_area == 0.0 {
            " (uncalibrated)"
        } else {
            ""
        }
    );
    println!("  Threshold factor: {}", config.protection.threshold_factor);
    println!("  Hysteresis gap: {}", config.protection.hysteresis_gap);
    println!("  Warning time: {}s", config.protection.warning_time_secs);
    println!(
        "  Haptics: {}",
        if config.protection.haptics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Paused: {}", config.paused);
    println!();

    let stats_path = config.data_path.join("protection_stats.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(n) = stats.get("observations_received") {
                    println!("  Observations received: {n}");
                }
                if let Some(n) = stats.get("warning_events") {
                    println!("  Warnings issued: {n}");
                }
                if let Some(n) = stats.get("block_events") {
                    println!("  Screen blocks: {n}");
                }
                if let Some(n) = stats.get("blocked_seconds") {
                    println!("  Time spent blocked: {n}s");
                }
                if let Some(n) = stats.get("baseline_corrections") {
                    println!("  Baseline corrections: {n}");
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_calibrate(area: f64) {
    if !(0.0..=1.0).contains(&area) || area == 0.0 {
        eprintln!("Error: baseline area must be in (0, 1], got {area}");
        std::process::exit(1);
    }

    let mut config = Config::load().unwrap_or_default();
    config.protection.baseline_area = area;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Baseline calibrated to {area}.");
    println!(
        "Warning threshold is now {:.4} (area), release at {:.4}.",
        area * config.protection.threshold_factor,
        area * (config.protection.threshold_factor - config.protection.hysteresis_gap).max(1.0)
    );
}

fn cmd_privacy() {
    println!("{PRIVACY_DECLARATION}");
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
