//! Ticket Scan CLI
//!
//! Command-line interface for demonstrating the live scanning subsystem.
//! Runs the mock capture pipeline by default; with the `camera` feature it
//! can drive real hardware.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use ticket_scan::capture::{CaptureBackend, FileConfig, MockBackend};
use ticket_scan::controller::{ScanCallbacks, ScanController, SurfacedError};
use ticket_scan::decode::{Decoder, ScriptedDecoder};
use ticket_scan::device::{CameraDevice, DeviceRegistry, MockRegistry};
use tracing::{info, warn};

#[cfg(feature = "camera")]
use ticket_scan::{capture::NokhwaBackend, decode::QrDecoder, device::NokhwaRegistry};

#[derive(Debug, Parser)]
#[command(name = "ticket-scan", version, about = "Live camera code scanning demo")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to keep the scanner active, in seconds.
    #[arg(long, default_value_t = 10)]
    duration: u64,

    /// List enumerated cameras and exit.
    #[arg(long)]
    list: bool,

    /// Use real camera hardware instead of the mock pipeline.
    #[cfg(feature = "camera")]
    #[arg(long)]
    real: bool,
}

fn build_stack(
    args: &Args,
) -> (
    Arc<dyn DeviceRegistry>,
    Arc<dyn CaptureBackend>,
    Arc<dyn Decoder>,
) {
    #[cfg(feature = "camera")]
    {
        if args.real {
            return (
                Arc::new(NokhwaRegistry),
                Arc::new(NokhwaBackend::new()),
                Arc::new(QrDecoder::new()),
            );
        }
    }
    let _ = args;

    let registry = MockRegistry::new(vec![
        CameraDevice::new("0", "Front Camera"),
        CameraDevice::new("1", "Back Camera"),
    ]);
    // A patron holding one ticket steady, then presenting another.
    let decoder = ScriptedDecoder::cycling(vec![
        Some("TICKET-0001".into()),
        None,
        Some("TICKET-0002".into()),
        None,
    ]);
    (
        Arc::new(registry),
        Arc::new(MockBackend::new()),
        Arc::new(decoder),
    )
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Ticket Scan v{}", ticket_scan::VERSION);

    let config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let (registry, backend, decoder) = build_stack(&args);

    if args.list {
        match registry.list_cameras() {
            Ok(devices) if devices.is_empty() => println!("No cameras found."),
            Ok(devices) => {
                for device in devices {
                    println!("{}  {}", device.id, device.label);
                }
            }
            Err(e) => {
                eprintln!("Enumeration failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let callbacks = ScanCallbacks::new(|value| {
        println!("scanned: {}", value);
    })
    .with_on_error(|err: &SurfacedError| {
        warn!(recoverable = err.recoverable, "Scanner error: {}", err);
    });

    let controller = ScanController::new(registry, backend, decoder, config.scan, callbacks);

    #[cfg(feature = "metrics")]
    if config.exporter.metrics_port != 0 {
        use ticket_scan::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

        match MetricsRegistry::new() {
            Ok(metrics) => {
                let server = MetricsServer::new(
                    MetricsServerConfig::with_port(config.exporter.metrics_port),
                    metrics,
                    controller.stats(),
                );
                tokio::spawn(async move {
                    if let Err(e) = server.run().await {
                        warn!("Metrics server failed: {}", e);
                    }
                });
            }
            Err(e) => warn!("Metrics registry unavailable: {}", e),
        }
    }

    // Ctrl-C flips the active flag, same as a caller toggling the scanner off.
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    }) {
        warn!("Ctrl-C handler unavailable: {}", e);
    }

    controller.set_active(true).await;
    info!(
        state = %controller.state(),
        duration = args.duration,
        "Scanning (Ctrl-C to stop early)"
    );

    if controller.can_switch_camera().await {
        if let Some(device) = controller.selected_camera().await {
            info!(label = %device.label, "Multiple cameras available; using");
        }
    }

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.duration)) => {}
        _ = shutdown_rx.changed() => {
            info!("Interrupted");
        }
    }

    controller.shutdown().await;

    let snap = controller.stats().snapshot();
    info!(
        frames = snap.frames_processed,
        hits = snap.decode_hits,
        forwarded = snap.scans_forwarded,
        suppressed = snap.scans_suppressed,
        "Done"
    );
}
