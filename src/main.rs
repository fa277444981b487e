//! Replays recorded detector output through the overlay pipeline.
//!
//! Usage:
//!   face-overlay fixture.json                     # Print the final overlay as JSON
//!   face-overlay fixture.json -o overlay.json     # Save to file
//!   face-overlay fixture.json --width 640 --height 480 --passes 3

use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;

#[allow(unused_imports)]
use log::{debug, info, warn, error};

use face_overlay::build_info::BuildInfo;
use face_overlay::config::{Config, APP_NAME};
use face_overlay::detection::{ReplayDetector, ReplayFixture};
use face_overlay::geometry::Rect;
use face_overlay::settings::UserSettings;
use face_overlay::{logging, AnalysisKind, DetectionError, DetectionSession, DisplayContext, OverlayRenderer};

#[derive(Parser, Debug)]
#[command(name = "face-overlay")]
#[command(author, version, about = "Overlay recorded face detections on image bounds", long_about = None)]
struct Args {
    /// Replay fixture with the image size and recorded detector results
    #[arg(required = true)]
    fixture: PathBuf,

    /// Settings file (default: platform config dir)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Displayed image width in pixels (default: fixture image width)
    #[arg(long, requires = "height")]
    width: Option<f32>,

    /// Displayed image height in pixels (default: fixture image height)
    #[arg(long, requires = "width")]
    height: Option<f32>,

    /// Write the effective settings, with comments, to this path
    #[arg(long)]
    write_settings: Option<PathBuf>,

    /// Number of detection passes to run
    #[arg(long, default_value = "1")]
    passes: usize,

    /// Export the captured log lines to the log directory on exit
    #[arg(long)]
    export_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match logging::setup_logger() {
        Ok(log_buffer) => logging::setup_panic_hook(APP_NAME, log_buffer),
        Err(e) => eprintln!("Failed to set up logging: {}", e),
    }
    info!("{} {}", APP_NAME, BuildInfo::summary());

    let export_logs = args.export_logs;
    if let Err(e) = run(args).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if export_logs {
        if let Some(log_buffer) = logging::shared_log_buffer() {
            if let Err(e) = logging::export_debug_logs(APP_NAME, &log_buffer) {
                eprintln!("Failed to export logs: {}", e);
            }
        }
    }
}

async fn run(args: Args) -> face_overlay::Result<()> {
    if args.passes == 0 {
        return Err(face_overlay::Error::InvalidArgument("--passes must be at least 1".to_string()));
    }

    let settings = UserSettings::load(args.settings.as_deref());
    if let Some(path) = &args.write_settings {
        settings.save_to(path)?;
        info!("Wrote settings to {}", path.display());
    }
    let config = Config::from_settings(&settings);

    let fixture = ReplayFixture::from_file(&args.fixture)?;
    let image = Arc::new(fixture.source_image());
    let bounds = match (args.width, args.height) {
        (Some(width), Some(height)) => Rect::from_size(width, height),
        _ => Rect::from_size(fixture.image.width as f32, fixture.image.height as f32),
    };

    let display = DisplayContext::new(bounds, OverlayRenderer::new(config.style))
        .with_error_handler(|kind: AnalysisKind, e: &DetectionError| {
            eprintln!("{} failed: {}", kind, e);
        });

    let mut session = DetectionSession::start(ReplayDetector::new(fixture), display);
    for _ in 0..args.passes {
        session.run_pass(Arc::clone(&image), config.requests.clone()).await?;
    }
    let surface = session.finish().await?;

    let json = serde_json::to_string_pretty(&surface.snapshot())?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Wrote overlay with {} annotation(s) to {}", surface.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
