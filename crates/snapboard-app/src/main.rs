//! Main application entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kurbo::Size;
use snapboard_app::{App, AppConfig, ShortcutRegistry, parse_script};
use snapboard_core::EngineConfig;

/// Command-line arguments for snapboard.
#[derive(Debug, Clone, Parser)]
#[command(name = "snapboard")]
#[command(about = "Replay pointer scripts through the Snapboard layout engine")]
#[command(version)]
struct CliArgs {
    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input script to replay (JSON array of steps)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Layout to start from (JSON array of element records)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Number of grid-placed test elements to start with
    #[arg(long, default_value_t = 0)]
    elements: usize,

    /// Container width
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Container height
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Print keyboard shortcuts and exit
    #[arg(long)]
    shortcuts: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    if args.shortcuts {
        ShortcutRegistry::print_all();
        return Ok(());
    }

    let engine = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    let mut app = App::with_config(AppConfig {
        container: Size::new(args.width, args.height),
        engine,
        elements: args.elements,
    });
    log::info!("Starting Snapboard with a {}x{} container", args.width, args.height);

    if let Some(path) = &args.layout {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let count = app.engine_mut().import_json(&json)?;
        log::info!("Loaded {count} elements from {}", path.display());
    }

    if let Some(path) = &args.script {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let steps = parse_script(&json).with_context(|| format!("parsing {}", path.display()))?;
        let stats = app.run(&steps);
        if stats.failed > 0 {
            log::warn!("{} of {} steps failed", stats.failed, stats.steps);
        }
    }

    println!("{}", app.export_json()?);
    Ok(())
}
