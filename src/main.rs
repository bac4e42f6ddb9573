//! Joystick Controller - interactive host
//!
//! Loads a scene of virtual joysticks and drives them from typed or scripted
//! pointer commands, printing every reading.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use joystick_controller::config::SceneConfig;

/// Joystick Controller - on-screen virtual joysticks driven from the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to scene file (built-in scene when missing)
    #[arg(short, long, default_value = "joysticks.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Replay commands from a file instead of starting the REPL
    #[arg(short, long)]
    script: Option<String>,

    /// Print readings and logs as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.json)?;

    info!("Starting Joystick Controller v{}...", env!("CARGO_PKG_VERSION"));

    let scene_config = load_scene(&args.config).await?;
    let mut console = cli::Console::new(&scene_config, args.json)?;
    info!("Scene loaded with {} joystick(s)", console.scene().len());

    match &args.script {
        Some(script) => cli::run_script(&mut console, script).await?,
        None => cli::run_repl(&mut console).await?,
    }

    info!("Joystick Controller shutdown complete");
    Ok(())
}

async fn load_scene(path: &str) -> Result<SceneConfig> {
    if Path::new(path).exists() {
        info!("Configuration file: {}", path);
        SceneConfig::load(path).await
    } else {
        info!("No scene file at {}, using built-in scene", path);
        Ok(SceneConfig::default_scene())
    }
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
    });
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .init();

    Ok(())
}
