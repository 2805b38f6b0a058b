/// Geometrie Terminal - Rotating torus and octahedron
///
/// Controls:
///   - Mouse drag: orbit, right drag: pan, scroll: zoom
///   - c: cycle color, w: wireframe, [ ] { }: wireframe opacity
///   - v: show/hide solids
///   - q / ESC: Quit
use clap::{Parser, ValueEnum};
use geometrie_core::{Color, SettingsState, Timing, ViewportOptions};
use geometrie_terminal::TerminalApp;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimingArg {
    /// Fixed 50 ms steps
    Fixed,
    /// Every frame, scaled by elapsed time
    Delta,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Wireframed torus and octahedron in the terminal")]
struct Args {
    #[arg(long, value_enum, default_value_t = TimingArg::Delta)]
    timing: TimingArg,

    /// Leave the wireframe overlays out of the scene
    #[arg(long)]
    no_wireframe: bool,

    /// Initial solid color, e.g. #352935
    #[arg(long)]
    color: Option<Color>,

    /// Write logs here; the terminal itself is busy drawing
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> geometrie_core::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    let settings = SettingsState {
        color: args.color.unwrap_or(SettingsState::default().color),
        ..SettingsState::default()
    };
    let options = ViewportOptions {
        wireframe: !args.no_wireframe,
        timing: match args.timing {
            TimingArg::Fixed => Timing::fixed(),
            TimingArg::Delta => Timing::DeltaTime,
        },
        settings,
        ..ViewportOptions::default()
    };

    tracing::info!(?options, "starting terminal viewer");
    TerminalApp::run(options)?;

    println!("Thank you for using Geometrie!");
    Ok(())
}
