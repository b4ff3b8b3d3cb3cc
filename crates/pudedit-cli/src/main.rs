//! pudedit - open or create a PUD map and report on it.
//!
//! - `pudedit` - create a blank map in memory and print its summary
//! - `pudedit map.pud` - open `map.pud` if it exists, otherwise create it

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use pudedit_core::{EditorConfig, EditorSession, NullObserver};
use pudedit_protocol::{wire, Era, MsgpackCodec, PlayerId};

#[derive(Parser)]
#[command(name = "pudedit")]
#[command(about = "PUD map editor core", version)]
struct Cli {
    /// Map to open, or to create when it does not exist
    path: Option<PathBuf>,

    /// Width of a new map
    #[arg(long, default_value_t = 32)]
    width: u16,

    /// Height of a new map
    #[arg(long, default_value_t = 32)]
    height: u16,

    /// Tileset of a new map
    #[arg(long, value_enum, default_value_t = EraArg::Forest)]
    era: EraArg,

    /// Editor configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the map here after loading
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the file model as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum EraArg {
    Forest,
    Winter,
    Wasteland,
    Swamp,
}

impl From<EraArg> for Era {
    fn from(era: EraArg) -> Self {
        match era {
            EraArg::Forest => Era::Forest,
            EraArg::Winter => Era::Winter,
            EraArg::Wasteland => Era::Wasteland,
            EraArg::Swamp => Era::Swamp,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::load_or_default(Path::new("pudedit.yaml"))?,
    };

    let mut session = match &cli.path {
        Some(path) if path.exists() => {
            EditorSession::open(&MsgpackCodec, path, config, NullObserver)
                .with_context(|| format!("Failed to open {}", path.display()))?
        }
        Some(path) => {
            let mut session = new_map(&cli, config)?;
            session
                .save(&MsgpackCodec, path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            session
        }
        None => new_map(&cli, config)?,
    };

    if let Some(out) = &cli.out {
        session
            .save(&MsgpackCodec, out)
            .with_context(|| format!("Failed to save {}", out.display()))?;
    }

    let file = session.to_map_file().context("Map is inconsistent")?;
    if cli.json {
        println!("{}", wire::serialize_map_json(&file)?);
        return Ok(());
    }

    println!("Map {}x{} ({:?})", file.width, file.height, file.era);
    if !file.description.is_empty() {
        println!("  {}", file.description);
    }
    println!("Units: {}", session.units().count());
    for player in PlayerId::players().chain([PlayerId::NEUTRAL]) {
        let units = session.units().units_of(player);
        if units.is_empty() {
            continue;
        }
        let settings = session.player_settings(player);
        let label = if player.is_neutral() {
            "neutral".to_string()
        } else {
            format!("player {}", player.0 + 1)
        };
        print!(
            "  {label:<9} {:?}/{:?} {} units",
            settings.race,
            settings.controller,
            units.len()
        );
        match session.units().start_location_of(player) {
            Some((x, y)) => println!(", starts at ({x}, {y})"),
            None => println!(),
        }
    }
    Ok(())
}

fn new_map(cli: &Cli, config: EditorConfig) -> Result<EditorSession> {
    let mut session = EditorSession::new(cli.width, cli.height, config, NullObserver)
        .with_context(|| format!("Failed to create a {}x{} map", cli.width, cli.height))?;
    session.set_era(cli.era.into());
    tracing::info!(width = cli.width, height = cli.height, "new map");
    Ok(session)
}
