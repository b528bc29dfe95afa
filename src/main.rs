//! Photogrid - search and browse photos in the terminal.
//!
//! # Usage
//!
//! ```bash
//! photogrid
//! photogrid sunset over water
//! photogrid --no-images --api-key KEY cats
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use photogrid::app::App;
use photogrid::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use photogrid::source::FlickrSource;

/// Search and browse photos in the terminal
#[derive(Parser, Debug)]
#[command(name = "photogrid", version, about, long_about = None)]
struct Cli {
    /// Search to run at startup; shows recent photos when omitted
    #[arg(value_name = "QUERY")]
    query: Vec<String>,

    /// Flickr API key (falls back to FLICKR_API_KEY)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Disable thumbnail rendering (titles only)
    #[arg(long)]
    no_images: bool,

    /// Force image rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Write debug logs to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Directory holding the persisted search history
    #[arg(long, value_name = "PATH")]
    history_dir: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Route logs to `path`, or drop them. The terminal is in raw mode while the
/// app runs, so nothing may be written to stdout or stderr.
fn init_logging(path: Option<&PathBuf>) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("photogrid=debug"));
    let file = path.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("[warn] Failed to open debug log {}: {err}", path.display());
                None
            }
        }
    });
    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let debug_log = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("PHOTOGRID_DEBUG_LOG").map(PathBuf::from));
    init_logging(debug_log.as_ref());

    let Some(api_key) = effective
        .api_key
        .clone()
        .or_else(|| std::env::var("FLICKR_API_KEY").ok())
        .filter(|key| !key.trim().is_empty())
    else {
        anyhow::bail!("No API key: pass --api-key or set FLICKR_API_KEY");
    };
    let source = FlickrSource::new(api_key).context("Failed to build HTTP client")?;

    let query = cli.query.join(" ");
    tracing::info!(query = %query, images = !effective.no_images, "starting");

    let mut app = App::new()
        .with_initial_query(Some(query).filter(|q| !q.trim().is_empty()))
        .with_images_enabled(!effective.no_images)
        .with_force_half_cell(effective.force_half_cell)
        .with_history_dir(effective.history_dir.clone())
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run(source).context("Application error")
}
