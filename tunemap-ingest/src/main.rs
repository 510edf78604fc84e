//! tunemap-ingest - builds the tunes-by-places dataset
//!
//! Fetches Irish settlements from OpenStreetMap and tunes from TheSession,
//! then attaches to each place the tunes whose names mention it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};
use tunemap_common::config::{
    load_toml_config, resolve_config_path, resolve_data_dir, TomlConfig, DEFAULT_LOG_LEVEL,
};
use tunemap_ingest::services::tune_listing::render_listing;
use tunemap_ingest::{DataStore, Pipeline};

/// Command-line arguments for tunemap-ingest
#[derive(Parser, Debug)]
#[command(name = "tunemap-ingest")]
#[command(about = "Builds the tunes-by-places dataset")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding places.geojson, tunes.json and tunesByPlaces.geojson
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch places from OpenStreetMap and normalize them
    Places {
        /// Normalize a previously downloaded GeoJSON file instead of querying Overpass
        #[arg(long)]
        from_file: Option<PathBuf>,
    },
    /// Fetch tunes and aliases from TheSession and consolidate them
    Tunes,
    /// Match stored places against stored tunes
    Merge,
    /// Run all three stages
    Run,
    /// Print the tunes attached to a place of the merged output
    Show {
        /// Place name (primary or Irish)
        name: String,
    },
}

fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_path) {
        Some(path) => load_toml_config(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(TomlConfig::default()),
    }
}

/// Filter directives for this workspace's crates at one level
fn log_directives(level: &str) -> String {
    format!("tunemap_ingest={level},tunemap_common={level}")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing before the config is read so its warnings are visible.
    // RUST_LOG wins; otherwise start at info and switch to [logging] level below.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let level_from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(log_directives(DEFAULT_LOG_LEVEL))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(args.config.as_deref())?;
    if !level_from_env {
        filter_handle
            .reload(EnvFilter::new(log_directives(&config.logging.level)))
            .context("Failed to apply configured log level")?;
    }

    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config);
    info!("Starting tunemap-ingest {}", env!("CARGO_PKG_VERSION"));
    info!("Data folder: {}", data_dir.display());

    let pipeline = Pipeline::new(config, DataStore::new(data_dir));

    match args.command {
        Command::Places { from_file } => {
            match from_file {
                Some(path) => pipeline.import_places(&path)?,
                None => pipeline.acquire_places().await?,
            };
        }
        Command::Tunes => {
            pipeline.acquire_tunes().await?;
        }
        Command::Merge => {
            pipeline.merge_stored()?;
        }
        Command::Run => {
            let stats = pipeline.run().await?;
            info!(
                places = stats.places_out,
                tune_links = stats.tune_links,
                "Pipeline complete"
            );
        }
        Command::Show { name } => match pipeline.find_place(&name)? {
            Some(place) => print!("{}", render_listing(&place)),
            None => anyhow::bail!(
                "No place named '{}' in {}",
                name,
                pipeline.store().output_path().display()
            ),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_config_warning_is_logged_at_startup_level() {
        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(log_directives(DEFAULT_LOG_LEVEL)))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(move || writer.clone()),
            );

        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        let config = tracing::subscriber::with_default(subscriber, || {
            load_config(Some(missing.as_path()))
        })
        .unwrap();

        assert_eq!(config, TomlConfig::default());
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("Config file not found"));
    }

    #[test]
    fn test_log_directives_cover_both_crates() {
        assert_eq!(
            log_directives("debug"),
            "tunemap_ingest=debug,tunemap_common=debug"
        );
    }
}
