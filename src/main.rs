use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use fishtable::{
    catalog::CatalogLoader,
    config::AppConfig,
    criteria::FilterCriteria,
    pipeline::filter_and_group,
    prefs::{DEFAULT_SEASON, DEFAULT_TOOL, DEFAULT_WEATHER, FilePreferenceStore},
    render::{render_tables, Layout},
    service::{CatalogSource, TableService},
    telemetry::init_tracing,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Fish availability tables by tool, season and weather")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tables for one filter
    Render {
        /// Catalog JSON (defaults to the config's catalog_path)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Tool tier label (base, copper, silver, gold, orihalcum)
        #[arg(long, default_value = DEFAULT_TOOL)]
        tool: String,

        #[arg(long, default_value = DEFAULT_SEASON)]
        season: String,

        #[arg(long, default_value = DEFAULT_WEATHER)]
        weather: String,

        /// Table layout (defaults to the config's layout)
        #[arg(long, value_enum)]
        layout: Option<Layout>,

        /// Emit the grouped tables as JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Serve the interactive page
    Serve {
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_yaml(path),
        None => Ok(AppConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.logging.level);

    match cli.command {
        Command::Render {
            catalog,
            tool,
            season,
            weather,
            layout,
            json,
            output,
        } => {
            let catalog_path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            let records = CatalogLoader::new(".")
                .load(&catalog_path)
                .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
            let criteria = FilterCriteria::from_labels(&tool, &season, &weather);
            let tables = filter_and_group(&records, &criteria);
            let text = if json {
                serde_json::to_string_pretty(&tables)?
            } else {
                render_tables(&tables, layout.unwrap_or(config.layout))
            };
            match output {
                Some(path) => {
                    fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), entries = tables.entry_count(), "tables written");
                }
                None => println!("{text}"),
            }
        }
        Command::Serve {
            catalog,
            host,
            port,
        } => {
            let catalog_path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            let source = CatalogSource::open(catalog_path.clone(), config.reload_catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
            let preferences = FilePreferenceStore::open(&config.preferences_path)?;
            info!(
                catalog = %catalog_path.display(),
                preferences = %preferences.path().display(),
                reload = config.reload_catalog,
                "starting server"
            );
            let service = TableService::new(source, config.layout, Box::new(preferences));
            web::run(WebServerConfig {
                service,
                icons_dir: config.icons_dir.clone(),
                host: host.unwrap_or_else(|| config.server.host.clone()),
                port: port.unwrap_or(config.server.port),
            })
            .await?;
        }
    }
    Ok(())
}
