//! # carlens CLI
//!
//! Command-line interface for carlens.
//!
//! carlens turns photos of car labels and short plain-language requests into
//! stored car records and rating-ranked queries.
//!
//! ## Commands
//!
//! - `carlens analyze <IMAGE>` - OCR an image and store the car it describes
//! - `carlens add <TEXT>` - Store a car described in plain language
//! - `carlens query <TEXT>` - Find the best-rated cars matching a request
//! - `carlens run <LINE>` - Dispatch a prefixed instruction (`adicionar ...` / `consultar ...`)
//! - `carlens filter` - Structured filtered query
//! - `carlens list` - List cars, optionally by brand or model
//! - `carlens extract <FILE>` - Show the fields found in a text file
//! - `carlens status` - Show store statistics
//!
//! ## Examples
//!
//! ```bash
//! # Store a car from a poster
//! carlens analyze ~/Pictures/poster.jpg
//!
//! # Store a car from a sentence
//! carlens add "o novo carro da Nissan lançado ontem é nota 4"
//!
//! # Ask for the best ones
//! carlens query "quais os 10 melhores carros da Nissan lançados entre 2010 e hoje"
//!
//! # Get JSON output
//! carlens filter --brand Nissan --min-rating 4 --format json
//! ```

use anyhow::{Context, Result};
use carlens_core::{Car, CarStore, DateRange, ExtractedFields, FilterSpec};
use carlens_extract::{TesseractOcr, extract_car_fields, is_supported_image};
use carlens_query::{CarCatalog, CommandInterpreter, Outcome};
use carlens_store::{MemoryStore, SqliteStore};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;

use config::{Config, StoreBackend};

#[derive(Parser)]
#[command(name = "carlens")]
#[command(about = "Car records from labels and plain-language requests")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/carlens/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR an image of a label or poster and store the car
    Analyze {
        /// Image to read
        image: PathBuf,

        /// Print the extracted fields without storing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Store a car described in plain language
    Add {
        /// Description, e.g. "o carro da Nissan lançado hoje nota 4"
        text: String,
    },

    /// Find cars from a plain-language request
    Query {
        /// Request, e.g. "os 5 melhores carros da Honda entre 2015 e hoje"
        text: String,
    },

    /// Run an instruction starting with adicionar/add or consultar/query
    Run {
        /// Full instruction, prefix included
        line: String,
    },

    /// Structured filtered query, best rated first
    Filter {
        /// Exact brand
        #[arg(short, long)]
        brand: Option<String>,

        /// Earliest launch date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest launch date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Lowest accepted rating
        #[arg(short, long)]
        min_rating: Option<f64>,

        /// Maximum results (default from config)
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// List cars in insertion order
    List {
        /// Only this brand
        #[arg(short, long, conflicts_with = "model")]
        brand: Option<String>,

        /// Only this model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show the car fields found in a text file, without storing anything
    Extract {
        /// Text file, e.g. saved OCR output
        file: PathBuf,
    },

    /// Show store status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Output structure for status.
#[derive(Serialize)]
struct StatusOutput {
    backend: StoreBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    total_cars: u64,
    brands: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_inserted_id: Option<i64>,
}

/// Load config from the CLI-specified path or the default location.
fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        Config::load_from(Some(path.clone()))
            .with_context(|| format!("Failed to load config from {}", path.display()))
    } else {
        Config::load().context("Failed to load config")
    }
}

/// Create the store, OCR engine and interpreter the config describes.
async fn create_catalog(config: &Config) -> Result<CarCatalog> {
    let store: Arc<dyn CarStore> = match config.store.backend {
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(config.database_path()?)),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    store.init().await.context("Failed to initialize store")?;

    Ok(CarCatalog::new(store)
        .with_interpreter(CommandInterpreter::new(config.query.default_limit))
        .with_ocr(Arc::new(TesseractOcr::new(config.ocr.clone()))))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    // Setup logging
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Analyze { image, dry_run } => {
            if !image.exists() {
                anyhow::bail!("Image does not exist: {}", image.display());
            }
            if !is_supported_image(&image) {
                warn!("{} does not have a known image extension", image.display());
            }

            let catalog = create_catalog(&config).await?;
            if dry_run {
                let fields = catalog.analyze_image(&image).await;
                print_fields(cli.format, &fields)?;
            } else {
                let car = catalog
                    .add_from_image(&image)
                    .await
                    .context("Failed to store car")?;
                print_added(cli.format, &car)?;
            }
        }

        Commands::Add { text } => {
            let catalog = create_catalog(&config).await?;
            let car = catalog
                .add_from_text(&text)
                .await
                .context("Failed to store car")?;
            print_added(cli.format, &car)?;
        }

        Commands::Query { text } => {
            let catalog = create_catalog(&config).await?;
            let cars = catalog
                .query_from_text(&text)
                .await
                .context("Query execution failed")?;
            print_cars(cli.format, &cars)?;
        }

        Commands::Run { line } => {
            let catalog = create_catalog(&config).await?;
            match catalog.handle(&line).await? {
                Some(Outcome::Added(car)) => print_added(cli.format, &car)?,
                Some(Outcome::Found(cars)) => print_cars(cli.format, &cars)?,
                None => anyhow::bail!(
                    "Unrecognized instruction. Start with 'adicionar'/'add' or 'consultar'/'query'."
                ),
            }
        }

        Commands::Filter {
            brand,
            from,
            to,
            min_rating,
            limit,
        } => {
            let spec = FilterSpec {
                brand,
                date_range: (from.is_some() || to.is_some()).then_some(DateRange {
                    start: from,
                    end: to,
                }),
                min_rating,
                limit: limit.unwrap_or(config.query.default_limit),
            };
            debug!("Filter: {:?}", spec);

            let catalog = create_catalog(&config).await?;
            let cars = catalog
                .filter(&spec)
                .await
                .context("Query execution failed")?;
            print_cars(cli.format, &cars)?;
        }

        Commands::List { brand, model } => {
            let catalog = create_catalog(&config).await?;
            let cars = match (brand, model) {
                (Some(brand), _) => catalog.by_brand(&brand).await?,
                (None, Some(model)) => catalog.by_model(&model).await?,
                (None, None) => catalog.all().await?,
            };
            print_cars(cli.format, &cars)?;
        }

        Commands::Extract { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            print_fields(cli.format, &extract_car_fields(&text))?;
        }

        Commands::Status => {
            let path = match config.store.backend {
                StoreBackend::Sqlite => Some(config.database_path()?),
                StoreBackend::Memory => None,
            };
            let catalog = create_catalog(&config).await?;
            let stats = catalog.stats().await?;
            info!("Store has {} cars", stats.total_cars);

            match cli.format {
                OutputFormat::Json => {
                    let output = StatusOutput {
                        backend: config.store.backend,
                        path: path.as_deref().map(|p| p.to_string_lossy().to_string()),
                        total_cars: stats.total_cars,
                        brands: stats.brands,
                        last_inserted_id: stats.last_inserted_id,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("Store: {}", describe_store(config.store.backend, path.as_deref()));
                    println!("  Cars:   {}", stats.total_cars);
                    println!("  Brands: {}", stats.brands);
                    if let Some(id) = stats.last_inserted_id {
                        println!("  Last id: {id}");
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("Failed to serialize config")?
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "{}",
                        toml::to_string_pretty(&config).context("Failed to serialize config")?
                    );
                }
            },
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        },
    }

    Ok(())
}

fn describe_store(backend: StoreBackend, path: Option<&Path>) -> String {
    match (backend, path) {
        (StoreBackend::Sqlite, Some(path)) => format!("sqlite ({})", path.display()),
        (StoreBackend::Sqlite, None) => "sqlite".to_string(),
        (StoreBackend::Memory, _) => "memory".to_string(),
    }
}

fn print_added(format: OutputFormat, car: &Car) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(car)?),
        OutputFormat::Text => println!("Added {}", format_car(car)),
    }
    Ok(())
}

fn print_cars(format: OutputFormat, cars: &[Car]) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(cars)?),
        OutputFormat::Text => {
            if cars.is_empty() {
                println!("No cars found.");
            }
            for (i, car) in cars.iter().enumerate() {
                println!("{}. {}", i + 1, format_car(car));
            }
        }
    }
    Ok(())
}

fn print_fields(format: OutputFormat, fields: &ExtractedFields) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(fields)?),
        OutputFormat::Text => {
            println!("Brand:  {}", fields.brand);
            println!("Model:  {}", fields.model);
            println!("Price:  {:.2}", fields.price);
            println!("Rating: {:.1}", fields.rating);
            println!("Launch: {}", format_date(fields.launch_date));
        }
    }
    Ok(())
}

/// One-line summary of a car.
fn format_car(car: &Car) -> String {
    format!(
        "#{} {} {} (price: {:.2}, rating: {:.1}, launched: {})",
        car.id,
        car.brand,
        car.model,
        car.price,
        car.rating,
        format_date(car.launch_date)
    )
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "unknown".to_string(), |d| d.format("%Y-%m-%d").to_string())
}
