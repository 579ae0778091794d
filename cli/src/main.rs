mod commands;
mod config;
mod mealdb;
mod openfoodfacts;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser, Subcommand};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    BrowseLabel, LocalFilter, Service, cmd_areas, cmd_barcode, cmd_browse, cmd_categories, cmd_clear,
    cmd_delete, cmd_log, cmd_meals, cmd_products, cmd_search, cmd_show, cmd_today, cmd_week,
};
use crate::config::Config;
use crate::mealdb::MealDbClient;
use crate::openfoodfacts::OpenFoodFactsClient;
use nutriplan_core::service::DEFAULT_MEAL_COUNT;

#[derive(Parser)]
#[command(
    name = "nutriplan",
    version,
    about = "Browse recipes and products, and keep a daily food log"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show random recipes, optionally narrowed by one local filter
    #[command(group(ArgGroup::new("filter").args(["search", "category", "area"])))]
    Meals {
        /// Number of random recipes to fetch
        #[arg(short = 'n', long, default_value_t = DEFAULT_MEAL_COUNT)]
        count: usize,
        /// Keep recipes whose name, category or area contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Keep recipes in this category (exact match)
        #[arg(short, long)]
        category: Option<String>,
        /// Keep recipes from this area (exact match)
        #[arg(short, long)]
        area: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search TheMealDB for recipes by name
    Search {
        /// Search text
        text: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every recipe in a category or area
    #[command(group(ArgGroup::new("label").args(["category", "area"]).required(true)))]
    Browse {
        /// Category label (e.g. "Seafood")
        #[arg(short, long)]
        category: Option<String>,
        /// Area label (e.g. "Japanese")
        #[arg(short, long)]
        area: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipe categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipe areas
    Areas {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe with ingredients and estimated nutrition
    Show {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log one serving of a recipe
    Log {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search `OpenFoodFacts` for packaged products
    Products {
        /// Search query
        query: String,
        /// Only show this Nutri-Score grade (a-e)
        #[arg(short, long)]
        grade: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a product by barcode, logging it when --servings is given
    Barcode {
        /// Barcode number
        code: String,
        /// Servings of 100 g to log
        #[arg(short, long)]
        servings: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's log, totals and goal progress
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show calories for the last seven days
    Week {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a log entry by timestamp
    Delete {
        /// Entry timestamp (shown by `today`)
        timestamp: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every log entry
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut svc = Service::open(&config.db_path)?;
    svc.state_mut()
        .subscribe(|event| debug!(?event, "State event"));

    // Providers block on this runtime; `main` itself stays synchronous.
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let meals = MealDbClient::new(rt.handle().clone())?;
    let off = OpenFoodFactsClient::new(rt.handle().clone())?;

    match cli.command {
        Commands::Meals {
            count,
            search,
            category,
            area,
            json,
        } => {
            let filter = match (search, category, area) {
                (Some(text), _, _) => LocalFilter::Search(text),
                (None, Some(label), _) => LocalFilter::Category(label),
                (None, None, Some(label)) => LocalFilter::Area(label),
                (None, None, None) => LocalFilter::None,
            };
            cmd_meals(&mut svc, &meals, count, filter, json)
        }
        Commands::Search { text, json } => cmd_search(&mut svc, &meals, &text, json),
        Commands::Browse {
            category,
            area,
            json,
        } => {
            let label = match (category.as_deref(), area.as_deref()) {
                (Some(label), _) => BrowseLabel::Category(label),
                (None, Some(label)) => BrowseLabel::Area(label),
                (None, None) => bail!("browse needs --category or --area"),
            };
            cmd_browse(&mut svc, &meals, label, json)
        }
        Commands::Categories { json } => cmd_categories(&mut svc, &meals, json),
        Commands::Areas { json } => cmd_areas(&mut svc, &meals, json),
        Commands::Show { id, json } => cmd_show(&mut svc, &meals, &id, json),
        Commands::Log { id, json } => cmd_log(&mut svc, &meals, &id, json),
        Commands::Products { query, grade, json } => {
            cmd_products(&mut svc, &off, &query, grade.as_deref(), json)
        }
        Commands::Barcode {
            code,
            servings,
            json,
        } => cmd_barcode(&mut svc, &off, &code, servings, json),
        Commands::Today { json } => cmd_today(&svc, json),
        Commands::Week { json } => cmd_week(&svc, json),
        Commands::Delete { timestamp, json } => cmd_delete(&mut svc, timestamp, json),
        Commands::Clear { json } => cmd_clear(&mut svc, json),
    }
}
