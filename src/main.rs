use crate::app::AppState;
use crate::config::AppConfig;
use crate::db::{init_db, Database};
use crate::domain::DateRange;
use crate::insight::{OpenRouterClient, TextGenerator, UnconfiguredGenerator};
use crate::query::{Dialect, MetricKind, QueryBuilder, ScopeFilters, Segment};
use crate::router::handle;
use astra::Server;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info, warn};

mod app;
mod config;
mod db;
mod domain;
mod errors;
mod insight;
mod logging;
mod query;
mod responses;
mod router;
mod spreadsheets;
mod templates;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "kpi_dashboard", about = "Hotel booking KPI dashboard and SQL assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the dashboard server (the default)
    Serve,
    /// Print the SQL a metric would run, without touching the database
    Sql(SqlArgs),
}

#[derive(Debug, Args)]
struct SqlArgs {
    #[arg(long, default_value = "city_summary")]
    kind: String,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    property_id: Option<i64>,
    #[arg(long)]
    start: Option<NaiveDate>,
    #[arg(long)]
    end: Option<NaiveDate>,
    #[arg(long)]
    segment: Option<String>,
    /// Render for SQLite instead of PostgreSQL
    #[arg(long)]
    sqlite: bool,
}

fn main() {
    let cli = Cli::parse();
    // Loads .env first so KPI_LOG_LEVEL from the file is honored.
    let config = AppConfig::from_env();
    logging::init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    let outcome = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config),
        Command::Sql(args) => print_sql(&config, args),
    };

    if let Err(msg) = outcome {
        error!("{msg}");
        std::process::exit(1);
    }
}

fn serve(config: AppConfig) -> Result<(), String> {
    let db = Database::new(&config.db_path);
    init_db(&db, &config.schema_path).map_err(|e| format!("database initialization failed: {e}"))?;

    let generator: Box<dyn TextGenerator> = match &config.llm.api_key {
        Some(key) => Box::new(
            OpenRouterClient::new(&config.llm.endpoint, key, config.llm.timeout)
                .map_err(|e| e.to_string())?,
        ),
        None => {
            warn!("OPENROUTER_API_KEY is not set; insights and the SQL assistant are disabled");
            Box::new(UnconfiguredGenerator)
        }
    };

    let state = Arc::new(AppState::new(
        db,
        config.policy.clone(),
        config.city_cache_ttl,
        generator,
        config.llm.model.clone(),
    ));

    info!(addr = %config.bind_addr, workers = config.workers, "starting server");
    let server = Server::bind(&config.bind_addr).max_workers(config.workers);

    let handler_state = Arc::clone(&state);
    let result = server.serve(move |req, _info| match handle(req, &handler_state) {
        Ok(resp) => resp,
        Err(err) => templates::html_error_response(err),
    });

    if let Err(e) = result {
        error!("server ended with error: {e}");
    }

    if state.db.is_open() {
        state
            .db
            .shutdown()
            .map_err(|e| format!("closing database failed: {e}"))?;
    }
    info!("server shut down cleanly");
    Ok(())
}

fn print_sql(config: &AppConfig, args: SqlArgs) -> Result<(), String> {
    let kind: MetricKind = args.kind.parse().map_err(|e| format!("{e}"))?;
    let segment = args.segment.map(|s| s.parse::<Segment>()).transpose()?;
    let range = match (args.start, args.end) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)),
        (None, None) => None,
        _ => return Err("--start and --end must be given together".into()),
    };
    let scope = ScopeFilters {
        city: args.city,
        property_id: args.property_id,
    };

    let spec = QueryBuilder::new(config.policy.clone())
        .build_query(kind, range, &scope, segment)
        .map_err(|e| e.to_string())?;
    let dialect = if args.sqlite { Dialect::Sqlite } else { Dialect::Postgres };
    println!("{}", spec.display_sql(dialect));
    Ok(())
}
