use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use carenav::completion::CompletionClientBuilder;
use carenav::config::Config;
use carenav::doctor::{self, CompletionHealth};
use carenav::server::{self, AppState, HealthContext};
use carenav::service::{DEFAULT_RADIUS_KM, ProviderSearch, SearchError};
use carenav::{CoordinateStore, Database, NavigatorService, QueryTranslator};

/// carenav - hospital pricing and quality lookup
#[derive(Parser)]
#[command(name = "carenav")]
#[command(about = "Answer questions about hospital prices, ratings and locations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeCommand),
    /// Answer a single question and print the SQL used
    Ask(AskCommand),
    /// Find providers for a procedure near a ZIP, cheapest first
    Search(SearchCommand),
    /// Check the database, ZIP file and completion configuration
    Doctor,
}

#[derive(Parser)]
struct ServeCommand {
    /// Address to listen on (overrides CARENAV_BIND)
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,
}

#[derive(Parser)]
struct AskCommand {
    /// The question, e.g. "Who is cheapest for DRG 470 within 25 miles of 10001?"
    #[arg(value_name = "QUESTION")]
    question: String,
}

#[derive(Parser)]
struct SearchCommand {
    /// DRG code or description fragment
    #[arg(value_name = "PROCEDURE")]
    procedure: String,

    /// Origin ZIP code
    #[arg(short, long, value_name = "ZIP")]
    zip: String,

    /// Search radius in kilometres
    #[arg(short, long, value_name = "KM", default_value_t = DEFAULT_RADIUS_KM)]
    radius_km: f64,

    /// Print the raw JSON response
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing(matches!(cli.command, Commands::Serve(_)));

    let result = match &cli.command {
        Commands::Serve(cmd) => handle_serve(cmd),
        Commands::Ask(cmd) => handle_ask(cmd),
        Commands::Search(cmd) => handle_search(cmd),
        Commands::Doctor => handle_doctor(),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Logs to stderr; `RUST_LOG` overrides the default level.
///
/// The server logs at `info`, one-shot commands only at `warn` so their
/// output stays readable.
fn init_tracing(server: bool) {
    let default = if server { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are bad arguments; everything else (missing files, database
/// and network failures) is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    if let Some(search) = error.downcast_ref::<SearchError>() {
        return search.is_invalid_input();
    }
    error.to_string().contains("cannot be empty")
}

/// Opens the database and coordinate file named by the configuration.
fn load_service(config: &Config) -> Result<NavigatorService> {
    let db = Database::open(&config.database_path)?;
    let coordinates = CoordinateStore::from_path(&config.zip_file)
        .with_context(|| format!("Failed to load ZIP coordinates: {}", config.zip_file.display()))?;

    Ok(NavigatorService::new(db, Arc::new(coordinates)))
}

fn build_translator() -> Result<(QueryTranslator, CompletionHealth)> {
    let client = CompletionClientBuilder::new()
        .build()
        .context("Failed to configure completion client")?;
    if !client.has_api_key() {
        tracing::warn!("OPENAI_API_KEY is not set; questions will fail to translate");
    }

    let health = CompletionHealth::check(&client);
    let model = client.model().to_string();
    Ok((QueryTranslator::new(Arc::new(client), model), health))
}

fn handle_serve(cmd: &ServeCommand) -> Result<()> {
    let config = Config::from_env()?;
    let bind = cmd.bind.clone().unwrap_or_else(|| config.bind.clone());

    let service = load_service(&config)?;
    // The blocking HTTP client must be created outside the async runtime.
    let (translator, completion) = build_translator()?;

    let state = AppState::new(
        service,
        translator,
        HealthContext {
            database_path: config.database_path.display().to_string(),
            zip_file: config.zip_file.display().to_string(),
            completion,
        },
    );
    // Held so the blocking client is also dropped outside the runtime.
    let _state_guard = state.clone();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(server::serve(state, &bind))
}

fn handle_ask(cmd: &AskCommand) -> Result<()> {
    if cmd.question.trim().is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let config = Config::from_env()?;
    let service = load_service(&config)?;
    let (translator, _) = build_translator()?;

    let response = service.ask(&translator, &cmd.question);

    println!("{}", response.answer);
    if let Some(query) = response.query {
        println!();
        println!("SQL: {query}");
    }
    Ok(())
}

fn handle_search(cmd: &SearchCommand) -> Result<()> {
    let config = Config::from_env()?;
    let service = load_service(&config)?;

    let search = ProviderSearch::new(&cmd.procedure, &cmd.zip, cmd.radius_km);
    let response = service.search_providers(&search)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.providers.is_empty() {
        println!("No providers found within {} km of {}", cmd.radius_km, cmd.zip);
        return Ok(());
    }

    println!(
        "{} provider(s) within {} km of {}:",
        response.total_found, cmd.radius_km, cmd.zip
    );
    for provider in &response.providers {
        let rating = provider
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unrated".to_string());
        println!(
            "  {:>12}  {:>8.2} km  {} ({}, {})  [DRG {}] {}",
            carenav::formatter::format_currency(provider.avg_covered_charges),
            provider.distance_km,
            provider.name,
            provider.city,
            provider.state,
            provider.drg_code,
            rating
        );
    }
    Ok(())
}

fn handle_doctor() -> Result<()> {
    let config = Config::from_env()?;
    let report = doctor::run_health_checks(&config);

    if report.is_healthy() {
        Ok(())
    } else {
        anyhow::bail!("One or more health checks failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_search_with_default_radius() {
        let cli = Cli::try_parse_from(["carenav", "search", "470", "--zip", "10001"]).unwrap();
        match cli.command {
            Commands::Search(cmd) => {
                assert_eq!(cmd.procedure, "470");
                assert_eq!(cmd.zip, "10001");
                assert_eq!(cmd.radius_km, DEFAULT_RADIUS_KM);
                assert!(!cmd.json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn cli_parses_serve_bind_override() {
        let cli = Cli::try_parse_from(["carenav", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:9000")),
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn invalid_search_input_is_user_error() {
        let error = anyhow::Error::new(SearchError::InvalidZip("1".to_string()));
        assert!(is_user_error(&error));

        let error = anyhow::anyhow!("Question cannot be empty");
        assert!(is_user_error(&error));
    }

    #[test]
    fn store_failures_are_internal_errors() {
        let error = anyhow::Error::new(SearchError::Store(rusqlite::Error::InvalidQuery));
        assert!(!is_user_error(&error));

        let error = anyhow::anyhow!("Failed to open database: /nope");
        assert!(!is_user_error(&error));
    }
}
