//! # Storefront CLI
//!
//! Runs one cart command against the configured store and prints the cart.
//!
//! ## Usage
//! ```text
//! storefront show
//! storefront add --id 1 --title "Outside-Zone Tech T-Shirt" --price "$29.99 USD"
//! storefront update 1 3
//! storefront remove 1
//! storefront clear
//! storefront --json show
//! ```
//!
//! Each invocation is one session: the stored cart is hydrated, the command
//! is applied, and closing the session writes the result back.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront_core::CatalogEntry;
use storefront_session::{CartSession, StorageKind, StorefrontConfig};

use crate::commands::CartResponse;
use crate::error::CliResult;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Inspect and edit the storefront cart")]
struct Cli {
    /// Config file (default: storefront.toml in the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage backend override: sqlite, memory, disabled
    #[arg(long)]
    storage: Option<StorageKind>,

    /// Print the cart as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the cart (default)
    Show,
    /// Add one unit of a product
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        /// Display price, e.g. "$29.99 USD"
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "")]
        image: String,
        #[arg(long, default_value = "")]
        slug: String,
    },
    /// Remove a line
    Remove { id: String },
    /// Set a line's quantity (0 or less removes it)
    Update {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

/// Default directives when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,storefront=debug,sqlx=warn";

/// Log filter from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
fn log_filter(env_value: Option<&str>) -> EnvFilter {
    env_value
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` for detailed logs
/// - `RUST_LOG=storefront=trace` for very detailed cart logs
/// - Default: INFO for most, DEBUG for storefront crates, WARN for sqlx
fn init_tracing() {
    let env_value = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env_value.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = StorefrontConfig::load(cli.config)?;
    if let Some(storage) = cli.storage {
        config.storage.backend = storage;
    }

    let backend = config.open_backend().await;
    info!(backend = backend.name(), "Storage opened");

    let session = CartSession::open(backend, config.session_options()).await;
    let cart = session.handle();

    let result = match cli.command.unwrap_or(Command::Show) {
        Command::Show => Ok(commands::show(&cart)),
        Command::Add {
            id,
            title,
            price,
            image,
            slug,
        } => commands::add(
            &cart,
            &CatalogEntry {
                id,
                title,
                price,
                image,
                slug,
            },
        ),
        Command::Remove { id } => Ok(commands::remove(&cart, &id)),
        Command::Update { id, quantity } => Ok(commands::update(&cart, &id, quantity)),
        Command::Clear => Ok(commands::clear(&cart)),
    };

    session.close().await;
    print_response(&result?, &config, cli.json)
}

fn print_response(response: &CartResponse, config: &StorefrontConfig, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        print!("{}", response.render(config));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    /// Evaluates `check` with `filter` installed as the current subscriber.
    fn enabled_under(filter: EnvFilter, check: impl FnOnce() -> bool) -> bool {
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, check)
    }

    #[test]
    fn test_default_filter_quiets_sqlx() {
        assert!(!enabled_under(log_filter(None), || {
            tracing::enabled!(target: "sqlx::query", Level::TRACE)
        }));
        assert!(enabled_under(log_filter(None), || {
            tracing::enabled!(target: "sqlx::pool", Level::WARN)
        }));
        assert!(enabled_under(log_filter(None), || {
            tracing::enabled!(target: "storefront_session::session", Level::DEBUG)
        }));
        assert!(!enabled_under(log_filter(None), || {
            tracing::enabled!(target: "storefront_session::writer", Level::TRACE)
        }));
    }

    #[test]
    fn test_env_directives_replace_default() {
        assert!(enabled_under(log_filter(Some("sqlx=trace")), || {
            tracing::enabled!(target: "sqlx::statement", Level::TRACE)
        }));
        assert!(!enabled_under(log_filter(Some("warn")), || {
            tracing::enabled!(target: "storefront_session::config", Level::DEBUG)
        }));
    }

    #[test]
    fn test_unparseable_env_falls_back_to_default() {
        assert!(!enabled_under(log_filter(Some("sqlx=loud")), || {
            tracing::enabled!(target: "sqlx::migrate", Level::TRACE)
        }));
    }

    #[test]
    fn test_cli_parses_update_with_negative_quantity() {
        let cli = Cli::try_parse_from(["storefront", "--storage", "memory", "update", "A", "-1"])
            .unwrap();
        assert!(matches!(cli.storage, Some(StorageKind::Memory)));
        assert!(matches!(
            cli.command,
            Some(Command::Update { ref id, quantity: -1 }) if id == "A"
        ));
    }
}
