//! # Carnicería POS Terminal
//!
//! Line-oriented operator console. One process is one till: it loads the
//! catalog once at startup, keeps the cart in memory and talks to the
//! backend for tickets and the daily summary.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize tracing (stderr, RUST_LOG aware)                         │
//! │  2. Load carniceria.toml + CARNICERIA_* env + command-line flags        │
//! │  3. Build the REST client                                               │
//! │  4. Fetch the catalog (fatal if the backend is unreachable)             │
//! │  5. Pick the receipt sink (spool directory or stdout)                   │
//! │  6. Read commands until `quit` or end of input                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod console;
mod sink;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use carniceria_client::{CatalogSource, ClientConfig, ClientResult, PosSession, ReceiptSink, RestClient};
use carniceria_core::Catalog;
use chrono::Local;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use commands::{parse_command, Command, ParseError};
pub use console::Console;
pub use sink::{SpoolSink, StdoutSink};

/// Command-line flags. Anything given here wins over the config file and
/// the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "carniceria-pos", version, about = "Carnicería point-of-sale console")]
pub struct Cli {
    /// Path to carniceria.toml (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:3000/api
    #[arg(long)]
    pub api_url: Option<String>,

    /// Write receipts into this directory instead of printing them here
    #[arg(long)]
    pub spool_dir: Option<PathBuf>,
}

impl Cli {
    /// Loads the config file and applies the flags on top.
    pub fn load_config(&self) -> ClientResult<ClientConfig> {
        let mut config = ClientConfig::load(self.config.clone())?;
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(dir) = &self.spool_dir {
            config.terminal.spool_dir = Some(dir.clone());
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,carniceria=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prompt() {
    print!("> ");
    // A broken stdout shows up on the next println anyway.
    let _ = std::io::stdout().flush();
}

/// Runs the console until the operator quits or stdin closes.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing();

    let config = cli.load_config().context("invalid terminal configuration")?;
    let client = Arc::new(RestClient::new(&config.api)?);
    info!(
        api = client.base_url(),
        store = %config.store.name,
        "Starting Carnicería POS terminal"
    );

    let products = client
        .fetch_products()
        .await
        .context("could not load the product catalog")?;
    let catalog = Catalog::new(products);
    info!(products = catalog.len(), "Catalog loaded");

    let receipt = config.receipt_settings(*Local::now().offset());
    let sink: Box<dyn ReceiptSink> = match &config.terminal.spool_dir {
        Some(dir) => Box::new(
            SpoolSink::new(dir)
                .with_context(|| format!("could not create spool directory {}", dir.display()))?,
        ),
        None => Box::new(StdoutSink),
    };

    let session = PosSession::new(catalog, client.clone(), receipt);
    let mut console = Console::new(
        session,
        client.clone(),
        client,
        sink,
        config.terminal.default_payment,
    );

    println!("{} - escriba 'help' para ver los comandos", config.store.name);
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => match console.execute(command).await {
                Ok(reply) => println!("{reply}"),
                Err(e) => println!("error: {e:#}"),
            },
            Err(ParseError::Empty) => {}
            Err(e) => println!("error: {e}"),
        }
        prompt();
    }

    if console.session().is_checkout_pending() {
        tracing::warn!("Exiting with a ticket submission still pending");
    }
    info!("Terminal closed");
    Ok(())
}
