//! # Carnicería POS Entry Point
//!
//! ## Startup Sequence
//! 1. Parse flags
//! 2. Initialize tracing (logging)
//! 3. Load configuration (file, environment, flags)
//! 4. Fetch the catalog
//! 5. Run the operator console until `quit` or end of input

use clap::Parser;

use carniceria_terminal::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The actual setup is in lib.rs for better testability
    carniceria_terminal::run(Cli::parse()).await
}
