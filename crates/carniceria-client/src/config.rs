//! # Terminal Configuration
//!
//! Settings for the backend connection, the store header and the receipt printer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CARNICERIA_API_URL=http://192.168.1.10:3000/api                    │
//! │     CARNICERIA_PAPER_WIDTH=48                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/carniceria-pos/carniceria.toml (Linux)                   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost backend, 58 mm paper, cash payment                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://localhost:3000/api"
//! timeout_secs = 10
//!
//! [store]
//! name = "CARNICERÍA DON PEPE"
//! footer_lines = ["¡Gracias por su compra!", "Vuelva pronto"]
//!
//! [receipt]
//! paper_width = 32   # 58 mm; use 48 for 80 mm paper
//! currency_symbol = "$"
//!
//! [terminal]
//! default_payment = "cash"   # cash | card | transfer
//! spool_dir = "/var/spool/carniceria"
//! ```

use std::path::PathBuf;

use carniceria_core::receipt::{ReceiptSettings, DEFAULT_WIDTH, MIN_WIDTH};
use carniceria_core::PaymentType;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Widest supported paper, in characters.
pub const MAX_PAPER_WIDTH: usize = 64;

// =============================================================================
// API Configuration
// =============================================================================

/// Where the REST backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, including any `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Store identity printed on every receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Second header line (e.g. address). Omitted when absent.
    #[serde(default)]
    pub subtitle: Option<String>,

    #[serde(default = "default_footer_lines")]
    pub footer_lines: Vec<String>,
}

fn default_store_name() -> String {
    "CARNICERÍA".to_string()
}

fn default_footer_lines() -> Vec<String> {
    vec![
        "¡Gracias por su compra!".to_string(),
        "Vuelva pronto".to_string(),
    ]
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: default_store_name(),
            subtitle: None,
            footer_lines: default_footer_lines(),
        }
    }
}

// =============================================================================
// Receipt Configuration
// =============================================================================

/// Printer paper layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptConfig {
    /// Characters per line. 32 for 58 mm paper, 48 for 80 mm.
    #[serde(default = "default_paper_width")]
    pub paper_width: usize,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_paper_width() -> usize {
    DEFAULT_WIDTH
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        ReceiptConfig {
            paper_width: default_paper_width(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Terminal Configuration
// =============================================================================

/// Operator console behavior.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Payment type used by `pay` without an argument.
    #[serde(default)]
    pub default_payment: PaymentType,

    /// Directory for spooled receipts. Receipts go to stdout when unset.
    #[serde(default)]
    pub spool_dir: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub receipt: ReceiptConfig,

    #[serde(default)]
    pub terminal: TerminalConfig,
}

impl ClientConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Override with TOML file (if exists)
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load terminal config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Terminal config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if !(MIN_WIDTH..=MAX_PAPER_WIDTH).contains(&self.receipt.paper_width) {
            return Err(ClientError::InvalidConfig(format!(
                "paper_width must be between {} and {}, got: {}",
                MIN_WIDTH, MAX_PAPER_WIDTH, self.receipt.paper_width
            )));
        }

        if self.store.name.trim().is_empty() {
            return Err(ClientError::InvalidConfig("store name cannot be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Backend URL
        if let Some(url) = lookup("CARNICERIA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        // Request timeout
        if let Some(timeout) = lookup("CARNICERIA_API_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.api.timeout_secs = secs;
            }
        }

        // Store header
        if let Some(name) = lookup("CARNICERIA_STORE_NAME") {
            self.store.name = name;
        }

        // Paper width
        if let Some(width) = lookup("CARNICERIA_PAPER_WIDTH") {
            if let Ok(w) = width.parse::<usize>() {
                debug!(width = w, "Overriding paper width from environment");
                self.receipt.paper_width = w;
            }
        }

        // Default payment
        if let Some(payment) = lookup("CARNICERIA_DEFAULT_PAYMENT") {
            match payment.parse::<PaymentType>() {
                Ok(parsed) => self.terminal.default_payment = parsed,
                Err(_) => warn!(payment = %payment, "Ignoring unknown default payment"),
            }
        }
    }

    /// Returns the default config file path.
    ///
    /// ## Platform Paths
    /// - Linux: `~/.config/carniceria-pos/carniceria.toml`
    /// - macOS: `~/Library/Application Support/com.carniceria.pos/carniceria.toml`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\carniceria\pos\config\carniceria.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "carniceria", "pos")
            .map(|dirs| dirs.config_dir().join("carniceria.toml"))
    }

    /// Receipt layout for this store, printing dates at `utc_offset`.
    pub fn receipt_settings(&self, utc_offset: FixedOffset) -> ReceiptSettings {
        ReceiptSettings {
            store_name: self.store.name.clone(),
            subtitle: self.store.subtitle.clone(),
            footer_lines: self.store.footer_lines.clone(),
            width: self.receipt.paper_width,
            currency_symbol: self.receipt.currency_symbol.clone(),
            utc_offset,
        }
    }
}
