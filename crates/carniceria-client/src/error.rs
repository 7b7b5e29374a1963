//! # Client Error Types
//!
//! Error types for backend calls and the checkout workflow.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Api { status, msg }    │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  InvalidResponse        │ │
//! │  │  ConfigLoad/Save│  │                 │  │  Catalog (bad price)    │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  CheckoutError wraps ClientError when a ticket submission fails:       │
//! │    EmptyCart / DuplicateSubmission   → caught before any I/O           │
//! │    TicketSubmissionFailed(ClientError) → cart kept intact for retry    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use carniceria_core::CoreError;
use thiserror::Error;

/// Result type alias for backend operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for checkout and session operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Client Error
// =============================================================================

/// Backend and configuration failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the backend.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The backend did not answer in time.
    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Non-2xx answer from the backend.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The body could not be read as the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A catalog entry failed validation.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CoreError),

    /// A spawned request did not complete.
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl ClientError {
    /// Returns true if the operator can simply try again.
    ///
    /// ## Retryable Errors
    /// - Connection failures and timeouts
    /// - 5xx answers from the backend
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::ConnectionFailed(_) | ClientError::Timeout => true,
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Failures of the finalize / print workflow and session cart operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Finalize on an empty cart. No request was sent.
    #[error("Cart is empty")]
    EmptyCart,

    /// Finalize while another submission is still in flight. No request was sent.
    #[error("A ticket is already being submitted")]
    DuplicateSubmission,

    /// A line price could not be used for a sale.
    #[error("Invalid price for {field}: '{value}'")]
    InvalidPrice { field: String, value: String },

    /// The backend rejected or never answered the create call.
    /// The cart is untouched.
    #[error("Ticket submission failed: {0}")]
    TicketSubmissionFailed(#[source] ClientError),

    /// Cart changes are locked until the pending submission resolves.
    #[error("Cart is locked while a ticket is being submitted")]
    CheckoutInProgress,

    /// Nothing is waiting for a result.
    #[error("No ticket submission is pending")]
    NothingPending,

    /// Product id not in the loaded catalog.
    #[error("Product {0} not found in catalog")]
    ProductNotFound(i64),

    /// No ticket has been created in this session yet.
    #[error("No ticket to print")]
    NothingToPrint,

    /// The receipt could not be written. The ticket stays unprinted.
    #[error("Receipt could not be printed: {0}")]
    PrintFailed(String),

    /// A backend call other than ticket creation failed.
    #[error("Backend request failed: {0}")]
    Backend(#[source] ClientError),

    /// A cart rule rejected the operation.
    #[error(transparent)]
    Cart(CoreError),
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => CheckoutError::EmptyCart,
            CoreError::InvalidPrice { field, value } => CheckoutError::InvalidPrice { field, value },
            other => CheckoutError::Cart(other),
        }
    }
}

impl CheckoutError {
    /// True when the operator can retry and the cart is still intact.
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::TicketSubmissionFailed(err) | CheckoutError::Backend(err) => {
                err.is_retryable()
            }
            CheckoutError::DuplicateSubmission | CheckoutError::CheckoutInProgress => true,
            _ => false,
        }
    }
}
