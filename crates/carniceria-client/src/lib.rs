//! # carniceria-client: Backend Boundary & Checkout
//!
//! Everything that leaves the process: the REST backend and the receipt
//! printer. Pricing and cart rules stay in `carniceria-core`.
//!
//! ## Module Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  config ──► http::RestClient ──implements──► gateway traits             │
//! │                    │                          CatalogSource             │
//! │                    ▼                          TicketGateway             │
//! │               wire (raw JSON ──► Product / Ticket / DailySummary)       │
//! │                                               SummarySource             │
//! │                                                                         │
//! │  session::PosSession ──► assembler::TicketAssembler ──► TicketGateway   │
//! │        │                    (one submission in flight)                  │
//! │        └──► ReceiptSink (print) ──► markPrinted                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod session;
pub mod wire;

pub use assembler::{PendingTicket, TicketAssembler};
pub use config::ClientConfig;
pub use error::{CheckoutError, CheckoutResult, ClientError, ClientResult};
pub use gateway::{share_link, CatalogSource, SummarySource, TicketGateway};
pub use http::RestClient;
pub use session::{PosSession, PrintOutcome, ReceiptSink};
