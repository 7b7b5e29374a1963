//! # REST Client
//!
//! `reqwest` implementation of every backend collaborator.
//!
//! ## Error Mapping
//! ```text
//! transport failure  ──► ConnectionFailed / Timeout
//! non-2xx            ──► Api { status, message }   (message from `{ "message": ... }`)
//! unreadable body    ──► InvalidResponse
//! ```

use std::time::Duration;

use async_trait::async_trait;
use carniceria_core::summary::DailySummary;
use carniceria_core::ticket::{CreateTicketRequest, Ticket, UpdateTicketRequest};
use carniceria_core::Product;
use chrono::{Local, NaiveDate};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{CatalogSource, SummarySource, TicketGateway};
use crate::wire::{ProductsPayload, RawDailySummary, RawTicket};

/// Error body shape used by the backend. NestJS sends an array for
/// validation failures.
#[derive(Deserialize)]
struct ApiErrorResponse {
    message: ApiMessage,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiMessage {
    One(String),
    Many(Vec<String>),
}

/// Maps a non-2xx answer to [`ClientError::Api`].
pub(crate) fn api_error(status: u16, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(ApiErrorResponse {
            message: ApiMessage::One(message),
        }) => message,
        Ok(ApiErrorResponse {
            message: ApiMessage::Many(messages),
        }) => messages.join("; "),
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => body.trim().to_string(),
    };
    ClientError::Api { status, message }
}

/// HTTP client for the POS backend.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        Url::parse(&config.base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ClientResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).query(query).send().await?;
        Self::handle_response(response).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        debug!(%method, %url, "Sending request");
        let response = self.client.request(method, &url).json(body).send().await?;
        Self::handle_response(response).await
    }
}

#[async_trait]
impl CatalogSource for RestClient {
    async fn fetch_products(&self) -> ClientResult<Vec<Product>> {
        let payload: ProductsPayload = self
            .get("products", &[("include", "categories,cuts".to_string())])
            .await?;
        let products = payload.into_products();
        info!(count = products.len(), "Catalog loaded");
        Ok(products)
    }
}

#[async_trait]
impl TicketGateway for RestClient {
    async fn create_ticket(&self, request: &CreateTicketRequest) -> ClientResult<Ticket> {
        let raw: RawTicket = self.send(Method::POST, "tickets", request).await?;
        Ok(raw.into_ticket())
    }

    async fn update_ticket(
        &self,
        ticket_id: i64,
        request: &UpdateTicketRequest,
    ) -> ClientResult<Ticket> {
        let raw: RawTicket = self
            .send(Method::PATCH, &format!("tickets/{ticket_id}"), request)
            .await?;
        Ok(raw.into_ticket())
    }

    async fn get_ticket(&self, ticket_id: i64) -> ClientResult<Ticket> {
        let raw: RawTicket = self.get(&format!("tickets/{ticket_id}"), &[]).await?;
        Ok(raw.into_ticket())
    }
}

#[async_trait]
impl SummarySource for RestClient {
    async fn daily_summary(&self, date: Option<NaiveDate>) -> ClientResult<DailySummary> {
        let query: Vec<(&str, String)> = date
            .map(|d| vec![("date", d.format("%Y-%m-%d").to_string())])
            .unwrap_or_default();
        let raw: RawDailySummary = self.get("tickets/summary/daily", &query).await?;
        Ok(raw.into_summary(date.unwrap_or_else(|| Local::now().date_naive())))
    }
}
