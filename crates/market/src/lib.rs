//! Market data for Stockast
//!
//! The ticker directory and live quotes behind `/api/tickers`, plus the
//! market briefing (topics, quotes and a technical read per ticker) that
//! in-process podcast generation writes from.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod briefing;
mod error;
mod history;
mod listing;
mod quotes;
pub mod technical;
pub mod topics;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::future::join_all;
use indexmap::IndexMap;
use reqwest::Client;
use serde::Serialize;
use stockast_config::MarketConfig;
use stockast_core::http_client;
use stockast_telemetry::metrics;
use url::Url;

pub use briefing::MarketBriefing;
pub use error::{MarketError, Result};
pub use history::parse_closes;
pub use listing::parse_symbols;
pub use quotes::{TickerDetail, logo_url, parse_quotes};
pub use topics::{MarketTopics, extract_topics};

const HISTORY_RANGE: &str = "3mo";

/// Ticker overview returned by `/api/tickers`
#[derive(Debug, Serialize)]
pub struct TickerOverview {
    pub tickers: Vec<String>,
    #[serde(rename = "topDetails")]
    pub top_details: Vec<TickerDetail>,
}

/// Client for the symbol directory and the quote service
pub struct MarketClient {
    client: Client,
    listing_url: Url,
    quote_url: Url,
    chart_url: Url,
    top_tickers: Vec<String>,
    domains: IndexMap<String, String>,
}

impl MarketClient {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            client: http_client(),
            listing_url: config.listing_url.clone(),
            quote_url: config.quote_url.clone(),
            chart_url: config.chart_url.clone(),
            top_tickers: config.top_tickers.clone(),
            domains: config.domains.clone(),
        }
    }

    /// Fetch every listed symbol plus live details for the headline tickers
    pub async fn overview(&self) -> Result<TickerOverview> {
        let (tickers, top_details) = tokio::try_join!(self.symbols(), self.top_details())?;

        tracing::debug!(listed = tickers.len(), quoted = top_details.len(), "ticker overview");

        Ok(TickerOverview { tickers, top_details })
    }

    async fn symbols(&self) -> Result<Vec<String>> {
        let started = Instant::now();
        let result = async {
            let body = self.fetch("listing", self.client.get(self.listing_url.clone())).await?;
            parse_symbols(&String::from_utf8_lossy(&body))
        }
        .await;
        metrics::observe("listing", started, &result);
        result
    }

    async fn top_details(&self) -> Result<Vec<TickerDetail>> {
        self.quotes(&self.top_tickers).await
    }

    /// Live quotes for `symbols`, in one request
    pub async fn quotes(&self, symbols: &[String]) -> Result<Vec<TickerDetail>> {
        let started = Instant::now();
        let result = async {
            let request = self
                .client
                .get(self.quote_url.clone())
                .query(&[("symbols", symbols.join(","))]);
            let body = self.fetch("quotes", request).await?;
            parse_quotes(&body, &self.domains)
        }
        .await;
        metrics::observe("quotes", started, &result);
        result
    }

    /// Daily closes for `symbol` over the last three months, oldest first
    pub async fn closes(&self, symbol: &str) -> Result<Vec<f64>> {
        let started = Instant::now();
        let result = async {
            let url = format!("{}/{symbol}", self.chart_url.as_str().trim_end_matches('/'));
            let request = self
                .client
                .get(url)
                .query(&[("range", HISTORY_RANGE), ("interval", "1d")]);
            let body = self.fetch("history", request).await?;
            parse_closes(&body)
        }
        .await;
        metrics::observe("history", started, &result);
        result
    }

    /// Gather market context for a listener's request
    ///
    /// Best effort: a failed quote lookup leaves quotes out, and a failed
    /// history lookup becomes a note in place of that ticker's technical read.
    pub async fn briefing(&self, text: &str) -> MarketBriefing {
        let topics = extract_topics(text);
        if topics.tickers.is_empty() {
            return MarketBriefing {
                topics,
                ..MarketBriefing::default()
            };
        }

        let histories = join_all(topics.tickers.iter().map(|symbol| self.closes(symbol)));
        let (quotes, histories) = tokio::join!(self.quotes(&topics.tickers), histories);

        let quotes = quotes.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "quotes unavailable for briefing");
            Vec::new()
        });

        let technicals = topics
            .tickers
            .iter()
            .zip(histories)
            .map(|(symbol, closes)| match closes {
                Ok(closes) => technical::describe(symbol, &closes),
                Err(e) => {
                    tracing::warn!(error = %e, symbol, "price history unavailable for briefing");
                    format!("Could not download price history for {symbol}.\n")
                }
            })
            .collect();

        tracing::debug!(tickers = ?topics.tickers, quoted = quotes.len(), "market briefing gathered");

        MarketBriefing {
            topics,
            quotes,
            technicals,
        }
    }

    async fn fetch(&self, source_name: &'static str, request: reqwest::RequestBuilder) -> Result<bytes::Bytes> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, source_name, "market request failed");
            MarketError::Upstream {
                source_name,
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, source_name, "market source returned error");
            return Err(MarketError::Upstream {
                source_name,
                message: format!("status {status}"),
            });
        }

        response.bytes().await.map_err(|e| MarketError::Upstream {
            source_name,
            message: e.to_string(),
        })
    }
}

/// Build the market client from configuration
pub fn build_client(config: &stockast_config::Config) -> Arc<MarketClient> {
    Arc::new(MarketClient::new(&config.market))
}

/// Create the endpoint router for market routes
pub fn endpoint_router() -> Router<Arc<MarketClient>> {
    Router::new().route("/api/tickers", get(tickers))
}

/// Handle `GET /api/tickers`
async fn tickers(State(client): State<Arc<MarketClient>>) -> Result<Json<TickerOverview>> {
    client.overview().await.map(Json)
}
