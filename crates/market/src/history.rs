//! Daily price history parsing

use serde::Deserialize;

use crate::error::{MarketError, Result};

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Closing prices from a chart response, oldest first
///
/// Days without a close are dropped. A chart with no result means no
/// history rather than an error.
pub fn parse_closes(body: &[u8]) -> Result<Vec<f64>> {
    let envelope: ChartEnvelope = serde_json::from_slice(body).map_err(|e| MarketError::InvalidResponse {
        source_name: "history",
        message: e.to_string(),
    })?;

    let closes = envelope
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|result| result.indicators.quote.into_iter().next())
        .map(|series| series.close.into_iter().flatten().collect())
        .unwrap_or_default();

    Ok(closes)
}
