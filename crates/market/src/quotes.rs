//! Live quote parsing

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};

const FALLBACK_DOMAIN: &str = "nasdaq.com";

/// Live details for one headline ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerDetail {
    pub symbol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Percent change since the previous close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    /// Previous close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,
    pub logo: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Option<Vec<Quote>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Quote {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_previous_close: Option<f64>,
}

/// Logo URL for a symbol, using its company domain when known
pub fn logo_url(domains: &IndexMap<String, String>, symbol: &str) -> String {
    let domain = domains.get(symbol).map_or(FALLBACK_DOMAIN, String::as_str);
    format!("https://logo.clearbit.com/{domain}")
}

/// Map a quote response body to ticker details
///
/// A body without `quoteResponse` is rejected; a missing or null `result`
/// list means no quotes.
pub fn parse_quotes(body: &[u8], domains: &IndexMap<String, String>) -> Result<Vec<TickerDetail>> {
    let envelope: QuoteEnvelope = serde_json::from_slice(body).map_err(|e| MarketError::InvalidResponse {
        source_name: "quotes",
        message: e.to_string(),
    })?;

    let details = envelope
        .quote_response
        .result
        .unwrap_or_default()
        .into_iter()
        .map(|quote| {
            let name = [quote.long_name, quote.short_name]
                .into_iter()
                .flatten()
                .find(|n| !n.is_empty())
                .unwrap_or_default();

            TickerDetail {
                logo: logo_url(domains, &quote.symbol),
                symbol: quote.symbol,
                name,
                price: quote.regular_market_price,
                change: quote.regular_market_change_percent,
                close: quote.regular_market_previous_close,
            }
        })
        .collect();

    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> IndexMap<String, String> {
        IndexMap::from([("AAPL".to_owned(), "apple.com".to_owned())])
    }

    #[test]
    fn quote_fields_are_mapped() {
        let body = br#"{"quoteResponse":{"result":[{
            "symbol":"AAPL","longName":"Apple Inc.","shortName":"Apple",
            "regularMarketPrice":201.5,"regularMarketChangePercent":-1.25,
            "regularMarketPreviousClose":204.05}],"error":null}}"#;

        let details = parse_quotes(body, &domains()).unwrap();

        assert_eq!(
            details,
            vec![TickerDetail {
                symbol: "AAPL".to_owned(),
                name: "Apple Inc.".to_owned(),
                price: Some(201.5),
                change: Some(-1.25),
                close: Some(204.05),
                logo: "https://logo.clearbit.com/apple.com".to_owned(),
            }]
        );
    }

    #[test]
    fn name_falls_back_to_short_name_then_empty() {
        let body = br#"{"quoteResponse":{"result":[
            {"symbol":"XYZ","shortName":"Xyz Corp"},
            {"symbol":"QQQ","longName":""}]}}"#;

        let details = parse_quotes(body, &domains()).unwrap();

        assert_eq!(details[0].name, "Xyz Corp");
        assert_eq!(details[1].name, "");
        assert_eq!(details[1].logo, "https://logo.clearbit.com/nasdaq.com");
    }

    #[test]
    fn missing_prices_are_omitted_from_json() {
        let body = br#"{"quoteResponse":{"result":[{"symbol":"AAPL"}]}}"#;
        let details = parse_quotes(body, &domains()).unwrap();

        let json = serde_json::to_value(&details[0]).unwrap();
        assert!(json.get("price").is_none());
        assert_eq!(json["name"], "");
    }

    #[test]
    fn null_result_means_no_quotes() {
        let body = br#"{"quoteResponse":{"result":null}}"#;
        assert!(parse_quotes(body, &domains()).unwrap().is_empty());
    }

    #[test]
    fn unexpected_shape_is_rejected() {
        let err = parse_quotes(br#"{"finance":{"error":"Unauthorized"}}"#, &domains()).unwrap_err();
        assert!(matches!(err, MarketError::InvalidResponse { source_name: "quotes", .. }));
    }
}
