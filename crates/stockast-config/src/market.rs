use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

/// Ticker directory and live quote sources
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketConfig {
    /// Pipe-delimited symbol directory
    #[serde(default = "default_listing_url")]
    pub listing_url: Url,
    /// Quote endpoint; symbols are appended as `?symbols=A,B`
    #[serde(default = "default_quote_url")]
    pub quote_url: Url,
    /// Daily chart endpoint; the symbol is appended as a path segment
    #[serde(default = "default_chart_url")]
    pub chart_url: Url,
    /// Symbols returned with live details
    #[serde(default = "default_top_tickers")]
    pub top_tickers: Vec<String>,
    /// Company domains used to build logo URLs
    #[serde(default = "default_domains")]
    pub domains: IndexMap<String, String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            quote_url: default_quote_url(),
            chart_url: default_chart_url(),
            top_tickers: default_top_tickers(),
            domains: default_domains(),
        }
    }
}

fn default_listing_url() -> Url {
    Url::parse("https://www.nasdaqtrader.com/dynamic/SymDir/nasdaqlisted.txt").expect("valid default URL")
}

fn default_quote_url() -> Url {
    Url::parse("https://query1.finance.yahoo.com/v7/finance/quote").expect("valid default URL")
}

fn default_chart_url() -> Url {
    Url::parse("https://query1.finance.yahoo.com/v8/finance/chart/").expect("valid default URL")
}

fn default_top_tickers() -> Vec<String> {
    ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"].map(str::to_owned).to_vec()
}

fn default_domains() -> IndexMap<String, String> {
    [
        ("AAPL", "apple.com"),
        ("MSFT", "microsoft.com"),
        ("GOOGL", "google.com"),
        ("AMZN", "amazon.com"),
        ("NVDA", "nvidia.com"),
    ]
    .into_iter()
    .map(|(symbol, domain)| (symbol.to_owned(), domain.to_owned()))
    .collect()
}
