//! Tickers, sectors and markets named in a listener's request

/// Tickers looked up per request
pub const MAX_TICKERS: usize = 3;

const COMPANIES: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("nvidia", "NVDA"),
    ("tesla", "TSLA"),
    ("meta", "META"),
    ("facebook", "META"),
    ("netflix", "NFLX"),
    ("intel", "INTC"),
    ("amd", "AMD"),
];

const SECTORS: &[(&str, &[&str])] = &[
    ("Healthcare", &["health", "healthcare", "pharma", "biotech", "medical"]),
    ("Technology", &["tech", "technology", "software", "semiconductor", "semiconductors", "chips"]),
    ("Energy", &["energy", "oil", "gas", "solar", "renewables"]),
    ("Financials", &["bank", "banks", "banking", "financials", "insurance"]),
    ("Consumer", &["retail", "consumer"]),
    ("Real Estate", &["reit", "reits", "housing", "property"]),
];

const MARKETS: &[(&str, &[&str])] = &[
    ("Crypto", &["crypto", "cryptocurrency", "bitcoin", "ethereum"]),
    ("Forex", &["forex", "currency", "currencies", "fx"]),
    ("Commodities", &["commodities", "commodity", "gold", "silver"]),
    ("Bonds", &["bond", "bonds", "treasury", "treasuries", "yields"]),
];

/// Upper-case words that are not tickers
const NOT_TICKERS: &[&str] = &[
    "AI", "CEO", "CFO", "ETF", "EPS", "GDP", "CPI", "FED", "IPO", "USA", "US", "UK", "EU", "THE", "AND", "FOR",
];

/// What a request is about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketTopics {
    /// At most [`MAX_TICKERS`], in order of first mention
    pub tickers: Vec<String>,
    pub sectors: Vec<&'static str>,
    pub markets: Vec<&'static str>,
}

impl MarketTopics {
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty() && self.sectors.is_empty() && self.markets.is_empty()
    }
}

/// Pick topics out of free text
///
/// Tickers come from `$SYMBOL` cashtags, bare upper-case symbols of two to
/// five letters, and well-known company names.
pub fn extract_topics(text: &str) -> MarketTopics {
    let mut topics = MarketTopics::default();

    for word in text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '$')) {
        if word.is_empty() {
            continue;
        }

        if let Some(symbol) = ticker_in(word) {
            push_unique(&mut topics.tickers, symbol);
        }

        let lower = word.trim_start_matches('$').to_ascii_lowercase();
        if let Some(&(_, symbol)) = COMPANIES.iter().find(|(name, _)| *name == lower) {
            push_unique(&mut topics.tickers, symbol.to_owned());
        }
        if let Some(&(sector, _)) = SECTORS.iter().find(|(_, words)| words.contains(&lower.as_str())) {
            push_unique(&mut topics.sectors, sector);
        }
        if let Some(&(market, _)) = MARKETS.iter().find(|(_, words)| words.contains(&lower.as_str())) {
            push_unique(&mut topics.markets, market);
        }
    }

    topics.tickers.truncate(MAX_TICKERS);
    topics
}

fn ticker_in(word: &str) -> Option<String> {
    let (symbol, cashtag) = match word.strip_prefix('$') {
        Some(rest) => (rest, true),
        None => (word, false),
    };

    let shaped = (1..=5).contains(&symbol.len()) && symbol.bytes().all(|b| b.is_ascii_alphabetic());
    if !shaped {
        return None;
    }

    if cashtag {
        return Some(symbol.to_ascii_uppercase());
    }

    let bare = symbol.len() >= 2 && symbol.bytes().all(|b| b.is_ascii_uppercase()) && !NOT_TICKERS.contains(&symbol);
    bare.then(|| symbol.to_owned())
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_names_sectors_and_markets() {
        let topics = extract_topics("I'm interested in Apple and health services and crypto");

        assert_eq!(
            topics,
            MarketTopics {
                tickers: vec!["AAPL".to_owned()],
                sectors: vec!["Healthcare"],
                markets: vec!["Crypto"],
            }
        );
    }

    #[test]
    fn symbols_and_cashtags() {
        let topics = extract_topics("Compare NVDA with $amd, and what the CEO said about AI chips");

        assert_eq!(topics.tickers, vec!["NVDA", "AMD"]);
        assert_eq!(topics.sectors, vec!["Technology"]);
        assert!(topics.markets.is_empty());
    }

    #[test]
    fn tickers_are_deduplicated_and_capped() {
        let topics = extract_topics("AAPL, Apple, MSFT, Tesla, Amazon and NVDA");

        assert_eq!(topics.tickers, vec!["AAPL", "MSFT", "TSLA"]);
    }

    #[test]
    fn plain_prose_has_no_topics() {
        let topics = extract_topics("What happened today?");
        assert!(topics.is_empty());
    }
}
