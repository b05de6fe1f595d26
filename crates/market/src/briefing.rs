//! Market context handed to the script writer

use std::fmt::Write as _;

use crate::quotes::TickerDetail;
use crate::topics::MarketTopics;

/// Topics, live quotes and technical reads for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketBriefing {
    pub topics: MarketTopics,
    pub quotes: Vec<TickerDetail>,
    /// One rendered technical summary (or degraded note) per ticker
    pub technicals: Vec<String>,
}

impl MarketBriefing {
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Short lines describing what was looked up
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if !self.topics.tickers.is_empty() {
            notes.push(format!("Looking up {}", self.topics.tickers.join(", ")));
        }
        if !self.quotes.is_empty() {
            let quoted: Vec<_> = self.quotes.iter().map(|q| q.symbol.as_str()).collect();
            notes.push(format!("Live quotes received for {}", quoted.join(", ")));
        }
        if !self.topics.sectors.is_empty() {
            notes.push(format!("Sectors in focus: {}", self.topics.sectors.join(", ")));
        }
        if !self.topics.markets.is_empty() {
            notes.push(format!("Markets in focus: {}", self.topics.markets.join(", ")));
        }
        notes
    }

    /// Prompt section with everything that was found
    pub fn render(&self) -> String {
        let mut out = String::new();

        for quote in &self.quotes {
            let _ = write!(out, "{} ({})", quote.symbol, quote.name);
            if let Some(price) = quote.price {
                let _ = write!(out, ": price ${price:.2}");
            }
            if let Some(change) = quote.change {
                let _ = write!(out, ", {change:+.2}% on the day");
            }
            if let Some(close) = quote.close {
                let _ = write!(out, ", previous close ${close:.2}");
            }
            out.push('\n');
        }

        for technical in &self.technicals {
            out.push_str(technical);
        }

        if !self.topics.sectors.is_empty() {
            let _ = writeln!(out, "Sectors the listener asked about: {}", self.topics.sectors.join(", "));
        }
        if !self.topics.markets.is_empty() {
            let _ = writeln!(out, "Markets the listener asked about: {}", self.topics.markets.join(", "));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn briefing() -> MarketBriefing {
        MarketBriefing {
            topics: MarketTopics {
                tickers: vec!["AAPL".to_owned()],
                sectors: vec!["Healthcare"],
                markets: vec!["Crypto"],
            },
            quotes: vec![TickerDetail {
                symbol: "AAPL".to_owned(),
                name: "Apple Inc.".to_owned(),
                price: Some(189.5),
                change: Some(-0.42),
                close: Some(190.3),
                logo: "https://logo.clearbit.com/apple.com".to_owned(),
            }],
            technicals: vec!["Technical summary for AAPL:\n- MACD is positive, supporting bullish momentum.\n".to_owned()],
        }
    }

    #[test]
    fn render_lists_quotes_technicals_and_focus() {
        assert_eq!(
            briefing().render(),
            indoc! {"
                AAPL (Apple Inc.): price $189.50, -0.42% on the day, previous close $190.30
                Technical summary for AAPL:
                - MACD is positive, supporting bullish momentum.
                Sectors the listener asked about: Healthcare
                Markets the listener asked about: Crypto
            "}
        );
    }

    #[test]
    fn notes_follow_what_was_found() {
        assert_eq!(
            briefing().notes(),
            vec![
                "Looking up AAPL",
                "Live quotes received for AAPL",
                "Sectors in focus: Healthcare",
                "Markets in focus: Crypto",
            ]
        );
        assert!(MarketBriefing::default().notes().is_empty());
        assert!(MarketBriefing::default().is_empty());
    }
}
