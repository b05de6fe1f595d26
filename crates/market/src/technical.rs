//! Rule-based technical read of a daily closing-price series
//!
//! Three signals feed the podcast briefing: the last close against its
//! 20-day simple average, the 14-day RSI (Wilder smoothing), and the sign of
//! the 12/26 MACD line. All of them are read at the most recent close.

use std::fmt::Write as _;

use thiserror::Error;

/// Closes needed before every signal is defined (the slow MACD average)
pub const MIN_CLOSES: usize = 26;

const SMA_PERIOD: usize = 20;
const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;

const OVERBOUGHT: f64 = 70.0;
const OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("need at least {needed} closes, got {got}")]
pub struct InsufficientHistory {
    pub needed: usize,
    pub got: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    AboveAverage,
    BelowAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Momentum {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdDirection {
    Bullish,
    Bearish,
}

/// Indicator values at the latest close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalSummary {
    pub close: f64,
    pub sma20: f64,
    pub rsi: f64,
    pub macd: f64,
}

impl TechnicalSummary {
    /// Compute every indicator over `closes`, oldest first
    pub fn from_closes(closes: &[f64]) -> Result<Self, InsufficientHistory> {
        let insufficient = InsufficientHistory {
            needed: MIN_CLOSES,
            got: closes.len(),
        };
        if closes.len() < MIN_CLOSES {
            return Err(insufficient);
        }

        let (Some(&close), Some(sma20), Some(rsi), Some(macd)) = (
            closes.last(),
            sma(closes, SMA_PERIOD),
            rsi(closes, RSI_PERIOD),
            macd(closes),
        ) else {
            return Err(insufficient);
        };

        Ok(Self { close, sma20, rsi, macd })
    }

    pub fn trend(&self) -> Trend {
        if self.close > self.sma20 {
            Trend::AboveAverage
        } else {
            Trend::BelowAverage
        }
    }

    pub fn momentum(&self) -> Momentum {
        if self.rsi > OVERBOUGHT {
            Momentum::Overbought
        } else if self.rsi < OVERSOLD {
            Momentum::Oversold
        } else {
            Momentum::Neutral
        }
    }

    pub fn macd_direction(&self) -> MacdDirection {
        if self.macd > 0.0 {
            MacdDirection::Bullish
        } else {
            MacdDirection::Bearish
        }
    }

    /// Plain-language lines for a script writer
    pub fn render(&self, symbol: &str) -> String {
        let trend = match self.trend() {
            Trend::AboveAverage => "The stock is trading above its 20-day average, indicating short-term strength.",
            Trend::BelowAverage => "The stock is trading below its 20-day average, which may suggest some weakness.",
        };
        let momentum = match self.momentum() {
            Momentum::Overbought => "RSI is above 70, suggesting the stock may be overbought.",
            Momentum::Oversold => "RSI is below 30, indicating it might be oversold.",
            Momentum::Neutral => "RSI is in a neutral range, showing balanced momentum.",
        };
        let macd = match self.macd_direction() {
            MacdDirection::Bullish => "MACD is positive, supporting bullish momentum.",
            MacdDirection::Bearish => "MACD is negative, indicating bearish momentum.",
        };

        let mut out = format!("Technical summary for {symbol}:\nClosing price: ${:.2}\n", self.close);
        for line in [trend, momentum, macd] {
            let _ = writeln!(out, "- {line}");
        }
        out
    }
}

/// Technical summary text for `symbol`, or a note saying why there is none
pub fn describe(symbol: &str, closes: &[f64]) -> String {
    match TechnicalSummary::from_closes(closes) {
        Ok(summary) => summary.render(symbol),
        Err(e) => format!("Insufficient data for {symbol} to calculate technical indicators: {e}.\n"),
    }
}

/// Simple moving average of the last `period` values
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(mean(&values[values.len() - period..]))
}

/// Exponential moving average series, seeded with the SMA of the first
/// `period` values; element 0 lines up with `values[period - 1]`
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let alpha = 2.0 / (len_f64(period) + 1.0);
    let mut current = mean(&values[..period]);
    let mut series = Vec::with_capacity(values.len() - period + 1);
    series.push(current);

    for value in &values[period..] {
        current = alpha * value + (1.0 - alpha) * current;
        series.push(current);
    }
    series
}

/// Relative strength index at the last value, with Wilder smoothing
pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() <= period {
        return None;
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let (seed, rest) = changes.split_at(period);

    let n = len_f64(period);
    let mut gain = seed.iter().map(|c| c.max(0.0)).sum::<f64>() / n;
    let mut loss = seed.iter().map(|c| (-c).max(0.0)).sum::<f64>() / n;

    for change in rest {
        gain = (gain * (n - 1.0) + change.max(0.0)) / n;
        loss = (loss * (n - 1.0) + (-change).max(0.0)) / n;
    }

    if loss <= 0.0 {
        return Some(if gain <= 0.0 { 50.0 } else { 100.0 });
    }
    Some(100.0 - 100.0 / (1.0 + gain / loss))
}

/// MACD line (fast EMA minus slow EMA) at the last value
pub fn macd(values: &[f64]) -> Option<f64> {
    let fast = ema_series(values, MACD_FAST);
    let slow = ema_series(values, MACD_SLOW);
    Some(fast.last()? - slow.last()?)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / len_f64(values.len())
}

#[allow(clippy::cast_precision_loss)]
fn len_f64(len: usize) -> f64 {
    len as f64
}
