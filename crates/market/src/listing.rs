//! Pipe-delimited symbol directory parsing

use crate::error::{MarketError, Result};

const SYMBOL_COLUMN: &str = "Symbol";
const FOOTER_MARKER: &str = "File Creation Time";

/// Extract ticker symbols from a symbol directory file
///
/// The first line is the header naming the columns. The last two lines are
/// the creation-time footer and the empty line after the final newline, and
/// are dropped even when the file is shorter than expected.
pub fn parse_symbols(text: &str) -> Result<Vec<String>> {
    let lines: Vec<&str> = text.split('\n').map(|line| line.trim_end_matches('\r')).collect();

    let header = lines.first().copied().unwrap_or_default();
    let column = header
        .split('|')
        .position(|name| name.trim() == SYMBOL_COLUMN)
        .ok_or_else(|| MarketError::InvalidResponse {
            source_name: "listing",
            message: format!("header has no {SYMBOL_COLUMN} column"),
        })?;

    let body_end = lines.len().saturating_sub(2).max(1);
    let symbols = lines
        .get(1..body_end)
        .unwrap_or_default()
        .iter()
        .filter_map(|line| line.split('|').nth(column))
        .map(str::trim)
        .filter(|symbol| !symbol.is_empty() && !symbol.contains(FOOTER_MARKER))
        .map(str::to_owned)
        .collect();

    Ok(symbols)
}
