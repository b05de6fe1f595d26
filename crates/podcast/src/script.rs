//! Extraction of the think and final-script regions of a `script` payload
//!
//! Model output is not guaranteed to contain either region, so extraction
//! never fails: a missing or unmatched marker pair yields an empty region.

use std::sync::OnceLock;

use regex::Regex;

use crate::progress::ProgressPhase;

pub const SCRIPT_START: &str = "[Final Podcast Script]";
pub const SCRIPT_END: &str = "[End of Podcast Script]";

fn think_region() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<think[>\s]([\s\S]*?)</think>").expect("must be valid regex"))
}

fn script_region() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\[Final Podcast Script\]([\s\S]*?)\[End of Podcast Script\]").expect("must be valid regex")
    })
}

/// Regions extracted from a `script` payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedScript {
    /// Think region lines, without blanks or phase messages
    pub thinking: Vec<String>,
    /// Final script region, trimmed
    pub script: String,
    /// Non-blank lines of the final script
    pub lines: Vec<String>,
}

/// Split a `script` payload into thinking lines and the final script
pub fn parse_script(content: &str) -> ParsedScript {
    let think = capture(think_region(), content);
    let script = capture(script_region(), content).to_owned();

    let thinking = think
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !ProgressPhase::is_canonical(line))
        .map(str::to_owned)
        .collect();

    let lines = script_lines(&script);

    ParsedScript {
        thinking,
        script,
        lines,
    }
}

/// Non-blank lines of a script
pub fn script_lines(script: &str) -> Vec<String> {
    script
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

/// Wrap plain text in the final-script markers unless it already has them
pub fn ensure_script_markers(text: &str) -> String {
    if script_region().is_match(text) {
        text.to_owned()
    } else {
        format!("{SCRIPT_START}\n{}\n{SCRIPT_END}", text.trim())
    }
}

fn capture<'a>(re: &Regex, content: &'a str) -> &'a str {
    re.captures(content)
        .and_then(|c| c.get(1))
        .map_or("", |m| m.as_str().trim())
}
