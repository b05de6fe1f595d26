//! Gradual reveal of script lines for display

use std::time::Duration;

use futures_util::Stream;
use futures_util::stream;

pub const REVEAL_BATCH: usize = 4;
pub const REVEAL_INTERVAL: Duration = Duration::from_secs(2);

/// Script lines released in fixed-size batches
#[derive(Debug, Clone, Default)]
pub struct ScriptReveal {
    lines: Vec<String>,
    shown: usize,
}

impl ScriptReveal {
    pub const fn new(lines: Vec<String>) -> Self {
        Self { lines, shown: 0 }
    }

    /// Release the next batch, if any lines remain hidden
    pub fn next_batch(&mut self) -> Option<&[String]> {
        if self.is_complete() {
            return None;
        }

        let start = self.shown;
        self.shown = (start + REVEAL_BATCH).min(self.lines.len());
        Some(&self.lines[start..self.shown])
    }

    pub fn visible(&self) -> &[String] {
        &self.lines[..self.shown]
    }

    pub const fn is_complete(&self) -> bool {
        self.shown >= self.lines.len()
    }
}

/// Batches of `lines`: the first right away, then one per [`REVEAL_INTERVAL`]
pub fn reveal(lines: Vec<String>) -> impl Stream<Item = Vec<String>> {
    let interval = tokio::time::interval(REVEAL_INTERVAL);

    stream::unfold((ScriptReveal::new(lines), interval), |(mut reveal, mut interval)| async move {
        if reveal.is_complete() {
            return None;
        }
        interval.tick().await;
        let batch = reveal.next_batch().map(<[String]>::to_vec).unwrap_or_default();
        Some((batch, (reveal, interval)))
    })
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn batches_of_four() {
        let mut reveal = ScriptReveal::new(lines(10));

        assert_eq!(reveal.next_batch().unwrap().len(), 4);
        assert_eq!(reveal.next_batch().unwrap().len(), 4);
        assert_eq!(reveal.next_batch().unwrap(), ["line 9", "line 10"]);
        assert!(reveal.next_batch().is_none());
        assert_eq!(reveal.visible().len(), 10);
    }

    #[test]
    fn empty_script_is_complete() {
        let mut reveal = ScriptReveal::new(Vec::new());
        assert!(reveal.is_complete());
        assert!(reveal.next_batch().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn batches_are_spaced_by_interval() {
        let started = tokio::time::Instant::now();
        let mut batches = Box::pin(reveal(lines(9)));

        assert_eq!(batches.next().await.unwrap().len(), 4);
        assert_eq!(started.elapsed(), Duration::ZERO);

        assert_eq!(batches.next().await.unwrap().len(), 4);
        assert_eq!(started.elapsed(), REVEAL_INTERVAL);

        assert_eq!(batches.next().await.unwrap(), vec!["line 9".to_owned()]);
        assert_eq!(started.elapsed(), REVEAL_INTERVAL * 2);

        assert!(batches.next().await.is_none());
    }
}
