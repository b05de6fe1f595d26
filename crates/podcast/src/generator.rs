//! In-process script generation through the completion service
//!
//! Used when no podcast backend is configured. Emits the same frames a
//! backend would: phase logs, free-text notes about the market lookup, then
//! one `script` or `error` frame.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use chat::{ChatMessage, CompletionClient};
use futures_util::{Stream, StreamExt, stream};
use market::{MarketBriefing, MarketClient};
use strum::IntoEnumIterator;

use crate::client::SCRIPT_FAILED;
use crate::progress::ProgressPhase;
use crate::protocol::{StreamEvent, encode_frame};
use crate::script::ensure_script_markers;

const SCRIPT_PROMPT: &str = "You are the host of a daily finance podcast. \
Research the listener's topic and write a short two-host episode about it. \
First write your reasoning inside <think></think> tags, one step per line. \
Then write the episode between the lines [Final Podcast Script] and [End of Podcast Script], \
one spoken line per row, with no stage directions.";

const BRIEFING_HEADER: &str = "Market data to build the episode on:";

/// Gather the market briefing for `text`, or an empty one without a client
pub async fn research(market: Option<&MarketClient>, text: &str) -> MarketBriefing {
    match market {
        Some(market) => market.briefing(text).await,
        None => MarketBriefing::default(),
    }
}

/// User message for the script prompt: the request, then any market data
pub fn script_request(text: &str, briefing: &MarketBriefing) -> String {
    let data = briefing.render();
    if data.is_empty() {
        return text.to_owned();
    }
    format!("{text}\n\n{BRIEFING_HEADER}\n{data}")
}

/// Ask the completion service for a tagged podcast script
pub async fn generate_script(
    completion: &CompletionClient,
    text: &str,
    briefing: &MarketBriefing,
) -> chat::Result<String> {
    let request = script_request(text, briefing);
    let messages = [ChatMessage::system(SCRIPT_PROMPT), ChatMessage::user(request)];
    let reply = completion.complete(completion.summary_model(), &messages).await?;

    Ok(ensure_script_markers(&reply.content))
}

/// Frame stream for one in-process generation
///
/// The first two phases are announced before the market lookup; the lookup
/// notes and the remaining phases follow it, and the script comes last.
pub fn script_frames(
    completion: Arc<CompletionClient>,
    market: Option<Arc<MarketClient>>,
    text: String,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let opening: Vec<_> = phase_logs(ProgressPhase::TrendAnalysis, ProgressPhase::DataGathering).collect();

    let lookup_text = text.clone();
    let lookup = stream::once(async move { research(market.as_deref(), &lookup_text).await });

    let rest = lookup.flat_map(move |briefing| {
        let mut frames: Vec<_> = briefing
            .notes()
            .into_iter()
            .map(|note| Ok(frame(&StreamEvent::log(note))))
            .collect();
        frames.extend(phase_logs(ProgressPhase::AnalysisSynthesis, ProgressPhase::ScriptGeneration));

        let completion = Arc::clone(&completion);
        let text = text.clone();
        let terminal = stream::once(async move {
            let event = match generate_script(&completion, &text, &briefing).await {
                Ok(content) => StreamEvent::script(content),
                Err(e) => {
                    tracing::error!(error = %e, "in-process script generation failed");
                    StreamEvent::error(SCRIPT_FAILED)
                }
            };
            Ok(frame(&event))
        });

        stream::iter(frames).chain(terminal)
    });

    stream::iter(opening).chain(rest)
}

/// `log` frames for the phases `first..=last`
fn phase_logs(first: ProgressPhase, last: ProgressPhase) -> impl Iterator<Item = Result<Bytes, Infallible>> {
    ProgressPhase::iter()
        .skip(first.index())
        .take(last.index() + 1 - first.index())
        .map(|phase| Ok(frame(&StreamEvent::log(phase.message()))))
}

pub(crate) fn frame(event: &StreamEvent) -> Bytes {
    Bytes::from(encode_frame(event))
}
