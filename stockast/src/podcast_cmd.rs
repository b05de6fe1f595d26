use futures_util::StreamExt;
use podcast::client::{AttemptOutcome, Generation, LogEntry, PodcastClient, PodcastConsumer};
use podcast::progress::{GenerationState, PhaseStatus, ProgressPhase};
use podcast::reveal::reveal;
use podcast::session::SessionStore;
use strum::{EnumCount, IntoEnumIterator};

use crate::args::PodcastArgs;

/// Generate a podcast through a running gateway and save its audio
pub async fn run(args: PodcastArgs) -> anyhow::Result<()> {
    let session = SessionStore::new();
    session.submit(args.text.as_str(), args.voice.as_str());

    let consumer = PodcastConsumer::new(PodcastClient::new(args.server.clone()), session);
    let mut updates = consumer.subscribe();
    let mut report = ProgressReport::default();

    let outcome = {
        let generate = consumer.generate();
        tokio::pin!(generate);

        loop {
            tokio::select! {
                outcome = &mut generate => break outcome,
                Ok(()) = updates.changed() => report.print(&updates.borrow_and_update()),
            }
        }
    };

    let generation = consumer.snapshot();
    report.print(&generation);

    match outcome {
        AttemptOutcome::Finished(GenerationState::AudioReady) => {}
        AttemptOutcome::Finished(state) => anyhow::bail!("podcast generation ended in {state:?}"),
        AttemptOutcome::Skipped => anyhow::bail!("nothing to generate: the text is empty"),
        AttemptOutcome::Superseded => anyhow::bail!("podcast generation was cancelled"),
    }

    println!();
    if args.reveal {
        let mut batches = std::pin::pin!(reveal(generation.script_lines.clone()));
        while let Some(batch) = batches.next().await {
            for line in batch {
                println!("{line}");
            }
        }
    } else {
        for line in &generation.script_lines {
            println!("{line}");
        }
    }

    let Some(audio) = generation.audio else {
        anyhow::bail!("audio was not produced");
    };
    let Some(bytes) = audio.bytes() else {
        anyhow::bail!("audio was released before it could be saved");
    };

    tokio::fs::write(&args.out, &bytes)
        .await
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", args.out.display()))?;
    audio.release();

    println!();
    println!("saved {} bytes of audio to {}", bytes.len(), args.out.display());

    Ok(())
}

/// Prints phase labels and thinking entries as they change
#[derive(Default)]
struct ProgressReport {
    statuses: [Option<PhaseStatus>; ProgressPhase::COUNT],
    thinking_printed: usize,
    script_seen: bool,
}

impl ProgressReport {
    fn print(&mut self, generation: &Generation) {
        for phase in ProgressPhase::iter() {
            let status = generation.cursor.status(phase);
            let seen = &mut self.statuses[phase.index()];

            if *seen != Some(status) && status != PhaseStatus::Pending {
                eprintln!("{}", generation.cursor.label(phase));
            }
            *seen = Some(status);
        }

        // A script frame replaces the thinking log wholesale
        if !self.script_seen && !generation.final_script.is_empty() {
            self.script_seen = true;
            self.thinking_printed = 0;
        }
        let start = self.thinking_printed.min(generation.thinking_log.len());

        for entry in &generation.thinking_log[start..] {
            match entry {
                LogEntry::Log(message) => eprintln!("  {message}"),
                LogEntry::Error(message) => eprintln!("error: {message}"),
            }
        }
        self.thinking_printed = generation.thinking_log.len();
    }
}
