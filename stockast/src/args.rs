use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

/// Stockast finance podcast gateway
#[derive(Debug, Parser)]
#[command(name = "stockast", about = "Finance chat, market data, and podcast generation gateway")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "stockast.toml", env = "STOCKAST_CONFIG", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP gateway (default)
    Serve(ServeArgs),
    /// Generate a podcast through a running gateway
    Podcast(PodcastArgs),
}

#[derive(Debug, Default, clap::Args)]
pub struct ServeArgs {
    /// Override the listen address
    #[arg(long, env = "STOCKAST_LISTEN")]
    pub listen: Option<SocketAddr>,
}

#[derive(Debug, clap::Args)]
pub struct PodcastArgs {
    /// Base URL of the gateway
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "STOCKAST_SERVER")]
    pub server: Url,

    /// Voice used for the audio
    #[arg(long, default_value = speech::DEFAULT_VOICE_ID)]
    pub voice: String,

    /// Where to write the generated audio
    #[arg(short, long, default_value = "podcast.mp3")]
    pub out: PathBuf,

    /// Print the script gradually instead of all at once
    #[arg(long)]
    pub reveal: bool,

    /// Market news or notes to turn into a podcast
    pub text: String,
}
