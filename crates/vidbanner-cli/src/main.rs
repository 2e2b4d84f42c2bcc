//! Vidbanner CLI - Inspect and simulate background video banners
//!
//! Features:
//! - Embed URL construction
//! - Banner config validation
//! - Style model inspection
//! - Lifecycle simulation against in-memory Vimeo/YouTube SDKs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// Vidbanner CLI - Video banner toolkit
#[derive(Parser)]
#[command(name = "vidbanner")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Vimeo/YouTube background video banner toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the embed URL for a video
    EmbedUrl {
        /// Provider video id
        video_id: String,

        /// Provider (vimeo, youtube)
        #[arg(short, long, default_value = "vimeo")]
        source: String,

        /// Disable looping (YouTube only)
        #[arg(long)]
        no_loop: bool,
    },

    /// Validate a banner config file
    Validate {
        /// Path to a JSON banner config
        config: PathBuf,
    },

    /// Show the computed banner styles
    Style {
        /// Take aspect ratio and overlay from a config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Aspect ratio (16:9, 9:16, 1:1, full)
        #[arg(short, long, default_value = "full")]
        aspect: String,

        /// Playback state (uninitialized, loading, playing, disposed)
        #[arg(long, default_value = "loading")]
        state: String,

        /// Viewport width in CSS pixels
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Viewport height in CSS pixels
        #[arg(long, default_value = "1080")]
        height: u32,
    },

    /// Run banners against in-memory SDKs with timed provider events
    Simulate {
        /// Provider (vimeo, youtube)
        #[arg(short, long, default_value = "youtube")]
        source: String,

        /// Number of banners mounted at once
        #[arg(short = 'n', long, default_value = "2")]
        banners: usize,

        /// Delay before the IFrame API finishes loading (YouTube)
        #[arg(long, default_value = "50")]
        api_ms: u64,

        /// Delay before players report ready
        #[arg(long, default_value = "50")]
        ready_ms: u64,

        /// Delay before playback starts
        #[arg(long, default_value = "100")]
        play_ms: u64,

        /// Delay before the banners unmount
        #[arg(long, default_value = "200")]
        unmount_ms: u64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();
    vidbanner_core::init();

    match cli.command {
        Commands::EmbedUrl { video_id, source, no_loop } => {
            commands::embed_url(&video_id, &source, !no_loop, &cli.format)?;
        }
        Commands::Validate { config } => {
            commands::validate(&config, &cli.format)?;
        }
        Commands::Style { config, aspect, state, width, height } => {
            commands::style(config.as_deref(), &aspect, &state, width, height, &cli.format)?;
        }
        Commands::Simulate { source, banners, api_ms, ready_ms, play_ms, unmount_ms } => {
            let options = commands::SimulateOptions {
                source,
                banners,
                api_ms,
                ready_ms,
                play_ms,
                unmount_ms,
            };
            // Banner state is single-threaded; everything runs on one LocalSet
            let local = tokio::task::LocalSet::new();
            local.run_until(commands::simulate(options, &cli.format)).await?;
        }
    }

    Ok(())
}
