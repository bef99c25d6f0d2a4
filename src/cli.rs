//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use audioprobe_core::batch::RunMode;
use audioprobe_core::provider::DEFAULT_CLIENT_NAME;

/// Resolve audio-track languages and transcripts for video identifiers.
///
/// Emits one JSON record per identifier on stdout: a bare object for a
/// single identifier, an array for several, or one object per line with
/// `--jsonl`. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "audioprobe")]
#[command(author, version, about)]
pub struct Args {
    /// Video identifiers (comma-separated values are split)
    #[arg(value_name = "VIDEO_ID", required = true)]
    pub video_ids: Vec<String>,

    /// Processing mode
    #[arg(long, value_enum, default_value_t = ModeArg::Audio)]
    pub mode: ModeArg,

    /// Metadata provider backend
    #[arg(long, value_enum, default_value_t = ProviderArg::Innertube)]
    pub provider: ProviderArg,

    /// InnerTube client name sent with player requests
    #[arg(long, default_value = DEFAULT_CLIENT_NAME)]
    pub client: String,

    /// Path to a cookies.txt file for age-restricted videos
    #[arg(long)]
    pub cookies: Option<PathBuf>,

    /// Path to the yt-dlp executable (yt-dlp provider only)
    #[arg(long)]
    pub yt_dlp_path: Option<PathBuf>,

    /// Emit one JSON object per line instead of an object/array
    #[arg(long)]
    pub jsonl: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Processing mode flag.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Audio,
    Transcript,
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Audio => Self::Audio,
            ModeArg::Transcript => Self::Transcript,
        }
    }
}

/// Provider backend flag.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderArg {
    Innertube,
    YtDlp,
}

/// Splits comma-separated identifier arguments and drops empty fragments.
#[must_use]
pub fn split_video_ids(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}
