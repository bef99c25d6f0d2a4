//! CLI entry point for the audioprobe tool.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};

use audioprobe_core::batch::{OutputFraming, RunFailureRecord, RunMode, run_batch, write_results};
use audioprobe_core::config::{COOKIES_PATH_KEY, EnvFile, YT_DLP_PATH_KEY};
use audioprobe_core::failure::{ClassifiedError, ErrorKind};
use audioprobe_core::provider::{InnertubeProvider, MetadataProvider, ProviderError, YtDlpProvider};
use audioprobe_core::cookie_header_from_file;

mod cli;

use cli::{Args, ProviderArg};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Results go to stdout; all diagnostics stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            // The contract is well-formed JSON output even for aborts.
            let record = RunFailureRecord::from(failure);
            let mut stdout = io::stdout().lock();
            if serde_json::to_writer(&mut stdout, &record).is_ok() {
                let _ = stdout.write_all(b"\n");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ClassifiedError> {
    let video_ids = cli::split_video_ids(&args.video_ids);
    if video_ids.is_empty() {
        // All arguments dissolved into empty fragments: a usage error, not
        // a batch result.
        eprintln!("error: no video identifiers supplied");
        std::process::exit(2);
    }

    let start_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_file = EnvFile::discover(&start_dir);

    let cookies_path = args
        .cookies
        .clone()
        .or_else(|| env_file.get(COOKIES_PATH_KEY).map(|raw| env_file.resolve_path(raw)));

    let provider: Box<dyn MetadataProvider> = match args.provider {
        ProviderArg::Innertube => {
            let cookie_header = match &cookies_path {
                Some(path) => cookie_header_from_file(path).map_err(|error| {
                    ClassifiedError::new(
                        ErrorKind::InitError,
                        format!("cookie file {}: {error}", path.display()),
                    )
                })?,
                None => String::new(),
            };
            let provider =
                InnertubeProvider::new(&args.client, cookie_header).map_err(init_failure)?;
            Box::new(provider)
        }
        ProviderArg::YtDlp => {
            let command = args
                .yt_dlp_path
                .clone()
                .or_else(|| env_file.get(YT_DLP_PATH_KEY).map(|raw| env_file.resolve_path(raw)));
            let provider = YtDlpProvider::new(command, cookies_path).map_err(init_failure)?;
            Box::new(provider)
        }
    };

    info!(
        ids = video_ids.len(),
        provider = provider.name(),
        "starting batch"
    );

    let mode = RunMode::from(args.mode);
    let framing = OutputFraming::select(args.jsonl, video_ids.len());
    let results = run_batch(provider.as_ref(), &video_ids, mode).await;

    let mut stdout = io::stdout().lock();
    write_results(&mut stdout, &results, framing)
        .map_err(|error| ClassifiedError::new(ErrorKind::Fatal, error.to_string()))?;

    Ok(())
}

/// Maps provider construction failures onto run-level kinds: a missing
/// executable dependency is `provider_missing`, everything else is
/// `init_error`.
fn init_failure(error: ProviderError) -> ClassifiedError {
    let kind = match &error {
        ProviderError::Missing { .. } => ErrorKind::ProviderMissing,
        _ => ErrorKind::InitError,
    };
    ClassifiedError::new(kind, error.to_string())
}
