use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use spdlog::warn;

use postcast::command::SystemRunner;
use postcast::config::open_config;
use postcast::logger::configure_logger;
use postcast::remote_fetch::RemoteAudioFetcher;
use postcast::PublishError;

/// Extracts the best quality audio of a video on the remote host
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path. Defaults to postcast.toml next to the executable, in the current dir or in the user config dir
    #[arg(short, long)]
    config_path: Option<String>,

    /// Also copy the remote files into the local music directory
    #[arg(short, long)]
    sync: bool,

    /// Video URL, passed untouched to the remote downloader
    url: String,
}

fn run(args: Args) -> Result<()> {
    let config = open_config(args.config_path.map(PathBuf::from))
        .context("Please run fetch-audio --help")?;

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    let fetcher = RemoteAudioFetcher::new(&config.remote, &SystemRunner);
    fetcher.fetch(&args.url)?;

    if args.sync {
        fetcher.sync_to(&config.paths.music_dir)?;
    }

    Ok(())
}

/// Line printed on stderr and the exit code for a failed run
fn report(err: &anyhow::Error) -> (String, u8) {
    let code = err.downcast_ref::<PublishError>()
        .map(|e| e.exit_code())
        .unwrap_or(1);
    (format!("fetch-audio: {:#}", err), code as u8)
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (message, code) = report(&err);
            eprintln!("{}", message);
            ExitCode::from(code)
        }
    }
}
