use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use spdlog::{info, warn};

use postcast::command::SystemRunner;
use postcast::config::open_config;
use postcast::logger::configure_logger;
use postcast::prompt::StdinConfirm;
use postcast::publisher::PostPublisher;
use postcast::PublishError;

/// Creates a new post, opens it in the editor, commits it and, when the
/// permalink is a YouTube video, pulls its audio into the music library
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path. Defaults to postcast.toml next to the executable, in the current dir or in the user config dir
    #[arg(short, long)]
    config_path: Option<String>,

    /// Title of the post
    #[arg(required = true, num_args = 1..)]
    title: Vec<String>,
}

fn run(args: Args) -> Result<()> {
    let title = args.title.join(" ");
    let config = open_config(args.config_path.map(PathBuf::from))
        .context("Please run publish --help")?;

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    let mut publisher = PostPublisher::new(&config, &SystemRunner, &StdinConfirm);
    let state = publisher.publish(&title)
        .with_context(|| format!("Publishing '{}' stopped after step '{}'", title, publisher.state()))?;

    info!("Publishing '{}' finished: {}", title, state);
    Ok(())
}

/// Line printed on stderr and the exit code for a failed run
fn report(err: &anyhow::Error) -> (String, u8) {
    let code = err.downcast_ref::<PublishError>()
        .map(|e| e.exit_code())
        .unwrap_or(1);
    (format!("publish: {:#}", err), code as u8)
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
