// Entrypoint for the uploader.
// - Parses flags (with `INPUT_*` environment fallbacks) and sets up logging.
// - Runs one upload; any error aborts with a non-zero exit status.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lstore_upload::api::ApiClient;
use lstore_upload::config::Config;
use lstore_upload::names::RandomNameSequence;
use lstore_upload::ui::{self, Console};
use lstore_upload::upload;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let default_level = if config.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let job = config.job()?;
    let credentials = config.credentials(ui::prompt_password)?;

    let mut api = ApiClient::new(&config.url).context("Failed to build HTTP client")?;
    let mut names = RandomNameSequence::new();
    let mut console = Console::new(config.quiet);

    let mut on_event = |event: upload::Event<'_>| console.event(event);
    let published = upload::run(&mut api, &credentials, &job, &mut names, &mut on_event)
        .with_context(|| format!("Uploading {:?} as \"{}\" failed", job.source, job.title))?;

    console.report(&published);
    Ok(())
}
