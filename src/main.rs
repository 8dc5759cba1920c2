use std::process::ExitCode;

use anyhow::Context as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bookscrape::logging::init().context("init logging")?;

    // Values already in the process environment win over the file.
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("load .env file"),
    }

    let config = bookscrape::config::Config::from_env().context("load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let summary = bookscrape::pipeline::run(&config)
        .await
        .context("scrape books")?;
    tracing::debug!(?summary, "run finished");

    Ok(())
}
