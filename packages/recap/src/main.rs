//! `recap` command line.
//!
//! ```text
//! recap [URL] [--site] [--force]
//! recap discuss [--slug SLUG | --url URL]
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recap::{
    BrowserConfig, CdpBrowser, CommandSession, FsStore, HttpFetcher, OpenAiSummarizer, Recap,
    RecapConfig, RecapRequest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "recap")]
#[command(about = "Summarize a page, video or whole site, once")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// URL to summarize (default: the browser's active tab)
    url: Option<String>,

    /// Summarize the whole site the URL belongs to
    #[arg(long)]
    site: bool,

    /// Summarize again even if a summary exists
    #[arg(long)]
    force: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a discussion about a stored summary (default: the latest)
    Discuss {
        #[arg(long, conflicts_with = "url")]
        slug: Option<String>,

        /// Source URL of the artifact
        #[arg(long)]
        url: Option<String>,
    },
}

/// Settings read from the environment.
struct Settings {
    config: RecapConfig,
    openai_api_key: Option<String>,
    model: String,
    discuss_command: Option<String>,
}

impl Settings {
    fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let storage_root = match env::var("RECAP_HOME") {
            Ok(path) => PathBuf::from(path),
            Err(_) => env::var("HOME")
                .map(|home| PathBuf::from(home).join(".recap"))
                .unwrap_or_else(|_| PathBuf::from(".recap")),
        };

        let mut config = RecapConfig::new(storage_root);
        if let Ok(budget) = env::var("RECAP_BUDGET_WORDS") {
            config = config.with_budget(
                budget
                    .parse()
                    .context("RECAP_BUDGET_WORDS must be a number")?,
            );
        }
        if let Ok(concurrency) = env::var("RECAP_CONCURRENCY") {
            config = config.with_concurrency(
                concurrency
                    .parse()
                    .context("RECAP_CONCURRENCY must be a number")?,
            );
        }
        if let Ok(secs) = env::var("RECAP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().context("RECAP_TIMEOUT_SECS must be a number")?;
            config = config.with_summarize_timeout(Duration::from_secs(secs));
        }
        if let Ok(viewer) = env::var("RECAP_VIEWER_URL") {
            config = config.with_viewer_base_url(viewer);
        }
        if let Ok(endpoint) = env::var("RECAP_CDP_ENDPOINT") {
            config = config.with_browser(BrowserConfig::default().with_endpoint(endpoint));
        }

        Ok(Self {
            config,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            model: env::var("RECAP_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            discuss_command: env::var("RECAP_DISCUSS_CMD").ok(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recap=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let api_key = match &cli.command {
        Some(Commands::Discuss { .. }) => settings.openai_api_key.clone().unwrap_or_default(),
        None => settings
            .openai_api_key
            .clone()
            .context("OPENAI_API_KEY must be set")?,
    };

    let config = settings.config.clone();
    let store = FsStore::new(&config.storage_root);
    let summarizer = OpenAiSummarizer::new(api_key).with_model(&settings.model);
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let browser = CdpBrowser::new(&config.browser.endpoint);

    let recap = Recap::new(config.clone(), store, summarizer, fetcher).with_browser(browser);

    match cli.command {
        Some(Commands::Discuss { slug, url }) => {
            let session = CommandSession::new(
                settings.discuss_command.as_deref(),
                recap.store().root().join("content"),
            );
            let meta = recap
                .discuss(&session, slug.as_deref(), url.as_deref())
                .await
                .context("Discussion failed")?;
            tracing::info!(slug = %meta.slug, "Discussion finished");
        }
        None => {
            let mut request = match cli.url {
                Some(url) => RecapRequest::url(url),
                None => RecapRequest::active_tab(),
            };
            if cli.site {
                request = request.whole_site();
            }
            if cli.force {
                request = request.force();
            }

            let outcome = recap.run(request).await.context("Summarization failed")?;
            if outcome.cached {
                eprintln!("(cached: {})", outcome.slug);
            } else {
                eprintln!("(saved: {})", outcome.slug);
            }
            println!("# {}\n\n{}", outcome.title, outcome.summary);
        }
    }

    Ok(())
}
