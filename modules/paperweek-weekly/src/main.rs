use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::{OpenAiClient, PerplexityClient};
use paperweek_common::{Config, PaperweekError};
use paperweek_sources::{JsonFileStore, ReliabilityScorer, SourceRegistry};
use paperweek_weekly::flows::{
    self, LearnOutcome, QualifyOutcome, SummarizeOutcome,
};
use paperweek_weekly::notify::EventWebhook;
use paperweek_weekly::pipeline::WeeklyPaperJob;
use paperweek_weekly::publish::{ChannelPublisher, DiscordWebhook, NoopPublisher};
use paperweek_weekly::scheduler;
use spacedevs_client::LaunchClient;

#[derive(Parser)]
#[command(name = "paperweek", about = "Trusted-source science publication bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the service: schedule the weekly publication and wait.
    Serve,
    /// Trigger one weekly publication run immediately.
    RunOnce {
        /// Run the pipeline without posting anywhere.
        #[arg(long)]
        dry_run: bool,
    },
    /// Learn a source from an article URL via AI validation.
    Learn {
        url: String,
        #[arg(long, default_value = "moderator")]
        actor: String,
    },
    /// Validate an article URL, summarizing it if the source is trusted.
    Qualify { url: String },
    /// Summarize an article from a trusted source.
    Summarize { url: String },
    /// Manage the trusted-source list.
    #[command(subcommand)]
    Sources(SourcesCommand),
    /// Show upcoming rocket launches.
    Launches {
        /// How many launches to show (1-10).
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum SourcesCommand {
    /// List registered domains.
    List,
    /// Add a domain (e.g. nature.com).
    Add {
        domain: String,
        #[arg(long, default_value = "moderator")]
        actor: String,
    },
    /// Remove a domain.
    Remove { domain: String },
    /// Check whether a URL passes the allow-list.
    Check { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("paperweek_weekly=info".parse()?)
                .add_directive("paperweek_sources=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(RunMode::Scheduled).await,
        Command::RunOnce { dry_run: false } => serve(RunMode::Once).await,
        Command::RunOnce { dry_run: true } => serve(RunMode::DryRun).await,
        Command::Learn { url, actor } => learn(&url, &actor).await,
        Command::Qualify { url } => qualify(&url).await,
        Command::Summarize { url } => summarize(&url).await,
        Command::Sources(cmd) => sources(cmd).await,
        Command::Launches { limit } => launches(limit).await,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum RunMode {
    Scheduled,
    Once,
    DryRun,
}

async fn serve(mode: RunMode) -> Result<()> {
    // The channel webhook is the one credential a publishing run cannot do
    // without; a dry run skips both it and the event webhook.
    let config = if mode == RunMode::DryRun {
        Config::admin_from_env()
    } else {
        Config::from_env()
    };
    config.log_startup();

    let registry = SourceRegistry::new(JsonFileStore::new(&config.sources_path));
    let searcher = Arc::new(PerplexityClient::new(config.perplexity_api_key.clone()));
    let summarizer = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));
    let publisher: Arc<dyn ChannelPublisher> = if mode == RunMode::DryRun {
        Arc::new(NoopPublisher)
    } else {
        Arc::new(DiscordWebhook::new(config.articles_webhook_url.clone()))
    };

    let mut job = WeeklyPaperJob::new(registry, searcher, summarizer, publisher);
    if mode != RunMode::DryRun {
        if let Some(url) = config.event_webhook_url.clone() {
            info!("Event webhook notifications enabled");
            job = job.with_events(EventWebhook::new(url));
        }
    }
    let job = Arc::new(job);

    if mode != RunMode::Scheduled {
        let outcome = job.run().await;
        info!(?outcome, "Manual weekly paper run finished");
        return Ok(());
    }

    let timezone: chrono_tz::Tz = config.timezone.parse().map_err(|e| {
        PaperweekError::Config(format!("invalid TIMEZONE '{}': {e}", config.timezone))
    })?;
    let _scheduler = scheduler::start(job, config.post_hour, timezone).await?;

    info!("paperweek service started, waiting for the weekly schedule");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");
    Ok(())
}

async fn learn(url: &str, actor: &str) -> Result<()> {
    let config = Config::admin_from_env();
    let registry = SourceRegistry::new(JsonFileStore::new(&config.sources_path));
    let searcher = PerplexityClient::new(config.perplexity_api_key.clone());
    let scorer = ReliabilityScorer::default();

    match flows::learn_source(&registry, &searcher, &scorer, url, actor).await? {
        LearnOutcome::AlreadyTrusted { domain } => {
            println!("{domain} is already a trusted source.");
        }
        LearnOutcome::Added { domain, assessment } => {
            println!("{domain} validated and added to the trusted sources.\n");
            println!("{assessment}");
        }
        LearnOutcome::Rejected { domain, assessment } => {
            println!("{domain} did not pass automatic validation.\n");
            println!("{assessment}");
        }
    }
    Ok(())
}

async fn qualify(url: &str) -> Result<()> {
    let config = Config::admin_from_env();
    let registry = SourceRegistry::new(JsonFileStore::new(&config.sources_path));
    let searcher = PerplexityClient::new(config.perplexity_api_key.clone());
    let summarizer = OpenAiClient::new(config.openai_api_key.clone());

    match flows::qualify_article(&registry, &searcher, &summarizer, url).await? {
        QualifyOutcome::Qualified { title, summary } => {
            println!("{title}\n\n{summary}");
        }
        QualifyOutcome::Unvetted { assessment } => {
            println!("Source is not in the trusted list. AI assessment:\n\n{assessment}");
        }
    }
    Ok(())
}

async fn summarize(url: &str) -> Result<()> {
    let config = Config::admin_from_env();
    let registry = SourceRegistry::new(JsonFileStore::new(&config.sources_path));
    let summarizer = OpenAiClient::new(config.openai_api_key.clone());

    match flows::summarize_url(&registry, &summarizer, url).await? {
        SummarizeOutcome::Untrusted => {
            println!("This source is not in the trusted list. Use `paperweek sources list` to see accepted domains.");
        }
        SummarizeOutcome::Summarized { title, summary } => {
            println!("{title}\n\n{summary}");
        }
    }
    Ok(())
}

async fn sources(cmd: SourcesCommand) -> Result<()> {
    let config = Config::admin_from_env();
    let registry = SourceRegistry::new(JsonFileStore::new(&config.sources_path));

    match cmd {
        SourcesCommand::List => {
            let info = registry.info().await;
            println!(
                "{} trusted sources (last updated {})",
                info.count,
                info.last_updated.format("%Y-%m-%d %H:%M UTC")
            );
            for domain in info.domains {
                println!("  {domain}");
            }
        }
        SourcesCommand::Add { domain, actor } => {
            if flows::add_source(&registry, &domain, &actor).await? {
                println!("Added. {} sources total.", registry.info().await.count);
            } else {
                println!("Already present.");
            }
        }
        SourcesCommand::Remove { domain } => {
            if flows::remove_source(&registry, &domain).await? {
                println!("Removed. {} sources total.", registry.info().await.count);
            } else {
                println!("Not found.");
            }
        }
        SourcesCommand::Check { url } => {
            if registry.is_valid(&url).await {
                println!("Trusted.");
            } else {
                println!("Not trusted.");
            }
        }
    }
    Ok(())
}

async fn launches(limit: u32) -> Result<()> {
    let limit = limit.clamp(1, 10);
    let client = LaunchClient::new();
    let launches = client.upcoming(limit).await?;

    if launches.is_empty() {
        println!("No rocket launches are currently scheduled.");
        return Ok(());
    }

    for (i, launch) in launches.iter().enumerate() {
        let mission: String = if launch.mission.chars().count() > 200 {
            let prefix: String = launch.mission.chars().take(200).collect();
            format!("{prefix}...")
        } else {
            launch.mission.clone()
        };

        println!("{}. {}", i + 1, launch.name);
        println!("   Date:     {}", launch.date.format("%Y-%m-%d %H:%M UTC"));
        println!("   Agency:   {}", launch.agency);
        println!("   Location: {}", launch.location);
        println!("   Status:   {}", launch.status);
        println!("   Mission:  {mission}");
        if !launch.url.is_empty() {
            println!("   Details:  {}", launch.url);
        }
        println!();
    }
    Ok(())
}
