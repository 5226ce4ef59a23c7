//! Weibo comment crawler entry point
//!
//! This is the command-line interface for crawling the comments of a single
//! Weibo post into a CSV file.

use anyhow::Context;
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use weibo_comment_crawler::config::{load_config_with_hash, Config};
use weibo_comment_crawler::crawler::{
    EventEmitter, HttpFetcher, SessionController, SessionEvent, SessionHandle, Severity,
};
use weibo_comment_crawler::output::{print_statistics, DirectorySink};
use weibo_comment_crawler::url::{encode_id, parse_post_url};
use weibo_comment_crawler::{CrawlerError, ExportError};

/// Weibo comment crawler
///
/// Walks every comment of a post, including one level of replies, and saves
/// them as a CSV file. While crawling, type `p` + Enter to pause or resume
/// and `c` + Enter (or Ctrl-C) to stop.
#[derive(Parser, Debug)]
#[command(name = "weibo-comment-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Crawls the comments of a Weibo post into CSV", long_about = None)]
struct Cli {
    /// Post URL, e.g. https://weibo.com/1234567890/AbC1dEf
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory the CSV file is written to (overrides the config)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config, &cli.url)
    } else {
        handle_crawl(config, &cli.url).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("weibo_comment_crawler=info,warn"),
            1 => EnvFilter::new("weibo_comment_crawler=debug,info"),
            2 => EnvFilter::new("weibo_comment_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates the URL and shows what would be crawled
fn handle_dry_run(config: &Config, url: &str) -> anyhow::Result<()> {
    println!("=== Weibo Comment Crawler Dry Run ===\n");

    let post = parse_post_url(url).with_context(|| format!("Invalid post URL: {}", url))?;

    println!("Post:");
    println!("  Author uid: {}", post.author_id);
    println!("  Post id (mid): {}", post.post_id);
    println!("  Token: {}", encode_id(post.post_id));

    println!("\nCrawler Configuration:");
    println!("  Page size: {}", config.crawler.page_size);
    println!(
        "  Cool-down: {}s every {} comments",
        config.crawler.cooldown_secs, config.crawler.cooldown_interval
    );
    println!(
        "  Retries: {} (delay {}ms)",
        config.crawler.max_retries, config.crawler.retry_delay_ms
    );

    println!("\nClient:");
    println!("  Base URL: {}", config.client.base_url);
    println!("  Locale: {}", config.client.locale);
    println!(
        "  Cookie: {}",
        if config.client.cookie.is_some() { "set" } else { "not set" }
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Timestamp format: {}", config.output.timestamp_format);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, url: &str) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.client, config.crawler.page_size)?;
    let (events, mut receiver) = EventEmitter::channel();
    let mut controller = SessionController::new(fetcher, &config, events);

    spawn_command_reader(controller.handle());
    tokio::spawn({
        let handle = controller.handle();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received");
                let _ = handle.cancel();
            }
        }
    });

    tracing::info!("Type 'p' + Enter to pause or resume, 'c' + Enter to stop");

    let result = {
        let crawl = controller.start(url);
        tokio::pin!(crawl);
        loop {
            tokio::select! {
                result = &mut crawl => break result,
                Some(event) = receiver.recv() => log_event(event),
            }
        }
    };
    while let Ok(event) = receiver.try_recv() {
        log_event(event);
    }

    let state = result?;
    tracing::info!("Session ended: {}", state);

    let sink = DirectorySink::new(&config.output.directory);
    let exported = controller.export_to(&sink);
    while let Ok(event) = receiver.try_recv() {
        log_event(event);
    }

    match exported {
        Ok(path) => println!("\n✓ Comments saved to: {}\n", path.display()),
        Err(CrawlerError::Export(ExportError::Empty)) => println!("\nNo comments were collected\n"),
        Err(e) => return Err(e).context("Failed to export comments"),
    }

    print_statistics(controller.stats());

    Ok(())
}

/// Reads interactive commands from stdin on a plain thread
///
/// A blocking stdin read on the runtime's pool would hold up shutdown.
fn spawn_command_reader(handle: SessionHandle) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let result = match line.trim() {
                "p" | "pause" | "resume" => handle.toggle_pause().map(|_| ()),
                "c" | "cancel" | "stop" => handle.cancel(),
                "" => continue,
                other => {
                    tracing::warn!("Unknown command '{}': use 'p' or 'c'", other);
                    continue;
                }
            };
            if let Err(e) = result {
                tracing::warn!("{}", e);
            }
        }
    });
}

/// Forwards a session event to the log
fn log_event(event: SessionEvent) {
    match event {
        SessionEvent::Progress { count, percent } => {
            tracing::debug!("{} comments collected ({}% to next cool-down)", count, percent);
        }
        SessionEvent::Log { message, severity } => match severity {
            Severity::Info | Severity::Success => tracing::info!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        },
        SessionEvent::StateChanged(state) => tracing::info!("Session {}", state),
    }
}
