use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nf_core::{response_schema, validate, ArticleSearch, ToolRegistry};
use nf_tools::{create_news_tools, fetch_articles, ContentExtractor, NewsApiClient, TopicSummarizer};

mod config;
mod setup;

use config::{expand_path, Config};

/// Log level for tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Most verbose: every request and extraction attempt
    Trace,
    /// Verbose: request URLs, per-strategy results
    Debug,
    /// Standard: article counts, extraction successes
    Info,
    /// Quiet: failed strategies and degraded results
    Warn,
    /// Minimal: only errors
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser)]
#[command(name = "nf")]
#[command(author, version, about = "news-fetch: search, extract and summarize news articles", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/nf/config.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Enable debug logging (shorthand for --log-level debug)
    #[arg(short, long)]
    pub debug: bool,

    /// Write logs to file (JSON-lines format) instead of stderr
    #[arg(long)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search recent articles on a topic
    Articles {
        /// Search terms
        query: String,
        /// How many days back to search
        #[arg(long)]
        days_back: Option<u32>,
        /// Comma-separated domains to restrict to
        #[arg(long)]
        sources: Option<String>,
        /// Maximum number of articles
        #[arg(short, long)]
        max: Option<u32>,
        /// ISO 639-1 language code
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Extract the main text of article pages
    Extract {
        /// Article URLs
        #[arg(required = true)]
        links: Vec<String>,
    },
    /// Summarize the top articles for a topic
    Summary {
        /// Topic to summarize
        query: String,
    },
    /// Summarize the given article URLs
    Digest {
        /// Article URLs
        #[arg(required = true)]
        links: Vec<String>,
    },
    /// Validate a response object read from a file or stdin
    Validate {
        /// JSON file, or '-' for stdin
        #[arg(default_value = "-")]
        file: String,
    },
    /// Print the response JSON schema
    Schema,
    /// List the agent tools and their parameters
    Tools,
    /// Invoke an agent tool with JSON arguments
    Call {
        /// Tool name
        name: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Show current configuration
    Config,
    /// Initialize a configuration file in ~/.config/nf
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --debug overrides --log-level
    let log_level = if cli.debug {
        LogLevel::Debug
    } else {
        cli.log_level
    };
    let filter = EnvFilter::new(log_level.as_filter());

    // stdout carries results only
    if let Some(log_path) = &cli.log_file {
        let log_path = expand_path(log_path);
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {:?}", log_path))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::sync::Mutex::new(file)))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    if matches!(cli.command, Commands::Setup) {
        return setup::run();
    }

    let config_path = cli.config.as_deref().map(expand_path);
    let config = Config::load(config_path.as_deref())?;

    match cli.command {
        Commands::Articles {
            query,
            days_back,
            sources,
            max,
            language,
        } => {
            let search = news_search(&config);
            let search_config = &config.news.search;
            let query = search_config
                .query(query)
                .with_days_back(days_back.unwrap_or(search_config.days_back))
                .with_sources(sources)
                .with_max_results(max.unwrap_or(search_config.max_articles))
                .with_language(language.unwrap_or_else(|| search_config.language.clone()));

            print_json(&fetch_articles(search.as_ref(), &query).await)
        }
        Commands::Extract { links } => {
            let extractor = ContentExtractor::new(&config.news.extract);
            print_json(&extractor.extract(&links).await)
        }
        Commands::Summary { query } => print_json(&topic_summarizer(&config).summarize_topic(&query).await),
        Commands::Digest { links } => print_json(&topic_summarizer(&config).summarize_links(&links).await),
        Commands::Validate { file } => {
            let raw = read_input(&file)?;
            // Unparseable input is validated as a bare string: an invalid-format fallback.
            let candidate = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
            print_json(&validate(candidate))
        }
        Commands::Schema => print_json(&response_schema()),
        Commands::Tools => print_json(&tool_registry(&config).definitions()),
        Commands::Call { name, arguments } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&arguments).context("Tool arguments must be a JSON object")?;
            let output = tool_registry(&config).call(&name, arguments).await;
            if output.is_error {
                anyhow::bail!(output.content);
            }
            println!("{}", output.content);
            Ok(())
        }
        Commands::Config => show_config(&config, config_path),
        Commands::Setup => unreachable!(),
    }
}

fn news_search(config: &Config) -> Arc<dyn ArticleSearch> {
    if !config.has_api_key() {
        warn!("No NewsAPI key configured; set {} or [search].api_key", config::API_KEY_ENV);
    }
    Arc::new(NewsApiClient::new(&config.news.search))
}

fn topic_summarizer(config: &Config) -> TopicSummarizer {
    TopicSummarizer::new(
        news_search(config),
        Arc::new(ContentExtractor::new(&config.news.extract)),
        config.news.search.clone(),
        config.news.summary.clone(),
    )
}

fn tool_registry(config: &Config) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in create_news_tools(&config.news) {
        registry.register(tool);
    }
    registry
}

fn read_input(file: &str) -> Result<String> {
    let mut input = String::new();
    if file == "-" {
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
    } else {
        let path = expand_path(file);
        input = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(input)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn show_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::config_path()?,
    };
    println!("# Configuration file: {}", path.display());
    if !path.exists() {
        println!("# (not found, using defaults)");
    }
    if !config.has_api_key() {
        println!("# NewsAPI key: not set ({})", config::API_KEY_ENV);
    }
    println!();
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}
