//! Cosmo CLI - Command-line interface
//!
//! Usage:
//!   cosmo extract <path> [--svg out.svg] [--json]
//!   cosmo fetch <url> [--svg out.svg] [--json]
//!   cosmo ask <path> <question>
//!   cosmo ask --url <url> <question>
//!   cosmo search <query> [--url <url>]
//!
//! Author: hephaex@gmail.com

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;

use cosmo_agent::FirecrawlAgent;
use cosmo_chat::{Assistant, ChatMode, ChatRequest, Exploration, Explorer, Session};
use cosmo_core::{AppConfig, SearchAgent};
use cosmo_parser::RawDocument;

#[derive(Parser)]
#[command(name = "cosmo")]
#[command(about = "MOSDAC knowledge explorer CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables still override it
    #[arg(long, global = true, env = "COSMO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities and relations from a .txt or .html file
    Extract {
        /// Path to the document
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch a web page and extract entities and relations
    Fetch {
        /// Page URL
        url: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Explore a document or page, then ask the knowledge base
    Ask {
        /// Explore this page instead of a file
        #[arg(long)]
        url: Option<String>,
        /// `<path> <question>`, or just `<question>` with --url
        #[arg(required = true, num_args = 1..=2)]
        args: Vec<String>,
    },
    /// Ask the web search agent
    Search {
        /// What to search for
        query: String,
        /// Restrict the analysis to this page
        #[arg(long)]
        url: Option<String>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Extract { .. } => "extract",
            Commands::Fetch { .. } => "fetch",
            Commands::Ask { .. } => "ask",
            Commands::Search { .. } => "search",
        }
    }
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Write the knowledge graph SVG to this file
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config);

    debug!(
        config_file = ?cli.config,
        agent_configured = config.agent.is_configured(),
        "Configuration loaded"
    );

    let span = info_span!("command", name = cli.command.name());
    run(cli.command, &config).instrument(span).await
}

async fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Extract { path, output } => {
            info!(path = %path.display(), "Extracting document");
            let explorer = Explorer::new(config)?;
            let doc = RawDocument::from_path(&path)?;
            let exploration = explorer.explore_document(&mut Session::new(), &doc)?;
            report(exploration, &output)?;
        }
        Commands::Fetch { url, output } => {
            info!(%url, "Fetching page");
            let explorer = Explorer::new(config)?;
            let exploration = explorer.explore_url(&mut Session::new(), &url).await?;
            report(exploration, &output)?;
        }
        Commands::Ask { url, args } => {
            let (source, question) = split_ask_args(url, args)?;
            let explorer = Explorer::new(config)?;
            let mut session = Session::new();

            let exploration = match source {
                AskSource::File(path) => {
                    info!(path = %path.display(), "Exploring document");
                    let doc = RawDocument::from_path(&path)?;
                    explorer.explore_document(&mut session, &doc)?
                }
                AskSource::Url(url) => {
                    info!(%url, "Exploring page");
                    explorer.explore_url(&mut session, &url).await?
                }
            };
            debug!(
                triples = exploration.triple_count,
                %question,
                "Asking the knowledge base"
            );

            let reply = Assistant::default()
                .send(&mut session, ChatRequest::new(ChatMode::KnowledgeBase, question))
                .await?;
            println!("{}", reply.content);
        }
        Commands::Search { query, url } => {
            let agent = FirecrawlAgent::from_config(&config.agent)
                .map(|agent| Arc::new(agent) as Arc<dyn SearchAgent>);
            if agent.is_none() {
                warn!("FIRECRAWL_API_KEY is not set; the search agent is disabled");
            }
            info!(%query, url = ?url, "Searching");

            let mode = match url {
                Some(url) => ChatMode::UrlAnalysis { url },
                None => ChatMode::WebSearch,
            };

            let reply = Assistant::new(agent)
                .send(&mut Session::new(), ChatRequest::new(mode, query))
                .await?;
            println!("{}", reply.content);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

enum AskSource {
    File(PathBuf),
    Url(String),
}

fn split_ask_args(url: Option<String>, mut args: Vec<String>) -> anyhow::Result<(AskSource, String)> {
    match (url, args.len()) {
        (Some(url), 1) => Ok((AskSource::Url(url), args.remove(0))),
        (None, 2) => {
            let question = args.remove(1);
            Ok((AskSource::File(PathBuf::from(args.remove(0))), question))
        }
        (Some(_), _) => bail!("with --url, pass only the question"),
        (None, _) => bail!("pass a document path and a question, or --url and a question"),
    }
}

fn report(mut exploration: Exploration, output: &OutputArgs) -> anyhow::Result<()> {
    let svg = exploration.graph.take();

    match (&output.svg, &svg) {
        (Some(path), Some(svg)) => {
            std::fs::write(path, svg)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = svg.len(), "Graph written");
            eprintln!("Graph written to {}", path.display());
        }
        (Some(path), None) => {
            warn!(path = %path.display(), "Nothing extracted, graph not written");
            eprintln!("No relations found; no graph written");
        }
        _ => {}
    }

    if output.json {
        println!("{}", serde_json::to_string_pretty(&exploration)?);
        return Ok(());
    }

    println!("Source:           {}", exploration.source);
    println!("Words:            {}", exploration.word_count);
    println!("Entity pairs:     {}", exploration.pair_count);
    println!("Relations:        {}", exploration.triple_count);
    println!("Unique entities:  {}", exploration.unique_entities);

    if !exploration.top_relations.is_empty() {
        println!("\nTop relations:");
        for triple in &exploration.top_relations {
            println!("  {triple}");
        }
    }

    Ok(())
}
