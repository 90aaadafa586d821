use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

mod cli;

use cli::{Cli, Commands};
use coursemate::QueryAnswer;
use coursemate::QueryCoordinator;
use coursemate::config::Config;
use coursemate::llm::AnthropicClient;
use coursemate::orchestrator::Orchestrator;
use coursemate::search::{InMemoryBackend, SearchBackend};
use coursemate::session::JsonlSessionStore;
use coursemate::tools::ToolRegistry;

type Coordinator = QueryCoordinator<AnthropicClient, JsonlSessionStore>;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coursemate")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("coursemate.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Pipe(target));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Coordinator plus a handle on its client for usage reporting
fn build_coordinator(config: &Config, registry: Arc<ToolRegistry>) -> Result<(Coordinator, Arc<AnthropicClient>)> {
    let llm = Arc::new(
        AnthropicClient::from_env(&config.llm.api_key_env, (&config.llm).into())
            .context("Failed to create LLM client")?,
    );
    let orchestrator = Orchestrator::with_config(llm.clone(), (&config.llm).into());
    let sessions = JsonlSessionStore::open(&config.session.store_dir, config.session.max_history)
        .context("Failed to open session store")?;

    Ok((QueryCoordinator::new(orchestrator, registry, Arc::new(sessions)), llm))
}

fn report_usage(llm: &AnthropicClient, verbose: bool) {
    let usage = llm.total_usage();
    info!(
        "token usage: {} in, {} out, {} total",
        usage.input_tokens,
        usage.output_tokens,
        usage.total()
    );
    if verbose {
        eprintln!(
            "{} {} in / {} out",
            "Tokens:".dimmed(),
            usage.input_tokens,
            usage.output_tokens
        );
    }
}

fn print_answer(result: &QueryAnswer) {
    println!("{}", result.answer);
    if result.sources.is_empty() {
        return;
    }

    println!();
    println!("{}", "Sources:".cyan());
    for (i, source) in result.sources.iter().enumerate() {
        let label = match source.lesson_number {
            Some(n) => format!("{} - Lesson {}", source.title, n),
            None => source.title.clone(),
        };
        match &source.url {
            Some(url) => println!("  {}. {} ({})", i + 1, label, url.dimmed()),
            None => println!("  {}. {}", i + 1, label),
        }
    }
}

async fn handle_ask(coordinator: &Coordinator, question: &str, session: Option<String>, new_session: bool) -> Result<()> {
    let session_id = if new_session {
        let id = coordinator.create_session()?;
        println!("{} {}", "Session:".green(), id);
        Some(id)
    } else {
        session
    };

    let result = coordinator
        .query(question, session_id.as_deref())
        .await
        .context("Query failed")?;
    print_answer(&result);
    Ok(())
}

async fn handle_chat(coordinator: &Coordinator) -> Result<()> {
    let session_id = coordinator.create_session()?;
    println!("{} {}", "Session:".green(), session_id);
    println!("{}", "Type a question, or 'exit' to quit.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".cyan());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        // A failed query is reported and the session carries on
        match coordinator.query(question, Some(&session_id)).await {
            Ok(result) => print_answer(&result),
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
        println!();
    }
    Ok(())
}

fn handle_tools(registry: &ToolRegistry) -> Result<()> {
    let descriptors: Vec<_> = registry
        .descriptors()
        .iter()
        .map(|d| d.to_anthropic_schema())
        .collect();
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}

async fn handle_courses(backend: &dyn SearchBackend) -> Result<()> {
    let titles = backend.course_titles().await;
    println!("{} {}", "Courses:".green(), titles.len());
    for title in titles {
        println!("  {}", title);
    }
    Ok(())
}

async fn run_application(cli: Cli, config: Config) -> Result<()> {
    info!("Starting application");

    let backend: Arc<dyn SearchBackend> = Arc::new(
        InMemoryBackend::from_file(&config.search.catalog_path, config.search.max_results)
            .context("Failed to load course catalog")?,
    );
    let registry = Arc::new(ToolRegistry::for_courses(backend.clone()));
    let verbose = cli.is_verbose();

    match cli.command {
        Commands::Tools => handle_tools(&registry),
        Commands::Courses => handle_courses(backend.as_ref()).await,
        Commands::Ask {
            question,
            session,
            new_session,
        } => {
            let (coordinator, llm) = build_coordinator(&config, registry)?;
            let outcome = handle_ask(&coordinator, &question, session, new_session).await;
            report_usage(&llm, verbose);
            outcome
        }
        Commands::Chat => {
            let (coordinator, llm) = build_coordinator(&config, registry)?;
            let outcome = handle_chat(&coordinator).await;
            report_usage(&llm, verbose);
            outcome
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.is_verbose()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(cli, config).await.context("Application failed")?;

    Ok(())
}
