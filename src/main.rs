//! PR Agent - CLI Entry Point
//!
//! Answers a single question given on the command line, or starts an
//! interactive session when no question is given.

use std::io::{self, Write};

use clap::Parser;
use colored::Colorize;
use pr_agent::agent::{Agent, AgentResult, Conversation};
use pr_agent::config::{self, Config};
use pr_agent::github::RepoRef;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pr-agent")]
#[command(about = "Ask questions about GitHub pull requests")]
#[command(version)]
struct Cli {
    /// Question to answer. Starts an interactive session when omitted.
    query: Vec<String>,

    /// Claude model to use (overrides CLAUDE_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Maximum LLM calls per question (overrides MAX_TOOL_ITERATIONS)
    #[arg(long, value_parser = config::parse_max_iterations)]
    max_iterations: Option<usize>,

    /// Default repository in owner/repo format (overrides DEFAULT_REPO)
    #[arg(long, value_parser = parse_repo)]
    repo: Option<String>,
}

fn parse_repo(value: &str) -> Result<String, String> {
    RepoRef::parse(value)
        .map(|repo| repo.to_string())
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so answers on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pr_agent=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Configuration error: {}", e).red());
            eprintln!(
                "{}",
                "Set ANTHROPIC_API_KEY and GITHUB_TOKEN in the environment or in a .env file."
                    .dimmed()
            );
            std::process::exit(1);
        }
    };

    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(repo) = cli.repo {
        config.default_repo = Some(repo);
    }

    tracing::info!(
        "Loaded configuration: model={}, max_iterations={}",
        config.model,
        config.max_iterations
    );

    let agent = Agent::new(&config)?;

    if cli.query.is_empty() {
        run_interactive(&agent).await
    } else {
        let question = cli.query.join(" ");
        let result = agent.run(&question).await?;
        print_result(&result);
        Ok(())
    }
}

async fn run_interactive(agent: &Agent) -> anyhow::Result<()> {
    println!("{}", "PR Agent".cyan().bold());
    println!(
        "{}",
        format!("Model: {} | max iterations: {}", agent.model(), agent.max_iterations()).dimmed()
    );
    println!(
        "{}",
        "Type 'quit' to leave, 'clear' to start a new conversation".dimmed()
    );
    println!();

    let mut conversation = Conversation::new();

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            println!();
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if ["quit", "exit", "q"]
            .iter()
            .any(|cmd| input.eq_ignore_ascii_case(cmd))
        {
            println!("{}", "Goodbye!".cyan());
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            conversation.clear();
            println!("{}", "Conversation cleared.".dimmed());
            continue;
        }

        match agent.run_in(&mut conversation, input).await {
            Ok(result) => {
                println!();
                print_result(&result);
            }
            Err(e) => {
                tracing::debug!("Question failed: {:?}", e);
                println!("{}", format!("Error: {}", e).red());
            }
        }

        println!();
    }

    Ok(())
}

fn print_result(result: &AgentResult) {
    if !result.tool_calls.is_empty() {
        let names = result
            .tool_calls
            .iter()
            .map(|call| call.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}", format!("Tools used: {}", names).dimmed());
    }
    if result.hit_iteration_limit {
        println!("{}", "(stopped at the iteration limit)".yellow());
    }
    println!("{}", result.response);
}
