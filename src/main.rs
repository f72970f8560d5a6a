use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use github_mcp::client::OctocrabClient;
use github_mcp::dispatch::Dispatcher;
use github_mcp::server;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

/// MCP server for GitHub repository search, repository info, and issues
#[derive(Parser)]
#[command(name = "github-mcp", version, about)]
struct Cli {
    /// GitHub personal access token.
    /// Can also be set via GITHUB_TOKEN environment variable.
    #[arg(long)]
    token: Option<String>,

    /// Read GitHub token from an environment variable.
    /// Default: GITHUB_TOKEN
    #[arg(long = "token-env")]
    token_env: Option<String>,

    /// Upper bound on any tool's result limit (GitHub caps pages at 100)
    #[arg(long, default_value = "100")]
    max_results: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Resolve token: --token > --token-env > GITHUB_TOKEN
    let token = if let Some(t) = cli.token {
        Some(t)
    } else {
        let env_name = cli.token_env.as_deref().unwrap_or("GITHUB_TOKEN");
        match std::env::var(env_name) {
            Ok(t) if !t.is_empty() => {
                tracing::info!(env = env_name, "Read GitHub token from environment variable");
                Some(t)
            }
            _ => None,
        }
    };

    // A missing token is not fatal: GitHub reports it on the first call that needs one.
    let github = if let Some(ref t) = token {
        octocrab::OctocrabBuilder::new()
            .personal_token(t.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create GitHub client: {}", e))?
    } else {
        tracing::warn!("No GitHub token provided; API rate limits will be very restrictive and issue creation will fail");
        octocrab::Octocrab::default()
    };

    let dispatcher = Dispatcher::with_max_results(
        Arc::new(OctocrabClient::new(github)),
        cli.max_results,
    )
    .map_err(|e| anyhow::anyhow!("Failed to build dispatcher: {}", e))?;

    tracing::info!(
        authenticated = token.is_some(),
        max_results = cli.max_results,
        tools = dispatcher.tool_names().count(),
        prompts = dispatcher.prompt_names().count(),
        "Starting github-mcp server"
    );

    let service = server::GithubMcpServer::new(dispatcher);
    let running = service.serve(stdio()).await?;
    running.waiting().await?;

    Ok(())
}
