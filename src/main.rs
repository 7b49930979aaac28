use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::{LevelFilter, info};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use egov_laws_mcp::api::HttpLawApi;
use egov_laws_mcp::protocol::{McpHandler, McpServer, ServerInfo};
use egov_laws_mcp::tools::{ArgumentBag, Dispatcher, ToolCatalog, ToolDefinition};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging() -> Result<()> {
    // Stdout carries protocol frames, so logs go to a file
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("egov-laws-mcp")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("egov-laws-mcp.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Let everything through the builder; the global max level does the gating
    // so the configured level can be applied once the config is loaded
    let env = env_logger::Env::default().default_filter_or("trace");
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Parse a configured level name, falling back to info
fn parse_log_level(level: Option<&str>) -> LevelFilter {
    match level {
        None => LevelFilter::Info,
        Some(name) => name.trim().parse().unwrap_or_else(|_| {
            log::warn!("Unknown log_level '{}', using info", name);
            LevelFilter::Info
        }),
    }
}

/// Apply the config's log level unless RUST_LOG is set
fn apply_log_level(level: Option<&str>) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    log::set_max_level(parse_log_level(level));
}

fn build_dispatcher(config: &Config) -> Result<Arc<Dispatcher>> {
    let api = HttpLawApi::new(&config.api.base_url, config.api.timeout(), &config.api.user_agent)
        .context("Failed to create law API client")?;
    info!("Law API base URL: {}", api.base_url());
    Ok(Arc::new(Dispatcher::new(Arc::new(api), config.api.timeout())))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
    }

    match cli.command.clone().unwrap_or(Commands::Serve) {
        Commands::Serve => handle_serve_command(config).await,
        Commands::Tools { json } => handle_tools_command(json),
        Commands::Call { tool, args } => handle_call_command(&tool, args.as_deref(), config).await,
    }
}

async fn handle_serve_command(config: &Config) -> Result<()> {
    let dispatcher = build_dispatcher(config)?;

    let mut handler = McpHandler::new(dispatcher, ServerInfo::new(&config.server.name));
    if let Some(instructions) = &config.server.instructions {
        handler = handler.with_instructions(instructions);
    }

    info!("Serving MCP on stdio as {}", config.server.name);
    McpServer::new(handler)
        .serve_stdio()
        .await
        .context("Server loop failed")?;

    info!("Client disconnected, shutting down");
    Ok(())
}

fn handle_tools_command(json: bool) -> Result<()> {
    let catalog = ToolCatalog::standard();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools_listing(&catalog))?);
        return Ok(());
    }

    for tool in catalog.list() {
        print_tool(tool);
    }
    Ok(())
}

/// The catalog in `tools/list` shape
fn tools_listing(catalog: &ToolCatalog) -> serde_json::Value {
    serde_json::json!({ "tools": catalog.list() })
}

fn print_tool(tool: &ToolDefinition) {
    let summary = tool.description.lines().next().unwrap_or_default();
    println!("{} {}", tool.name.cyan().bold(), summary);

    let contract = &tool.input_contract;
    for name in contract.property_names() {
        let marker = if contract.required().iter().any(|r| r == name) {
            "*".red().to_string()
        } else {
            " ".to_string()
        };
        println!("  {}{}", marker, name.green());
    }
}

async fn handle_call_command(tool: &str, args: Option<&str>, config: &Config) -> Result<()> {
    let args: ArgumentBag = match args {
        Some(text) => match serde_json::from_str(text).context("--args must be a JSON object")? {
            serde_json::Value::Object(map) => map,
            other => return Err(eyre!("--args must be a JSON object, got {}", other)),
        },
        None => ArgumentBag::new(),
    };

    let dispatcher = build_dispatcher(config)?;
    info!("Calling {} from the command line", tool);
    let result = dispatcher.dispatch(tool, &args).await;

    println!("{}", result.to_text());
    if result.is_failure() {
        eprintln!("{} {}", "Call failed:".red(), tool);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging first so config warnings are kept
    setup_logging().context("Failed to setup logging")?;

    // Load configuration, then let flags win
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.apply_cli(cli.base_url.as_deref(), cli.timeout_ms);
    config.validate().context("Invalid configuration")?;
    apply_log_level(config.log_level.as_deref());

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
