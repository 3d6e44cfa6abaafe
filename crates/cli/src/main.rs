//! inkpipe CLI
//!
//! Main entry point for the inkpipe command-line tool.
//! Turns a topic into a published article through staged generation.

mod commands;

use clap::{Parser, Subcommand};
use commands::{GenerateCommand, PublishCommand, StylesCommand, WriteCommand};
use inkpipe_core::config::{AppConfig, Overrides};
use inkpipe_core::logging;
use std::path::PathBuf;

/// inkpipe - staged article generation and publishing
#[derive(Parser, Debug)]
#[command(name = "inkpipe")]
#[command(about = "Generate articles in stages and publish them", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "INKPIPE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "INKPIPE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generation provider (gemini, deepseek)
    #[arg(short, long, global = true, env = "INKPIPE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "INKPIPE_MODEL")]
    model: Option<String>,

    /// Template style (a file name under the prompts directory)
    #[arg(short, long, global = true, env = "INKPIPE_STYLE")]
    style: Option<String>,

    /// Seconds to wait between generation calls
    #[arg(long, global = true, env = "INKPIPE_RATE_LIMIT_DELAY")]
    delay: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive run: propose titles, write, then deploy
    Generate(GenerateCommand),

    /// Write an article for a given title and publish it to Pages
    Write(WriteCommand),

    /// Publish an existing markdown file to Pages
    Publish(PublishCommand),

    /// List available template styles
    Styles(StylesCommand),
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            workspace: self.workspace.clone(),
            config_file: self.config.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            style: self.style.clone(),
            rate_limit_delay: self.delay,
            log_level: self.log_level.clone(),
            verbose: self.verbose,
            no_color: self.no_color,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // File, then environment, then flags
    let config = AppConfig::load_with(&cli.overrides())?;

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("inkpipe starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model());
    tracing::debug!("Style: {}", config.style);

    let command_name = match &cli.command {
        Commands::Generate(_) => "generate",
        Commands::Write(_) => "write",
        Commands::Publish(_) => "publish",
        Commands::Styles(_) => "styles",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Generate(cmd) => cmd.execute(&config).await,
        Commands::Write(cmd) => cmd.execute(&config).await,
        Commands::Publish(cmd) => cmd.execute(&config),
        Commands::Styles(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
