use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use payments_agent_tools::adapters::{chat, function_calling, mcp};
use payments_agent_tools::server;
use payments_agent_tools::tools::Toolkit;
use payments_agent_tools::utils::config_loader;
use payments_agent_tools::utils::logging;
use payments_agent_tools::utils::logging::LogLevel;
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "payments-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the tools over HTTP (default)
    Serve,
    /// Print the enabled tool descriptors
    ListTools {
        #[arg(long, value_enum, default_value_t = ToolFormat::Mcp)]
        format: ToolFormat,
    },
    /// Run one tool and print its result envelope
    Invoke {
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ToolFormat {
    Mcp,
    Functions,
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args, load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;

    // -------------------------------
    // 2. Build API client and tool registry
    // -------------------------------

    let toolkit = Toolkit::from_config(&service_config).context("failed to build toolkit")?;
    info!(
        "{} tools enabled for {} environment",
        toolkit.list_tool_descriptors().len(),
        service_config.settings.environment.as_str()
    );

    // -------------------------------
    // 3. Dispatch command
    // -------------------------------

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Service starting...");
            tokio::select! {
                served = server::server::start(&service_config.settings, toolkit) => served?,
                _ = tokio::signal::ctrl_c() => info!("shutdown signal received"),
            }
        }
        Command::ListTools { format } => {
            let listing = match format {
                ToolFormat::Mcp => mcp::list_tools(&toolkit),
                ToolFormat::Functions => Value::Array(function_calling::definitions(&toolkit)),
                ToolFormat::Chat => serde_json::to_value(chat::tools(&toolkit))?,
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Invoke { name, args } => {
            let envelope = function_calling::call(&toolkit, &name, &args).await;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
    }

    Ok(())
}
