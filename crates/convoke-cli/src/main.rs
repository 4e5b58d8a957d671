//! Interactive chat REPL for convoke sessions.
//!
//! Connects a [`Session`] to an OpenAI-compatible endpoint, registers
//! the bundled tools, and reads user turns from the terminal until
//! `exit` or end of input.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use convoke::{
    ChatOptions, CurrentTimeTool, DeliveryDateTool, OpenAIClient, Session, ToolRegistry,
};

mod repl;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL for the API endpoint
    #[arg(long, default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// API key for authentication (or set OPENAI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Model to use for chat completion
    #[arg(long, default_value = "gpt-4o")]
    model: String,

    /// System prompt seeding the conversation
    #[arg(
        long,
        default_value = "You are a helpful customer support assistant."
    )]
    system: String,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Print each tool call and its result as it executes
    #[arg(long)]
    show_tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let api_key = args
        .api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .context("API key must be provided via --api-key or OPENAI_API_KEY env var")?;

    let mut options = ChatOptions::new(&args.model)
        .with_base_url(&args.base_url)
        .with_api_key(api_key);
    if let Some(temperature) = args.temperature {
        options = options.with_temperature(temperature);
    }

    let client = OpenAIClient::new(options)?;

    let registry = ToolRegistry::new();
    registry.register(DeliveryDateTool)?;
    registry.register(CurrentTimeTool)?;

    let mut session = Session::new(client, registry).with_system_prompt(&args.system);
    if args.show_tools {
        session = session.with_tool_trace(Arc::new(|name, tool_args, result| {
            eprintln!(
                "{} {name}({tool_args}) => {result}",
                "tool:".bright_yellow()
            );
        }));
    }

    repl::run(session, &args.model).await
}
