use std::io::{stdin, stdout, Write};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use sql_chatbox::logging::init_tracing;
use sql_chatbox::{Chatbox, ChatboxConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Generate SQL for a natural-language question.
    Query,
    /// Explain what a SQL statement does.
    Explain,
    /// Explain how PostgreSQL would execute a SQL statement.
    Plan,
}

#[derive(Debug, Parser)]
#[command(name = "sql-chatbox", about = "Ask a local LLM about your PostgreSQL database")]
struct Cli {
    #[arg(value_enum)]
    mode: Mode,

    /// Question or SQL text. Read from stdin when omitted.
    text: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ChatboxConfig::from_env()?;
    let processor = Chatbox::from_config(&config)?;

    let input = match cli.text {
        Some(text) => text,
        None => read_input()?,
    };
    let input = input.trim();
    if input.is_empty() {
        bail!("nothing to ask");
    }

    let result = match cli.mode {
        Mode::Query => processor.generate_sql(input).await,
        Mode::Explain => processor.explain_query(input).await,
        Mode::Plan => processor.explain_plan(input).await,
    }
    .context("request failed")?;

    println!("{}", result);
    Ok(())
}

fn read_input() -> anyhow::Result<String> {
    let mut input = String::new();

    print!("How can I help you?: ");
    stdout().flush()?;

    stdin()
        .read_line(&mut input)
        .context("Failed to read line")?;
    Ok(input)
}
