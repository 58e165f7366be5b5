use clap::Parser;
use log::debug;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

use chop::{ApiResponse, ChopError, Repurposer};

/// Turn long-form content into platform-native social posts
#[derive(Parser, Debug)]
#[command(name = "chop", version, about)]
struct Cli {
    /// Source text; read from stdin when omitted
    text: Option<String>,

    /// Comma-separated target platforms
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "twitter,linkedin,reddit,youtube,telegram"
    )]
    platforms: Vec<String>,

    /// Attach a file whose text is appended to the source (repeatable)
    #[arg(short, long = "file")]
    files: Vec<PathBuf>,

    /// Groq model to try before the built-in candidates
    #[arg(short, long)]
    model: Option<String>,

    /// Use templates only, never call a provider
    #[arg(long)]
    offline: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

async fn read_stdin() -> Result<String, ChopError> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    Ok(input)
}

async fn run(cli: Cli) -> Result<chop::GenerateResponse, ChopError> {
    let text = match cli.text {
        Some(text) => text,
        None => read_stdin().await?,
    };
    debug!("Read {} characters of source text", text.chars().count());

    let mut builder = Repurposer::builder()
        .text(text)
        .platforms(cli.platforms);
    for file in cli.files {
        builder = builder.file(file);
    }
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if cli.offline {
        builder = builder.offline();
    }

    builder.build().await
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let pretty = cli.pretty;

    let response = match run(cli).await {
        Ok(response) => ApiResponse::success(response),
        Err(e) => ApiResponse::from_error(&e),
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to render response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
