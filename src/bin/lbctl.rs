use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "lbctl")]
#[command(about = "Query a running mesh-balancer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "https://localhost:443")]
    url: String,

    /// Skip certificate verification (self-signed listener certs)
    #[arg(short = 'k', long)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every backend and the rotation cursor
    Status,
    /// Check whether any backend is available
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(cli.insecure)
        .build()?;
    let base = cli.url.trim_end_matches('/');

    let ok = match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/status", base)).send().await?;
            print_json(res).await?
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_text(res).await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// `/status` answers with the same JSON body on 200 and 503.
async fn print_json(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() && status != reqwest::StatusCode::SERVICE_UNAVAILABLE {
        eprintln!("Error: balancer returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(false);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(status.is_success())
}

async fn print_text(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if status.is_success() {
        println!("{}", text);
    } else {
        eprintln!("{} ({})", text, status);
    }
    Ok(status.is_success())
}
