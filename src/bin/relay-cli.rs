use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::ORIGIN;
use serde_json::{json, Value};

use contact_relay::config::load_origins;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Management CLI for the contact relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an origins file and list its origins
    Check {
        /// Path to the origins file
        path: PathBuf,
    },
    /// Post a test submission to a running relay
    Submit {
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,

        /// Origin header to send
        #[arg(short, long)]
        origin: String,

        #[arg(long, default_value = "test@example.com")]
        email: String,

        #[arg(long, default_value = "relay-cli")]
        name: String,

        #[arg(long, default_value = "Test message from relay-cli")]
        message: String,

        #[arg(long)]
        phone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { path } => {
            let store = load_origins(&path)?;
            println!("{} origin(s) configured:", store.len());
            let mut origins: Vec<_> = store.origins().collect();
            origins.sort_by_key(|(origin, _)| *origin);
            for (origin, cfg) in origins {
                println!(
                    "  {origin} -> {} via {}:{} ({})",
                    cfg.to_email,
                    cfg.smtp.host,
                    cfg.smtp.port,
                    if cfg.smtp.secure { "tls" } else { "starttls" }
                );
            }
        }
        Commands::Submit {
            url,
            origin,
            email,
            name,
            message,
            phone,
        } => {
            let mut body = json!({ "email": email, "name": name, "message": message });
            if let Some(phone) = phone {
                body["phone"] = Value::String(phone);
            }

            let res = reqwest::Client::new()
                .post(format!("{}/api/send", url.trim_end_matches('/')))
                .header(ORIGIN, origin)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Received status {}", status);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
