use ballot_api::{sha256_hex, AdminCredentials, ApiState};
use ballot_core::Ledger;
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LISTEN: &str = "127.0.0.1:5001";

#[derive(Parser)]
#[command(name = "ballotd")]
#[command(about = "Ballot chain voting service")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address override
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[derive(Debug, Deserialize, Default)]
struct Config {
    listen: Option<SocketAddr>,
    #[serde(default)]
    admin: AdminConfig,
    #[serde(default)]
    auth: AuthConfig,
    #[serde(default, rename = "candidate")]
    candidates: Vec<CandidateConfig>,
}

#[derive(Debug, Deserialize)]
struct AdminConfig {
    id: String,
    password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            id: "admin".to_string(),
            password: "admin_password".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct AuthConfig {
    /// Fixed JWT signing secret. When absent a random per-process secret
    /// is generated and issued tokens do not survive a restart.
    secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateConfig {
    id: String,
    name: String,
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

fn random_secret() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to read config {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let listen = cli
        .listen
        .or(config.listen)
        .unwrap_or_else(|| DEFAULT_LISTEN.parse().expect("default listen address parses"));

    let secret = config.auth.secret.clone().unwrap_or_else(|| {
        tracing::warn!("no auth secret configured; issued tokens will not survive a restart");
        random_secret()
    });

    let admin = AdminCredentials {
        admin_id: config.admin.id.clone(),
        password_hash: sha256_hex(&config.admin.password),
    };

    let candidates: HashMap<String, String> = config
        .candidates
        .iter()
        .map(|c| (c.id.clone(), c.name.clone()))
        .collect();

    println!("{}", "ballot-chain node".cyan().bold());
    println!("  listening on {}", listen.to_string().green());
    println!("  candidates configured: {}", candidates.len());

    // The ledger is built here, at service start, and handed to the API
    // layer by ownership. It lives exactly as long as the process.
    let state = ApiState::new(Ledger::new(), admin, secret, candidates);

    if let Err(e) = ballot_api::start_server(listen, state).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
