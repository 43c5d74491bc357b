//! AlephX endpoint registry CLI
//!
//! Inspect the REST route table and preview signed requests.

use alephx_api::exchange::{self, Capability, Support};
use alephx_api::{endpoints, Config, Endpoint, HttpMethod, Params, PreparedRequest, RateLimiter, Signer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "alephx-endpoints")]
#[command(about = "Inspect AlephX REST endpoints and preview signed requests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every endpoint with both aliases
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one endpoint by snake_case or camelCase name
    Show {
        name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prepare (but do not send) a request, signing it with credentials from the environment
    Prepare {
        name: String,

        /// Request parameter as key=value, repeatable
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Unix timestamp in seconds to sign with (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Show the unified capability table
    Capabilities,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging, RUST_LOG takes precedence over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::List { json } => list_endpoints(json)?,
        Commands::Show { name, json } => show_endpoint(&name, json)?,
        Commands::Prepare { name, params, timestamp } => prepare_request(&name, params, timestamp).await?,
        Commands::Capabilities => show_capabilities(),
    }

    Ok(())
}

fn endpoint_json(endpoint: &Endpoint) -> Value {
    json!({
        "snake_name": endpoint.snake_name(),
        "camel_name": endpoint.camel_name(),
        "path": endpoint.path,
        "tags": endpoint.tags(),
        "method": endpoint.method,
        "config": endpoint.config,
    })
}

fn colored_method(method: HttpMethod) -> String {
    let text = format!("{:<6}", method.as_str());
    match method {
        HttpMethod::Get => text.green().to_string(),
        HttpMethod::Post => text.yellow().to_string(),
        HttpMethod::Patch | HttpMethod::Put => text.blue().to_string(),
        HttpMethod::Delete => text.red().to_string(),
        _ => text,
    }
}

fn list_endpoints(as_json: bool) -> Result<()> {
    if as_json {
        let all: Vec<Value> = endpoints::all().map(endpoint_json).collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(90));
    println!(
        "  {} REST API {} | {} endpoints",
        exchange::EXCHANGE_NAME,
        exchange::API_VERSION,
        endpoints::ENDPOINTS.len()
    );
    println!("{}\n", "=".repeat(90));

    for endpoint in endpoints::all() {
        println!(
            "{} {:<22} {:<16} cost={:<4} {} / {}",
            colored_method(endpoint.method),
            endpoint.path,
            endpoint.tags().join(","),
            endpoint.config.cost,
            endpoint.snake_name(),
            endpoint.camel_name().dimmed()
        );
    }
    Ok(())
}

fn show_endpoint(name: &str, as_json: bool) -> Result<()> {
    let endpoint = endpoints::lookup(name)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&endpoint_json(endpoint))?);
        return Ok(());
    }

    println!("{}", endpoint.camel_name().bold());
    println!("  snake_case : {}", endpoint.snake_name());
    println!("  path       : {}", endpoint.path);
    println!("  tags       : {}", endpoint.tags().join(", "));
    println!("  method     : {}", colored_method(endpoint.method));
    println!("  cost       : {}", endpoint.config.cost);
    Ok(())
}

async fn prepare_request(name: &str, pairs: Vec<(String, String)>, timestamp: Option<i64>) -> Result<()> {
    let endpoint = endpoints::lookup(name)?;
    let config = Config::from_env().context("Failed to load configuration")?;
    let signer = Signer::from_config(&config);

    let params: Params = pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect();

    let limiter = RateLimiter::new(config.rate_limit_ms);
    if limiter.acquire_endpoint(endpoint).await {
        info!("Rate limited before preparing {}", endpoint.camel_name());
    }

    let prepared = match timestamp {
        Some(ts) => signer.prepare_at(endpoint, &params, ts)?,
        None => signer.prepare(endpoint, &params)?,
    };
    info!("Prepared {} against {}", endpoint.camel_name(), signer.rest_url());
    print_prepared(&prepared);
    Ok(())
}

fn print_prepared(prepared: &PreparedRequest) {
    println!("{} {}", colored_method(prepared.method), prepared.url);
    for (name, value) in &prepared.headers {
        println!("  {}: {}", name.cyan(), value);
    }
    if let Some(body) = &prepared.body {
        println!("\n{}", body);
    }
}

fn show_capabilities() {
    for capability in Capability::ALL {
        let support = match capability.support() {
            Support::Yes => "yes".green(),
            Support::Emulated => "emulated".yellow(),
            Support::No => "no".dimmed(),
        };
        let via = capability
            .endpoint()
            .map(|id| id.camel_name().to_string())
            .unwrap_or_default();
        println!("{:<18} {:<10} {}", capability.name(), support, via);
    }
}
