//! ipscope CLI
//!
//! Runs the geolocation proxy, or performs a single direct lookup.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ipscope_api::{ApiConfig, ApiServer};
use ipscope_core::types::{Provider, ResultRecord};
use ipscope_upstream::GeoClient;

/// ipscope - caching IP geolocation proxy
#[derive(Parser)]
#[command(name = "ipscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "3001")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Look up an address directly against a provider, bypassing cache and limits
    Lookup {
        /// Address to locate (omit for this machine's public address)
        address: Option<String>,
        /// Use the alternate provider (ipinfo)
        #[arg(long)]
        alt: bool,
        /// Print the raw JSON record
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "ipscope=debug,info"
    } else {
        "ipscope=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Lookup { address, alt, json } => {
            cmd_lookup(address.as_deref(), alt, json).await
        }
    }
}

/// Run the API server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    let mut config = ApiConfig::from_env();
    config.port = port;

    println!("{}", "🚀 Starting ipscope API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!(
        "   {} {} requests / {}s per client, cache TTL {}s",
        "Limits:".dimmed(),
        config.rate_limit.max_requests,
        config.rate_limit.window_seconds,
        config.cache.ttl_seconds
    );
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config).context("Failed to initialize server")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;
    server.run(addr).await?;

    Ok(())
}

/// Single lookup against a provider
async fn cmd_lookup(address: Option<&str>, alt: bool, json: bool) -> Result<()> {
    let provider = if alt { Provider::ALTERNATE } else { Provider::PRIMARY };
    let config = ApiConfig::from_env();
    let client = GeoClient::with_config(config.upstream).context("Failed to build client")?;

    let target = address.unwrap_or("this machine");
    if !json {
        println!(
            "{} {} via {}",
            "🔎 Locating".cyan().bold(),
            target,
            provider.to_string().yellow()
        );
    }

    let record = match client.lookup(address, provider).await {
        Ok(record) => record,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }

    Ok(())
}

fn print_record(record: &ResultRecord) {
    let rows = [
        ("IP", record.ip.clone()),
        ("Hostname", record.hostname.clone()),
        ("City", record.city.clone()),
        ("Region", record.region.clone()),
        ("Postal", record.postal.clone()),
        (
            "Country",
            record.country_name.clone().or_else(|| record.country.clone()),
        ),
        ("Timezone", record.timezone.clone()),
        ("Organization", record.org.clone()),
        ("ASN", record.asn.clone()),
        ("Currency", record.currency.clone()),
    ];

    println!();
    for (label, value) in rows {
        if let Some(value) = value {
            println!("   {:<14} {}", format!("{}:", label).green(), value);
        }
    }
    if let Some((lat, lon)) = record.coordinates() {
        println!("   {:<14} {:.4}, {:.4}", "Location:".green(), lat, lon);
    }
    if !record.extra.is_empty() {
        println!("   {} {} more field(s), use --json", "+".dimmed(), record.extra.len());
    }
}
