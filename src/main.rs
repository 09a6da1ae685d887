//! `conhub` command-line client.
//!
//! Thin wrapper over [`conhub_client::ServiceRegistry`] for poking at a
//! running ConHub deployment. Every command prints the JSON it received.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use conhub_client::config::{self, ClientConfig};
use conhub_client::services::types::DocumentQuery;
use conhub_client::{ApiError, Service, ServiceRegistry};

#[derive(Parser)]
#[command(name = "conhub")]
#[command(about = "Command-line client for the ConHub services", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "CONHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Bearer token sent to every service
    #[arg(short, long, env = "CONHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check /health on every service
    Health,
    /// List documents
    Documents {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// List registered agents
    Agents,
    /// List connected data sources
    DataSources,
    /// Platform connections merged from auth and security
    Connections,
    /// GET an arbitrary path
    Get {
        path: String,
        #[arg(short, long, default_value = "backend")]
        service: Service,
    },
    /// Run a GraphQL query against the backend
    Graphql {
        query: String,
        /// Variables as a JSON object
        #[arg(short, long, default_value = "{}")]
        variables: String,
    },
    /// Validate and print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    conhub_client::observability::logging::init(&config.observability);

    let registry = ServiceRegistry::from_config(&config)?;
    let registry = match cli.token.as_deref() {
        Some(token) => registry.with_bearer_token(token)?,
        None => registry,
    };

    tracing::debug!(trace_id = %registry.backend().trace().trace_id(), "Client ready");

    match cli.command {
        Commands::Health => {
            let mut healthy = true;
            for (service, result) in registry.health_all().await {
                match result {
                    Ok(status) => println!("{:<10} {}", service, status.status),
                    Err(err) => {
                        healthy = false;
                        println!("{:<10} DOWN ({})", service, err);
                    }
                }
            }
            if !healthy {
                std::process::exit(1);
            }
        }
        Commands::Documents {
            search,
            source,
            limit,
        } => {
            let query = DocumentQuery {
                search,
                source,
                limit,
                offset: None,
            };
            print_result(registry.backend().list_documents(&query).await)?;
        }
        Commands::Agents => print_result(registry.backend().list_agents().await)?,
        Commands::DataSources => print_result(registry.data().list_data_sources().await)?,
        Commands::Connections => print_result(registry.list_connections().await)?,
        Commands::Get { path, service } => {
            print_result(registry.client(service).get(path).send_value().await)?
        }
        Commands::Graphql { query, variables } => {
            let variables: Value = serde_json::from_str(&variables)?;
            print_result(registry.backend().graphql::<Value>(&query, variables).await)?;
        }
        Commands::Config => print_config(&config)?,
    }

    Ok(())
}

fn print_result<T: Serialize>(result: Result<T, ApiError>) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            match err.status() {
                Some(status) => eprintln!("Error: service returned status {}", status),
                None => eprintln!("Error: request failed"),
            }
            if let ApiError::Http { body, .. } = &err {
                if !body.is_null() {
                    eprintln!("{}", serde_json::to_string_pretty(body)?);
                }
            }
            Err(err.into())
        }
    }
}

fn print_config(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", toml::to_string_pretty(config)?);
    for route in config.effective_routes() {
        println!("# {} → {}", route.path_prefix, route.service);
    }
    Ok(())
}
