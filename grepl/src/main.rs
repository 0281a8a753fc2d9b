//! # Grepl CLI Entry Point
//!
//! The main executable for the Grepl tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and merges them with the
//!    configuration file.
//! 2. **Schema**: Loads the descriptor set the requests are built from.
//! 3. **Execution**: Delegates the interactive call to a `grepl_core` [`Session`].
//! 4. **Presentation**: Prints the response to standard output, or a colored error to standard error.

mod cli;
mod config;
mod formatter;
mod terminal;

use clap::Parser;
use cli::{Cli, Commands, ListCommands};
use config::{AppConfig, ConfigManager};
use formatter::{FormattedString, MethodList, ServiceList};
use grepl_core::call::{Session, Target};
use grepl_core::grpc::client::GrpcTransport;
use grepl_core::registry::DescriptorRegistry;
use std::process;
use std::time::Duration;
use terminal::{LinePrompt, MenuChoice};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Cli::parse();

    let config = match ConfigManager::new(args.config).and_then(|manager| manager.load()) {
        Ok(config) => config,
        Err(err) => exit_with(FormattedString::from(err)),
    };

    let registry = match DescriptorRegistry::from_file(&args.file_descriptor_set) {
        Ok(registry) => registry,
        Err(err) => exit_with(FormattedString::from(err)),
    };

    match args.command {
        Commands::Call {
            endpoint,
            headers,
            timeout,
        } => {
            let target = Target::new(
                args.host.unwrap_or_else(|| config.host.clone()),
                args.port.unwrap_or(config.port),
            );
            let (service, method) = endpoint;
            run_call(registry, &config, target, service, method, headers, timeout).await;
        }
        Commands::List { sub } => match sub {
            ListCommands::Services => {
                println!("{}", FormattedString::from(ServiceList(registry.services())))
            }
            ListCommands::Methods { service } => match registry.methods(&service) {
                Ok(methods) => println!("{}", FormattedString::from(MethodList(methods))),
                Err(err) => exit_with(FormattedString::from(err)),
            },
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_call(
    mut registry: DescriptorRegistry,
    config: &AppConfig,
    target: Target,
    service: String,
    method: String,
    headers: Vec<(String, String)>,
    timeout: Option<u64>,
) {
    if let Err(err) = registry.select_service(&service) {
        exit_with(FormattedString::from(err));
    }

    // Headers given on the command line come after the configured ones.
    let headers = config
        .headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .chain(headers)
        .collect();

    let mut transport = GrpcTransport::new().with_headers(headers);
    if let Some(secs) = timeout.or(config.timeout_secs) {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    debug!(host = %target.host, port = target.port, %service, %method, "starting call");

    let session =
        Session::new(registry, transport, target).with_label_format(config.label_format());

    let prompt = match LinePrompt::new() {
        Ok(prompt) => prompt,
        Err(err) => exit_with(FormattedString::from(anyhow::anyhow!(
            "Failed to open the line editor: {err}"
        ))),
    };

    match session.invoke(&method, prompt, MenuChoice::default()).await {
        Ok(output) => print!("{output}"),
        Err(err) => exit_with(FormattedString::from(err)),
    }
}

fn exit_with(message: FormattedString) -> ! {
    eprintln!("{message}");
    process::exit(1);
}
