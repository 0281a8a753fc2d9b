//! # CLI
//!
//! This module defines the command-line interface of `grepl` using `clap`.
//!
//! It is responsible for parsing user input and performing validation (e.g., ensuring headers are `key:value`);
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grepl", version, about = "Interactive gRPC client")]
pub struct Cli {
    /// Host of the gRPC server (overrides the configuration file)
    #[arg(long)]
    pub host: Option<String>,

    /// Port of the gRPC server (overrides the configuration file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to the configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the descriptor set (.bin) describing the server's services
    #[arg(long)]
    pub file_descriptor_set: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a request interactively and send it to the server
    ///
    /// Every field of the method's input message is asked on the terminal. Oneof groups and
    /// enumerations are answered by picking one of the options. Press Ctrl-D to abort.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// grepl --file-descriptor-set api.bin call my.pkg.Service/Method -H authorization:token
    /// ```
    Call {
        /// Endpoint (package.Service/Method)
        #[arg(value_parser = parse_endpoint)]
        endpoint: (String, String),

        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List available services or methods
    List {
        #[command(subcommand)]
        sub: ListCommands,
    },
}

#[derive(Subcommand)]
pub enum ListCommands {
    /// List all services of the descriptor set
    Services,
    /// List the methods of a service
    Methods {
        /// Fully qualified service name (e.g. my.package.Service)
        service: String,
    },
}

fn parse_endpoint(value: &str) -> Result<(String, String), String> {
    let (service, method) = value.split_once('/').ok_or_else(|| {
        format!("Invalid endpoint format: '{value}'. Expected 'package.Service/Method'",)
    })?;

    if service.trim().is_empty() || method.trim().is_empty() {
        return Err("Service and Method names cannot be empty".to_string());
    }

    Ok((service.to_string(), method.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| "Format must be 'key:value'".to_string())
}
