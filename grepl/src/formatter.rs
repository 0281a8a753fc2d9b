use colored::*;
use grepl_core::{
    call::CallError, grpc::client::TransportError, prost_reflect::MethodDescriptor,
    registry::SchemaError,
};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct ServiceList(pub Vec<String>);

pub struct MethodList(pub Vec<MethodDescriptor>);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<CallError> for FormattedString {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Schema(err) => FormattedString::from(err),
            CallError::Transport(TransportError::Status(status)) => FormattedString(format!(
                "{} code={:?} message={:?}",
                "gRPC Failed:".red().bold(),
                status.code(),
                status.message()
            )),
            CallError::Transport(err) => {
                FormattedString(format!("{}\n\n'{}'", "Connection Error:".red().bold(), err))
            }
            err => FormattedString(format!("{}\n\n'{}'", "Call Failed:".red().bold(), err)),
        }
    }
}

impl From<SchemaError> for FormattedString {
    fn from(err: SchemaError) -> Self {
        let title = match err {
            SchemaError::Io(_) | SchemaError::Decode(_) => "Failed to load file descriptor:",
            _ => "Symbol Lookup Failed:",
        };
        FormattedString(format!("{}\n\n'{}'", title.red().bold(), err))
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!("{}\n\n'{:#}'", "Error:".red().bold(), err))
    }
}

impl From<ServiceList> for FormattedString {
    fn from(ServiceList(services): ServiceList) -> Self {
        if services.is_empty() {
            return FormattedString("No services found.".yellow().to_string());
        }

        let mut out = String::new();
        out.push_str("Available Services:\n");
        for svc in services {
            out.push_str(&format!("  - {}\n", svc.green()));
        }
        FormattedString(out.trim_end().to_string())
    }
}

impl From<MethodList> for FormattedString {
    fn from(MethodList(methods): MethodList) -> Self {
        if methods.is_empty() {
            return FormattedString("No methods found.".yellow().to_string());
        }

        let mut out = String::new();
        out.push_str("Available Methods:\n");
        for method in methods {
            let streaming = if method.is_client_streaming() || method.is_server_streaming() {
                format!(" {}", "(streaming, not callable)".yellow())
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  - {}({}) returns ({}){}\n",
                method.name().green(),
                method.input().full_name().cyan(),
                method.output().full_name().cyan(),
                streaming
            ));
        }
        FormattedString(out.trim_end().to_string())
    }
}
