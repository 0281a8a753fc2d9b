//! # Call Session
//!
//! [`Session`] ties every piece of the engine together. One call goes through these steps:
//!
//! 1. **Resolve**: the method name is looked up in the [`SchemaProvider`].
//! 2. **Collect**: the input message schema is walked and the human answers every field.
//! 3. **Assemble**: the answers are coerced into a typed request.
//! 4. **Invoke**: a connection is dialed, the request is sent and the connection is dropped,
//!    whatever the outcome.
//! 5. **Format**: the response is rendered as indented JSON.
//!
//! If the human ends the input while being asked, the call produces an empty result and nothing
//! is sent.
use crate::assembler::{self, AssembleError};
use crate::grpc::client::TransportError;
use crate::message::EncodeError;
use crate::registry::{Procedure, SchemaError, SchemaProvider};
use crate::resolver::ResolveError;
use crate::schema::MessageSchema;
use crate::source::{ChoiceSource, PromptSource};
use crate::walker::{self, CollectError, LabelFormat};
use prost_reflect::{DynamicMessage, MessageDescriptor};
use std::future::Future;
use tracing::{debug, instrument};

/// Opens connections and performs unary calls on them.
pub trait Transport {
    type Connection;

    fn dial(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>>;

    /// Sends `request` to `path` and decodes the reply with `response`.
    fn invoke(
        &self,
        connection: &mut Self::Connection,
        path: &str,
        request: DynamicMessage,
        response: MessageDescriptor,
    ) -> impl Future<Output = Result<DynamicMessage, TransportError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Resolve(ResolveError),
    #[error("Failed to collect request input: {0}")]
    Collect(#[source] CollectError),
    #[error("Failed to assemble request: {0}")]
    Assemble(#[source] AssembleError),
    #[error("Failed to encode request: {0}")]
    Encode(#[source] EncodeError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Format(#[from] serde_json::Error),
}

/// The server a session talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

pub struct Session<R, T> {
    registry: R,
    transport: T,
    target: Target,
    labels: LabelFormat,
}

impl<R, T> Session<R, T>
where
    R: SchemaProvider,
    T: Transport,
{
    pub fn new(registry: R, transport: T, target: Target) -> Self {
        Self {
            registry,
            transport,
            target,
            labels: LabelFormat::default(),
        }
    }

    /// Overrides how field labels are rendered.
    pub fn with_label_format(mut self, labels: LabelFormat) -> Self {
        self.labels = labels;
        self
    }

    /// Collects a request for `procedure`, sends it and returns the formatted response.
    ///
    /// Returns an empty string when the input was cancelled.
    #[instrument(skip_all, fields(procedure = %procedure))]
    pub async fn invoke<P, C>(
        &self,
        procedure: &str,
        prompt: P,
        choices: C,
    ) -> Result<String, CallError>
    where
        P: PromptSource,
        C: ChoiceSource,
    {
        let procedure = self.registry.procedure(procedure)?;
        let schema = MessageSchema::from(&procedure.input());

        if let Some(unsupported) = schema.find_unsupported() {
            return Err(CallError::Collect(CollectError::UnsupportedKind {
                field: unsupported.path,
                kind: unsupported.kind,
            }));
        }

        let collected = match walker::collect(prompt, choices, &self.labels, &schema) {
            Ok(collected) => collected,
            Err(CollectError::Cancelled) => {
                debug!("input cancelled, nothing sent");
                return Ok(String::new());
            }
            Err(CollectError::Resolve(err)) => return Err(CallError::Resolve(err)),
            Err(err) => return Err(CallError::Collect(err)),
        };

        let request = assembler::build(&schema, &collected)
            .map_err(CallError::Assemble)?
            .into_dynamic(procedure.input())
            .map_err(CallError::Encode)?;

        let response = self.send(&procedure, request).await?;

        Ok(format_response(&response)?)
    }

    async fn send(
        &self,
        procedure: &Procedure,
        request: DynamicMessage,
    ) -> Result<DynamicMessage, CallError> {
        let path = procedure.endpoint();

        let mut connection = self
            .transport
            .dial(&self.target.host, self.target.port)
            .await?;

        debug!(%path, "sending request");
        let response = self
            .transport
            .invoke(&mut connection, &path, request, procedure.output())
            .await;

        drop(connection);
        debug!("connection released");

        Ok(response?)
    }
}

/// Renders a response as JSON with 2-space indentation followed by a newline.
pub fn format_response(message: &DynamicMessage) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(message)?;
    text.push('\n');
    Ok(text)
}
